use super::*;

fn stops() -> Vec<TransitionStop> {
    vec![
        TransitionStop::parse(0.0, "scale(1)").unwrap(),
        TransitionStop::parse(0.5, "translate(10, 20) scale(3)").unwrap(),
        TransitionStop::parse(1.0, "rotate(90)").unwrap(),
    ]
}

#[test]
fn exact_offsets_return_stop_matrix() {
    let s = stops();
    for stop in &s {
        assert_eq!(interpolate_transform(&s, stop.offset), stop.matrix());
    }
}

#[test]
fn interior_offset_is_exact_without_rounding() {
    let stops = vec![
        TransitionStop::parse(0.0, "scale(0.2)").unwrap(),
        TransitionStop::parse(0.5, "scale(0.9)").unwrap(),
        TransitionStop::parse(1.0, "scale(1)").unwrap(),
    ];
    assert_eq!(interpolate_transform(&stops, 0.5), Affine::scale(0.9));
    assert_eq!(interpolate_transform(&stops, 0.5), stops[1].matrix);
}

#[test]
fn midpoint_is_componentwise_mean() {
    let s = stops();
    let m = interpolate_transform(&s, 0.25).as_coeffs();
    let a = s[0].matrix().as_coeffs();
    let b = s[1].matrix().as_coeffs();
    for i in 0..6 {
        assert!((m[i] - (a[i] + b[i]) * 0.5).abs() < 1e-12);
    }
}

#[test]
fn positions_outside_range_clamp_to_end_stops() {
    let s = stops();
    assert_eq!(interpolate_transform(&s, -1.0), s[0].matrix());
    assert_eq!(interpolate_transform(&s, 2.0), s[2].matrix());
}

#[test]
fn unbracketed_position_falls_back_to_identity() {
    let s = stops();
    assert_eq!(interpolate_transform(&s, f64::NAN), Affine::IDENTITY);
    assert_eq!(interpolate_transform(&[], 0.5), Affine::IDENTITY);
}

#[test]
fn validation_rejects_bad_stop_sets() {
    assert!(Transition::parse([(0.0, "scale(1)")]).is_err());
    assert!(Transition::parse([(0.0, "scale(1)"), (1.5, "scale(2)")]).is_err());
    assert!(Transition::parse([(0.6, "scale(1)"), (0.4, "scale(2)")]).is_err());
    let many: Vec<(f64, &str)> = (0..11).map(|i| (i as f64 / 10.0, "scale(1)")).collect();
    assert!(Transition::parse(many).is_err());
    assert!(Transition::parse([(0.0, "scale(1)"), (1.0, "scale(2)")]).is_ok());
}

#[test]
fn morph_maps_first_and_last_vertex_through_end_stops() {
    let t = Transition::parse([(0.0, "translate(0,0)"), (1.0, "translate(0,10)")]).unwrap();
    let mut p = BezPath::new();
    p.move_to((0.0, 0.0));
    p.line_to((5.0, 0.0));
    p.line_to((10.0, 0.0));
    let out = t.morph_path(&p);
    let els = out.elements();
    assert_eq!(els[0], PathEl::MoveTo(Point::new(0.0, 0.0)));
    assert_eq!(els[1], PathEl::LineTo(Point::new(5.0, 5.0)));
    assert_eq!(els[2], PathEl::LineTo(Point::new(10.0, 10.0)));
}
