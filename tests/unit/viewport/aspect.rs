use super::*;

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn meet_fits_inside_and_touches_one_edge_pair() {
    for &(tw, th, sw, sh) in &[
        (200.0, 100.0, 50.0, 50.0),
        (100.0, 300.0, 40.0, 10.0),
        (64.0, 64.0, 128.0, 32.0),
    ] {
        let m = AspectRatio::default().map(tw, th, sw, sh);
        let (w, h) = (sw * m.scale_x, sh * m.scale_y);
        assert!(w <= tw + 1e-9 && h <= th + 1e-9);
        assert!(approx(w, tw) || approx(h, th));
        assert!(m.offset_x >= 0.0 && m.offset_y >= 0.0);
    }
}

#[test]
fn slice_covers_the_target() {
    let ar = AspectRatio {
        fit: Fit::Slice,
        ..AspectRatio::default()
    };
    let m = ar.map(200.0, 100.0, 50.0, 50.0);
    assert!(approx(m.scale_x, 4.0));
    assert!(50.0 * m.scale_x >= 200.0 && 50.0 * m.scale_y >= 100.0);
    assert!(approx(m.offset_y, -50.0));
}

#[test]
fn alignment_places_leftover_space() {
    let mut ar = AspectRatio {
        x: Align::Min,
        ..AspectRatio::default()
    };
    assert!(approx(ar.map(200.0, 100.0, 10.0, 10.0).offset_x, 0.0));
    ar.x = Align::Mid;
    assert!(approx(ar.map(200.0, 100.0, 10.0, 10.0).offset_x, 50.0));
    ar.x = Align::Max;
    assert!(approx(ar.map(200.0, 100.0, 10.0, 10.0).offset_x, 100.0));
}

#[test]
fn none_scales_axes_independently() {
    let ar = AspectRatio::parse("none").unwrap();
    let m = ar.map(200.0, 100.0, 50.0, 50.0);
    assert_eq!(m, ViewMapping {
        offset_x: 0.0,
        offset_y: 0.0,
        scale_x: 4.0,
        scale_y: 2.0,
    });
}

#[test]
fn none_leaves_a_sub_pixel_axis_unscaled() {
    let ar = AspectRatio::parse("none").unwrap();
    let m = ar.map(100.0, 100.0, 0.5, 200.0);
    assert_eq!(m.scale_x, 1.0);
    assert!(approx(m.scale_y, 0.5));

    let m = ar.map(0.5, 100.0, 50.0, 50.0);
    assert_eq!(m.scale_x, 1.0);
    assert!(approx(m.scale_y, 2.0));
}

#[test]
fn degenerate_source_is_replaced_by_target() {
    let m = AspectRatio::default().map(80.0, 40.0, 0.0, 0.0);
    assert!(approx(m.scale_x, 1.0) && approx(m.scale_y, 1.0));
}

#[test]
fn parse_accepts_svg_forms() {
    let ar = AspectRatio::parse("xMinYMax slice").unwrap();
    assert_eq!(ar, AspectRatio {
        x: Align::Min,
        y: Align::Max,
        fit: Fit::Slice,
    });
    assert_eq!(AspectRatio::parse("").unwrap(), AspectRatio::default());
    assert!(AspectRatio::parse("xLeftYMid").is_err());
    assert!(AspectRatio::parse("xMidYMid stretch").is_err());
}

#[test]
fn mapping_affine_places_view_origin_at_offset() {
    let m = AspectRatio::default().map(200.0, 100.0, 50.0, 50.0);
    let a = m.to_affine(10.0, 10.0, 5.0, 0.0);
    let p = a * kurbo::Point::new(10.0, 10.0);
    assert!(approx(p.x, 5.0 + 50.0) && approx(p.y, 0.0));
}

#[test]
fn deserializes_from_text_or_flags() {
    let a: AspectRatio = serde_json::from_str("\"xMinYMax slice\"").unwrap();
    assert_eq!((a.x, a.y, a.fit), (Align::Min, Align::Max, Fit::Slice));
    let b: AspectRatio = serde_json::from_str(r#"{"fit": "none"}"#).unwrap();
    assert_eq!((b.x, b.y, b.fit), (Align::Mid, Align::Mid, Fit::None));
    assert!(serde_json::from_str::<AspectRatio>("\"xFooYMid\"").is_err());
}
