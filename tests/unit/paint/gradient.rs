use super::*;
use crate::foundation::core::BezPath;
use kurbo::Shape;

const RED: Color = Color::rgb(255, 0, 0);
const BLUE: Color = Color::rgb(0, 0, 255);

fn red_blue(kind: GradientKind) -> Gradient {
    Gradient::new(kind, vec![GradientStop::new(0.0, RED), GradientStop::new(1.0, BLUE)]).unwrap()
}

fn ctx(path: &BezPath) -> PaintContext<'_> {
    PaintContext {
        path,
        bounds: path.bounding_box(),
        view: ViewSize::new(400.0, 400.0),
        transform: Affine::IDENTITY,
        opacity: 1.0,
    }
}

fn row(span: &mut GradientSpan, x: i32, y: i32, len: usize) -> Vec<Rgba8Premul> {
    let mut out = vec![Rgba8Premul::transparent(); len];
    span.generate(x, y, &mut out);
    out
}

#[test]
fn two_stop_table_blends_at_the_middle() {
    let t = ColorTable::build(red_blue(GradientKind::Linear).stops(), 1.0);
    let mid = t.get(128);
    assert!((mid.r as i32 - 127).abs() <= 2, "{mid:?}");
    assert!((mid.b as i32 - 128).abs() <= 2, "{mid:?}");
    assert_eq!(mid.a, 255);
    assert_eq!(t.get(0), RED.premul());
    assert_eq!(t.get(255), BLUE.premul());
}

#[test]
fn table_pads_before_first_and_after_last_stop() {
    let stops = [GradientStop::new(0.25, RED), GradientStop::new(0.5, BLUE)];
    let t = ColorTable::build(&stops, 1.0);
    assert_eq!(t.get(10), RED.premul());
    assert_eq!(t.get(200), BLUE.premul());
}

#[test]
fn table_opacity_scales_alpha() {
    let t = ColorTable::build(red_blue(GradientKind::Linear).stops(), 0.5);
    assert_eq!(t.get(0).a, 128);
    assert_eq!(t.get(0).r, 128);
}

#[test]
fn invalid_stops_are_rejected_and_previous_kept() {
    let mut g = red_blue(GradientKind::Linear);
    let err = g.set_stops(vec![GradientStop::new(0.6, RED), GradientStop::new(0.4, BLUE)]);
    assert!(matches!(err, Err(SceneError::Validation(_))));
    assert!(g.set_stops(vec![GradientStop::new(1.5, RED)]).is_err());
    assert_eq!(g.stops().len(), 2);
    assert_eq!(g.stops()[0].offset, 0.0);
}

#[test]
fn linear_bounding_box_gradient_runs_across_the_shape() {
    let path = Rect::new(0.0, 0.0, 256.0, 10.0).to_path(0.1);
    let mut span = red_blue(GradientKind::Linear).span(&ctx(&path)).unwrap();
    let px = row(&mut span, 0, 5, 256);
    assert_eq!(px[0], RED.premul());
    assert_eq!(px[255], BLUE.premul());
    assert!(px[128].r < 140 && px[128].b > 115);
}

#[test]
fn user_space_linear_gradient_ignores_the_bounds() {
    let path = Rect::new(100.0, 0.0, 200.0, 10.0).to_path(0.1);
    let mut g = red_blue(GradientKind::Linear);
    g.units = Units::UserSpace;
    g.x1 = Coord::Px(100.0);
    g.x2 = Coord::Px(200.0);
    let mut span = g.span(&ctx(&path)).unwrap();
    let px = row(&mut span, 0, 0, 300);
    assert_eq!(px[50], RED.premul());
    assert_eq!(px[250], BLUE.premul());
}

#[test]
fn radial_gradient_grows_from_the_center() {
    let path = Rect::new(0.0, 0.0, 100.0, 100.0).to_path(0.1);
    let mut span = red_blue(GradientKind::Radial).span(&ctx(&path)).unwrap();
    let px = row(&mut span, 0, 50, 100);
    assert!(px[50].r > 240);
    assert!(px[99].b > 240);
}

#[test]
fn focal_point_starts_the_ramp() {
    let path = Rect::new(0.0, 0.0, 100.0, 100.0).to_path(0.1);
    let mut g = red_blue(GradientKind::Radial);
    g.fx = Some(Coord::Rel(0.25));
    let mut span = g.span(&ctx(&path)).unwrap();
    let px = row(&mut span, 25, 50, 1);
    assert!(px[0].r > 240, "{:?}", px[0]);
}

#[test]
fn focal_radius_reshapes_the_ramp_around_the_focus() {
    let path = Rect::new(0.0, 0.0, 100.0, 100.0).to_path(0.1);
    let mut plain = red_blue(GradientKind::Radial);
    plain.fx = Some(Coord::Rel(0.25));
    let mut narrow = plain.clone();
    narrow.focal_radius = Some(Coord::Rel(0.3));
    let mut unset = plain.clone();
    unset.focal_radius = Some(Coord::Rel(0.0));

    let a = row(&mut plain.span(&ctx(&path)).unwrap(), 25, 50, 60);
    let b = row(&mut narrow.span(&ctx(&path)).unwrap(), 25, 50, 60);
    let c = row(&mut unset.span(&ctx(&path)).unwrap(), 25, 50, 60);
    assert!(b[0].r > 240, "{:?}", b[0]);
    assert!(
        (a[50].b as i32 - b[50].b as i32).abs() > 10,
        "{:?} vs {:?}",
        a[50],
        b[50]
    );
    assert_eq!(a, c);
}

#[test]
fn fewer_than_two_stops_are_rejected() {
    let one = Gradient::new(GradientKind::Linear, vec![GradientStop::new(0.0, RED)]);
    assert!(matches!(one, Err(SceneError::Validation(_))));
    assert!(Gradient::new(GradientKind::Linear, vec![]).is_err());
    let mut g = red_blue(GradientKind::Linear);
    assert!(g.set_stops(vec![GradientStop::new(0.5, BLUE)]).is_err());
    assert_eq!(g.stops().len(), 2);
}

#[test]
fn clip_spread_leaves_outside_transparent() {
    let path = Rect::new(0.0, 0.0, 100.0, 100.0).to_path(0.1);
    let mut g = red_blue(GradientKind::Radial);
    g.spread = SpreadMethod::Clip;
    g.radius = Coord::Rel(0.25);
    let mut span = g.span(&ctx(&path)).unwrap();
    let px = row(&mut span, 0, 50, 100);
    assert_eq!(px[2], Rgba8Premul::transparent());
    assert!(px[50].a > 0);
}

#[test]
fn spread_index_modes() {
    assert_eq!(spread_index(-5.0, SpreadMethod::Pad), Some(0));
    assert_eq!(spread_index(300.0, SpreadMethod::Pad), Some(255));
    assert_eq!(spread_index(260.0, SpreadMethod::Repeat), Some(4));
    assert_eq!(spread_index(260.0, SpreadMethod::Reflect), Some(251));
    assert_eq!(spread_index(-1.0, SpreadMethod::Clip), None);
    assert_eq!(spread_index(256.0, SpreadMethod::Clip), Some(255));
    assert_eq!(spread_index(f64::NAN, SpreadMethod::Pad), None);
}

#[test]
fn conic_and_diamond_are_symmetric() {
    let path = Rect::new(0.0, 0.0, 100.0, 100.0).to_path(0.1);
    for kind in [GradientKind::Conic, GradientKind::Diamond] {
        let mut span = red_blue(kind).span(&ctx(&path)).unwrap();
        let top = row(&mut span, 50, 20, 1)[0];
        let bottom = row(&mut span, 50, 79, 1)[0];
        assert!((top.r as i32 - bottom.r as i32).abs() <= 3, "{kind:?}");
    }
}

#[test]
fn contour_gradient_is_deepest_at_the_center() {
    let path = Rect::new(0.0, 0.0, 64.0, 64.0).to_path(0.1);
    let mut span = red_blue(GradientKind::Contour).span(&ctx(&path)).unwrap();
    let px = row(&mut span, 0, 32, 64);
    assert!(px[0].r > 200);
    assert!(px[32].b > 200);
}

#[test]
fn empty_gradient_paints_nothing() {
    let path = Rect::new(0.0, 0.0, 10.0, 10.0).to_path(0.1);
    let g = Gradient::default();
    assert!(g.span(&ctx(&path)).is_none());
}
