use super::*;
use crate::render::raster::VelloRasterizer;

fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> (BezPath, FillRule) {
    (Rect::new(x0, y0, x1, y1).to_path(0.1), FillRule::NonZero)
}

#[test]
fn bounds_are_the_union_of_content() {
    let b = ClipMask::mask_bounds(&[rect(0.0, 0.0, 10.0, 10.0), rect(20.0, 5.0, 30.0, 40.0)], 4096);
    assert_eq!(b, IRect::new(0, 0, 30, 40));
}

#[test]
fn oversized_content_is_clamped_to_the_ceiling() {
    let b = ClipMask::mask_bounds(&[rect(0.0, 0.0, 10000.0, 5000.0)], DEFAULT_CLIP_CEILING);
    assert_eq!((b.width(), b.height()), (4096, 4096));
}

#[test]
fn empty_content_degrades_to_one_pixel() {
    let b = ClipMask::mask_bounds(&[], 4096);
    assert_eq!((b.width(), b.height()), (1, 1));
    let b = ClipMask::mask_bounds(&[rect(5.0, 5.0, 5.0, 5.0)], 4096);
    assert_eq!((b.width(), b.height()), (1, 1));
}

#[test]
fn mask_is_opaque_inside_content_and_clear_outside() {
    let mut r = VelloRasterizer::default();
    let m = ClipMask::build(
        &[rect(0.0, 0.0, 10.0, 10.0), rect(20.0, 0.0, 30.0, 10.0)],
        None,
        &mut r,
        4096,
    );
    assert_eq!(m.get(5, 5), 255);
    assert_eq!(m.get(25, 5), 255);
    assert_eq!(m.get(15, 5), 0);
    assert_eq!(m.get(-1, 5), 0);
}

#[test]
fn consumer_path_is_included() {
    let mut r = VelloRasterizer::default();
    let (extra, _) = rect(40.0, 40.0, 50.0, 50.0);
    let m = ClipMask::build(&[rect(0.0, 0.0, 10.0, 10.0)], Some(&extra), &mut r, 4096);
    assert_eq!(m.get(45, 45), 255);
}

#[test]
fn nested_masks_intersect() {
    let mut r = VelloRasterizer::default();
    let outer = ClipMask::build(&[rect(0.0, 0.0, 10.0, 10.0)], None, &mut r, 4096);
    let mut inner = ClipMask::build(&[rect(5.0, 0.0, 15.0, 10.0)], None, &mut r, 4096);
    inner.intersect(&outer);
    assert_eq!(inner.get(7, 5), 255);
    assert_eq!(inner.get(12, 5), 0);
}

#[test]
fn apply_multiplies_coverage() {
    let mut r = VelloRasterizer::default();
    let m = ClipMask::build(&[rect(0.0, 0.0, 4.0, 4.0)], None, &mut r, 4096);
    let mut cov = Coverage {
        bounds: IRect::new(2, 0, 6, 1),
        alpha: vec![255; 4],
    };
    m.apply(&mut cov);
    assert_eq!(cov.alpha, vec![255, 255, 0, 0]);
}
