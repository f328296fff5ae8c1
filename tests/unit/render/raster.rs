use super::*;
use kurbo::{Rect, Shape};

fn clip() -> IRect {
    IRect::new(0, 0, 64, 64)
}

#[test]
fn pixel_aligned_square_is_fully_covered() {
    let path = Rect::new(4.0, 4.0, 12.0, 10.0).to_path(0.1);
    let cov = VelloRasterizer::default()
        .rasterize(&path, FillRule::NonZero, clip())
        .unwrap();
    assert_eq!(cov.bounds, IRect::new(4, 4, 12, 10));
    assert!(cov.alpha.iter().all(|&a| a == 255));
    assert_eq!(cov.get(3, 5), 0);
    assert_eq!(cov.row(5).len(), 8);
}

#[test]
fn half_pixel_edge_gets_partial_coverage() {
    let path = Rect::new(0.0, 0.0, 4.5, 4.0).to_path(0.1);
    let cov = VelloRasterizer::default()
        .rasterize(&path, FillRule::NonZero, clip())
        .unwrap();
    let edge = cov.get(4, 2);
    assert!(edge > 96 && edge < 160, "edge={edge}");
}

#[test]
fn even_odd_leaves_a_hole() {
    let mut path = Rect::new(0.0, 0.0, 30.0, 30.0).to_path(0.1);
    path.extend(Rect::new(10.0, 10.0, 20.0, 20.0).to_path(0.1));
    let mut r = VelloRasterizer::default();
    let eo = r.rasterize(&path, FillRule::EvenOdd, clip()).unwrap();
    let nz = r.rasterize(&path, FillRule::NonZero, clip()).unwrap();
    assert_eq!(eo.get(15, 15), 0);
    assert_eq!(nz.get(15, 15), 255);
    assert_eq!(eo.get(5, 5), 255);
}

#[test]
fn paths_outside_the_clip_produce_nothing() {
    let path = Rect::new(100.0, 100.0, 120.0, 120.0).to_path(0.1);
    assert!(
        VelloRasterizer::default()
            .rasterize(&path, FillRule::NonZero, clip())
            .is_none()
    );
}

#[test]
fn coverage_is_clipped_to_the_device_rect() {
    let path = Rect::new(-10.0, -10.0, 10.0, 10.0).to_path(0.1);
    let cov = VelloRasterizer::default()
        .rasterize(&path, FillRule::NonZero, IRect::new(0, 0, 5, 5))
        .unwrap();
    assert_eq!(cov.bounds, IRect::new(0, 0, 5, 5));
}

#[test]
fn gamma_table_bends_midtones_only() {
    let g = GammaLut::new(2.0);
    assert_eq!(g.apply(0), 0);
    assert_eq!(g.apply(255), 255);
    assert!(g.apply(128) < 128);
    assert_eq!(GammaLut::new(1.0).apply(77), 77);
}
