use super::*;

fn checker() -> Arc<Bitmap> {
    let a = Rgba8Premul::from_array([255, 0, 0, 255]);
    let b = Rgba8Premul::from_array([0, 0, 255, 255]);
    Arc::new(Bitmap::from_premul(2, 2, vec![a, b, b, a]).unwrap())
}

fn flat(color: [u8; 4]) -> Arc<Bitmap> {
    let px = Rgba8Premul::from_array(color);
    Arc::new(Bitmap::from_premul(4, 4, vec![px; 16]).unwrap())
}

fn run(span: &mut ImageSpan, x: i32, y: i32, len: usize) -> Vec<Rgba8Premul> {
    let mut out = vec![Rgba8Premul::transparent(); len];
    span.generate(x, y, &mut out);
    out
}

#[test]
fn unknown_method_falls_back_to_bicubic() {
    assert_eq!(SampleMethod::parse("hermite"), SampleMethod::Bicubic);
    assert_eq!(SampleMethod::parse("Lanczos"), SampleMethod::Lanczos);
    let m: SampleMethod = serde_json::from_str("\"wobbly\"").unwrap();
    assert_eq!(m, SampleMethod::Bicubic);
}

#[test]
fn kernel_shapes() {
    assert!((kernel_weight(SampleMethod::Bicubic, 2.0, 0.0) - 2.0 / 3.0).abs() < 1e-12);
    assert!((kernel_weight(SampleMethod::Bicubic, 2.0, 1.0) - 1.0 / 6.0).abs() < 1e-12);
    assert_eq!(kernel_weight(SampleMethod::Spline16, 2.0, 0.0), 1.0);
    assert!(kernel_weight(SampleMethod::Spline16, 2.0, 1.0).abs() < 1e-12);
    assert_eq!(kernel_weight(SampleMethod::Lanczos, 3.0, 0.0), 1.0);
    assert!(kernel_weight(SampleMethod::Lanczos, 3.0, 2.0).abs() < 1e-12);
    assert!((kernel_weight(SampleMethod::Kaiser, 1.0, 0.0) - 1.0).abs() < 1e-12);
    assert!((kernel_weight(SampleMethod::Mitchell, 2.0, 0.0) - 8.0 / 9.0).abs() < 1e-12);
    assert_eq!(kernel_weight(SampleMethod::Gaussian, 2.0, 2.5), 0.0);
}

#[test]
fn automatic_filter_follows_scale() {
    let pick = |s: f64| Filter::resolve(SampleMethod::Auto, Affine::scale(s), true);
    assert!(matches!(pick(0.25), Filter::Kernel { method: SampleMethod::Bicubic, .. }));
    assert!(matches!(pick(0.8), Filter::Kernel { method: SampleMethod::Sinc, .. }));
    assert!(matches!(pick(2.0), Filter::Kernel { method: SampleMethod::Spline16, .. }));
    assert_eq!(
        Filter::resolve(SampleMethod::Auto, Affine::scale(2.0), false),
        Filter::Bilinear
    );
}

#[test]
fn windowed_sinc_radius_depends_on_scale() {
    let r = |s: f64| match Filter::resolve(SampleMethod::Lanczos, Affine::scale(s), true) {
        Filter::Kernel { radius, .. } => radius,
        other => panic!("unexpected {other:?}"),
    };
    assert!((r(1.0) - 4.0).abs() < 1e-9);
    assert_eq!(r(0.01), 8.0);
    assert!((r(100.0) - 3.01).abs() < 1e-9);
}

#[test]
fn translation_copies_pixels_one_to_one() {
    let mut span = ImageSpan::new(
        checker(),
        Affine::translate((10.0, 10.0)),
        ImageSpread::Pad,
        Filter::Bilinear,
        1.0,
    );
    let row = run(&mut span, 9, 10, 4);
    assert_eq!(row[0], Rgba8Premul::transparent());
    assert_eq!(row[1].to_array(), [255, 0, 0, 255]);
    assert_eq!(row[2].to_array(), [0, 0, 255, 255]);
    assert_eq!(row[3], Rgba8Premul::transparent());
}

#[test]
fn repeat_and_reflect_tile_the_source() {
    let mut span = ImageSpan::new(
        checker(),
        Affine::IDENTITY,
        ImageSpread::Repeat,
        Filter::Bilinear,
        1.0,
    );
    let row = run(&mut span, 0, 0, 4);
    assert_eq!(row[2], row[0]);
    assert_eq!(row[3], row[1]);

    assert_eq!(reflect(-1, 3), 0);
    assert_eq!(reflect(3, 3), 2);
    assert_eq!(reflect(4, 3), 1);
    assert_eq!(ImageSpread::ReflectX.wrap(2, 2, 2, 2), Some((1, 0)));
    assert_eq!(ImageSpread::ReflectY.wrap(2, 2, 2, 2), Some((0, 1)));
}

#[test]
fn filters_preserve_flat_color() {
    for method in [
        SampleMethod::Bicubic,
        SampleMethod::Lanczos,
        SampleMethod::Mitchell,
        SampleMethod::Gaussian,
    ] {
        let xf = Affine::rotate(0.3) * Affine::scale(3.0);
        let filter = Filter::resolve(method, xf, true);
        let mut span = ImageSpan::new(flat([40, 80, 120, 200]), xf, ImageSpread::Repeat, filter, 1.0);
        for px in run(&mut span, 5, 5, 8) {
            assert_eq!(px.to_array(), [40, 80, 120, 200], "{method:?}");
        }
    }
}

#[test]
fn opacity_scales_samples() {
    let mut span = ImageSpan::new(
        flat([200, 200, 200, 255]),
        Affine::IDENTITY,
        ImageSpread::Repeat,
        Filter::Bilinear,
        0.5,
    );
    assert_eq!(run(&mut span, 0, 0, 1)[0].a, 128);
}
