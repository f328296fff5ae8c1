//! Span generator contract and the solid-color generator.

use crate::foundation::core::{Affine, BezPath, Point, Rect, Rgba8Premul};
use crate::foundation::units::ViewSize;

/// Geometry of the node consuming a paint.
#[derive(Clone, Copy, Debug)]
pub struct PaintContext<'a> {
    /// Object-space path of the consumer.
    pub path: &'a BezPath,
    /// Object-space bounds of the consumer.
    pub bounds: Rect,
    /// Size that user-space relative values resolve against.
    pub view: ViewSize,
    /// Object-to-device transform of the consumer.
    pub transform: Affine,
    /// Effective opacity of the consumer.
    pub opacity: f64,
}

/// Produces premultiplied colors for a horizontal run of device pixels.
pub trait SpanGenerator {
    /// Fill `out` with the colors of pixels `x .. x + out.len()` on row `y`, sampled at pixel
    /// centers.
    fn generate(&mut self, x: i32, y: i32, out: &mut [Rgba8Premul]);
}

/// Constant color.
#[derive(Clone, Copy, Debug)]
pub struct SolidSpan {
    color: Rgba8Premul,
}

impl SolidSpan {
    /// Solid span of an already premultiplied color.
    pub fn new(color: Rgba8Premul) -> Self {
        Self { color }
    }
}

impl SpanGenerator for SolidSpan {
    fn generate(&mut self, _x: i32, _y: i32, out: &mut [Rgba8Premul]) {
        out.fill(self.color);
    }
}

/// Walks a span in paint space using the inverse of the paint-to-device transform.
#[derive(Clone, Copy, Debug)]
pub(crate) struct SpanInterpolator {
    inv: Affine,
}

impl SpanInterpolator {
    /// `paint_to_device` maps paint space to device pixels. A singular transform degrades to
    /// identity.
    pub(crate) fn new(paint_to_device: Affine) -> Self {
        let det = paint_to_device.determinant();
        let inv = if det.abs() > 1e-12 && det.is_finite() {
            paint_to_device.inverse()
        } else {
            tracing::warn!("singular paint transform; sampling with identity");
            Affine::IDENTITY
        };
        Self { inv }
    }

    /// Paint-space position of the center of pixel `(x, y)` and the per-pixel step along x.
    #[inline]
    pub(crate) fn begin(&self, x: i32, y: i32) -> (Point, (f64, f64)) {
        let p = self.inv * Point::new(f64::from(x) + 0.5, f64::from(y) + 0.5);
        let c = self.inv.as_coeffs();
        (p, (c[0], c[1]))
    }

    pub(crate) fn inverse(&self) -> Affine {
        self.inv
    }
}
