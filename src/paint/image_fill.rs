//! Image fills: a bitmap placed into the consumer's bounds.

use std::sync::Arc;

use crate::foundation::core::Affine;
use crate::paint::bitmap::Bitmap;
use crate::paint::sample::{Filter, ImageSpan, ImageSpread, SampleMethod};
use crate::paint::span::PaintContext;
use crate::viewport::aspect::AspectRatio;

/// Bitmap paint definition.
#[derive(Clone, Debug)]
pub struct ImageFill {
    /// Source pixels.
    pub bitmap: Arc<Bitmap>,
    /// Placement of the bitmap within the consumer's bounds.
    pub aspect: AspectRatio,
    /// Tiling outside the placed bitmap.
    pub spread: ImageSpread,
    /// Resampling filter; `None` uses the renderer default.
    pub sample: Option<SampleMethod>,
}

impl ImageFill {
    /// Untiled, centered, meet-fitted image.
    pub fn new(bitmap: Arc<Bitmap>) -> Self {
        Self {
            bitmap,
            aspect: AspectRatio::default(),
            spread: ImageSpread::Pad,
            sample: None,
        }
    }

    /// Source pixel space to consumer object space.
    pub fn placement(&self, ctx: &PaintContext<'_>) -> Affine {
        let b = ctx.bounds;
        let (iw, ih) = (f64::from(self.bitmap.width()), f64::from(self.bitmap.height()));
        self.aspect
            .map(b.width(), b.height(), iw, ih)
            .to_affine(0.0, 0.0, b.x0, b.y0)
    }

    /// Span generator for a consumer.
    pub fn span(&self, ctx: &PaintContext<'_>, default_sample: SampleMethod) -> ImageSpan {
        let xf = ctx.transform * self.placement(ctx);
        let filter = Filter::resolve(self.sample.unwrap_or(default_sample), xf, true);
        ImageSpan::new(self.bitmap.clone(), xf, self.spread, filter, ctx.opacity)
    }
}
