//! Pattern definitions and tile placement.

use crate::foundation::core::{Affine, Rect};
use crate::foundation::units::Coord;
use crate::paint::gradient::Units;
use crate::paint::sample::{ImageSpread, SampleMethod};
use crate::paint::span::PaintContext;
use crate::scene::node::NodeId;
use crate::transform::affine::{Transform, affine_scale, compose};
use crate::viewport::aspect::{AspectRatio, ViewBox};

/// A tiled sub-scene used as paint.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Pattern {
    /// Coordinate system of the tile rectangle.
    pub units: Units,
    /// Coordinate system of the tile content.
    pub content_units: Units,
    /// Tile left.
    pub x: Coord,
    /// Tile top.
    pub y: Coord,
    /// Tile width.
    pub width: Coord,
    /// Tile height.
    pub height: Coord,
    /// Optional content view box, fitted into the tile with `aspect`.
    pub view_box: Option<ViewBox>,
    /// View box fitting.
    pub aspect: AspectRatio,
    /// Pattern-space transforms.
    pub transforms: Vec<Transform>,
    /// Tiling; repeat unless overridden.
    pub spread: ImageSpread,
    /// Resampling of the rendered tile.
    pub sample: SampleMethod,
    /// Detached root of the tile content.
    #[serde(skip)]
    pub content: Option<NodeId>,
}

impl Default for Pattern {
    fn default() -> Self {
        Self {
            units: Units::BoundingBox,
            content_units: Units::UserSpace,
            x: Coord::Px(0.0),
            y: Coord::Px(0.0),
            width: Coord::Px(0.0),
            height: Coord::Px(0.0),
            view_box: None,
            aspect: AspectRatio::default(),
            transforms: Vec::new(),
            spread: ImageSpread::Repeat,
            sample: SampleMethod::Auto,
            content: None,
        }
    }
}

/// How a pattern tile is rasterized and mapped back onto the consumer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TilePlan {
    /// Tile width in pixels.
    pub width: u32,
    /// Tile height in pixels.
    pub height: u32,
    /// Tile content space to tile pixels.
    pub content: Affine,
    /// Tile pixels to device space.
    pub image_to_device: Affine,
}

impl Pattern {
    /// Tile rectangle in the consumer's object space.
    pub fn tile_rect(&self, ctx: &PaintContext<'_>) -> Rect {
        match self.units {
            Units::BoundingBox => {
                let b = ctx.bounds;
                let frac = |c: Coord| match c {
                    Coord::Px(v) => v,
                    Coord::Rel(f) => f,
                };
                Rect::from_origin_size(
                    (b.x0 + frac(self.x) * b.width(), b.y0 + frac(self.y) * b.height()),
                    (frac(self.width) * b.width(), frac(self.height) * b.height()),
                )
            }
            Units::UserSpace => Rect::from_origin_size(
                (self.x.resolve(ctx.view.width), self.y.resolve(ctx.view.height)),
                (
                    self.width.resolve(ctx.view.width),
                    self.height.resolve(ctx.view.height),
                ),
            ),
        }
    }

    /// Plan the tile for a consumer; `None` for an empty tile. Tile sides are capped at
    /// `ceiling` pixels.
    pub fn plan(&self, ctx: &PaintContext<'_>, ceiling: u32) -> Option<TilePlan> {
        let tile = self.tile_rect(ctx);
        let (tw, th) = (tile.width(), tile.height());
        if !(tw.is_finite() && th.is_finite()) || tw <= 0.0 || th <= 0.0 {
            return None;
        }

        let own = compose(&self.transforms);
        let scale = affine_scale(ctx.transform * own).max(1e-6);
        let cap = f64::from(ceiling.max(1));
        let pw = (tw * scale).ceil().clamp(1.0, cap);
        let ph = (th * scale).ceil().clamp(1.0, cap);

        let to_pixels = Affine::scale_non_uniform(pw / tw, ph / th);
        let content_map = match (self.view_box, self.content_units) {
            (Some(vb), _) if vb.width > 0.0 && vb.height > 0.0 => self
                .aspect
                .map(tw, th, vb.width, vb.height)
                .to_affine(vb.x, vb.y, 0.0, 0.0),
            (_, Units::BoundingBox) => {
                Affine::scale_non_uniform(ctx.bounds.width(), ctx.bounds.height())
            }
            _ => Affine::IDENTITY,
        };

        Some(TilePlan {
            width: pw as u32,
            height: ph as u32,
            content: to_pixels * content_map,
            image_to_device: ctx.transform
                * own
                * Affine::translate((tile.x0, tile.y0))
                * to_pixels.inverse(),
        })
    }
}
