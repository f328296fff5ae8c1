//! 8-bit clip masks.

use kurbo::Shape;

use crate::foundation::core::{BezPath, IRect, Rect};
use crate::foundation::math::mul_div255_u8;
use crate::render::raster::{Coverage, Rasterizer};
use crate::render::surface::FillRule;

/// Largest mask side in pixels.
pub const DEFAULT_CLIP_CEILING: u32 = 4096;

/// Alpha mask over a device rectangle; pixels outside the rectangle are fully masked.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClipMask {
    bounds: IRect,
    alpha: Vec<u8>,
}

impl ClipMask {
    /// Union bounds of `paths`, clamped to `ceiling` per side and at least 1x1.
    pub fn mask_bounds(paths: &[(BezPath, FillRule)], ceiling: u32) -> IRect {
        let union = paths
            .iter()
            .map(|(p, _)| p.bounding_box())
            .filter(|r| r.x0.is_finite() && r.y0.is_finite() && r.x1.is_finite() && r.y1.is_finite())
            .reduce(|a, b| a.union(b))
            .unwrap_or(Rect::ZERO);
        let mut b = IRect::enclosing(union);

        let ceiling = ceiling.max(1);
        if b.width() > ceiling || b.height() > ceiling {
            tracing::warn!(
                width = b.width(),
                height = b.height(),
                ceiling,
                "clip mask exceeds size ceiling; clamping"
            );
        }
        let w = b.width().clamp(1, ceiling) as i32;
        let h = b.height().clamp(1, ceiling) as i32;
        b.x1 = b.x0.saturating_add(w);
        b.y1 = b.y0.saturating_add(h);
        b
    }

    /// Rasterize the union of `paths` (device space). `consumer` is an additional path
    /// contributed by the node the mask is built for, such as a viewport's own box.
    pub fn build(
        paths: &[(BezPath, FillRule)],
        consumer: Option<&BezPath>,
        rasterizer: &mut dyn Rasterizer,
        ceiling: u32,
    ) -> Self {
        let mut all: Vec<(BezPath, FillRule)> = paths.to_vec();
        if let Some(extra) = consumer {
            all.push((extra.clone(), FillRule::NonZero));
        }
        let bounds = Self::mask_bounds(&all, ceiling);
        let mut mask = Self {
            bounds,
            alpha: vec![0; bounds.width() as usize * bounds.height() as usize],
        };
        for (path, rule) in &all {
            if let Some(cov) = rasterizer.rasterize(path, *rule, bounds) {
                mask.add(&cov);
            }
        }
        mask
    }

    /// Device rectangle of the mask.
    pub fn bounds(&self) -> IRect {
        self.bounds
    }

    /// Mask value at a device pixel.
    pub fn get(&self, x: i32, y: i32) -> u8 {
        let b = self.bounds;
        if x < b.x0 || y < b.y0 || x >= b.x1 || y >= b.y1 {
            return 0;
        }
        self.alpha[(y - b.y0) as usize * b.width() as usize + (x - b.x0) as usize]
    }

    // Union with `cov`: a + b - ab.
    fn add(&mut self, cov: &Coverage) {
        for y in cov.bounds.y0..cov.bounds.y1 {
            let row = cov.row(y);
            for (i, &c) in row.iter().enumerate() {
                let x = cov.bounds.x0 + i as i32;
                let idx = (y - self.bounds.y0) as usize * self.bounds.width() as usize
                    + (x - self.bounds.x0) as usize;
                let a = self.alpha[idx];
                self.alpha[idx] =
                    a.saturating_add(c).saturating_sub(mul_div255_u8(u16::from(a), u16::from(c)));
            }
        }
    }

    /// Multiply by `outer`, for masks nested inside another active mask.
    pub fn intersect(&mut self, outer: &ClipMask) {
        let b = self.bounds;
        for y in b.y0..b.y1 {
            for x in b.x0..b.x1 {
                let idx = (y - b.y0) as usize * b.width() as usize + (x - b.x0) as usize;
                self.alpha[idx] =
                    mul_div255_u8(u16::from(self.alpha[idx]), u16::from(outer.get(x, y)));
            }
        }
    }

    /// Multiply coverage by the mask.
    pub fn apply(&self, cov: &mut Coverage) {
        let b = cov.bounds;
        for y in b.y0..b.y1 {
            let row = cov.row_mut(y);
            for (i, c) in row.iter_mut().enumerate() {
                *c = mul_div255_u8(u16::from(*c), u16::from(self.get(b.x0 + i as i32, y)));
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/clip.rs"]
mod tests;
