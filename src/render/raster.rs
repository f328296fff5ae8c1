//! Anti-aliased coverage rasterization backed by `vello_cpu`.

use crate::foundation::core::{Affine, BezPath, IRect, PathEl, Point};
use crate::render::surface::FillRule;

/// 8-bit coverage over a device-space rectangle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Coverage {
    /// Device rectangle covered by `alpha`.
    pub bounds: IRect,
    /// Row-major coverage values.
    pub alpha: Vec<u8>,
}

impl Coverage {
    /// Coverage row `y` (device coordinates).
    pub fn row(&self, y: i32) -> &[u8] {
        let w = self.bounds.width() as usize;
        let start = (y - self.bounds.y0) as usize * w;
        &self.alpha[start..start + w]
    }

    /// Coverage row `y` (device coordinates).
    pub fn row_mut(&mut self, y: i32) -> &mut [u8] {
        let w = self.bounds.width() as usize;
        let start = (y - self.bounds.y0) as usize * w;
        &mut self.alpha[start..start + w]
    }

    /// Coverage at a device pixel; 0 outside the bounds.
    pub fn get(&self, x: i32, y: i32) -> u8 {
        let b = self.bounds;
        if x < b.x0 || y < b.y0 || x >= b.x1 || y >= b.y1 {
            return 0;
        }
        self.alpha[(y - b.y0) as usize * b.width() as usize + (x - b.x0) as usize]
    }
}

/// Turns a device-space path into coverage.
pub trait Rasterizer {
    /// Rasterize `path` (device space) under `rule`, restricted to `clip`. Returns `None` when
    /// nothing inside `clip` can be covered.
    fn rasterize(&mut self, path: &BezPath, rule: FillRule, clip: IRect) -> Option<Coverage>;
}

/// Coverage rasterizer using `vello_cpu`'s sparse-strip renderer.
#[derive(Clone, Debug)]
pub struct VelloRasterizer {
    gamma: GammaLut,
}

impl Default for VelloRasterizer {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl VelloRasterizer {
    /// Rasterizer applying `gamma` to coverage values.
    pub fn new(gamma: f64) -> Self {
        Self {
            gamma: GammaLut::new(gamma),
        }
    }
}

impl Rasterizer for VelloRasterizer {
    fn rasterize(&mut self, path: &BezPath, rule: FillRule, clip: IRect) -> Option<Coverage> {
        let bbox = kurbo::Shape::bounding_box(path);
        if !(bbox.x0.is_finite() && bbox.y0.is_finite() && bbox.x1.is_finite() && bbox.y1.is_finite())
        {
            tracing::warn!("path bounds are not finite; skipping rasterization");
            return None;
        }
        let bounds = IRect::enclosing(bbox).intersect(clip);
        if bounds.is_empty() {
            return None;
        }
        let (Ok(w), Ok(h)) = (
            u16::try_from(bounds.width()),
            u16::try_from(bounds.height()),
        ) else {
            tracing::warn!(
                width = bounds.width(),
                height = bounds.height(),
                "coverage area exceeds rasterizer limits"
            );
            return None;
        };

        let mut ctx = vello_cpu::RenderContext::new(w, h);
        ctx.set_transform(affine_to_cpu(Affine::translate((
            -f64::from(bounds.x0),
            -f64::from(bounds.y0),
        ))));
        ctx.set_fill_rule(match rule {
            FillRule::NonZero => vello_cpu::peniko::Fill::NonZero,
            FillRule::EvenOdd => vello_cpu::peniko::Fill::EvenOdd,
        });
        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(255, 255, 255, 255));
        ctx.fill_path(&bezpath_to_cpu(path));
        ctx.flush();

        let mut pixmap = vello_cpu::Pixmap::new(w, h);
        ctx.render_to_pixmap(&mut pixmap);
        let alpha = pixmap
            .data_as_u8_slice()
            .chunks_exact(4)
            .map(|px| self.gamma.apply(px[3]))
            .collect();

        Some(Coverage { bounds, alpha })
    }
}

/// Coverage gamma lookup.
#[derive(Clone, Debug)]
pub struct GammaLut {
    table: Option<Box<[u8; 256]>>,
}

impl GammaLut {
    /// Identity when `gamma` is 1 or not a positive finite value.
    pub fn new(gamma: f64) -> Self {
        if !(gamma.is_finite() && gamma > 0.0) || (gamma - 1.0).abs() < 1e-9 {
            return Self { table: None };
        }
        let mut table = Box::new([0u8; 256]);
        for (i, v) in table.iter_mut().enumerate() {
            *v = ((i as f64 / 255.0).powf(gamma) * 255.0).round() as u8;
        }
        Self { table: Some(table) }
    }

    /// Map one coverage value.
    #[inline]
    pub fn apply(&self, c: u8) -> u8 {
        match &self.table {
            Some(t) => t[c as usize],
            None => c,
        }
    }
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn point_to_cpu(p: Point) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}

fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(point_to_cpu(p)),
            PathEl::LineTo(p) => out.line_to(point_to_cpu(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(point_to_cpu(p1), point_to_cpu(p2)),
            PathEl::CurveTo(p1, p2, p3) => {
                out.curve_to(point_to_cpu(p1), point_to_cpu(p2), point_to_cpu(p3));
            }
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/render/raster.rs"]
mod tests;
