//! Gradient definitions, color tables and the gradient span generator.

use std::sync::Arc;

use crate::foundation::core::{Affine, Point, Rect, Rgba8Premul};
use crate::foundation::error::{SceneError, SceneResult};
use crate::foundation::math::lerp;
use crate::foundation::units::{Coord, ViewSize};
use crate::paint::color::Color;
use crate::paint::contour::ContourField;
use crate::paint::span::{PaintContext, SpanGenerator, SpanInterpolator};
use crate::transform::affine::{Transform, affine_scale, compose};

/// Length of the gradient axis in gradient space, and the color table size.
pub const GRADIENT_SPAN: f64 = 256.0;

/// Gradient geometry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GradientKind {
    /// Along the axis from `(x1, y1)` to `(x2, y2)`.
    #[default]
    Linear,
    /// Circles around the center, optionally seen from a focal point.
    Radial,
    /// Squares around the center.
    Diamond,
    /// Angle around the center.
    Conic,
    /// Depth inside the consumer's own outline.
    Contour,
}

/// Coordinate system of gradient, clip and pattern geometry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Units {
    /// Fractions of the consumer's object bounding box.
    #[default]
    BoundingBox,
    /// The consumer's user space; relative values resolve against the enclosing view.
    UserSpace,
}

/// What happens past the ends of the gradient ramp.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpreadMethod {
    /// Extend the end colors.
    #[default]
    Pad,
    /// Mirror the ramp.
    Reflect,
    /// Restart the ramp.
    Repeat,
    /// Leave pixels outside the ramp unpainted.
    Clip,
}

/// One color stop.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GradientStop {
    /// Position in `[0, 1]`.
    pub offset: f64,
    /// Straight color.
    pub color: Color,
}

impl GradientStop {
    /// Stop at `offset`.
    pub fn new(offset: f64, color: Color) -> Self {
        Self { offset, color }
    }
}

/// A gradient definition.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Gradient {
    /// Geometry.
    pub kind: GradientKind,
    /// Coordinate system.
    pub units: Units,
    /// Spread past the ramp ends.
    pub spread: SpreadMethod,
    /// Linear start x, or the contour window start.
    pub x1: Coord,
    /// Linear start y.
    pub y1: Coord,
    /// Linear end x, or the contour window end.
    pub x2: Coord,
    /// Linear end y.
    pub y2: Coord,
    /// Center x.
    pub cx: Coord,
    /// Center y.
    pub cy: Coord,
    /// Focal x; defaults to the center.
    pub fx: Option<Coord>,
    /// Focal y; defaults to the center.
    pub fy: Option<Coord>,
    /// Radius.
    pub radius: Coord,
    /// Radius of the focal area; absent or non-positive uses `radius`.
    pub focal_radius: Option<Coord>,
    /// Keep the focal point strictly inside the radius.
    pub contain_focal: bool,
    /// Gradient-space transforms, applied before the consumer's transform.
    pub transforms: Vec<Transform>,
    stops: Vec<GradientStop>,
}

impl Default for Gradient {
    fn default() -> Self {
        Self {
            kind: GradientKind::Linear,
            units: Units::BoundingBox,
            spread: SpreadMethod::Pad,
            x1: Coord::Px(0.0),
            y1: Coord::Px(0.0),
            x2: Coord::Rel(1.0),
            y2: Coord::Px(0.0),
            cx: Coord::Rel(0.5),
            cy: Coord::Rel(0.5),
            fx: None,
            fy: None,
            radius: Coord::Rel(0.5),
            focal_radius: None,
            contain_focal: false,
            transforms: Vec::new(),
            stops: Vec::new(),
        }
    }
}

/// Reject stop lists with fewer than two stops, or with offsets outside `[0, 1]` or out of
/// order.
pub fn validate_gradient_stops(stops: &[GradientStop]) -> SceneResult<()> {
    if stops.len() < 2 {
        return Err(SceneError::validation(format!(
            "gradient needs at least 2 stops, got {}",
            stops.len()
        )));
    }
    let mut prev = 0.0f64;
    for (i, s) in stops.iter().enumerate() {
        if !(0.0..=1.0).contains(&s.offset) {
            return Err(SceneError::validation(format!(
                "gradient stop {i} offset {} outside [0, 1]",
                s.offset
            )));
        }
        if s.offset < prev {
            return Err(SceneError::validation(format!(
                "gradient stop {i} offset {} precedes {prev}",
                s.offset
            )));
        }
        prev = s.offset;
    }
    Ok(())
}

impl Gradient {
    /// Gradient of `kind` with the given stops.
    pub fn new(kind: GradientKind, stops: Vec<GradientStop>) -> SceneResult<Self> {
        let mut g = Self {
            kind,
            ..Self::default()
        };
        g.set_stops(stops)?;
        Ok(g)
    }

    /// Color stops in offset order.
    pub fn stops(&self) -> &[GradientStop] {
        &self.stops
    }

    /// Replace the stops; on error the previous stops are kept.
    pub fn set_stops(&mut self, stops: Vec<GradientStop>) -> SceneResult<()> {
        validate_gradient_stops(&stops)?;
        self.stops = stops;
        Ok(())
    }

    /// Validate a gradient read from a document.
    pub fn validate(&self) -> SceneResult<()> {
        validate_gradient_stops(&self.stops)
    }

    fn frac(c: Coord) -> f64 {
        match c {
            Coord::Px(v) => v,
            Coord::Rel(f) => f,
        }
    }

    fn resolve_x(&self, c: Coord, view: ViewSize) -> f64 {
        match self.units {
            Units::BoundingBox => Self::frac(c),
            Units::UserSpace => c.resolve(view.width),
        }
    }

    fn resolve_y(&self, c: Coord, view: ViewSize) -> f64 {
        match self.units {
            Units::BoundingBox => Self::frac(c),
            Units::UserSpace => c.resolve(view.height),
        }
    }

    fn resolve_radius(&self, radius: Coord, view: ViewSize) -> f64 {
        match self.units {
            Units::BoundingBox => Self::frac(radius),
            Units::UserSpace => radius.resolve(view.diagonal_mean()),
        }
    }

    // Bounding-box units map the unit square onto the consumer's bounds.
    fn units_map(&self, bounds: Rect) -> Affine {
        match self.units {
            Units::BoundingBox => {
                let w = bounds.width().max(1.0);
                let h = bounds.height().max(1.0);
                Affine::translate((bounds.x0, bounds.y0)) * Affine::scale_non_uniform(w, h)
            }
            Units::UserSpace => Affine::IDENTITY,
        }
    }

    /// Build a span generator for a consumer, or `None` when nothing can be painted.
    pub fn span(&self, ctx: &PaintContext<'_>) -> Option<GradientSpan> {
        if self.stops.is_empty() {
            tracing::warn!("gradient has no stops; skipping paint");
            return None;
        }
        let table = Arc::new(ColorTable::build(&self.stops, ctx.opacity));
        let own = compose(&self.transforms);
        let view = ctx.view;

        let (axis, func, spread, d1, d2) = match self.kind {
            GradientKind::Linear => {
                let p1 = Point::new(self.resolve_x(self.x1, view), self.resolve_y(self.y1, view));
                let p2 = Point::new(self.resolve_x(self.x2, view), self.resolve_y(self.y2, view));
                let d = p2 - p1;
                let len = d.hypot().max(1e-9);
                let axis = Affine::translate(p1.to_vec2())
                    * Affine::rotate(d.y.atan2(d.x))
                    * Affine::scale(len / GRADIENT_SPAN);
                (
                    self.units_map(ctx.bounds) * own * axis,
                    GradientFunc::Linear,
                    self.spread,
                    0.0,
                    GRADIENT_SPAN,
                )
            }
            GradientKind::Radial | GradientKind::Diamond | GradientKind::Conic => {
                let c = Point::new(self.resolve_x(self.cx, view), self.resolve_y(self.cy, view));
                let r = self.resolve_radius(self.radius, view).abs().max(1e-9);
                let axis = Affine::translate(c.to_vec2()) * Affine::scale(r / GRADIENT_SPAN);
                let func = match self.kind {
                    GradientKind::Radial => self.radial_func(c, r, view),
                    GradientKind::Diamond => GradientFunc::Diamond,
                    _ => GradientFunc::Conic,
                };
                let spread = if self.kind == GradientKind::Conic {
                    SpreadMethod::Pad
                } else {
                    self.spread
                };
                (
                    self.units_map(ctx.bounds) * own * axis,
                    func,
                    spread,
                    0.0,
                    GRADIENT_SPAN,
                )
            }
            GradientKind::Contour => {
                let field = ContourField::build(ctx.path, affine_scale(ctx.transform))?;
                let x2 = Self::frac(self.x2).clamp(0.01, 10.0);
                let x1 = Self::frac(self.x1).clamp(0.0, x2);
                (
                    own,
                    GradientFunc::Contour(Arc::new(field)),
                    SpreadMethod::Pad,
                    x1 * GRADIENT_SPAN,
                    x2 * GRADIENT_SPAN,
                )
            }
        };

        Some(GradientSpan {
            interp: SpanInterpolator::new(ctx.transform * axis),
            func,
            table,
            spread,
            d1,
            d2,
        })
    }

    fn radial_func(&self, c: Point, r: f64, view: ViewSize) -> GradientFunc {
        let fx = self.fx.map_or(c.x, |v| self.resolve_x(v, view));
        let fy = self.fy.map_or(c.y, |v| self.resolve_y(v, view));
        let mut f = ((fx - c.x) / r * GRADIENT_SPAN, (fy - c.y) / r * GRADIENT_SPAN);
        if f.0.abs() < 1e-9 && f.1.abs() < 1e-9 {
            return GradientFunc::Radial;
        }

        // Focal radius in ramp units; the ramp itself still spans `radius`.
        let focal = self
            .focal_radius
            .map(|v| self.resolve_radius(v, view))
            .filter(|v| *v > 0.0)
            .map_or(GRADIENT_SPAN, |v| v / r * GRADIENT_SPAN);

        let dist = f.0.hypot(f.1);
        if self.contain_focal && dist > GRADIENT_SPAN * 0.99 {
            let k = GRADIENT_SPAN * 0.99 / dist;
            f = (f.0 * k, f.1 * k);
        }
        let dist = f.0.hypot(f.1);
        if (dist - focal).abs() < 1.0 {
            let k = focal * 0.99 / dist;
            f = (f.0 * k, f.1 * k);
        }
        let r2 = focal * focal;
        GradientFunc::RadialFocus {
            fx: f.0,
            fy: f.1,
            r2,
            mul: focal / (r2 - (f.0 * f.0 + f.1 * f.1)),
        }
    }
}

/// 256-entry premultiplied color ramp.
#[derive(Clone, Debug)]
pub struct ColorTable {
    entries: [Rgba8Premul; 256],
}

impl ColorTable {
    /// Interpolate `stops` into the table, scaling alpha by `opacity`.
    pub fn build(stops: &[GradientStop], opacity: f64) -> Self {
        let mut entries = [Rgba8Premul::transparent(); 256];
        let Some(first) = stops.first() else {
            return Self { entries };
        };
        let opacity = opacity.clamp(0.0, 1.0);
        let put = |c: Color| c.with_opacity(opacity).premul();
        let index = |offset: f64| ((255.0 * offset).trunc() as i64).clamp(0, 255) as usize;

        let start = index(first.offset);
        for e in entries.iter_mut().take(start + 1) {
            *e = put(first.color);
        }

        for pair in stops.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            let (i1, i2) = (index(a.offset), index(b.offset));
            for (i, e) in entries.iter_mut().enumerate().take(i2 + 1).skip(i1) {
                let t = if i2 > i1 {
                    (i - i1) as f64 / (i2 - i1) as f64
                } else {
                    1.0
                };
                let ch = |x: u8, y: u8| lerp(f64::from(x), f64::from(y), t).round() as u8;
                *e = put(Color::rgba(
                    ch(a.color.r, b.color.r),
                    ch(a.color.g, b.color.g),
                    ch(a.color.b, b.color.b),
                    ch(a.color.a, b.color.a),
                ));
            }
        }

        if let Some(last) = stops.last() {
            for e in entries.iter_mut().skip(index(last.offset)) {
                *e = put(last.color);
            }
        }
        Self { entries }
    }

    /// Entry at `i`.
    #[inline]
    pub fn get(&self, i: usize) -> Rgba8Premul {
        self.entries[i.min(255)]
    }
}

#[derive(Clone, Debug)]
enum GradientFunc {
    Linear,
    Radial,
    RadialFocus { fx: f64, fy: f64, r2: f64, mul: f64 },
    Diamond,
    Conic,
    Contour(Arc<ContourField>),
}

impl GradientFunc {
    #[inline]
    fn eval(&self, p: Point) -> f64 {
        match self {
            GradientFunc::Linear => p.x,
            GradientFunc::Radial => p.x.hypot(p.y),
            GradientFunc::RadialFocus { fx, fy, r2, mul } => {
                let dx = p.x - fx;
                let dy = p.y - fy;
                let d2 = dx * fy - dy * fx;
                let d3 = r2 * (dx * dx + dy * dy) - d2 * d2;
                (dx * fx + dy * fy + d3.abs().sqrt()) * mul
            }
            GradientFunc::Diamond => p.x.abs().max(p.y.abs()),
            GradientFunc::Conic => p.y.atan2(p.x).abs() * GRADIENT_SPAN / std::f64::consts::PI,
            GradientFunc::Contour(field) => field.value(p),
        }
    }
}

/// Span generator evaluating a gradient function through a color table.
#[derive(Clone, Debug)]
pub struct GradientSpan {
    interp: SpanInterpolator,
    func: GradientFunc,
    table: Arc<ColorTable>,
    spread: SpreadMethod,
    d1: f64,
    d2: f64,
}

/// Map a ramp position in `0..256` units onto a table index under `spread`.
pub fn spread_index(t: f64, spread: SpreadMethod) -> Option<usize> {
    if !t.is_finite() {
        return None;
    }
    let i = t.floor() as i64;
    match spread {
        SpreadMethod::Pad => Some(i.clamp(0, 255) as usize),
        SpreadMethod::Repeat => Some(i.rem_euclid(256) as usize),
        SpreadMethod::Reflect => {
            let m = i.rem_euclid(512);
            Some(if m >= 256 { 511 - m } else { m } as usize)
        }
        SpreadMethod::Clip => {
            if !(0.0..=GRADIENT_SPAN).contains(&t) {
                None
            } else {
                Some(i.min(255) as usize)
            }
        }
    }
}

impl SpanGenerator for GradientSpan {
    fn generate(&mut self, x: i32, y: i32, out: &mut [Rgba8Premul]) {
        let (mut p, (sx, sy)) = self.interp.begin(x, y);
        let range = (self.d2 - self.d1).max(1e-9);
        for px in out.iter_mut() {
            let d = self.func.eval(p);
            let t = (d - self.d1) * GRADIENT_SPAN / range;
            *px = match spread_index(t, self.spread) {
                Some(i) => self.table.get(i),
                None => Rgba8Premul::transparent(),
            };
            p.x += sx;
            p.y += sy;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/paint/gradient.rs"]
mod tests;
