//! Parametric generators: spiral, superformula shape and sine wave.

use crate::foundation::core::{Affine, BezPath, Point, Rect};
use crate::foundation::units::Coord;
use crate::path::shapes::{GenContext, Generated};

/// Hard cap on spiral vertices.
pub const MAX_SPIRAL_VERTICES: usize = 65536;

/// Exclusive upper bound on explicit ellipse and supershape vertex counts.
pub const MAX_SHAPE_VERTICES: u32 = 16384;

/// Archimedean spiral growing outward from its center until it leaves `radius`.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Spiral {
    /// Center x.
    pub cx: Coord,
    /// Center y.
    pub cy: Coord,
    /// Bounding radius; generation stops once a vertex leaves it.
    pub radius: f64,
    /// Angle increment per vertex, in radians.
    pub step: f64,
    /// Starting distance from the center.
    pub offset: f64,
    /// Growth per radian.
    pub scale: f64,
}

impl Default for Spiral {
    fn default() -> Self {
        Self {
            cx: Coord::Px(0.0),
            cy: Coord::Px(0.0),
            radius: 100.0,
            step: 0.1,
            offset: 1.0,
            scale: 1.0,
        }
    }
}

impl Spiral {
    /// Emit the spiral polyline and its bounds.
    pub fn generate(&self, ctx: &GenContext) -> Generated {
        let cx = ctx.x(self.cx);
        let cy = ctx.y(self.cy);
        let mut path = BezPath::new();
        let mut bounds: Option<Rect> = None;
        let mut angle = 0.0f64;

        for i in 0..MAX_SPIRAL_VERTICES {
            let dist = self.offset + self.scale * angle;
            let x = dist * angle.cos();
            let y = dist * angle.sin();
            if x.abs() > self.radius || y.abs() > self.radius {
                break;
            }
            let p = Point::new(x + cx, y + cy);
            if i == 0 {
                path.move_to(p);
            } else {
                path.line_to(p);
            }
            bounds = Some(bounds.map_or(Rect::from_points(p, p), |b| b.union_pt(p)));
            angle += self.step;
        }
        Generated { path, bounds }
    }
}

/// Default superformula vertex count.
pub const SUPERSHAPE_DEFAULT_VERTICES: u32 = 360 * 4;

/// Superformula shape (Gielis).
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Supershape {
    /// Center x.
    pub cx: Coord,
    /// Center y.
    pub cy: Coord,
    /// Output radius; the raw curve is rescaled to it.
    pub radius: f64,
    /// Rotational symmetry.
    pub m: f64,
    /// Exponent n1.
    pub n1: f64,
    /// Exponent n2.
    pub n2: f64,
    /// Exponent n3.
    pub n3: f64,
    /// Parameter a.
    pub a: f64,
    /// Parameter b.
    pub b: f64,
    /// Angular range multiplier (2 = full turn).
    pub phi: f64,
    /// Vertex count.
    pub vertices: u32,
    /// Number of spiral turns; 1 or less disables the spiral.
    pub spiral: u32,
    /// Concentric repeats (closed); 1 or less disables.
    pub repeat: u32,
    /// Close the outline.
    pub close: bool,
    /// Radius modifier 1..=8 (exp, ln, atan, exp(1/r), 1+cos², sin², 1+sin², cos²); 0 = none.
    pub modifier: u8,
}

impl Default for Supershape {
    fn default() -> Self {
        Self {
            cx: Coord::Px(0.0),
            cy: Coord::Px(0.0),
            radius: 100.0,
            m: 5.0,
            n1: 0.1,
            n2: 1.7,
            n3: 1.7,
            a: 1.0,
            b: 1.0,
            phi: 2.0,
            vertices: SUPERSHAPE_DEFAULT_VERTICES,
            spiral: 0,
            repeat: 0,
            close: true,
            modifier: 0,
        }
    }
}

impl Supershape {
    fn radius_at(&self, phi: f64) -> f64 {
        let a = 1.0 / self.a;
        let b = 1.0 / self.b;
        let t1 = (a * (self.m * phi * 0.25).cos()).abs().powf(self.n2);
        let t2 = (b * (self.m * phi * 0.25).sin()).abs().powf(self.n3);
        let r = 1.0 / (t1 + t2).powf(1.0 / self.n1);
        match self.modifier {
            1 => r.exp(),
            2 => r.ln(),
            3 => r.atan(),
            4 => (1.0 / r).exp(),
            5 => 1.0 + r.cos().powi(2),
            6 => r.sin().powi(2),
            7 => 1.0 + r.sin().powi(2),
            8 => r.cos().powi(2),
            _ => r,
        }
    }

    /// Sample the superformula, rescale to `radius` and translate to the center.
    pub fn generate(&self, ctx: &GenContext) -> Generated {
        let cx = ctx.x(self.cx);
        let cy = ctx.y(self.cy);
        let scale = self.radius;
        let tscale = if ctx.scale > 0.0 { ctx.scale } else { 1.0 };

        let mut vertices = f64::from(self.vertices.max(3));
        if self.vertices == SUPERSHAPE_DEFAULT_VERTICES && self.spiral > 1 {
            vertices *= 2.0;
        }
        let phi_a = if self.spiral > 1 {
            std::f64::consts::PI * self.phi * f64::from(self.spiral) / vertices
        } else {
            std::f64::consts::PI * self.phi / vertices
        };

        let mut points: Vec<Point> = Vec::with_capacity(vertices as usize);
        let mut rescale = 0.0f64;
        let mut last = (i64::MAX, i64::MAX);
        let mut i = 0.0;
        while i < vertices {
            let phi = phi_a * i;
            i += 1.0;
            let r = self.radius_at(phi);
            let x = r * phi.cos() * scale * tscale;
            let y = r * phi.sin() * scale * tscale;
            if !x.is_finite() || !y.is_finite() {
                continue;
            }
            // Drop vertices that land on the same whole unit as the previous one.
            let key = (x as i64, y as i64);
            if key == last {
                continue;
            }
            last = key;
            rescale = rescale.max(x).max(y);
            points.push(Point::new(x, y));
        }

        let mut raw = BezPath::new();
        if self.spiral > 1 {
            let total = points.len() as f64;
            for (i, p) in points.iter().enumerate() {
                let k = i as f64 / total;
                push_vertex(&mut raw, i, Point::new(p.x * k, p.y * k));
            }
        } else {
            for (i, p) in points.iter().enumerate() {
                push_vertex(&mut raw, i, *p);
            }
            if self.repeat > 1 {
                raw.close_path();
                let base = raw.clone();
                for n in 0..self.repeat - 1 {
                    let k = f64::from(n + 1) / f64::from(self.repeat);
                    raw.extend((Affine::scale(k) * base.clone()).elements().iter().copied());
                }
            } else if self.close && !points.is_empty() {
                raw.close_path();
            }
        }

        let mut fit = Affine::IDENTITY;
        if rescale > 0.0 && rescale != scale {
            fit = Affine::scale(scale / rescale);
        }
        let path = Affine::translate((cx, cy)) * fit * raw;
        let bounds = (!path.elements().is_empty()).then(|| kurbo::Shape::bounding_box(&path));
        Generated { path, bounds }
    }
}

fn push_vertex(path: &mut BezPath, i: usize, p: Point) {
    if i == 0 {
        path.move_to(p);
    } else {
        path.line_to(p);
    }
}

/// Which edge a wave is closed against.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaveClose {
    /// Open polyline.
    #[default]
    None,
    /// Closed against the top edge of the wave box.
    Top,
    /// Closed against the bottom edge of the wave box.
    Bottom,
}

/// Sine wave generated left to right inside a rectangle.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Wave {
    /// Left edge.
    pub x: Coord,
    /// Top edge.
    pub y: Coord,
    /// Box width.
    pub width: Coord,
    /// Box height.
    pub height: Coord,
    /// Amplitude as a fraction of half the box height.
    pub amplitude: f64,
    /// Cycles across the box.
    pub frequency: f64,
    /// Decay rate; 1 = none, positive = exponential, negative = logarithmic.
    pub decay: f64,
    /// Starting phase in degrees.
    pub degree: f64,
    /// When positive the wave becomes a band of this height.
    pub thickness: f64,
    /// Closure mode.
    pub close: WaveClose,
}

impl Default for Wave {
    fn default() -> Self {
        Self {
            x: Coord::Px(0.0),
            y: Coord::Px(0.0),
            width: Coord::Px(0.0),
            height: Coord::Px(0.0),
            amplitude: 1.0,
            frequency: 1.0,
            decay: 1.0,
            degree: 0.0,
            thickness: 0.0,
            close: WaveClose::None,
        }
    }
}

impl Wave {
    fn y_at(degree: f64, angle: f64, amp: f64, mid: f64, decay: f64) -> f64 {
        let s = degree.to_radians().sin() * amp;
        if decay == 1.0 {
            s + mid
        } else if decay > 0.0 {
            s / (angle / (360.0 * decay)).exp() + mid
        } else {
            let d = (angle / (360.0 * -decay)).ln();
            let d = if d.abs() < 1e-6 { 1e-6f64.copysign(d) } else { d };
            s / d + mid
        }
    }

    /// Emit the wave outline.
    pub fn generate(&self, ctx: &GenContext) -> Generated {
        let width = ctx.x(self.width);
        let height = ctx.y(self.height);
        let origin = (ctx.x(self.x), ctx.y(self.y));

        let decay = if self.decay == 0.0 { 0.00000001 } else { self.decay };
        let amp = height * 0.5 * self.amplitude;
        let mid = height * 0.5;
        let step = if ctx.scale > 0.0 { 1.0 / ctx.scale } else { 1.0 };
        let freq = self.frequency * step;

        let mut degree = self.degree;
        let start = Point::new(0.0, Self::y_at(degree, 0.0, amp, mid, decay));
        let mut path = BezPath::new();
        let mut pts: Vec<Point> = Vec::new();

        if self.close == WaveClose::None || self.thickness > 0.0 {
            path.move_to(start);
        } else if self.close == WaveClose::Top {
            path.move_to((width, 0.0));
            path.line_to((0.0, 0.0));
            path.line_to(start);
        } else {
            path.move_to((width, height));
            path.line_to((0.0, height));
            path.line_to(start);
        }
        pts.push(start);

        let xscale = width / 360.0;
        let mut last = start;
        let mut angle = step;
        while angle < 360.0 {
            let p = Point::new(
                angle * xscale,
                Self::y_at(degree, angle, amp, mid, decay),
            );
            if (p.x - last.x).abs() >= 0.5 || (p.y - last.y).abs() >= 0.5 {
                path.line_to(p);
                pts.push(p);
                last = p;
            }
            angle += step;
            degree += freq;
        }

        // Land the final vertex exactly on the right edge.
        degree -= freq;
        degree += freq * (360.0 - (angle - step)) / step;
        let end = Point::new(width, Self::y_at(degree, 360.0, amp, mid, decay));
        path.line_to(end);
        pts.push(end);

        if self.thickness > 0.0 {
            for p in pts.iter().rev() {
                path.line_to((p.x, p.y + self.thickness));
            }
            path = Affine::translate((0.0, -self.thickness * 0.5)) * path;
        }

        if self.close != WaveClose::None || self.thickness > 0.0 {
            path.close_path();
        }

        Generated::path(Affine::translate(origin) * path)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/path/parametric.rs"]
mod tests;
