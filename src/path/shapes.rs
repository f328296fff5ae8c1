//! Primitive shape generators: ellipse, rectangle and polygon/polyline.

use kurbo::Arc;

use crate::foundation::core::{BezPath, Point, Rect, Vec2};
use crate::foundation::error::{SceneError, SceneResult};
use crate::foundation::scan::NumScanner;
use crate::foundation::units::{Coord, ViewSize};

/// Inputs shared by all generators.
#[derive(Clone, Copy, Debug)]
pub struct GenContext {
    /// View that relative coordinates resolve against.
    pub view: ViewSize,
    /// Scale of the node's accumulated transform; drives vertex density.
    pub scale: f64,
}

impl GenContext {
    /// Context with unit scale.
    pub fn new(view: ViewSize) -> Self {
        Self { view, scale: 1.0 }
    }

    pub(crate) fn x(&self, c: Coord) -> f64 {
        c.resolve(self.view.width)
    }

    pub(crate) fn y(&self, c: Coord) -> f64 {
        c.resolve(self.view.height)
    }
}

/// A generated base path plus bounds captured at generation time, when the generator caches
/// them.
#[derive(Clone, Debug, Default)]
pub struct Generated {
    /// Object-space geometry.
    pub path: BezPath,
    /// Raw (pre-transform) bounds for generators that track them.
    pub bounds: Option<Rect>,
}

impl Generated {
    pub(crate) fn path(path: BezPath) -> Self {
        Self { path, bounds: None }
    }
}

/// Ellipse centered on `(cx, cy)`.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Ellipse {
    /// Center x.
    pub cx: Coord,
    /// Center y.
    pub cy: Coord,
    /// Horizontal radius.
    pub rx: Coord,
    /// Vertical radius.
    pub ry: Coord,
    /// Explicit vertex count; values below 3 select the automatic count.
    pub vertices: u32,
}

/// Vertex count for an ellipse whose mean radius is `ra` under a transform of scale `scale`.
pub fn ellipse_steps(ra: f64, scale: f64) -> u32 {
    let scale = if scale > 0.0 && scale.is_finite() {
        scale
    } else {
        1.0
    };
    let ra = ra.abs();
    let da = (ra / (ra + 0.125 / scale)).acos();
    if da.is_nan() || da <= 0.0 {
        return 3;
    }
    let steps = (std::f64::consts::TAU / da).round();
    if steps.is_finite() {
        (steps as u32).max(3)
    } else {
        3
    }
}

impl Ellipse {
    /// Sample the perimeter into a closed polygon.
    pub fn generate(&self, ctx: &GenContext) -> Generated {
        let cx = ctx.x(self.cx);
        let cy = ctx.y(self.cy);
        let rx = ctx.x(self.rx);
        let ry = ctx.y(self.ry);

        let steps = if self.vertices >= 3 {
            self.vertices
        } else {
            ellipse_steps((rx.abs() + ry.abs()) * 0.5, ctx.scale)
        };

        let mut path = BezPath::new();
        for step in 0..steps {
            let angle = f64::from(step) / f64::from(steps) * std::f64::consts::TAU;
            let p = Point::new(cx + angle.cos() * rx, cy + angle.sin() * ry);
            if step == 0 {
                path.move_to(p);
            } else {
                path.line_to(p);
            }
        }
        path.close_path();
        Generated::path(path)
    }
}

/// Axis-aligned rectangle with optional rounded corners.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Rectangle {
    /// Left edge.
    pub x: Coord,
    /// Top edge.
    pub y: Coord,
    /// Width.
    pub width: Coord,
    /// Height.
    pub height: Coord,
    /// Horizontal corner radius (0 = square).
    pub rx: f64,
    /// Vertical corner radius (0 = same as `rx`).
    pub ry: f64,
}

/// Largest accepted corner radius.
pub const MAX_CORNER_RADIUS: f64 = 1000.0;

impl Rectangle {
    /// Set the corner radii, rejecting values outside `[0, 1000]`.
    pub fn set_corner_radii(&mut self, rx: f64, ry: f64) -> SceneResult<()> {
        for (name, v) in [("rx", rx), ("ry", ry)] {
            if !(0.0..=MAX_CORNER_RADIUS).contains(&v) {
                return Err(SceneError::validation(format!(
                    "rectangle {name} {v} is outside [0, {MAX_CORNER_RADIUS}]"
                )));
            }
        }
        self.rx = rx;
        self.ry = ry;
        Ok(())
    }

    /// Emit move, three lines and a close, or a rounded outline when radii are set.
    pub fn generate(&self, ctx: &GenContext) -> Generated {
        let x = ctx.x(self.x);
        let y = ctx.y(self.y);
        let w = ctx.x(self.width);
        let h = ctx.y(self.height);

        let mut path = BezPath::new();
        if self.rx > 0.0 || self.ry > 0.0 {
            let rx = if self.rx > 0.0 { self.rx } else { self.ry };
            let ry = if self.ry > 0.0 { self.ry } else { self.rx };
            rounded_rect(&mut path, x, y, w, h, rx, ry);
        } else {
            path.move_to((x, y));
            path.line_to((x + w, y));
            path.line_to((x + w, y + h));
            path.line_to((x, y + h));
            path.close_path();
        }
        Generated::path(path)
    }
}

fn rounded_rect(path: &mut BezPath, x: f64, y: f64, w: f64, h: f64, rx: f64, ry: f64) {
    // Radii never exceed half of the side they sit on.
    let rx = rx.min(w.abs() * 0.5);
    let ry = ry.min(h.abs() * 0.5);
    let quarter = std::f64::consts::FRAC_PI_2;
    let radii = Vec2::new(rx, ry);

    path.move_to((x + rx, y));
    path.line_to((x + w - rx, y));
    corner(path, Point::new(x + w - rx, y + ry), radii, -quarter, quarter);
    path.line_to((x + w, y + h - ry));
    corner(path, Point::new(x + w - rx, y + h - ry), radii, 0.0, quarter);
    path.line_to((x + rx, y + h));
    corner(path, Point::new(x + rx, y + h - ry), radii, quarter, quarter);
    path.line_to((x, y + ry));
    corner(path, Point::new(x + rx, y + ry), radii, 2.0 * quarter, quarter);
    path.close_path();
}

fn corner(path: &mut BezPath, center: Point, radii: Vec2, start: f64, sweep: f64) {
    let arc = Arc::new(center, radii, start, sweep, 0.0);
    for el in arc.append_iter(0.1) {
        path.push(el);
    }
}

/// Polygon or polyline through a list of points.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Polygon {
    /// Vertices in object space.
    pub points: Vec<Point>,
    /// Close the outline; only honored with more than two points.
    pub closed: bool,
}

impl Polygon {
    /// Build a polygon, requiring at least two points.
    pub fn new(points: Vec<Point>, closed: bool) -> SceneResult<Self> {
        if points.len() < 2 {
            return Err(SceneError::validation(format!(
                "a polygon requires at least two points, got {}",
                points.len()
            )));
        }
        Ok(Self { points, closed })
    }

    /// Straight line from one point to another.
    pub fn line(a: Point, b: Point) -> Self {
        Self {
            points: vec![a, b],
            closed: false,
        }
    }

    /// Emit the outline and cache its raw bounds.
    pub fn generate(&self, _ctx: &GenContext) -> Generated {
        let mut path = BezPath::new();
        let mut bounds: Option<Rect> = None;
        for (i, p) in self.points.iter().enumerate() {
            if i == 0 {
                path.move_to(*p);
            } else {
                path.line_to(*p);
            }
            bounds = Some(match bounds {
                None => Rect::from_points(*p, *p),
                Some(b) => b.union_pt(*p),
            });
        }
        if self.closed && self.points.len() > 2 {
            path.close_path();
        }
        Generated { path, bounds }
    }
}

/// Parse `"x1,y1 x2,y2 ..."` into points. A trailing odd value is ignored.
pub fn parse_points(text: &str) -> SceneResult<Vec<Point>> {
    let mut scan = NumScanner::new(text);
    let mut values = Vec::new();
    while let Some(v) = scan.number() {
        values.push(v);
    }
    let points: Vec<Point> = values
        .chunks_exact(2)
        .map(|c| Point::new(c[0], c[1]))
        .collect();
    if points.len() < 2 {
        return Err(SceneError::validation(format!(
            "a point list requires at least two points, got {}",
            points.len()
        )));
    }
    Ok(points)
}

#[cfg(test)]
#[path = "../../tests/unit/path/shapes.rs"]
mod tests;
