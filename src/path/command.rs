//! Path command grammar (`M L H V C S Q T A Z`) and conversion into geometry.

use kurbo::{Arc, SvgArc, Vec2};

use crate::foundation::core::{BezPath, Point};
use crate::foundation::error::{SceneError, SceneResult};
use crate::foundation::scan::NumScanner;

/// One typed path command. `rel` selects the relative (lower-case) variant.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum PathCommand {
    /// Start a new subpath.
    MoveTo {
        /// Target x.
        x: f64,
        /// Target y.
        y: f64,
        /// Relative to the current point.
        #[serde(default)]
        rel: bool,
    },
    /// Straight line.
    LineTo {
        /// Target x.
        x: f64,
        /// Target y.
        y: f64,
        /// Relative to the current point.
        #[serde(default)]
        rel: bool,
    },
    /// Horizontal line; y is taken from the current point.
    HLineTo {
        /// Target x.
        x: f64,
        /// Relative to the current point.
        #[serde(default)]
        rel: bool,
    },
    /// Vertical line; x is taken from the current point.
    VLineTo {
        /// Target y.
        y: f64,
        /// Relative to the current point.
        #[serde(default)]
        rel: bool,
    },
    /// Cubic Bézier.
    CurveTo {
        /// First control x.
        x1: f64,
        /// First control y.
        y1: f64,
        /// Second control x.
        x2: f64,
        /// Second control y.
        y2: f64,
        /// End x.
        x: f64,
        /// End y.
        y: f64,
        /// Relative to the current point.
        #[serde(default)]
        rel: bool,
    },
    /// Cubic whose first control reflects the previous curve's second control.
    SmoothCurveTo {
        /// Second control x.
        x2: f64,
        /// Second control y.
        y2: f64,
        /// End x.
        x: f64,
        /// End y.
        y: f64,
        /// Relative to the current point.
        #[serde(default)]
        rel: bool,
    },
    /// Quadratic Bézier.
    QuadTo {
        /// Control x.
        x1: f64,
        /// Control y.
        y1: f64,
        /// End x.
        x: f64,
        /// End y.
        y: f64,
        /// Relative to the current point.
        #[serde(default)]
        rel: bool,
    },
    /// Quadratic whose control reflects the previous quadratic's control.
    SmoothQuadTo {
        /// End x.
        x: f64,
        /// End y.
        y: f64,
        /// Relative to the current point.
        #[serde(default)]
        rel: bool,
    },
    /// Elliptical arc.
    ArcTo {
        /// Radius x.
        rx: f64,
        /// Radius y.
        ry: f64,
        /// X-axis rotation in degrees.
        #[serde(default)]
        angle: f64,
        /// Take the larger of the two candidate arcs.
        #[serde(default)]
        large_arc: bool,
        /// Positive-angle sweep direction.
        #[serde(default)]
        sweep: bool,
        /// End x.
        x: f64,
        /// End y.
        y: f64,
        /// Relative to the current point.
        #[serde(default)]
        rel: bool,
    },
    /// Close the current subpath.
    Close,
}

impl PathCommand {
    fn is_cubic(&self) -> bool {
        matches!(
            self,
            PathCommand::CurveTo { .. } | PathCommand::SmoothCurveTo { .. }
        )
    }

    fn is_quad(&self) -> bool {
        matches!(
            self,
            PathCommand::QuadTo { .. } | PathCommand::SmoothQuadTo { .. }
        )
    }
}

/// Parse path data text into commands.
///
/// Unknown command letters fail the parse. Stray non-numeric characters between values are
/// skipped. Numbers following a command without a new letter repeat the command, except that
/// repeats of a move become lines. At least two commands are required.
pub fn parse_path(text: &str) -> SceneResult<Vec<PathCommand>> {
    let mut out = Vec::new();
    let mut scan = NumScanner::new(text);
    let mut cmd: Option<u8> = None;

    while let Some(c) = scan.peek() {
        if c.is_ascii_alphabetic() {
            if !b"MmLlHhVvCcSsQqTtAaZz".contains(&c) {
                return Err(SceneError::parse(format!(
                    "invalid path command '{}'",
                    char::from(c)
                )));
            }
            scan.bump();
            cmd = Some(c);
        } else if scan.at_number() {
            match cmd {
                None => {
                    return Err(SceneError::parse("path data must begin with a command"));
                }
                Some(b'Z' | b'z') => {
                    scan.bump();
                    continue;
                }
                Some(_) => {}
            }
        } else {
            scan.bump();
            continue;
        }

        let Some(letter) = cmd else { continue };
        let rel = letter.is_ascii_lowercase();
        let before = scan.pos();
        let repeated = !c.is_ascii_alphabetic();

        let command = match letter.to_ascii_uppercase() {
            b'M' => {
                let ([x, y], _) = scan.numbers::<2>();
                cmd = Some(if rel { b'l' } else { b'L' });
                PathCommand::MoveTo { x, y, rel }
            }
            b'L' => {
                let ([x, y], _) = scan.numbers::<2>();
                PathCommand::LineTo { x, y, rel }
            }
            b'H' => {
                let ([x], _) = scan.numbers::<1>();
                PathCommand::HLineTo { x, rel }
            }
            b'V' => {
                let ([y], _) = scan.numbers::<1>();
                PathCommand::VLineTo { y, rel }
            }
            b'C' => {
                let ([x1, y1, x2, y2, x, y], _) = scan.numbers::<6>();
                PathCommand::CurveTo {
                    x1,
                    y1,
                    x2,
                    y2,
                    x,
                    y,
                    rel,
                }
            }
            b'S' => {
                let ([x2, y2, x, y], _) = scan.numbers::<4>();
                PathCommand::SmoothCurveTo { x2, y2, x, y, rel }
            }
            b'Q' => {
                let ([x1, y1, x, y], _) = scan.numbers::<4>();
                PathCommand::QuadTo { x1, y1, x, y, rel }
            }
            b'T' => {
                let ([x, y], _) = scan.numbers::<2>();
                PathCommand::SmoothQuadTo { x, y, rel }
            }
            b'A' => {
                let ([rx, ry, angle, large, sweep, x, y], _) = scan.numbers::<7>();
                PathCommand::ArcTo {
                    rx,
                    ry,
                    angle,
                    large_arc: large != 0.0,
                    sweep: sweep != 0.0,
                    x,
                    y,
                    rel,
                }
            }
            _ => PathCommand::Close,
        };

        if repeated && scan.pos() == before {
            // Nothing consumed; step past the offending character.
            scan.bump();
            continue;
        }
        out.push(command);
    }

    if out.len() < 2 {
        return Err(SceneError::parse(format!(
            "path data requires at least two commands, got {}",
            out.len()
        )));
    }
    Ok(out)
}

/// Convert commands into a geometric path.
///
/// Smooth cubics reflect the previous cubic's second control point; when the previous command
/// was not a cubic they are emitted as a quadratic through their given control. Smooth
/// quadratics reflect the previous quadratic's control, or use the current point.
pub fn commands_to_path(commands: &[PathCommand]) -> BezPath {
    let mut path = BezPath::new();
    let mut cur = Point::ZERO;
    let mut start = Point::ZERO;
    let mut last_ctrl = Point::ZERO;
    let mut prev: Option<&PathCommand> = None;
    let mut open = false;

    let abs = |rel: bool, cur: Point, x: f64, y: f64| {
        if rel {
            Point::new(cur.x + x, cur.y + y)
        } else {
            Point::new(x, y)
        }
    };

    for command in commands {
        if !open && !matches!(command, PathCommand::MoveTo { .. } | PathCommand::Close) {
            path.move_to(cur);
            start = cur;
            open = true;
        }

        match *command {
            PathCommand::MoveTo { x, y, rel } => {
                cur = abs(rel, cur, x, y);
                start = cur;
                path.move_to(cur);
                open = true;
            }
            PathCommand::LineTo { x, y, rel } => {
                cur = abs(rel, cur, x, y);
                path.line_to(cur);
            }
            PathCommand::HLineTo { x, rel } => {
                cur = Point::new(if rel { cur.x + x } else { x }, cur.y);
                path.line_to(cur);
            }
            PathCommand::VLineTo { y, rel } => {
                cur = Point::new(cur.x, if rel { cur.y + y } else { y });
                path.line_to(cur);
            }
            PathCommand::CurveTo {
                x1,
                y1,
                x2,
                y2,
                x,
                y,
                rel,
            } => {
                let c1 = abs(rel, cur, x1, y1);
                let c2 = abs(rel, cur, x2, y2);
                let end = abs(rel, cur, x, y);
                path.curve_to(c1, c2, end);
                last_ctrl = c2;
                cur = end;
            }
            PathCommand::SmoothCurveTo { x2, y2, x, y, rel } => {
                let c2 = abs(rel, cur, x2, y2);
                let end = abs(rel, cur, x, y);
                if prev.is_some_and(PathCommand::is_cubic) {
                    let c1 = cur + (cur - last_ctrl);
                    path.curve_to(c1, c2, end);
                } else {
                    path.quad_to(c2, end);
                }
                last_ctrl = c2;
                cur = end;
            }
            PathCommand::QuadTo { x1, y1, x, y, rel } => {
                let c = abs(rel, cur, x1, y1);
                let end = abs(rel, cur, x, y);
                path.quad_to(c, end);
                last_ctrl = c;
                cur = end;
            }
            PathCommand::SmoothQuadTo { x, y, rel } => {
                let c = if prev.is_some_and(PathCommand::is_quad) {
                    cur + (cur - last_ctrl)
                } else {
                    cur
                };
                let end = abs(rel, cur, x, y);
                path.quad_to(c, end);
                last_ctrl = c;
                cur = end;
            }
            PathCommand::ArcTo {
                rx,
                ry,
                angle,
                large_arc,
                sweep,
                x,
                y,
                rel,
            } => {
                let end = abs(rel, cur, x, y);
                append_arc(&mut path, cur, end, rx, ry, angle, large_arc, sweep);
                cur = end;
            }
            PathCommand::Close => {
                if open {
                    path.close_path();
                    open = false;
                }
                cur = start;
            }
        }
        prev = Some(command);
    }
    path
}

#[allow(clippy::too_many_arguments)]
fn append_arc(
    path: &mut BezPath,
    from: Point,
    to: Point,
    rx: f64,
    ry: f64,
    angle_deg: f64,
    large_arc: bool,
    sweep: bool,
) {
    let svg = SvgArc {
        from,
        to,
        radii: Vec2::new(rx.abs(), ry.abs()),
        x_rotation: angle_deg.to_radians(),
        large_arc,
        sweep,
    };
    match Arc::from_svg_arc(&svg) {
        Some(arc) => {
            for el in arc.append_iter(0.1) {
                path.push(el);
            }
        }
        None => path.line_to(to),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/path/command.rs"]
mod tests;
