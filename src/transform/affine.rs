//! Tagged transform entries and their composition into affine matrices.

use crate::foundation::core::Affine;
use crate::foundation::error::{SceneError, SceneResult};
use crate::foundation::scan::NumScanner;

/// One entry of a node's transform list. Angles are in degrees.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Transform {
    /// Raw `[a, b, c, d, e, f]` coefficients (SVG `matrix()` order).
    Matrix {
        /// Coefficients.
        m: [f64; 6],
    },
    /// Translation.
    Translate {
        /// Horizontal offset.
        x: f64,
        /// Vertical offset.
        #[serde(default)]
        y: f64,
    },
    /// Rotation about `(cx, cy)`.
    Rotate {
        /// Angle in degrees.
        angle: f64,
        /// Pivot x.
        #[serde(default)]
        cx: f64,
        /// Pivot y.
        #[serde(default)]
        cy: f64,
    },
    /// Scale about the origin.
    Scale {
        /// Horizontal factor.
        x: f64,
        /// Vertical factor.
        y: f64,
    },
    /// Skew along both axes, in degrees.
    Skew {
        /// Horizontal skew angle.
        #[serde(default)]
        x: f64,
        /// Vertical skew angle.
        #[serde(default)]
        y: f64,
    },
}

impl Transform {
    /// The matrix for this single entry.
    pub fn to_affine(self) -> Affine {
        match self {
            Transform::Matrix { m } => Affine::new(m),
            Transform::Translate { x, y } => Affine::translate((x, y)),
            Transform::Rotate { angle, cx, cy } => {
                let r = Affine::rotate(angle.to_radians());
                if cx == 0.0 && cy == 0.0 {
                    r
                } else {
                    Affine::translate((cx, cy)) * r * Affine::translate((-cx, -cy))
                }
            }
            Transform::Scale { x, y } => Affine::scale_non_uniform(x, y),
            Transform::Skew { x, y } => {
                Affine::skew(x.to_radians().tan(), y.to_radians().tan())
            }
        }
    }
}

/// Compose a transform list; the first entry is applied to a point first.
pub fn compose(transforms: &[Transform]) -> Affine {
    transforms
        .iter()
        .fold(Affine::IDENTITY, |acc, t| t.to_affine() * acc)
}

/// Average scale factor of a matrix, used to pick curve and vertex density.
pub fn affine_scale(a: Affine) -> f64 {
    let [sx, shy, shx, sy, _, _] = a.as_coeffs();
    let x = std::f64::consts::FRAC_1_SQRT_2 * sx + std::f64::consts::FRAC_1_SQRT_2 * shx;
    let y = std::f64::consts::FRAC_1_SQRT_2 * shy + std::f64::consts::FRAC_1_SQRT_2 * sy;
    (x * x + y * y).sqrt()
}

/// True when the matrix does more than translate.
pub fn is_complex(a: Affine) -> bool {
    let [sx, shy, shx, sy, _, _] = a.as_coeffs();
    sx != 1.0 || shy != 0.0 || shx != 0.0 || sy != 1.0
}

/// True when the matrix maps axis-aligned rectangles onto axis-aligned rectangles.
pub fn is_axis_aligned(a: Affine) -> bool {
    let [_, shy, shx, _, _, _] = a.as_coeffs();
    shy.abs() < 1e-12 && shx.abs() < 1e-12
}

/// Parse an SVG-style transform list such as `translate(10,5) rotate(45)`.
///
/// The result is in application order: the rightmost function in the text is applied first,
/// so it becomes the first entry.
pub fn parse_transform_list(text: &str) -> SceneResult<Vec<Transform>> {
    let mut out = Vec::new();
    let mut scan = NumScanner::new(text);

    loop {
        scan.skip_separators();
        if scan.is_done() {
            break;
        }

        let rest = scan.rest();
        let name_len = rest
            .iter()
            .take_while(|c| c.is_ascii_alphabetic())
            .count();
        if name_len == 0 {
            return Err(SceneError::parse(format!(
                "unexpected character '{}' in transform list",
                char::from(rest[0])
            )));
        }
        let name = String::from_utf8_lossy(&rest[..name_len]).to_ascii_lowercase();
        for _ in 0..name_len {
            scan.bump();
        }

        let args = scan.run();

        let arg = |i: usize| args.get(i).copied();
        let t = match name.as_str() {
            "matrix" => {
                if args.len() != 6 {
                    return Err(SceneError::parse("matrix() requires six values"));
                }
                Transform::Matrix {
                    m: [args[0], args[1], args[2], args[3], args[4], args[5]],
                }
            }
            "translate" => Transform::Translate {
                x: arg(0).ok_or_else(|| SceneError::parse("translate() requires a value"))?,
                y: arg(1).unwrap_or(0.0),
            },
            "rotate" => Transform::Rotate {
                angle: arg(0).ok_or_else(|| SceneError::parse("rotate() requires an angle"))?,
                cx: arg(1).unwrap_or(0.0),
                cy: arg(2).unwrap_or(0.0),
            },
            "scale" => {
                let x = arg(0).ok_or_else(|| SceneError::parse("scale() requires a value"))?;
                Transform::Scale {
                    x,
                    y: arg(1).unwrap_or(x),
                }
            }
            "skewx" => Transform::Skew {
                x: arg(0).ok_or_else(|| SceneError::parse("skewX() requires an angle"))?,
                y: 0.0,
            },
            "skewy" => Transform::Skew {
                x: 0.0,
                y: arg(0).ok_or_else(|| SceneError::parse("skewY() requires an angle"))?,
            },
            other => {
                return Err(SceneError::parse(format!(
                    "unknown transform function '{other}'"
                )));
            }
        };
        out.push(t);
    }

    out.reverse();
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/transform/affine.rs"]
mod tests;
