//! View-box to target mapping (`preserveAspectRatio` semantics).

use crate::foundation::core::Affine;
use crate::foundation::error::{SceneError, SceneResult};

/// Alignment along one axis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Align {
    /// Flush with the minimum edge.
    Min,
    /// Centered.
    #[default]
    Mid,
    /// Flush with the maximum edge.
    Max,
}

impl Align {
    fn offset(self, leftover: f64) -> f64 {
        match self {
            Align::Min => 0.0,
            Align::Mid => leftover * 0.5,
            Align::Max => leftover,
        }
    }
}

/// How the source is fitted into the target.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Fit {
    /// Uniform scale so that the whole source is visible.
    #[default]
    Meet,
    /// Uniform scale so that the source covers the whole target.
    Slice,
    /// Independent per-axis scale.
    None,
}

/// Aspect-ratio flags. Deserializes from `"xMidYMid meet"` text or the struct form.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct AspectRatio {
    /// Horizontal alignment.
    pub x: Align,
    /// Vertical alignment.
    pub y: Align,
    /// Fit mode.
    pub fit: Fit,
}

impl<'de> serde::Deserialize<'de> for AspectRatio {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(serde::Deserialize)]
        #[serde(default)]
        struct Flags {
            x: Align,
            y: Align,
            fit: Fit,
        }

        impl Default for Flags {
            fn default() -> Self {
                Self {
                    x: Align::Mid,
                    y: Align::Mid,
                    fit: Fit::Meet,
                }
            }
        }

        #[derive(serde::Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Text(String),
            Flags(Flags),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Text(s) => AspectRatio::parse(&s).map_err(serde::de::Error::custom),
            Repr::Flags(f) => Ok(AspectRatio {
                x: f.x,
                y: f.y,
                fit: f.fit,
            }),
        }
    }
}

/// Source rectangle of a view.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ViewBox {
    /// Left.
    pub x: f64,
    /// Top.
    pub y: f64,
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
}

impl ViewBox {
    /// View box from origin and size.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Result of a view mapping: translate by the offset, then scale.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewMapping {
    /// Horizontal offset within the target.
    pub offset_x: f64,
    /// Vertical offset within the target.
    pub offset_y: f64,
    /// Horizontal scale.
    pub scale_x: f64,
    /// Vertical scale.
    pub scale_y: f64,
}

impl ViewMapping {
    /// Identity mapping.
    pub const IDENTITY: Self = Self {
        offset_x: 0.0,
        offset_y: 0.0,
        scale_x: 1.0,
        scale_y: 1.0,
    };

    /// Affine mapping a point of the view box (origin `(vx, vy)`) into target space whose
    /// origin is `(tx, ty)`.
    pub fn to_affine(&self, vx: f64, vy: f64, tx: f64, ty: f64) -> Affine {
        Affine::translate((tx + self.offset_x, ty + self.offset_y))
            * Affine::scale_non_uniform(self.scale_x, self.scale_y)
            * Affine::translate((-vx, -vy))
    }
}

impl AspectRatio {
    /// Parse `"xMidYMid meet"`, `"xMinYMax slice"` or `"none"`.
    pub fn parse(text: &str) -> SceneResult<Self> {
        let mut out = AspectRatio::default();
        let mut words = text.split_whitespace();
        let Some(first) = words.next() else {
            return Ok(out);
        };

        if first.eq_ignore_ascii_case("none") {
            out.fit = Fit::None;
            return Ok(out);
        }

        let align = |s: &str| -> SceneResult<Align> {
            match s {
                "Min" => Ok(Align::Min),
                "Mid" => Ok(Align::Mid),
                "Max" => Ok(Align::Max),
                _ => Err(SceneError::parse(format!("invalid alignment in '{text}'"))),
            }
        };
        let bad = || SceneError::parse(format!("invalid aspect ratio '{text}'"));
        let rest = first.strip_prefix('x').ok_or_else(bad)?;
        let (ax, ay) = rest.split_once('Y').ok_or_else(bad)?;
        out.x = align(ax)?;
        out.y = align(ay)?;

        match words.next() {
            None => {}
            Some(w) if w.eq_ignore_ascii_case("meet") => out.fit = Fit::Meet,
            Some(w) if w.eq_ignore_ascii_case("slice") => out.fit = Fit::Slice,
            Some(_) => return Err(bad()),
        }
        Ok(out)
    }

    /// Map a source extent onto a target extent.
    pub fn map(&self, target_w: f64, target_h: f64, source_w: f64, source_h: f64) -> ViewMapping {
        let target_w = if target_w <= 1e-6 { 0.1 } else { target_w };
        let target_h = if target_h <= 1e-6 { 0.1 } else { target_h };
        let source_w = if source_w <= 1e-6 { target_w } else { source_w };
        let source_h = if source_h <= 1e-6 { target_h } else { source_h };

        let rx = target_w / source_w;
        let ry = target_h / source_h;

        match self.fit {
            Fit::None => {
                // Sub-pixel extents on an axis leave that axis unscaled.
                let scale_x = if target_w >= 1.0 && source_w >= 1.0 { rx } else { 1.0 };
                let scale_y = if target_h >= 1.0 && source_h >= 1.0 { ry } else { 1.0 };
                ViewMapping {
                    offset_x: 0.0,
                    offset_y: 0.0,
                    scale_x,
                    scale_y,
                }
            }
            Fit::Meet | Fit::Slice => {
                let s = if self.fit == Fit::Meet {
                    rx.min(ry)
                } else {
                    rx.max(ry)
                };
                ViewMapping {
                    offset_x: self.x.offset(target_w - source_w * s),
                    offset_y: self.y.offset(target_h - source_h * s),
                    scale_x: s,
                    scale_y: s,
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/viewport/aspect.rs"]
mod tests;
