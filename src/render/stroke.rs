//! Stroke outlining.

use kurbo::{Cap, Join, Stroke, StrokeOpts};

use crate::foundation::core::BezPath;

/// Corner style of outer joins.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineJoin {
    /// Sharp corner up to the miter limit, bevel beyond it.
    #[default]
    Miter,
    /// Rounded corner.
    Round,
    /// Flat corner.
    Bevel,
}

/// Corner style of inner joins.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InnerJoin {
    /// Flat.
    Bevel,
    /// Sharp.
    #[default]
    Miter,
    /// Overlapping.
    Jag,
    /// Rounded.
    Round,
}

/// End style of open subpaths.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineCap {
    /// Flush with the endpoint.
    #[default]
    Butt,
    /// Semicircle.
    Round,
    /// Half-square extension.
    Square,
}

/// Resolved stroke parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct StrokeStyle {
    /// Width in object units.
    pub width: f64,
    /// Outer join.
    pub join: LineJoin,
    /// Inner join. Outlines are built with the outer join on both sides.
    pub inner_join: InnerJoin,
    /// Cap.
    pub cap: LineCap,
    /// Miter limit as a multiple of half the width.
    pub miter_limit: f64,
    /// Dash lengths; empty for solid.
    pub dashes: Vec<f64>,
    /// Offset into the dash pattern.
    pub dash_offset: f64,
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self {
            width: 1.0,
            join: LineJoin::Miter,
            inner_join: InnerJoin::Miter,
            cap: LineCap::Butt,
            miter_limit: 4.0,
            dashes: Vec::new(),
            dash_offset: 0.0,
        }
    }
}

/// Normalize a dash list: odd lists repeat once, negative or all-zero lists disable dashing.
pub fn normalize_dashes(dashes: &[f64]) -> Vec<f64> {
    if dashes.iter().any(|d| !d.is_finite() || *d < 0.0) || dashes.iter().all(|d| *d == 0.0) {
        return Vec::new();
    }
    let mut out = dashes.to_vec();
    if out.len() % 2 == 1 {
        out.extend_from_slice(dashes);
    }
    out
}

impl StrokeStyle {
    fn to_kurbo(&self) -> Stroke {
        let join = match self.join {
            LineJoin::Miter => Join::Miter,
            LineJoin::Round => Join::Round,
            LineJoin::Bevel => Join::Bevel,
        };
        let cap = match self.cap {
            LineCap::Butt => Cap::Butt,
            LineCap::Round => Cap::Round,
            LineCap::Square => Cap::Square,
        };
        let stroke = Stroke::new(self.width)
            .with_join(join)
            .with_caps(cap)
            .with_miter_limit(self.miter_limit.max(1.0));
        let dashes = normalize_dashes(&self.dashes);
        if dashes.is_empty() {
            stroke
        } else {
            stroke.with_dashes(self.dash_offset, dashes)
        }
    }

    /// Outline of `path` stroked with this style, in the same space as `path`. The result is
    /// filled with the non-zero rule.
    pub fn outline(&self, path: &BezPath, tolerance: f64) -> BezPath {
        if !(self.width.is_finite() && self.width > 0.0) {
            return BezPath::new();
        }
        kurbo::stroke(
            path.elements().iter().copied(),
            &self.to_kurbo(),
            &StrokeOpts::default(),
            tolerance.max(1e-4),
        )
    }
}
