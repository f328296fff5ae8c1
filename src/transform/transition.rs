//! Transitions: transform stops interpolated along a normalized position.

use crate::foundation::core::{Affine, BezPath, PathEl, Point};
use crate::foundation::error::{SceneError, SceneResult};
use crate::foundation::math::lerp;
use crate::transform::affine::{Transform, compose, parse_transform_list};

/// Upper bound on stops per transition.
pub const MAX_TRANSITION_STOPS: usize = 10;

/// One stop: an offset in `[0,1]` and the transform list in effect there.
#[derive(Clone, Debug, PartialEq)]
pub struct TransitionStop {
    /// Position along the path, in `[0,1]`.
    pub offset: f64,
    /// Transforms in application order.
    pub transforms: Vec<Transform>,
    matrix: Affine,
}

impl TransitionStop {
    /// Build a stop from an already-parsed transform list.
    pub fn new(offset: f64, transforms: Vec<Transform>) -> Self {
        let matrix = compose(&transforms);
        Self {
            offset,
            transforms,
            matrix,
        }
    }

    /// Build a stop from transform text, e.g. `"rotate(20) scale(2)"`.
    pub fn parse(offset: f64, text: &str) -> SceneResult<Self> {
        Ok(Self::new(offset, parse_transform_list(text)?))
    }

    /// The composed matrix of this stop.
    pub fn matrix(&self) -> Affine {
        self.matrix
    }
}

/// A validated, ordered set of transition stops.
#[derive(Clone, Debug, PartialEq)]
pub struct Transition {
    stops: Vec<TransitionStop>,
}

impl Transition {
    /// Validate and build. Requires 2..=10 stops with non-decreasing offsets in `[0,1]`.
    pub fn new(stops: Vec<TransitionStop>) -> SceneResult<Self> {
        validate_stops(&stops)?;
        Ok(Self { stops })
    }

    /// Build from `(offset, transform text)` pairs.
    pub fn parse<'a>(pairs: impl IntoIterator<Item = (f64, &'a str)>) -> SceneResult<Self> {
        let stops = pairs
            .into_iter()
            .map(|(offset, text)| TransitionStop::parse(offset, text))
            .collect::<SceneResult<Vec<_>>>()?;
        Self::new(stops)
    }

    /// Stops in storage order.
    pub fn stops(&self) -> &[TransitionStop] {
        &self.stops
    }

    /// Interpolated matrix at `position`; see [`interpolate_transform`].
    pub fn at(&self, position: f64) -> Affine {
        interpolate_transform(&self.stops, position)
    }

    /// Map every vertex of `path` through the transition, using the vertex index normalized
    /// over the vertex count as the position.
    pub fn morph_path(&self, path: &BezPath) -> BezPath {
        let total: usize = path
            .elements()
            .iter()
            .map(|el| match el {
                PathEl::MoveTo(_) | PathEl::LineTo(_) => 1,
                PathEl::QuadTo(..) => 2,
                PathEl::CurveTo(..) => 3,
                PathEl::ClosePath => 0,
            })
            .sum();
        let denom = total.saturating_sub(1).max(1) as f64;

        let mut index = 0usize;
        let mut next = |p: Point| {
            let pos = index as f64 / denom;
            index += 1;
            self.at(pos) * p
        };

        let mut out = BezPath::new();
        for el in path.elements() {
            match *el {
                PathEl::MoveTo(p) => out.move_to(next(p)),
                PathEl::LineTo(p) => out.line_to(next(p)),
                PathEl::QuadTo(a, b) => {
                    let a = next(a);
                    out.quad_to(a, next(b));
                }
                PathEl::CurveTo(a, b, c) => {
                    let a = next(a);
                    let b = next(b);
                    out.curve_to(a, b, next(c));
                }
                PathEl::ClosePath => out.close_path(),
            }
        }
        out
    }
}

pub(crate) fn validate_stops(stops: &[TransitionStop]) -> SceneResult<()> {
    if stops.len() < 2 {
        return Err(SceneError::validation(
            "a transition requires at least two stops",
        ));
    }
    if stops.len() > MAX_TRANSITION_STOPS {
        return Err(SceneError::validation(format!(
            "a transition supports at most {MAX_TRANSITION_STOPS} stops, got {}",
            stops.len()
        )));
    }
    let mut last = 0.0;
    for (i, stop) in stops.iter().enumerate() {
        if !(0.0..=1.0).contains(&stop.offset) {
            return Err(SceneError::validation(format!(
                "transition stop {i} offset {} is outside [0,1]",
                stop.offset
            )));
        }
        if stop.offset < last {
            return Err(SceneError::validation(format!(
                "transition stop {i} offset {} is less than the previous offset {last}",
                stop.offset
            )));
        }
        last = stop.offset;
    }
    Ok(())
}

/// Interpolate a transform along `stops` at `position`.
///
/// Positions at or before the first stop return the first stop's matrix, at or after the last
/// return the last. Between a bracketing pair each of the six coefficients is lerped
/// independently. When no bracketing pair exists the stops are corrupt; a warning is logged and
/// identity is returned.
pub fn interpolate_transform(stops: &[TransitionStop], position: f64) -> Affine {
    let (Some(first), Some(last)) = (stops.first(), stops.last()) else {
        tracing::warn!("transition has no stops; using identity");
        return Affine::IDENTITY;
    };

    if position <= first.offset {
        return first.matrix;
    }
    if position >= last.offset {
        return last.matrix;
    }

    for pair in stops.windows(2) {
        let (left, right) = (&pair[0], &pair[1]);
        if left.offset <= position && position <= right.offset {
            if position == left.offset {
                return left.matrix;
            }
            if position == right.offset {
                return right.matrix;
            }
            let span = right.offset - left.offset;
            if span <= 0.0 {
                return right.matrix;
            }
            let t = (position - left.offset) / span;
            let a = left.matrix.as_coeffs();
            let b = right.matrix.as_coeffs();
            let mut m = [0.0; 6];
            for (i, out) in m.iter_mut().enumerate() {
                *out = lerp(a[i], b[i], t);
            }
            return Affine::new(m);
        }
    }

    tracing::warn!(position, "no bracketing transition stops; using identity");
    Affine::IDENTITY
}

#[cfg(test)]
#[path = "../../tests/unit/transform/transition.rs"]
mod tests;
