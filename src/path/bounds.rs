//! Bounding boxes of paths under a transform.

use kurbo::Shape;

use crate::foundation::core::{Affine, BezPath, Rect};

/// Bounds of `path` after applying `xf`, or `None` for an empty path.
pub fn bounds(path: &BezPath, xf: Affine) -> Option<Rect> {
    if path.elements().is_empty() {
        return None;
    }
    let r = if xf == Affine::IDENTITY {
        path.bounding_box()
    } else {
        (xf * path.clone()).bounding_box()
    };
    (r.x0.is_finite() && r.y0.is_finite() && r.x1.is_finite() && r.y1.is_finite()).then_some(r)
}

/// Union of two optional rectangles.
pub fn union(a: Option<Rect>, b: Option<Rect>) -> Option<Rect> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.union(b)),
        (a, None) => a,
        (None, b) => b,
    }
}
