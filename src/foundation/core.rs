pub use kurbo::{Affine, BezPath, PathEl, Point, Rect, Vec2};

/// Premultiplied RGBA8 (r,g,b already multiplied by a).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgba8Premul {
    /// Red, premultiplied.
    pub r: u8,
    /// Green, premultiplied.
    pub g: u8,
    /// Blue, premultiplied.
    pub b: u8,
    /// Alpha.
    pub a: u8,
}

impl Rgba8Premul {
    /// Fully transparent black.
    pub fn transparent() -> Self {
        Self {
            r: 0,
            g: 0,
            b: 0,
            a: 0,
        }
    }

    /// Premultiply a straight-alpha color.
    pub fn from_straight_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self {
            r: mul_div255(r, a),
            g: mul_div255(g, a),
            b: mul_div255(b, a),
            a,
        }
    }

    /// Scale all four channels by an 8-bit factor.
    #[inline]
    pub fn scale(self, k: u8) -> Self {
        if k == 255 {
            return self;
        }
        Self {
            r: mul_div255(self.r, k),
            g: mul_div255(self.g, k),
            b: mul_div255(self.b, k),
            a: mul_div255(self.a, k),
        }
    }

    /// Return the color as `[r, g, b, a]`.
    #[inline]
    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Build from `[r, g, b, a]` premultiplied bytes.
    #[inline]
    pub fn from_array(px: [u8; 4]) -> Self {
        Self {
            r: px[0],
            g: px[1],
            b: px[2],
            a: px[3],
        }
    }
}

#[inline]
fn mul_div255(c: u8, a: u8) -> u8 {
    crate::foundation::math::mul_div255_u8(u16::from(c), u16::from(a))
}

/// Integer device-space rectangle, `x1`/`y1` exclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IRect {
    /// Left edge.
    pub x0: i32,
    /// Top edge.
    pub y0: i32,
    /// Right edge (exclusive).
    pub x1: i32,
    /// Bottom edge (exclusive).
    pub y1: i32,
}

impl IRect {
    /// Construct from edges.
    pub fn new(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Width, zero when inverted.
    pub fn width(self) -> u32 {
        (self.x1 - self.x0).max(0) as u32
    }

    /// Height, zero when inverted.
    pub fn height(self) -> u32 {
        (self.y1 - self.y0).max(0) as u32
    }

    /// True when the rectangle covers no pixels.
    pub fn is_empty(self) -> bool {
        self.x1 <= self.x0 || self.y1 <= self.y0
    }

    /// Overlap of two rectangles (possibly empty).
    pub fn intersect(self, other: IRect) -> IRect {
        IRect {
            x0: self.x0.max(other.x0),
            y0: self.y0.max(other.y0),
            x1: self.x1.min(other.x1),
            y1: self.y1.min(other.y1),
        }
    }

    /// Smallest pixel rectangle enclosing a floating-point rectangle.
    pub fn enclosing(r: Rect) -> IRect {
        fn edge(v: f64) -> i32 {
            v.clamp(i32::MIN as f64 / 2.0, i32::MAX as f64 / 2.0) as i32
        }
        IRect {
            x0: edge(r.x0.floor()),
            y0: edge(r.y0.floor()),
            x1: edge(r.x1.ceil()),
            y1: edge(r.y1.ceil()),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
