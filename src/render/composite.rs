//! Premultiplied source-over blending.

use crate::foundation::core::Rgba8Premul;
use crate::foundation::math::mul_div255_u8;

/// `src` over `dst`, with `src` first weighted by `cover` (0..=255).
#[inline]
pub fn over(dst: Rgba8Premul, src: Rgba8Premul, cover: u8) -> Rgba8Premul {
    if cover == 0 || src.a == 0 {
        return dst;
    }
    let src = src.scale(cover);
    if src.a == 255 {
        return src;
    }
    let inv = 255u16 - u16::from(src.a);
    let blend = |s: u8, d: u8| s.saturating_add(mul_div255_u8(u16::from(d), inv));
    Rgba8Premul {
        r: blend(src.r, dst.r),
        g: blend(src.g, dst.g),
        b: blend(src.b, dst.b),
        a: blend(src.a, dst.a),
    }
}

/// Blend a coverage-weighted span into one row of pixels.
pub fn over_span(dst: &mut [Rgba8Premul], src: &[Rgba8Premul], coverage: &[u8]) {
    for ((d, s), c) in dst.iter_mut().zip(src).zip(coverage) {
        *d = over(*d, *s, *c);
    }
}
