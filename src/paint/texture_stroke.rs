//! Texture strokes: an image strip wrapped along a stroked path.

use std::sync::Arc;

use kurbo::{PathEl, Point};

use crate::foundation::core::{Affine, BezPath, Rgba8Premul};
use crate::foundation::math::{is_pow2, unit_to_u8};
use crate::paint::bitmap::Bitmap;
use crate::paint::span::SpanGenerator;
use crate::transform::affine::affine_scale;

#[derive(Clone, Copy, Debug)]
struct Segment {
    a: Point,
    b: Point,
    // Arc length at `a`.
    start: f64,
}

/// Maps device pixels onto an image whose x axis runs along the path and whose y axis runs
/// across the stroke.
#[derive(Clone, Debug)]
pub struct TextureStrokeSpan {
    segments: Vec<Segment>,
    half_width: f64,
    source: Arc<Bitmap>,
    // Image pixels per device unit.
    scale: f64,
    opacity: u8,
}

impl TextureStrokeSpan {
    /// `path` is in object space, `width` is the object-space stroke width.
    pub fn new(
        source: Arc<Bitmap>,
        path: &BezPath,
        transform: Affine,
        width: f64,
        opacity: f64,
    ) -> Option<Self> {
        let device_width = width * affine_scale(transform);
        if !(device_width.is_finite() && device_width > 0.0) {
            return None;
        }

        let mut segments = Vec::new();
        let mut length = 0.0;
        let mut start = Point::ORIGIN;
        let mut last = Point::ORIGIN;
        kurbo::flatten(transform * path.clone(), 0.25, |el| match el {
            PathEl::MoveTo(p) => {
                start = p;
                last = p;
            }
            PathEl::LineTo(p) => {
                segments.push(Segment {
                    a: last,
                    b: p,
                    start: length,
                });
                length += (p - last).hypot();
                last = p;
            }
            PathEl::ClosePath => {
                if last != start {
                    segments.push(Segment {
                        a: last,
                        b: start,
                        start: length,
                    });
                    length += (start - last).hypot();
                }
                last = start;
            }
            _ => {}
        });
        if segments.is_empty() {
            return None;
        }

        Some(Self {
            segments,
            half_width: device_width * 0.5,
            scale: f64::from(source.height()) / device_width,
            source,
            opacity: unit_to_u8(opacity),
        })
    }

    // Arc length and signed distance of the nearest centerline point.
    fn locate(&self, p: Point) -> (f64, f64) {
        let mut best = (f64::INFINITY, 0.0, 0.0);
        for s in &self.segments {
            let d = s.b - s.a;
            let len2 = d.hypot2();
            let t = if len2 > 0.0 {
                ((p - s.a).dot(d) / len2).clamp(0.0, 1.0)
            } else {
                0.0
            };
            let q = s.a + d * t;
            let dist2 = (p - q).hypot2();
            if dist2 < best.0 {
                let side = d.cross(p - s.a).signum();
                best = (dist2, s.start + t * len2.sqrt(), side * dist2.sqrt());
            }
        }
        (best.1, best.2)
    }

    fn sample(&self, u: f64, v: f64) -> Rgba8Premul {
        let (w, h) = (self.source.width(), self.source.height());
        let fx = u - 0.5;
        let fy = (v - 0.5).clamp(0.0, f64::from(h - 1));
        let x0 = fx.floor();
        let y0 = fy.floor();
        let (tx, ty) = (fx - x0, fy - y0);
        let wrap = |x: i64| -> u32 {
            if is_pow2(w) {
                (x & i64::from(w - 1)) as u32
            } else {
                x.rem_euclid(i64::from(w)) as u32
            }
        };
        let row = |y: f64| (y as u32).min(h - 1);

        let mut acc = [0.0f64; 4];
        for (yy, wy) in [(row(y0), 1.0 - ty), (row(y0 + 1.0), ty)] {
            for (xx, wx) in [(wrap(x0 as i64), 1.0 - tx), (wrap(x0 as i64 + 1), tx)] {
                for (a, c) in acc.iter_mut().zip(self.source.pixel(xx, yy).to_array()) {
                    *a += wx * wy * f64::from(c);
                }
            }
        }
        let a = acc[3].round().clamp(0.0, 255.0);
        let ch = |v: f64| v.round().clamp(0.0, a) as u8;
        Rgba8Premul {
            r: ch(acc[0]),
            g: ch(acc[1]),
            b: ch(acc[2]),
            a: a as u8,
        }
    }
}

impl SpanGenerator for TextureStrokeSpan {
    fn generate(&mut self, x: i32, y: i32, out: &mut [Rgba8Premul]) {
        let py = f64::from(y) + 0.5;
        for (i, px) in out.iter_mut().enumerate() {
            let p = Point::new(f64::from(x) + i as f64 + 0.5, py);
            let (along, across) = self.locate(p);
            *px = if across.abs() > self.half_width + 0.5 {
                Rgba8Premul::transparent()
            } else {
                self.sample(along * self.scale, (across + self.half_width) * self.scale)
                    .scale(self.opacity)
            };
        }
    }
}
