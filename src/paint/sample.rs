//! Resampling filters and the image span generator shared by image fills and patterns.

use std::sync::Arc;

use crate::foundation::core::{Affine, Rgba8Premul};
use crate::paint::bitmap::Bitmap;
use crate::paint::span::{SpanGenerator, SpanInterpolator};
use crate::transform::affine::{affine_scale, is_complex};

/// Resampling filter selection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleMethod {
    /// Chosen from the effective scale.
    #[default]
    Auto,
    /// Nearest pixel.
    Neighbour,
    /// Bilinear.
    Bilinear,
    /// Bicubic B-spline.
    Bicubic,
    /// Spline16.
    Spline16,
    /// Kaiser window.
    Kaiser,
    /// Quadric.
    Quadric,
    /// Gaussian.
    Gaussian,
    /// Bessel.
    Bessel,
    /// Mitchell-Netravali.
    Mitchell,
    /// Windowless sinc.
    Sinc,
    /// Lanczos-windowed sinc.
    Lanczos,
    /// Blackman-windowed sinc.
    Blackman,
}

impl SampleMethod {
    /// Parse a method name. Unknown names fall back to bicubic with a warning.
    pub fn parse(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "auto" => Self::Auto,
            "neighbour" | "neighbor" | "nearest" => Self::Neighbour,
            "bilinear" => Self::Bilinear,
            "bicubic" => Self::Bicubic,
            "spline16" => Self::Spline16,
            "kaiser" => Self::Kaiser,
            "quadric" => Self::Quadric,
            "gaussian" => Self::Gaussian,
            "bessel" => Self::Bessel,
            "mitchell" => Self::Mitchell,
            "sinc" => Self::Sinc,
            "lanczos" => Self::Lanczos,
            "blackman" => Self::Blackman,
            other => {
                tracing::warn!(method = other, "unrecognised sampling method; using bicubic");
                Self::Bicubic
            }
        }
    }
}

impl<'de> serde::Deserialize<'de> for SampleMethod {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(SampleMethod::parse(&s))
    }
}

/// Tiling of an image or pattern source outside its extent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageSpread {
    /// Single placement; outside is transparent.
    #[default]
    Pad,
    /// Tile in both axes.
    Repeat,
    /// Mirror horizontally, repeat vertically.
    ReflectX,
    /// Repeat horizontally, mirror vertically.
    ReflectY,
}

impl ImageSpread {
    #[inline]
    fn wrap(self, x: i64, y: i64, w: i64, h: i64) -> Option<(u32, u32)> {
        let (x, y) = match self {
            ImageSpread::Pad => {
                if x < 0 || y < 0 || x >= w || y >= h {
                    return None;
                }
                (x, y)
            }
            ImageSpread::Repeat => (x.rem_euclid(w), y.rem_euclid(h)),
            ImageSpread::ReflectX => (reflect(x, w), y.rem_euclid(h)),
            ImageSpread::ReflectY => (x.rem_euclid(w), reflect(y, h)),
        };
        Some((x as u32, y as u32))
    }
}

#[inline]
fn reflect(i: i64, n: i64) -> i64 {
    let m = i.rem_euclid(2 * n);
    if m >= n { 2 * n - 1 - m } else { m }
}

// Geometric mean of the axis scales, normalized so that a uniform scale reports itself.
fn diag_scale(a: Affine) -> f64 {
    let [sx, shy, shx, sy, _, _] = a.as_coeffs();
    let x = sx.hypot(shy);
    let y = shx.hypot(sy);
    (x * x + y * y).sqrt() / std::f64::consts::SQRT_2
}

/// Concrete filter after resolving [`SampleMethod::Auto`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum Filter {
    Nearest,
    Bilinear,
    Kernel { method: SampleMethod, radius: f64 },
}

impl Filter {
    /// Resolve `method` for a source drawn through `image_to_device`. `auto_is_image` enables
    /// the image-specific automatic choice; patterns use bilinear for `Auto`.
    pub(crate) fn resolve(method: SampleMethod, image_to_device: Affine, auto_is_image: bool) -> Self {
        let method = match method {
            SampleMethod::Auto if auto_is_image => {
                let s = affine_scale(image_to_device);
                if s <= 0.5 {
                    SampleMethod::Bicubic
                } else if s <= 1.0 {
                    SampleMethod::Sinc
                } else {
                    SampleMethod::Spline16
                }
            }
            SampleMethod::Auto => SampleMethod::Bilinear,
            m => m,
        };
        let radius = match method {
            SampleMethod::Neighbour => return Filter::Nearest,
            SampleMethod::Bilinear | SampleMethod::Auto => return Filter::Bilinear,
            SampleMethod::Kaiser => 1.0,
            SampleMethod::Quadric => 1.5,
            SampleMethod::Bicubic
            | SampleMethod::Spline16
            | SampleMethod::Gaussian
            | SampleMethod::Mitchell => 2.0,
            SampleMethod::Bessel => 3.2383,
            SampleMethod::Sinc | SampleMethod::Lanczos | SampleMethod::Blackman => {
                let d = diag_scale(image_to_device).max(1e-6);
                (3.0 + 1.0 / d).clamp(2.0, 8.0)
            }
        };
        Filter::Kernel { method, radius }
    }
}

/// Weight of `method` at distance `x >= 0` with support `radius`.
pub(crate) fn kernel_weight(method: SampleMethod, radius: f64, x: f64) -> f64 {
    use std::f64::consts::PI;

    if x > radius {
        return 0.0;
    }
    match method {
        SampleMethod::Neighbour => f64::from(u8::from(x < 0.5)),
        SampleMethod::Bilinear | SampleMethod::Auto => (1.0 - x).max(0.0),
        SampleMethod::Bicubic => {
            let p3 = |v: f64| if v <= 0.0 { 0.0 } else { v * v * v };
            (p3(x + 2.0) - 4.0 * p3(x + 1.0) + 6.0 * p3(x) - 4.0 * p3(x - 1.0)) / 6.0
        }
        SampleMethod::Spline16 => {
            if x < 1.0 {
                ((x - 9.0 / 5.0) * x - 1.0 / 5.0) * x + 1.0
            } else {
                let t = x - 1.0;
                ((-1.0 / 3.0 * t + 4.0 / 5.0) * t - 7.0 / 15.0) * t
            }
        }
        SampleMethod::Kaiser => {
            let a = 6.33;
            bessel_i0(a * (1.0 - x * x).max(0.0).sqrt()) / bessel_i0(a)
        }
        SampleMethod::Quadric => {
            if x < 0.5 {
                0.75 - x * x
            } else {
                let t = x - 1.5;
                0.5 * t * t
            }
        }
        SampleMethod::Gaussian => (-2.0 * x * x).exp() * (2.0 / PI).sqrt(),
        SampleMethod::Bessel => {
            if x == 0.0 {
                PI / 4.0
            } else {
                bessel_j1(PI * x) / (2.0 * x)
            }
        }
        SampleMethod::Mitchell => {
            let (b, c) = (1.0 / 3.0, 1.0 / 3.0);
            if x < 1.0 {
                let p0 = (6.0 - 2.0 * b) / 6.0;
                let p2 = (-18.0 + 12.0 * b + 6.0 * c) / 6.0;
                let p3 = (12.0 - 9.0 * b - 6.0 * c) / 6.0;
                p0 + x * x * (p2 + x * p3)
            } else {
                let q0 = (8.0 * b + 24.0 * c) / 6.0;
                let q1 = (-12.0 * b - 48.0 * c) / 6.0;
                let q2 = (6.0 * b + 30.0 * c) / 6.0;
                let q3 = (-b - 6.0 * c) / 6.0;
                q0 + x * (q1 + x * (q2 + x * q3))
            }
        }
        SampleMethod::Sinc | SampleMethod::Lanczos | SampleMethod::Blackman => {
            if x == 0.0 {
                return 1.0;
            }
            let px = x * PI;
            let sinc = px.sin() / px;
            let xr = px / radius;
            match method {
                SampleMethod::Lanczos => sinc * xr.sin() / xr,
                SampleMethod::Blackman => {
                    sinc * (0.42 + 0.5 * xr.cos() + 0.08 * (2.0 * xr).cos())
                }
                _ => sinc,
            }
        }
    }
}

fn bessel_i0(x: f64) -> f64 {
    let mut sum = 1.0;
    let mut term = 1.0;
    let y = x * x / 4.0;
    let mut k = 1.0;
    while term > sum * 1e-12 {
        term *= y / (k * k);
        sum += term;
        k += 1.0;
    }
    sum
}

fn bessel_j1(x: f64) -> f64 {
    let half = x / 2.0;
    let mut term = half;
    let mut sum = term;
    for m in 1..40 {
        let m = f64::from(m);
        term *= -half * half / (m * (m + 1.0));
        sum += term;
        if term.abs() < 1e-15 {
            break;
        }
    }
    sum
}

/// Samples a bitmap under a transform, spread mode and filter.
#[derive(Clone, Debug)]
pub struct ImageSpan {
    interp: SpanInterpolator,
    source: Arc<Bitmap>,
    spread: ImageSpread,
    filter: Filter,
    // Kernel support is widened by this factor when minifying.
    blur: f64,
    opacity: u8,
    fast: bool,
}

impl ImageSpan {
    /// `image_to_device` maps source pixel space onto device pixels.
    pub(crate) fn new(
        source: Arc<Bitmap>,
        image_to_device: Affine,
        spread: ImageSpread,
        filter: Filter,
        opacity: f64,
    ) -> Self {
        let scale = affine_scale(image_to_device);
        let blur = if scale > 0.0 && scale < 1.0 {
            1.0 / scale
        } else {
            1.0
        };
        Self {
            interp: SpanInterpolator::new(image_to_device),
            source,
            spread,
            filter,
            blur,
            opacity: crate::foundation::math::unit_to_u8(opacity),
            fast: !is_complex(image_to_device),
        }
    }

    #[inline]
    fn fetch(&self, x: i64, y: i64) -> Option<Rgba8Premul> {
        let (w, h) = (i64::from(self.source.width()), i64::from(self.source.height()));
        self.spread
            .wrap(x, y, w, h)
            .map(|(x, y)| self.source.pixel(x, y))
    }

    fn bilinear(&self, sx: f64, sy: f64) -> Rgba8Premul {
        let fx = sx - 0.5;
        let fy = sy - 0.5;
        let x0 = fx.floor();
        let y0 = fy.floor();
        let tx = fx - x0;
        let ty = fy - y0;
        let (x0, y0) = (x0 as i64, y0 as i64);

        let mut acc = [0.0f64; 4];
        for (dy, wy) in [(0, 1.0 - ty), (1, ty)] {
            for (dx, wx) in [(0, 1.0 - tx), (1, tx)] {
                if let Some(px) = self.fetch(x0 + dx, y0 + dy) {
                    let w = wx * wy;
                    for (a, c) in acc.iter_mut().zip(px.to_array()) {
                        *a += w * f64::from(c);
                    }
                }
            }
        }
        to_pixel(acc)
    }

    fn kernel(&self, method: SampleMethod, radius: f64, sx: f64, sy: f64) -> Rgba8Premul {
        let support = radius * self.blur;
        let fx = sx - 0.5;
        let fy = sy - 0.5;
        let (x0, x1) = ((fx - support).ceil() as i64, (fx + support).floor() as i64);
        let (y0, y1) = ((fy - support).ceil() as i64, (fy + support).floor() as i64);

        let wx: Vec<f64> = (x0..=x1)
            .map(|ix| kernel_weight(method, radius, (ix as f64 - fx).abs() / self.blur))
            .collect();
        let wy: Vec<f64> = (y0..=y1)
            .map(|iy| kernel_weight(method, radius, (iy as f64 - fy).abs() / self.blur))
            .collect();
        let norm: f64 = wx.iter().sum::<f64>() * wy.iter().sum::<f64>();
        if norm.abs() < 1e-12 {
            return self.bilinear(sx, sy);
        }

        let mut acc = [0.0f64; 4];
        for (iy, wyv) in (y0..=y1).zip(&wy) {
            for (ix, wxv) in (x0..=x1).zip(&wx) {
                if let Some(px) = self.fetch(ix, iy) {
                    let w = wxv * wyv;
                    for (a, c) in acc.iter_mut().zip(px.to_array()) {
                        *a += w * f64::from(c);
                    }
                }
            }
        }
        for a in &mut acc {
            *a /= norm;
        }
        to_pixel(acc)
    }
}

fn to_pixel(acc: [f64; 4]) -> Rgba8Premul {
    let a = acc[3].round().clamp(0.0, 255.0);
    let ch = |v: f64| v.round().clamp(0.0, a) as u8;
    Rgba8Premul {
        r: ch(acc[0]),
        g: ch(acc[1]),
        b: ch(acc[2]),
        a: a as u8,
    }
}

impl SpanGenerator for ImageSpan {
    fn generate(&mut self, x: i32, y: i32, out: &mut [Rgba8Premul]) {
        let (mut p, (stx, sty)) = self.interp.begin(x, y);
        if self.fast {
            // Translation only: one source pixel per device pixel.
            let sy = p.y.floor() as i64;
            let sx = p.x.floor() as i64;
            for (i, px) in out.iter_mut().enumerate() {
                *px = self
                    .fetch(sx + i as i64, sy)
                    .map_or(Rgba8Premul::transparent(), |c| c.scale(self.opacity));
            }
            return;
        }

        for px in out.iter_mut() {
            let c = match self.filter {
                Filter::Nearest => self
                    .fetch(p.x.floor() as i64, p.y.floor() as i64)
                    .unwrap_or_default(),
                Filter::Bilinear => self.bilinear(p.x, p.y),
                Filter::Kernel { method, radius } => self.kernel(method, radius, p.x, p.y),
            };
            *px = c.scale(self.opacity);
            p.x += stx;
            p.y += sty;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/paint/sample.rs"]
mod tests;
