use crate::effects::filter::FilterEffect;
use crate::foundation::core::Rgba8Premul;
use crate::foundation::error::{SceneError, SceneResult};
use crate::paint::bitmap::Bitmap;

/// Separable Gaussian blur with a fixed-point kernel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GaussianBlur {
    radius: u32,
    sigma: f32,
}

impl GaussianBlur {
    /// Blur with an explicit kernel radius and standard deviation.
    pub fn new(radius: u32, sigma: f32) -> SceneResult<Self> {
        if radius > 0 && (!sigma.is_finite() || sigma <= 0.0) {
            return Err(SceneError::validation("blur sigma must be > 0"));
        }
        Ok(Self { radius, sigma })
    }

    /// Blur with radius `ceil(3 * sigma)`.
    pub fn from_std_deviation(sigma: f32) -> SceneResult<Self> {
        if !sigma.is_finite() || sigma < 0.0 {
            return Err(SceneError::validation("blur deviation must be >= 0"));
        }
        Self::new((sigma * 3.0).ceil() as u32, sigma)
    }

    /// Kernel radius in pixels.
    pub fn radius(&self) -> u32 {
        self.radius
    }
}

impl FilterEffect for GaussianBlur {
    fn name(&self) -> &str {
        "gaussian_blur"
    }

    fn apply(&self, bitmap: &mut Bitmap) -> SceneResult<()> {
        if self.radius == 0 {
            return Ok(());
        }
        let (w, h) = (bitmap.width(), bitmap.height());
        let kernel = gaussian_kernel_q16(self.radius, self.sigma)?;
        let mut tmp = vec![Rgba8Premul::transparent(); bitmap.pixels().len()];
        horizontal_pass(bitmap.pixels(), &mut tmp, w, h, &kernel);
        vertical_pass(&tmp, bitmap.pixels_mut(), w, h, &kernel);
        Ok(())
    }
}

fn gaussian_kernel_q16(radius: u32, sigma: f32) -> SceneResult<Vec<u32>> {
    let r = radius as i32;
    let sigma = f64::from(sigma);
    let denom = 2.0 * sigma * sigma;
    let weights_f: Vec<f64> = (-r..=r)
        .map(|i| {
            let x = f64::from(i);
            (-x * x / denom).exp()
        })
        .collect();
    let sum: f64 = weights_f.iter().sum();
    if sum <= 0.0 {
        return Err(SceneError::render("gaussian kernel sum is zero"));
    }

    let mut weights: Vec<u32> = Vec::with_capacity(weights_f.len());
    let mut acc: i64 = 0;
    for &wf in &weights_f {
        let q = ((wf / sum) * 65536.0).round() as i64;
        let q = q.clamp(0, 65536);
        weights.push(q as u32);
        acc += q;
    }
    // Put rounding drift on the center tap so the kernel sums to exactly 1.0.
    let delta = 65536 - acc;
    if delta != 0 {
        let mid = weights.len() / 2;
        weights[mid] = (i64::from(weights[mid]) + delta).clamp(0, 65536) as u32;
    }
    Ok(weights)
}

fn horizontal_pass(src: &[Rgba8Premul], dst: &mut [Rgba8Premul], width: u32, height: u32, k: &[u32]) {
    let radius = (k.len() / 2) as i32;
    let w = width as i32;
    for y in 0..height as i32 {
        for x in 0..w {
            let mut acc = [0u64; 4];
            for (ki, &kw) in k.iter().enumerate() {
                let sx = (x + ki as i32 - radius).clamp(0, w - 1);
                let px = src[(y * w + sx) as usize].to_array();
                for c in 0..4 {
                    acc[c] += u64::from(kw) * u64::from(px[c]);
                }
            }
            dst[(y * w + x) as usize] = q16_pixel(acc);
        }
    }
}

fn vertical_pass(src: &[Rgba8Premul], dst: &mut [Rgba8Premul], width: u32, height: u32, k: &[u32]) {
    let radius = (k.len() / 2) as i32;
    let w = width as i32;
    let h = height as i32;
    for y in 0..h {
        for x in 0..w {
            let mut acc = [0u64; 4];
            for (ki, &kw) in k.iter().enumerate() {
                let sy = (y + ki as i32 - radius).clamp(0, h - 1);
                let px = src[(sy * w + x) as usize].to_array();
                for c in 0..4 {
                    acc[c] += u64::from(kw) * u64::from(px[c]);
                }
            }
            dst[(y * w + x) as usize] = q16_pixel(acc);
        }
    }
}

fn q16_pixel(acc: [u64; 4]) -> Rgba8Premul {
    let ch = |v: u64| ((v + 32768) >> 16).min(255) as u8;
    Rgba8Premul::from_array([ch(acc[0]), ch(acc[1]), ch(acc[2]), ch(acc[3])])
}
