//! Premultiplied RGBA8 bitmaps used as image sources, pattern tiles and canvases.

use std::path::Path;

use anyhow::Context;

use crate::foundation::core::Rgba8Premul;
use crate::foundation::error::{SceneError, SceneResult};

/// Owned premultiplied RGBA8 pixel buffer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bitmap {
    width: u32,
    height: u32,
    pixels: Vec<Rgba8Premul>,
}

impl Bitmap {
    /// Transparent bitmap. Both sides must be non-zero.
    pub fn new(width: u32, height: u32) -> SceneResult<Self> {
        let len = pixel_count(width, height)?;
        Ok(Self {
            width,
            height,
            pixels: vec![Rgba8Premul::transparent(); len],
        })
    }

    /// Wrap premultiplied pixels.
    pub fn from_premul(width: u32, height: u32, pixels: Vec<Rgba8Premul>) -> SceneResult<Self> {
        if pixels.len() != pixel_count(width, height)? {
            return Err(SceneError::resource("bitmap pixel count mismatch"));
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Premultiply straight RGBA8 bytes.
    pub fn from_rgba8(width: u32, height: u32, rgba: &[u8]) -> SceneResult<Self> {
        if rgba.len() != pixel_count(width, height)? * 4 {
            return Err(SceneError::resource("rgba byte length mismatch"));
        }
        let pixels = rgba
            .chunks_exact(4)
            .map(|px| Rgba8Premul::from_straight_rgba(px[0], px[1], px[2], px[3]))
            .collect();
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Decode an encoded image (PNG, JPEG, ...).
    pub fn decode(bytes: &[u8]) -> SceneResult<Self> {
        let img = image::load_from_memory(bytes).context("decode image from memory")?;
        let rgba = img.to_rgba8();
        let (w, h) = rgba.dimensions();
        Self::from_rgba8(w, h, rgba.as_raw())
    }

    /// Read and decode an image file.
    pub fn open(path: impl AsRef<Path>) -> SceneResult<Self> {
        let path = path.as_ref();
        let bytes =
            std::fs::read(path).with_context(|| format!("read image '{}'", path.display()))?;
        Self::decode(&bytes)
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// All pixels, row-major.
    pub fn pixels(&self) -> &[Rgba8Premul] {
        &self.pixels
    }

    /// All pixels, row-major.
    pub fn pixels_mut(&mut self) -> &mut [Rgba8Premul] {
        &mut self.pixels
    }

    /// Pixel at `(x, y)`; callers keep coordinates in range.
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> Rgba8Premul {
        self.pixels[y as usize * self.width as usize + x as usize]
    }

    /// One row.
    pub fn row_mut(&mut self, y: u32) -> &mut [Rgba8Premul] {
        let w = self.width as usize;
        let start = y as usize * w;
        &mut self.pixels[start..start + w]
    }

    /// Overwrite every pixel.
    pub fn clear(&mut self, color: Rgba8Premul) {
        self.pixels.fill(color);
    }

    /// Straight-alpha RGBA8 bytes.
    pub fn to_rgba8(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.pixels.len() * 4);
        for px in &self.pixels {
            out.extend_from_slice(&unpremultiply(*px));
        }
        out
    }

    /// Flat premultiplied bytes.
    pub fn as_bytes(&self) -> Vec<u8> {
        self.pixels.iter().flat_map(|p| p.to_array()).collect()
    }
}

fn pixel_count(width: u32, height: u32) -> SceneResult<usize> {
    if width == 0 || height == 0 {
        return Err(SceneError::resource(format!(
            "bitmap size {width}x{height} must be non-zero"
        )));
    }
    (width as usize)
        .checked_mul(height as usize)
        .ok_or_else(|| SceneError::resource("bitmap size overflow"))
}

fn unpremultiply(px: Rgba8Premul) -> [u8; 4] {
    let a = u32::from(px.a);
    if a == 0 {
        return [0, 0, 0, 0];
    }
    let un = |c: u8| ((u32::from(c) * 255 + a / 2) / a).min(255) as u8;
    [un(px.r), un(px.g), un(px.b), px.a]
}
