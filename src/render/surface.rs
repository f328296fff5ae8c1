//! Render targets.

use std::io::Cursor;
use std::path::Path;

use anyhow::Context;

use crate::foundation::core::Rgba8Premul;
use crate::foundation::error::SceneResult;
use crate::paint::bitmap::Bitmap;
use crate::render::composite::over_span;

/// Winding rule deciding the interior of a path.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FillRule {
    /// Non-zero winding.
    #[default]
    NonZero,
    /// Even-odd.
    EvenOdd,
}

/// A pixel target that accepts coverage-weighted color spans.
pub trait Surface {
    /// Width in pixels.
    fn width(&self) -> u32;

    /// Height in pixels.
    fn height(&self) -> u32;

    /// Blend `colors`, weighted by `coverage`, into row `y` starting at column `x`. Both
    /// slices have the same length and lie inside the surface.
    fn blend_span(&mut self, x: u32, y: u32, colors: &[Rgba8Premul], coverage: &[u8]);
}

/// In-memory premultiplied RGBA8 surface.
#[derive(Clone, Debug)]
pub struct Canvas {
    bitmap: Bitmap,
}

impl Canvas {
    /// Transparent canvas.
    pub fn new(width: u32, height: u32) -> SceneResult<Self> {
        Ok(Self {
            bitmap: Bitmap::new(width, height)?,
        })
    }

    /// Wrap an existing bitmap.
    pub fn from_bitmap(bitmap: Bitmap) -> Self {
        Self { bitmap }
    }

    /// Fill with `color`.
    pub fn clear(&mut self, color: Rgba8Premul) {
        self.bitmap.clear(color);
    }

    /// Pixel at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> Rgba8Premul {
        self.bitmap.pixel(x, y)
    }

    /// Underlying pixels.
    pub fn bitmap(&self) -> &Bitmap {
        &self.bitmap
    }

    /// Underlying pixels.
    pub fn bitmap_mut(&mut self) -> &mut Bitmap {
        &mut self.bitmap
    }

    /// Unwrap.
    pub fn into_bitmap(self) -> Bitmap {
        self.bitmap
    }

    /// PNG-encoded contents.
    pub fn encode_png(&self) -> SceneResult<Vec<u8>> {
        let img = image::RgbaImage::from_raw(
            self.bitmap.width(),
            self.bitmap.height(),
            self.bitmap.to_rgba8(),
        )
        .context("canvas byte length does not match its size")?;
        let mut out = Vec::new();
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut out), image::ImageFormat::Png)
            .context("encode png")?;
        Ok(out)
    }

    /// Write contents as a PNG file.
    pub fn save_png(&self, path: impl AsRef<Path>) -> SceneResult<()> {
        let path = path.as_ref();
        let bytes = self.encode_png()?;
        std::fs::write(path, bytes).with_context(|| format!("write '{}'", path.display()))?;
        Ok(())
    }
}

impl Surface for Canvas {
    fn width(&self) -> u32 {
        self.bitmap.width()
    }

    fn height(&self) -> u32 {
        self.bitmap.height()
    }

    fn blend_span(&mut self, x: u32, y: u32, colors: &[Rgba8Premul], coverage: &[u8]) {
        let row = self.bitmap.row_mut(y);
        let start = x as usize;
        let end = (start + colors.len()).min(row.len());
        if start >= end {
            return;
        }
        over_span(&mut row[start..end], colors, coverage);
    }
}
