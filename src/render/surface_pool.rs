use std::collections::HashMap;

use crate::foundation::core::Rgba8Premul;
use crate::foundation::error::SceneResult;
use crate::paint::bitmap::Bitmap;

/// Pool configuration for scratch surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SurfacePoolOpts {
    /// Maximum bytes retained across all buckets.
    pub max_pool_bytes: usize,
    /// Maximum number of retained surfaces per size bucket.
    pub max_surfaces_per_bucket: usize,
}

impl Default for SurfacePoolOpts {
    fn default() -> Self {
        Self {
            max_pool_bytes: 256 * 1024 * 1024,
            max_surfaces_per_bucket: 8,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct SurfaceKey {
    w: u32,
    h: u32,
}

impl SurfaceKey {
    fn of(bitmap: &Bitmap) -> Self {
        Self {
            w: bitmap.width(),
            h: bitmap.height(),
        }
    }

    fn byte_len(self) -> usize {
        (self.w as usize)
            .saturating_mul(self.h as usize)
            .saturating_mul(4)
    }
}

/// Allocation counters.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SurfacePoolStats {
    /// Surfaces currently held by the pool.
    pub retained_surfaces: usize,
    /// Bytes currently held by the pool.
    pub retained_bytes: usize,
    /// Fresh allocations.
    pub alloc_surfaces: u64,
    /// Bytes of fresh allocations.
    pub alloc_bytes: u64,
    /// Releases that were dropped instead of retained.
    pub dropped_on_release: u64,
}

/// Bounded pool of scratch bitmaps used for isolated groups, filters and pattern tiles.
///
/// Keyed by `(width, height)`. Borrowed bitmaps come back cleared to transparent.
#[derive(Debug)]
pub struct SurfacePool {
    opts: SurfacePoolOpts,
    stats: SurfacePoolStats,
    buckets: HashMap<SurfaceKey, Vec<Bitmap>>,
}

impl SurfacePool {
    /// Empty pool.
    pub fn new(opts: SurfacePoolOpts) -> Self {
        Self {
            opts,
            stats: SurfacePoolStats::default(),
            buckets: HashMap::new(),
        }
    }

    /// Counters snapshot.
    pub fn stats(&self) -> SurfacePoolStats {
        self.stats.clone()
    }

    /// Take a transparent bitmap of the given size.
    pub fn borrow(&mut self, width: u32, height: u32) -> SceneResult<Bitmap> {
        let key = SurfaceKey {
            w: width,
            h: height,
        };
        if let Some(mut b) = self.buckets.get_mut(&key).and_then(Vec::pop) {
            self.stats.retained_surfaces = self.stats.retained_surfaces.saturating_sub(1);
            self.stats.retained_bytes = self.stats.retained_bytes.saturating_sub(key.byte_len());
            b.clear(Rgba8Premul::transparent());
            return Ok(b);
        }

        let bitmap = Bitmap::new(width, height)?;
        self.stats.alloc_surfaces = self.stats.alloc_surfaces.saturating_add(1);
        self.stats.alloc_bytes = self.stats.alloc_bytes.saturating_add(key.byte_len() as u64);
        Ok(bitmap)
    }

    /// Return a bitmap; it is dropped when the pool is full.
    pub fn release(&mut self, bitmap: Bitmap) {
        if self.opts.max_pool_bytes == 0 || self.opts.max_surfaces_per_bucket == 0 {
            self.stats.dropped_on_release = self.stats.dropped_on_release.saturating_add(1);
            return;
        }

        let key = SurfaceKey::of(&bitmap);
        let bytes = key.byte_len();
        if self.stats.retained_bytes.saturating_add(bytes) > self.opts.max_pool_bytes {
            self.stats.dropped_on_release = self.stats.dropped_on_release.saturating_add(1);
            return;
        }

        let bucket = self.buckets.entry(key).or_default();
        if bucket.len() >= self.opts.max_surfaces_per_bucket {
            self.stats.dropped_on_release = self.stats.dropped_on_release.saturating_add(1);
            return;
        }

        bucket.push(bitmap);
        self.stats.retained_surfaces = self.stats.retained_surfaces.saturating_add(1);
        self.stats.retained_bytes = self.stats.retained_bytes.saturating_add(bytes);
    }

    /// Borrow a bitmap, run `f` on it, and release it whatever `f` returns.
    pub fn with_surface<R>(
        &mut self,
        width: u32,
        height: u32,
        f: impl FnOnce(&mut Self, &mut Bitmap) -> R,
    ) -> SceneResult<R> {
        let mut bitmap = self.borrow(width, height)?;
        let out = f(self, &mut bitmap);
        self.release(bitmap);
        Ok(out)
    }
}
