//! Distance-to-contour field backing the contour gradient.

use kurbo::Shape;

use crate::foundation::core::{BezPath, Point};

/// Largest grid side used for the distance field.
pub const MAX_FIELD_CELLS: usize = 512;

// Squared-distance seed for cells inside the shape.
const FAR: f64 = 1e20;

/// Interior distance field over a path's bounds, normalized to `0..=256`.
#[derive(Clone, Debug)]
pub struct ContourField {
    origin: Point,
    cell: f64,
    cols: usize,
    rows: usize,
    values: Vec<f32>,
}

impl ContourField {
    /// Build the field for `path` in its own coordinate space. `scale` is the path's
    /// object-to-device scale and sets the grid resolution.
    pub fn build(path: &BezPath, scale: f64) -> Option<Self> {
        let b = path.bounding_box();
        let extent = b.width().max(b.height());
        if !extent.is_finite() || extent <= 0.0 {
            return None;
        }
        let scale = if scale > 0.0 && scale.is_finite() { scale } else { 1.0 };
        let n = ((extent * scale).ceil() as usize).clamp(1, MAX_FIELD_CELLS);
        let cell = extent / n as f64;
        // One cell of padding keeps the border outside the shape.
        let cols = ((b.width() / cell).ceil() as usize).max(1) + 2;
        let rows = ((b.height() / cell).ceil() as usize).max(1) + 2;
        let origin = Point::new(b.x0 - cell, b.y0 - cell);

        let mut grid = vec![0.0f64; cols * rows];
        for row in 1..rows - 1 {
            for col in 1..cols - 1 {
                let p = Point::new(
                    origin.x + (col as f64 + 0.5) * cell,
                    origin.y + (row as f64 + 0.5) * cell,
                );
                if path.winding(p) != 0 {
                    grid[row * cols + col] = FAR;
                }
            }
        }

        distance_transform(&mut grid, cols, rows);

        let max = grid.iter().copied().fold(0.0f64, f64::max).sqrt();
        let norm = if max > 0.0 { 256.0 / max } else { 0.0 };
        let values = grid.iter().map(|d| (d.sqrt() * norm) as f32).collect();

        Some(Self {
            origin,
            cell,
            cols,
            rows,
            values,
        })
    }

    /// Normalized depth at `p`: 0 on or outside the contour, 256 at the deepest point.
    pub fn value(&self, p: Point) -> f64 {
        let cx = ((p.x - self.origin.x) / self.cell).floor();
        let cy = ((p.y - self.origin.y) / self.cell).floor();
        if cx < 0.0 || cy < 0.0 || cx >= self.cols as f64 || cy >= self.rows as f64 {
            return 0.0;
        }
        f64::from(self.values[cy as usize * self.cols + cx as usize])
    }
}

// Exact squared Euclidean distance transform, separable row and column passes.
fn distance_transform(grid: &mut [f64], cols: usize, rows: usize) {
    let n = cols.max(rows);
    let mut f = vec![0.0f64; n];
    let mut d = vec![0.0f64; n];
    let mut v = vec![0usize; n];
    let mut z = vec![0.0f64; n + 1];

    for x in 0..cols {
        for y in 0..rows {
            f[y] = grid[y * cols + x];
        }
        edt_1d(&f[..rows], &mut d[..rows], &mut v, &mut z);
        for y in 0..rows {
            grid[y * cols + x] = d[y];
        }
    }

    for y in 0..rows {
        let row = &mut grid[y * cols..(y + 1) * cols];
        f[..cols].copy_from_slice(row);
        edt_1d(&f[..cols], &mut d[..cols], &mut v, &mut z);
        row.copy_from_slice(&d[..cols]);
    }
}

fn edt_1d(f: &[f64], d: &mut [f64], v: &mut [usize], z: &mut [f64]) {
    let n = f.len();
    if n == 0 {
        return;
    }
    let sq = |i: usize| (i * i) as f64;
    let meet = |q: usize, p: usize| ((f[q] + sq(q)) - (f[p] + sq(p))) / (2.0 * (q as f64 - p as f64));

    let mut k = 0usize;
    v[0] = 0;
    z[0] = f64::NEG_INFINITY;
    z[1] = f64::INFINITY;
    for q in 1..n {
        let mut s = meet(q, v[k]);
        while s <= z[k] {
            k -= 1;
            s = meet(q, v[k]);
        }
        k += 1;
        v[k] = q;
        z[k] = s;
        z[k + 1] = f64::INFINITY;
    }

    k = 0;
    for (q, out) in d.iter_mut().enumerate() {
        while z[k + 1] < q as f64 {
            k += 1;
        }
        let dq = q as f64 - v[k] as f64;
        *out = dq * dq + f[v[k]];
    }
}
