//! Uniform cell grid pruning the O(n^2) pairwise distance scan.
//!
//! Points are bucketed by cell coordinate over the region's bounding box;
//! a neighborhood query then visits only the cells overlapping the probe
//! disk instead of the whole point set.

/// Grid of point indices keyed by cell coordinate.
pub(super) struct CellGrid {
    min_x: f64,
    min_y: f64,
    cell: f64,
    nx: usize,
    ny: usize,
    buckets: Vec<Vec<u32>>,
}

impl CellGrid {
    /// Build a grid over `bounds` = (min_x, min_y, max_x, max_y) with a
    /// cell size of roughly `radius` (clamped so the grid stays small).
    pub fn build(points: &[(f64, f64)], bounds: (f64, f64, f64, f64), radius: f64) -> Self {
        let (min_x, min_y, max_x, max_y) = bounds;
        let span = (max_x - min_x).max(max_y - min_y).max(f64::MIN_POSITIVE);
        let cell = radius.max(span / 256.0);
        let nx = ((max_x - min_x) / cell).ceil().max(1.0) as usize;
        let ny = ((max_y - min_y) / cell).ceil().max(1.0) as usize;
        let mut buckets = vec![Vec::new(); nx * ny];
        for (i, &(x, y)) in points.iter().enumerate() {
            let cx = Self::clamp_coord((x - min_x) / cell, nx);
            let cy = Self::clamp_coord((y - min_y) / cell, ny);
            buckets[cy * nx + cx].push(i as u32);
        }
        Self { min_x, min_y, cell, nx, ny, buckets }
    }

    fn clamp_coord(c: f64, n: usize) -> usize {
        (c.floor().max(0.0) as usize).min(n - 1)
    }

    /// Collect the indices of all points that may lie within `radius` of
    /// `(x, y)` into `out`. Conservative: callers still check distances.
    pub fn gather(&self, x: f64, y: f64, radius: f64, out: &mut Vec<u32>) {
        out.clear();
        let reach = (radius / self.cell).ceil() as i64 + 1;
        let cx = ((x - self.min_x) / self.cell).floor() as i64;
        let cy = ((y - self.min_y) / self.cell).floor() as i64;
        for gy in (cy - reach).max(0)..=(cy + reach).min(self.ny as i64 - 1) {
            for gx in (cx - reach).max(0)..=(cx + reach).min(self.nx as i64 - 1) {
                out.extend_from_slice(&self.buckets[gy as usize * self.nx + gx as usize]);
            }
        }
    }
}
