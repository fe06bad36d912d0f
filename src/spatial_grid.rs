//! Uniform grid spatial index over projected system positions, binned at
//! `sample_rate` (spec.md §4.3 Phase B, §9 design notes).
//!
//! Built once per render from the immutable system list and read only
//! during the parallel render (spec.md §5).

use fnv::FnvHashMap;

use crate::graph::SolarSystem;

/// Maps `(cell_x, cell_y)` to the ids of systems whose influence radius
/// intersects that cell.
pub struct SpatialGrid {
    cell_size: i32,
    buckets: FnvHashMap<(i32, i32), Vec<u32>>,
}

impl SpatialGrid {
    pub fn build<'a>(
        cell_size: u32,
        systems: impl Iterator<Item = (&'a SolarSystem, f64)>,
    ) -> SpatialGrid {
        let cell_size = cell_size.max(1) as i32;
        let mut buckets: FnvHashMap<(i32, i32), Vec<u32>> = FnvHashMap::default();
        for (system, radius) in systems {
            if radius <= 0.0 {
                continue;
            }
            let min_cx = ((f64::from(system.x_px) - radius) / f64::from(cell_size)).floor() as i32;
            let max_cx = ((f64::from(system.x_px) + radius) / f64::from(cell_size)).floor() as i32;
            let min_cy = ((f64::from(system.y_px) - radius) / f64::from(cell_size)).floor() as i32;
            let max_cy = ((f64::from(system.y_px) + radius) / f64::from(cell_size)).floor() as i32;
            for cy in min_cy..=max_cy {
                for cx in min_cx..=max_cx {
                    buckets.entry((cx, cy)).or_default().push(system.id);
                }
            }
        }
        SpatialGrid { cell_size, buckets }
    }

    /// Systems whose radius may intersect the cell containing pixel `(px,
    /// py)`.
    pub fn query(&self, px: i32, py: i32) -> &[u32] {
        let cx = px.div_euclid(self.cell_size);
        let cy = py.div_euclid(self.cell_size);
        self.buckets
            .get(&(cx, cy))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}
