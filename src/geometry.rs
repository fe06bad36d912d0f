//! Affine projection of 3D system coordinates into raster pixel space.
//!
//! Follows the teacher's convention of expressing positions as typed
//! `nalgebra` points rather than bare tuples.

use nalgebra::{Point2, Point3};

/// Parameters of the affine `x,z -> pixel` projection (spec.md §4.1).
#[derive(Debug, Clone, Copy)]
pub struct Projection {
    pub width: u32,
    pub height: u32,
    pub offset_x: f64,
    pub offset_y: f64,
    pub scale: f64,
}

impl Projection {
    /// Projects a 3D system position (`y` is vertical and ignored) onto an
    /// integer pixel. Returns `None` if the result falls outside
    /// `[0, width) x [0, height)`.
    pub fn project(&self, position: Point3<f64>) -> Option<Point2<i32>> {
        let x_px = (position.x * self.scale + f64::from(self.width) / 2.0 + self.offset_x).round();
        let y_px = (position.z * self.scale + f64::from(self.height) / 2.0 + self.offset_y).round();
        if !x_px.is_finite() || !y_px.is_finite() {
            return None;
        }
        let x_px = x_px as i64;
        let y_px = y_px as i64;
        if x_px < 0 || y_px < 0 || x_px >= i64::from(self.width) || y_px >= i64::from(self.height) {
            return None;
        }
        Some(Point2::new(x_px as i32, y_px as i32))
    }

    /// Derives `scale` from a reference world extent so that the extent
    /// exactly fits the shorter raster dimension (used when the caller
    /// requests `update_size`).
    pub fn derive_scale(width: u32, height: u32, reference_extent: f64) -> f64 {
        if reference_extent <= 0.0 {
            return 1.0;
        }
        f64::from(width.min(height)) / reference_extent
    }
}
