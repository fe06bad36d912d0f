//! sovmap: a jump-graph sovereignty influence diffusion and raster
//! rendering engine.
//!
//! [`SovMap`] is the facade applications embed; it wraps [`Map`], which
//! holds the raster buffers, the loaded graph and the render lifecycle.
//! This mirrors the teacher's split between a thin public entry point and
//! the internal engine (`point_viewer`'s octree/xray crates keep their
//! public API surface in `lib.rs` and push the heavy lifting into modules).

pub mod color;
pub mod color_assigner;
pub mod error;
pub mod functions;
pub mod geometry;
pub mod graph;
pub mod influence;
pub mod labels;
pub mod map;
pub mod render;
pub mod resolver;
pub mod snapshot;
pub mod spatial_grid;

use std::path::Path;

use image::RgbaImage;

pub use error::{Error, ErrorKind};
pub use functions::{Functions, InfluenceToAlphaFn, PowerFalloffFn, SovPowerFn};
pub use graph::{Graph, JumpInput, Jumps, Owner, OwnerInput, Region, RegionInput, SolarSystem, SystemInput};
pub use labels::Label;
pub use map::Map;

/// The public facade: owns a [`Map`] and exposes the lifecycle described in
/// spec.md §3 ("Lifecycle") as a small, stable API surface.
pub struct SovMap {
    map: Map,
}

impl SovMap {
    /// Creates a new map with the given raster size and projection
    /// parameters (spec.md §3/§4.1).
    pub fn new(width: u32, height: u32, offset_x: f64, offset_y: f64, scale: f64, sample_rate: u32) -> Result<SovMap, Error> {
        Ok(SovMap {
            map: Map::new(width, height, offset_x, offset_y, scale, sample_rate)?,
        })
    }

    /// Resizes the raster, optionally re-deriving `scale` from a reference
    /// world extent.
    pub fn update_size(&mut self, width: u32, height: u32, sample_rate: u32, reference_extent: Option<f64>) -> Result<(), Error> {
        self.map.update_size(width, height, sample_rate, reference_extent)
    }

    pub fn set_offset(&mut self, offset_x: f64, offset_y: f64) {
        self.map.set_offset(offset_x, offset_y)
    }

    /// Installs custom configurable functions (spec.md §6).
    pub fn set_functions(&mut self, functions: Functions) {
        self.map.set_functions(functions)
    }

    /// Loads owners/systems/constellations/regions/jumps (spec.md §6
    /// Data-in contract). Replaces any previously loaded graph.
    pub fn load_data(
        &mut self,
        owners: &[OwnerInput],
        systems: &[SystemInput],
        constellations: &[(u32, u32, String)],
        regions: &[RegionInput],
        jumps: &[JumpInput],
    ) {
        self.map.load_data(owners, systems, constellations, regions, jumps)
    }

    /// Runs Phase A of the influence engine (spec.md §4.3).
    pub fn calculate_influence(&mut self) -> Result<(), Error> {
        self.map.calculate_influence()
    }

    /// Renders the raster with `thread_count` worker stripes (spec.md §4.5).
    /// `thread_count == 0` defers to the number of available CPUs, mirroring
    /// the teacher's use of `num_cpus` for worker-pool sizing.
    pub fn render(&mut self, thread_count: usize) -> Result<(), Error> {
        let thread_count = if thread_count == 0 { num_cpus::get() } else { thread_count };
        self.map.render(thread_count)
    }

    /// Computes owner labels from the last render (spec.md §4.6), using the
    /// default minimum label area.
    pub fn calculate_labels(&self) -> Result<Vec<Label>, Error> {
        self.map.calculate_labels_default()
    }

    /// Computes owner labels with a caller-supplied minimum area.
    pub fn calculate_labels_with_min_area(&self, min_label_area: usize) -> Result<Vec<Label>, Error> {
        self.map.calculate_labels(min_label_area)
    }

    /// Saves the last-rendered owner-id buffer (spec.md §4.7).
    pub fn save_owner_data(&self, path: &Path, compress: bool) -> Result<(), Error> {
        self.map.save_owner_data(path, compress)
    }

    /// Loads a prior owner-id snapshot to drive the change-overlay striping
    /// on the next render (spec.md §4.4 step 6).
    pub fn load_old_owner_data(&mut self, path: &Path) -> Result<(), Error> {
        self.map.load_old_owner_data(path)
    }

    pub fn clear_old_owner_data(&mut self) {
        self.map.clear_old_owner_data()
    }

    pub fn width(&self) -> u32 {
        self.map.width()
    }

    pub fn height(&self) -> u32 {
        self.map.height()
    }

    pub fn sample_rate(&self) -> u32 {
        self.map.sample_rate()
    }

    pub fn scale(&self) -> f64 {
        self.map.scale()
    }

    pub fn solar_systems(&self) -> impl Iterator<Item = &SolarSystem> {
        self.map.graph().systems.values()
    }

    pub fn owners(&self) -> impl Iterator<Item = &Owner> {
        self.map.graph().owners.values()
    }

    pub fn jumps(&self) -> &Jumps {
        &self.map.graph().jumps
    }

    /// The rendered RGBA image buffer, if `render` has succeeded at least
    /// once (spec.md §6 Data-out contract).
    pub fn get_image(&self) -> Option<&RgbaImage> {
        self.map.image()
    }

    /// The rendered owner-id buffer, if `render` has succeeded at least once.
    pub fn get_owner_ids(&self) -> Option<&[i32]> {
        self.map.owner_ids()
    }
}
