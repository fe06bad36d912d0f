//! The top-level aggregate (spec.md §3 `Map`): owns the raster buffers, the
//! graph, the configurable functions, and drives the lifecycle described in
//! spec.md §3's "Lifecycle" paragraph.

use std::collections::HashMap;
use std::path::Path;

use fnv::FnvHashMap;
use image::RgbaImage;
use log::info;

use crate::color::Color;
use crate::color_assigner;
use crate::error::{Error, ErrorKind};
use crate::functions::Functions;
use crate::geometry::Projection;
use crate::graph::{Graph, JumpInput, OwnerInput, RegionInput, SystemInput};
use crate::influence::{self, DEFAULT_HOP_CAP};
use crate::labels::{self, Label, DEFAULT_MIN_LABEL_AREA};
use crate::render;
use crate::snapshot;
use crate::spatial_grid::SpatialGrid;

/// The engine's top-level aggregate. `render()`/`calculate_influence()` take
/// `&mut self`, which is what makes concurrent mutation of a `Map` a
/// compile-time impossibility rather than a runtime-checked contract
/// (SPEC_FULL.md §3's realization of I6).
pub struct Map {
    width: u32,
    height: u32,
    sample_rate: u32,
    projection: Projection,
    functions: Functions,
    graph: Graph,
    calculated: bool,
    new_colors: HashMap<u32, Color>,
    image: Option<RgbaImage>,
    owner_ids: Option<Vec<i32>>,
    old_owner_ids: Option<Vec<i32>>,
}

impl Map {
    /// Creates an empty map. Fails with `InvalidInput` if `width`/`height`
    /// aren't multiples of `sample_rate` (spec.md §3 I5).
    pub fn new(width: u32, height: u32, offset_x: f64, offset_y: f64, scale: f64, sample_rate: u32) -> Result<Map, Error> {
        check_sample_rate(width, height, sample_rate)?;
        Ok(Map {
            width,
            height,
            sample_rate,
            projection: Projection {
                width,
                height,
                offset_x,
                offset_y,
                scale,
            },
            functions: Functions::default(),
            graph: Graph::default(),
            calculated: false,
            new_colors: HashMap::new(),
            image: None,
            owner_ids: None,
            old_owner_ids: None,
        })
    }

    /// Resizes the raster, optionally re-deriving `scale` from a reference
    /// world extent (spec.md §4.1). Invalidates any prior render.
    pub fn update_size(&mut self, width: u32, height: u32, sample_rate: u32, reference_extent: Option<f64>) -> Result<(), Error> {
        check_sample_rate(width, height, sample_rate)?;
        self.width = width;
        self.height = height;
        self.sample_rate = sample_rate;
        if let Some(extent) = reference_extent {
            self.projection.scale = Projection::derive_scale(width, height, extent);
        }
        self.projection.width = width;
        self.projection.height = height;
        self.invalidate();
        Ok(())
    }

    pub fn set_offset(&mut self, offset_x: f64, offset_y: f64) {
        self.projection.offset_x = offset_x;
        self.projection.offset_y = offset_y;
        self.invalidate();
    }

    pub fn set_functions(&mut self, functions: Functions) {
        self.functions = functions;
        self.invalidate();
    }

    /// Loads owners/systems/constellations/regions/jumps, replacing any
    /// previously loaded graph (spec.md §6 Data-in contract).
    pub fn load_data(
        &mut self,
        owners: &[OwnerInput],
        systems: &[SystemInput],
        constellations: &[(u32, u32, String)],
        regions: &[RegionInput],
        jumps: &[JumpInput],
    ) {
        self.graph = Graph::build(&self.projection, owners, systems, constellations, regions, jumps);
        self.new_colors.clear();
        self.invalidate();
    }

    fn invalidate(&mut self) {
        self.calculated = false;
        self.image = None;
        self.owner_ids = None;
    }

    /// Assigns colors to owners that have none (spec.md §4.2), recording
    /// them in `new_colors`.
    fn ensure_colors_assigned(&mut self) {
        let missing: Vec<u32> = self
            .graph
            .owners
            .values()
            .filter(|o| o.color.is_none() && !self.new_colors.contains_key(&o.id))
            .map(|o| o.id)
            .collect();
        if missing.is_empty() {
            return;
        }
        let existing: Vec<Color> = self
            .graph
            .owners
            .values()
            .filter_map(|o| o.color)
            .chain(self.new_colors.values().cloned())
            .collect();
        for (id, color) in color_assigner::assign_colors(&missing, &existing) {
            self.new_colors.insert(id, color);
            if let Some(owner) = self.graph.owners.get_mut(&id) {
                owner.color = Some(color);
            }
        }
    }

    /// Runs Phase A of the influence engine over the whole graph (spec.md
    /// §4.3), assigning colors first so the resolver always has one to use.
    pub fn calculate_influence(&mut self) -> Result<(), Error> {
        self.ensure_colors_assigned();
        influence::calculate_influence(&mut self.graph, &self.functions, DEFAULT_HOP_CAP)?;
        self.calculated = true;
        info!("calculated influence for {} systems", self.graph.systems.len());
        Ok(())
    }

    /// Renders the raster (spec.md §4.5). Auto-triggers `calculate_influence`
    /// if it hasn't run yet and systems are loaded; otherwise fails with
    /// `NotReady` (spec.md §7).
    pub fn render(&mut self, thread_count: usize) -> Result<(), Error> {
        if !self.calculated {
            if self.graph.systems.is_empty() {
                return Err(ErrorKind::NotReady.into());
            }
            self.calculate_influence()?;
        }

        let k = influence::radius_k(self.sample_rate);
        let mut radii: FnvHashMap<u32, f64> = FnvHashMap::default();
        for system in self.graph.systems.values() {
            let max_influence = influence::max_influence(&system.influences);
            radii.insert(system.id, influence::system_radius(max_influence, k));
        }

        let grid = SpatialGrid::build(
            self.sample_rate,
            self.graph.systems.values().map(|s| (s, radii[&s.id])),
        );

        let output = render::render(
            self.width,
            self.height,
            self.sample_rate,
            &self.graph,
            &grid,
            &radii,
            &self.functions,
            self.old_owner_ids.as_deref(),
            thread_count,
        )?;

        self.image = Some(output.rgba);
        self.owner_ids = Some(output.owner_ids);
        Ok(())
    }

    /// Computes owner labels from the last render (spec.md §4.6).
    pub fn calculate_labels(&self, min_label_area: usize) -> Result<Vec<Label>, Error> {
        let owner_ids = self.owner_ids.as_ref().ok_or(ErrorKind::NotReady)?;
        Ok(labels::compute_labels(self.width, self.height, owner_ids, &self.graph, min_label_area))
    }

    /// Computes owner labels using the default minimum area (spec.md §4.6).
    pub fn calculate_labels_default(&self) -> Result<Vec<Label>, Error> {
        self.calculate_labels(DEFAULT_MIN_LABEL_AREA)
    }

    /// Saves the owner-id buffer from the last render (spec.md §4.7).
    pub fn save_owner_data(&self, path: &Path, compress: bool) -> Result<(), Error> {
        let owner_ids = self.owner_ids.as_ref().ok_or(ErrorKind::NotReady)?;
        snapshot::save_owner_data(path, self.width, self.height, owner_ids, compress)
    }

    /// Loads a previously saved owner-id buffer to use as the "old owner"
    /// snapshot for the change-overlay striping (spec.md §4.4 step 6).
    pub fn load_old_owner_data(&mut self, path: &Path) -> Result<(), Error> {
        let buf = snapshot::load_old_owner_data(path, (self.width, self.height))?;
        self.old_owner_ids = Some(buf);
        Ok(())
    }

    pub fn clear_old_owner_data(&mut self) {
        self.old_owner_ids = None;
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn scale(&self) -> f64 {
        self.projection.scale
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn image(&self) -> Option<&RgbaImage> {
        self.image.as_ref()
    }

    pub fn owner_ids(&self) -> Option<&[i32]> {
        self.owner_ids.as_deref()
    }

    pub fn new_colors(&self) -> &HashMap<u32, Color> {
        &self.new_colors
    }
}

fn check_sample_rate(width: u32, height: u32, sample_rate: u32) -> Result<(), Error> {
    if sample_rate == 0 || width % sample_rate != 0 || height % sample_rate != 0 {
        return Err(ErrorKind::InvalidInput(format!(
            "width {} and height {} must be multiples of sample_rate {}",
            width, height, sample_rate
        ))
        .into());
    }
    Ok(())
}
