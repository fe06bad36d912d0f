//! Per-pixel owner selection and alpha mapping (spec.md §4.4).
//!
//! Pure function of read-only inputs: the same `(px, py)` always resolves
//! to the same `PixelResolution`, which is what makes the parallel renderer
//! in `render.rs` deterministic regardless of stripe count (spec.md §5).

use fnv::FnvHashMap;
use image::Rgba;

use crate::color::{Color, TRANSPARENT};
use crate::error::Error;
use crate::functions::{invoke_guarded, Functions};
use crate::graph::Graph;
use crate::spatial_grid::SpatialGrid;

/// Owner-id buffer sentinel for "no owner" (spec.md §4.7/§6).
pub const SENTINEL: i32 = -1;

/// ε_pixel: a pixel with no owner's accumulated influence above this is
/// rendered fully transparent (spec.md §4.4 step 2).
pub const EPSILON_PIXEL: f32 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelResolution {
    pub rgba: Rgba<u8>,
    pub owner_id: i32,
}

impl PixelResolution {
    fn transparent() -> Self {
        PixelResolution {
            rgba: TRANSPARENT.into(),
            owner_id: SENTINEL,
        }
    }
}

fn quadratic_falloff(distance: f64, radius: f64) -> f64 {
    if radius <= 0.0 {
        return 0.0;
    }
    let t = (1.0 - distance / radius).max(0.0);
    t * t
}

/// Accumulates per-owner influence `I_o` at `(px, py)` (spec.md §4.3 Phase B).
fn accumulate_influence(
    px: i32,
    py: i32,
    graph: &Graph,
    grid: &SpatialGrid,
    radii: &FnvHashMap<u32, f64>,
) -> FnvHashMap<u32, f32> {
    let mut totals: FnvHashMap<u32, f32> = FnvHashMap::default();
    for &system_id in grid.query(px, py) {
        let system = match graph.systems.get(&system_id) {
            Some(s) => s,
            None => continue,
        };
        let radius = match radii.get(&system_id) {
            Some(&r) if r > 0.0 => r,
            _ => continue,
        };
        let dx = f64::from(px - system.x_px);
        let dy = f64::from(py - system.y_px);
        let distance = (dx * dx + dy * dy).sqrt();
        if distance > radius {
            continue;
        }
        let falloff = quadratic_falloff(distance, radius);
        if falloff <= 0.0 {
            continue;
        }
        for (&owner_id, &influence) in &system.influences {
            *totals.entry(owner_id).or_insert(0.0) += influence * falloff as f32;
        }
    }
    totals
}

/// Picks the dominant owner among `totals`, excluding NPC owners unless
/// they are the only non-zero influence (spec.md §4.4).
fn pick_dominant(totals: &FnvHashMap<u32, f32>, graph: &Graph) -> Option<(u32, f32)> {
    let non_npc: Vec<(u32, f32)> = totals
        .iter()
        .filter(|&(&owner_id, &value)| {
            value > EPSILON_PIXEL && !graph.owners.get(&owner_id).map(|o| o.npc).unwrap_or(false)
        })
        .map(|(&id, &v)| (id, v))
        .collect();

    let pool: Vec<(u32, f32)> = if !non_npc.is_empty() {
        non_npc
    } else {
        totals
            .iter()
            .filter(|&(_, &value)| value > EPSILON_PIXEL)
            .map(|(&id, &v)| (id, v))
            .collect()
    };

    pool.into_iter()
        .fold(None, |best: Option<(u32, f32)>, (id, value)| match best {
            None => Some((id, value)),
            Some((best_id, best_value)) => {
                if value > best_value || (value == best_value && id < best_id) {
                    Some((id, value))
                } else {
                    Some((best_id, best_value))
                }
            }
        })
}

/// Resolves one sample cell to an RGBA pixel and owner id, applying the
/// diagonal-stripe change overlay when an old-owner snapshot disagrees
/// (spec.md §4.4 step 6).
pub fn resolve_cell(
    px: i32,
    py: i32,
    graph: &Graph,
    grid: &SpatialGrid,
    radii: &FnvHashMap<u32, f64>,
    functions: &Functions,
    old_owner_id: Option<i32>,
) -> Result<PixelResolution, Error> {
    let totals = accumulate_influence(px, py, graph, grid, radii);
    let dominant = match pick_dominant(&totals, graph) {
        Some(d) => d,
        None => return Ok(PixelResolution::transparent()),
    };
    let (owner_id, influence) = dominant;

    let alpha_fn = functions.influence_to_alpha_fn.clone();
    let alpha = invoke_guarded("influence_to_alpha_fn", move || alpha_fn(influence))?;

    let owner = graph.owners.get(&owner_id);
    let new_color = owner.and_then(|o| o.color).unwrap_or(TRANSPARENT);

    let mut color = new_color;
    color.alpha = alpha;

    if let Some(old_id) = old_owner_id {
        if old_id != SENTINEL && old_id != owner_id as i32 {
            if (px + py) % 2 != 0 {
                if let Some(old_owner) = graph.owners.get(&(old_id as u32)) {
                    if let Some(old_color) = old_owner.color {
                        color = Color {
                            red: old_color.red,
                            green: old_color.green,
                            blue: old_color.blue,
                            alpha,
                        };
                    }
                }
            }
        }
    }

    Ok(PixelResolution {
        rgba: color.into(),
        owner_id: owner_id as i32,
    })
}
