//! Two-phase power diffusion (spec.md §4.3).
//!
//! Phase A diffuses each owner's seed power across the jump graph via BFS.
//! Phase B does not eagerly fill a dense pixel tensor; it only computes,
//! per system, the radius within which that system's influence reaches
//! pixels (spatial diffusion itself happens during rendering, see
//! `resolver.rs`).

use std::collections::{HashMap, VecDeque};

use fnv::FnvHashMap;

use crate::error::{Error, ErrorKind};
use crate::functions::{invoke_guarded, Functions};
use crate::graph::Graph;

/// Default hop cap for Phase A BFS (spec.md §4.3).
pub const DEFAULT_HOP_CAP: u32 = 8;

/// `ε_graph = max(0.005 * P0, 0.001)` (spec.md §4.3).
fn epsilon_for(p0: f32) -> f32 {
    (0.005 * p0).max(0.001)
}

/// Radius constant `K` such that `r(s) = K * sqrt(max_influence(s))` gives
/// `r ≈ 20 * sample_rate` at `sov_power = 6` (spec.md §4.3, pinned in
/// SPEC_FULL.md §4.3).
pub fn radius_k(sample_rate: u32) -> f64 {
    20.0 * f64::from(sample_rate.max(1)) / 6f64.sqrt()
}

/// Runs Phase A over the whole graph, filling `SolarSystem::influences`.
/// Returns the first `CallbackError` raised by a configurable function, if
/// any (spec.md §7: callback errors are surfaced, not swallowed).
pub fn calculate_influence(graph: &mut Graph, functions: &Functions, hop_cap: u32) -> Result<(), Error> {
    for system in graph.systems.values_mut() {
        system.influences.clear();
    }

    let mut seed_ids: Vec<u32> = graph
        .systems
        .values()
        .filter(|s| s.owner_id.is_some() && s.sov_power > 0.0)
        .map(|s| s.id)
        .collect();
    seed_ids.sort_unstable();

    let mut accumulated: FnvHashMap<u32, FnvHashMap<u32, f32>> = FnvHashMap::default();

    for seed_id in seed_ids {
        let (owner_id, sov_power) = {
            let seed = &graph.systems[&seed_id];
            (seed.owner_id.unwrap(), seed.sov_power)
        };

        let sov_power_fn = functions.sov_power_fn.clone();
        let p0 = invoke_guarded("sov_power_fn", move || sov_power_fn(sov_power, seed_id, owner_id))?;
        if p0 <= 0.0 {
            continue;
        }
        let epsilon = epsilon_for(p0);

        let mut distance: HashMap<u32, u32> = HashMap::new();
        distance.insert(seed_id, 0);
        let mut queue = VecDeque::new();
        queue.push_back(seed_id);

        while let Some(node_id) = queue.pop_front() {
            let d = distance[&node_id];
            let falloff_fn = functions.power_falloff_fn.clone();
            let p_n = invoke_guarded("power_falloff_fn", move || falloff_fn(p0, d, node_id))?;
            if p_n < epsilon {
                continue;
            }
            *accumulated
                .entry(node_id)
                .or_default()
                .entry(owner_id)
                .or_insert(0.0) += p_n;

            if d >= hop_cap {
                continue;
            }
            for &neighbor in graph.jumps.neighbors(node_id) {
                if let std::collections::hash_map::Entry::Vacant(slot) = distance.entry(neighbor) {
                    slot.insert(d + 1);
                    queue.push_back(neighbor);
                }
            }
        }
    }

    for (id, influences) in accumulated {
        if let Some(system) = graph.systems.get_mut(&id) {
            system.influences = influences;
        }
    }

    Ok(())
}

/// Per-system spatial falloff radius (spec.md §4.3 Phase B): `K *
/// sqrt(max_influence(s))`.
pub fn system_radius(max_influence: f32, k: f64) -> f64 {
    if max_influence <= 0.0 {
        return 0.0;
    }
    k * f64::from(max_influence).sqrt()
}

pub fn max_influence(influences: &FnvHashMap<u32, f32>) -> f32 {
    influences.values().cloned().fold(0.0, f32::max)
}
