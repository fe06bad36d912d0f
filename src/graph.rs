//! Owners, systems, constellations, regions and the undirected jump
//! adjacency (spec.md §3 Data Model, §4.1 projection filtering).

use std::collections::{HashMap, HashSet};

use fnv::FnvHashMap;
use log::{debug, warn};
use nalgebra::Point3;

use crate::color::Color;
use crate::geometry::Projection;

/// Loader-facing owner record (spec.md §6 Data-in contract).
#[derive(Debug, Clone)]
pub struct OwnerInput {
    pub id: u32,
    pub name: String,
    pub color: Option<(u8, u8, u8, u8)>,
    pub npc: bool,
}

/// Loader-facing system record. `x`/`y`/`z` are `None` when the source had
/// no coordinate for this system at all (spec.md §8 P2).
#[derive(Debug, Clone)]
pub struct SystemInput {
    pub id: u32,
    pub name: Option<String>,
    pub constellation_id: u32,
    pub region_id: u32,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub z: Option<f64>,
    pub has_station: bool,
    pub sov_power: f32,
    pub owner: Option<u32>,
}

/// Loader-facing region record.
#[derive(Debug, Clone)]
pub struct RegionInput {
    pub id: u32,
    pub name: String,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub z: Option<f64>,
}

/// Unordered pair of system ids (spec.md §3 Jump).
pub type JumpInput = (u32, u32);

#[derive(Debug, Clone)]
pub struct Owner {
    pub id: u32,
    pub name: String,
    pub color: Option<Color>,
    pub npc: bool,
}

#[derive(Debug, Clone)]
pub struct Region {
    pub id: u32,
    pub name: String,
    pub center_px: Option<(i32, i32)>,
}

#[derive(Debug, Clone)]
pub struct Constellation {
    pub id: u32,
    pub region_id: u32,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct SolarSystem {
    pub id: u32,
    pub constellation_id: u32,
    pub region_id: u32,
    pub x_px: i32,
    pub y_px: i32,
    pub has_station: bool,
    pub sov_power: f32,
    pub owner_id: Option<u32>,
    pub influences: FnvHashMap<u32, f32>,
}

/// Undirected, deduplicated jump adjacency with O(deg) neighbor iteration
/// (spec.md §3: "stored once").
#[derive(Debug, Default, Clone)]
pub struct Jumps {
    pairs: Vec<(u32, u32)>,
    adjacency: HashMap<u32, Vec<u32>>,
}

impl Jumps {
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn pairs(&self) -> &[(u32, u32)] {
        &self.pairs
    }

    pub fn neighbors(&self, system_id: u32) -> &[u32] {
        self.adjacency
            .get(&system_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// The static graph: owners, regions, constellations, systems and jumps,
/// all keyed by id, after load-time filtering (spec.md §4.1, §7 InvalidInput
/// / OutOfBounds recovery).
#[derive(Debug, Default)]
pub struct Graph {
    pub owners: HashMap<u32, Owner>,
    pub regions: HashMap<u32, Region>,
    pub constellations: HashMap<u32, Constellation>,
    pub systems: HashMap<u32, SolarSystem>,
    pub jumps: Jumps,
}

impl Graph {
    pub fn build(
        projection: &Projection,
        owners: &[OwnerInput],
        systems: &[SystemInput],
        constellations: &[(u32, u32, String)],
        regions: &[RegionInput],
        jumps: &[JumpInput],
    ) -> Graph {
        let mut graph = Graph::default();

        let mut seen_owner_ids = HashSet::new();
        for owner in owners {
            if !seen_owner_ids.insert(owner.id) {
                warn!("dropping duplicate owner id {}", owner.id);
                continue;
            }
            let color = match owner.color {
                None => None,
                Some((r, g, b, a)) => Some(Color {
                    red: r,
                    green: g,
                    blue: b,
                    alpha: a,
                }),
            };
            graph.owners.insert(
                owner.id,
                Owner {
                    id: owner.id,
                    name: owner.name.clone(),
                    color,
                    npc: owner.npc,
                },
            );
        }

        for region in regions {
            let center_px = match (region.x, region.y, region.z) {
                (Some(x), Some(_y), Some(z)) => projection.project(Point3::new(x, 0.0, z)).map(|p| (p.x, p.y)),
                _ => None,
            };
            if center_px.is_none() && region.x.is_some() {
                debug!("region {} center falls outside the raster", region.id);
            }
            graph.regions.insert(
                region.id,
                Region {
                    id: region.id,
                    name: region.name.clone(),
                    center_px,
                },
            );
        }

        for (id, region_id, name) in constellations {
            graph.constellations.insert(
                *id,
                Constellation {
                    id: *id,
                    region_id: *region_id,
                    name: name.clone(),
                },
            );
        }

        let mut seen_system_ids = HashSet::new();
        for system in systems {
            if !seen_system_ids.insert(system.id) {
                warn!("dropping duplicate system id {}", system.id);
                continue;
            }
            let (x, y, z) = match (system.x, system.y, system.z) {
                (Some(x), Some(y), Some(z)) => (x, y, z),
                _ => {
                    debug!("system {} has no coordinates, dropping", system.id);
                    continue;
                }
            };
            let px = match projection.project(Point3::new(x, y, z)) {
                Some(px) => px,
                None => {
                    debug!("system {} projects outside the raster, dropping", system.id);
                    continue;
                }
            };
            let owner_id = match system.owner {
                Some(owner_id) if graph.owners.contains_key(&owner_id) => Some(owner_id),
                Some(owner_id) => {
                    warn!(
                        "system {} references unknown owner {}, treating as unowned",
                        system.id, owner_id
                    );
                    None
                }
                None => None,
            };
            graph.systems.insert(
                system.id,
                SolarSystem {
                    id: system.id,
                    constellation_id: system.constellation_id,
                    region_id: system.region_id,
                    x_px: px.x,
                    y_px: px.y,
                    has_station: system.has_station,
                    sov_power: system.sov_power,
                    owner_id,
                    influences: FnvHashMap::default(),
                },
            );
        }

        let mut pairs = Vec::new();
        let mut seen_pairs = HashSet::new();
        let mut adjacency: HashMap<u32, Vec<u32>> = HashMap::new();
        for &(a, b) in jumps {
            if a == b {
                warn!("dropping self-jump at system {}", a);
                continue;
            }
            if !graph.systems.contains_key(&a) || !graph.systems.contains_key(&b) {
                debug!("dropping jump ({}, {}) referencing an out-of-bounds system", a, b);
                continue;
            }
            let key = if a < b { (a, b) } else { (b, a) };
            if !seen_pairs.insert(key) {
                continue;
            }
            pairs.push(key);
            adjacency.entry(key.0).or_default().push(key.1);
            adjacency.entry(key.1).or_default().push(key.0);
        }
        for neighbors in adjacency.values_mut() {
            neighbors.sort_unstable();
        }
        graph.jumps = Jumps { pairs, adjacency };

        graph
    }
}
