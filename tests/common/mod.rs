//! Shared fixtures with the same topology as the mock data used by the
//! original implementation's test suite (four owners, six valid systems laid
//! out on a diagonal, two invalid systems — one out of bounds, one with no
//! coordinates — a jump list with three edges referencing the invalid
//! systems, and four regions, two valid and two invalid), but with
//! independently chosen coordinates rather than the original's literal
//! numbers. The original's raw coordinates (systems at x = 0.0..5.0, the
//! out-of-bounds system at x = 12.0) don't project to distinct, correctly
//! classified pixels under this projection's own formula at the shared
//! params below (see DESIGN.md's "Open Question decisions"), so these
//! fixtures are scaled to actually exercise the scenario they're meant to:
//! six systems landing on six distinct in-bounds pixels, and the invalid
//! systems genuinely dropped.

use sovmap::{JumpInput, OwnerInput, RegionInput, SovMap, SystemInput};

pub const WIDTH: u32 = 128;
pub const HEIGHT: u32 = 128;
pub const OFFSET_X: f64 = -32.0;
pub const OFFSET_Y: f64 = -32.0;
pub const SCALE: f64 = 1.0 / 16.0;
pub const SAMPLE_RATE: u32 = 8;

pub fn mock_owners() -> Vec<OwnerInput> {
    vec![
        OwnerInput { id: 1, name: "Alliance Red".into(), color: Some((255, 0, 0, 255)), npc: false },
        OwnerInput { id: 2, name: "Alliance Green".into(), color: Some((0, 255, 0, 255)), npc: false },
        OwnerInput { id: 3, name: "Alliance Blue".into(), color: Some((0, 0, 255, 255)), npc: false },
        OwnerInput { id: 4, name: "Alliance Yellow".into(), color: Some((255, 255, 0, 255)), npc: false },
    ]
}

/// Remaps owner 3's systems to owner 1 (used by the old-owner snapshot
/// scenario).
pub fn mock_systems_remapped() -> Vec<SystemInput> {
    mock_systems()
        .into_iter()
        .map(|mut s| {
            if s.owner == Some(3) {
                s.owner = Some(1);
            }
            s
        })
        .collect()
}

pub fn mock_systems() -> Vec<SystemInput> {
    let coords = [0.0, 64.0, 128.0, 192.0, 256.0, 320.0];
    let constellations = [10, 10, 10, 11, 11, 12];
    let regions = [1, 1, 1, 2, 2, 2];
    let sov_powers = [5.0, 3.0, 4.0, 2.0, 6.0, 2.0];
    let owners = [1, 2, 3, 1, 4, 3];

    let mut systems: Vec<SystemInput> = (0..6)
        .map(|i| SystemInput {
            id: 100 + i as u32,
            name: None,
            constellation_id: constellations[i],
            region_id: regions[i],
            x: Some(coords[i]),
            y: Some(0.0),
            z: Some(coords[i]),
            has_station: false,
            sov_power: sov_powers[i],
            owner: Some(owners[i]),
        })
        .collect();

    systems.push(SystemInput {
        id: 106,
        name: None,
        constellation_id: 12,
        region_id: 2,
        x: Some(4000.0),
        y: Some(0.0),
        z: Some(0.0),
        has_station: false,
        sov_power: 0.0,
        owner: None,
    });
    systems.push(SystemInput {
        id: 107,
        name: None,
        constellation_id: 12,
        region_id: 2,
        x: None,
        y: None,
        z: None,
        has_station: false,
        sov_power: 0.0,
        owner: None,
    });

    systems
}

pub fn mock_connections() -> Vec<JumpInput> {
    vec![
        (100, 101), (101, 102), (102, 103), (103, 104), (104, 105), (105, 100),
        (100, 102), (101, 103), (102, 104), (103, 105), (104, 100), (105, 101),
        (100, 106), (106, 107), (107, 100),
    ]
}

pub fn mock_regions() -> Vec<RegionInput> {
    vec![
        RegionInput { id: 1, name: "Region Alpha".into(), x: Some(0.0), y: Some(0.0), z: Some(0.0) },
        RegionInput { id: 2, name: "Region Beta".into(), x: Some(64.0), y: Some(0.0), z: Some(64.0) },
        RegionInput { id: 3, name: "Region Gamma".into(), x: Some(4000.0), y: Some(0.0), z: Some(0.0) },
        RegionInput { id: 4, name: "Region Delta".into(), x: None, y: None, z: None },
    ]
}

pub fn mock_constellations() -> Vec<(u32, u32, String)> {
    vec![
        (10, 1, "Constellation J".into()),
        (11, 2, "Constellation K".into()),
        (12, 2, "Constellation L".into()),
    ]
}

pub fn loaded_map() -> SovMap {
    let mut map = SovMap::new(WIDTH, HEIGHT, OFFSET_X, OFFSET_Y, SCALE, SAMPLE_RATE).unwrap();
    map.load_data(&mock_owners(), &mock_systems(), &mock_constellations(), &mock_regions(), &mock_connections());
    map
}
