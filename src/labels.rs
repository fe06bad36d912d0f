//! Owner label placement (spec.md §4.6): per-(owner, region) pair, the
//! largest 4-connected component and its centroid.

use std::collections::{HashMap, VecDeque};

use crate::graph::Graph;
use crate::resolver::SENTINEL;

/// Default minimum component size to emit a label for (spec.md §4.6).
pub const DEFAULT_MIN_LABEL_AREA: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    pub owner_id: u32,
    pub region_id: u32,
    pub centroid: (i32, i32),
    pub pixel_count: usize,
}

/// Precomputes, for every pixel, the id of the region whose center is
/// nearest (spec.md §4.6 "nearest-region Voronoi"). Regions without a
/// center are skipped (spec.md §9: "regions without centers are skipped").
fn region_raster(width: i32, height: i32, region_centers: &[(u32, (i32, i32))]) -> Vec<u32> {
    let mut raster = vec![0u32; (width * height) as usize];
    for y in 0..height {
        for x in 0..width {
            let nearest = region_centers
                .iter()
                .min_by_key(|&&(_, (cx, cy))| {
                    let dx = i64::from(x - cx);
                    let dy = i64::from(y - cy);
                    dx * dx + dy * dy
                })
                .map(|&(id, _)| id)
                .unwrap_or(0);
            raster[(y * width + x) as usize] = nearest;
        }
    }
    raster
}

/// Computes labels from a fully-rendered owner-id buffer (spec.md §4.6).
pub fn compute_labels(
    width: u32,
    height: u32,
    owner_ids: &[i32],
    graph: &Graph,
    min_label_area: usize,
) -> Vec<Label> {
    let width = width as i32;
    let height = height as i32;

    let region_centers: Vec<(u32, (i32, i32))> = graph
        .regions
        .values()
        .filter_map(|r| r.center_px.map(|c| (r.id, c)))
        .collect();
    if region_centers.is_empty() {
        return Vec::new();
    }
    let region_ids = region_raster(width, height, &region_centers);

    let idx = |x: i32, y: i32| -> usize { (y * width + x) as usize };
    let mut visited = vec![false; (width * height) as usize];
    let mut best: HashMap<(u32, u32), (usize, Vec<(i32, i32)>)> = HashMap::new();

    for y in 0..height {
        for x in 0..width {
            let i = idx(x, y);
            if visited[i] {
                continue;
            }
            let owner_id = owner_ids[i];
            if owner_id == SENTINEL {
                visited[i] = true;
                continue;
            }
            let region_id = region_ids[i];

            let mut component: Vec<(i32, i32)> = Vec::new();
            let mut queue = VecDeque::new();
            queue.push_back((x, y));
            visited[i] = true;

            while let Some((cx, cy)) = queue.pop_front() {
                component.push((cx, cy));
                for (nx, ny) in [(cx - 1, cy), (cx + 1, cy), (cx, cy - 1), (cx, cy + 1)] {
                    if nx < 0 || ny < 0 || nx >= width || ny >= height {
                        continue;
                    }
                    let ni = idx(nx, ny);
                    if visited[ni] || owner_ids[ni] != owner_id || region_ids[ni] != region_id {
                        continue;
                    }
                    visited[ni] = true;
                    queue.push_back((nx, ny));
                }
            }

            let key = (owner_id as u32, region_id);
            let is_larger = best.get(&key).map(|(size, _)| component.len() > *size).unwrap_or(true);
            if is_larger {
                best.insert(key, (component.len(), component));
            }
        }
    }

    let mut labels: Vec<Label> = best
        .into_iter()
        .filter(|&(_, (size, _))| size >= min_label_area)
        .map(|((owner_id, region_id), (size, pixels))| {
            let (sum_x, sum_y) = pixels
                .iter()
                .fold((0i64, 0i64), |(sx, sy), &(x, y)| (sx + i64::from(x), sy + i64::from(y)));
            let mean_x = (sum_x as f64 / size as f64).round() as i32;
            let mean_y = (sum_y as f64 / size as f64).round() as i32;
            let centroid = if pixels.contains(&(mean_x, mean_y)) {
                (mean_x, mean_y)
            } else {
                *pixels
                    .iter()
                    .min_by_key(|&&(x, y)| {
                        let dx = i64::from(x - mean_x);
                        let dy = i64::from(y - mean_y);
                        dx * dx + dy * dy
                    })
                    .unwrap()
            };
            Label {
                owner_id,
                region_id,
                centroid,
                pixel_count: size,
            }
        })
        .collect();

    labels.sort_by(|a, b| {
        b.pixel_count
            .cmp(&a.pixel_count)
            .then(a.owner_id.cmp(&b.owner_id))
            .then(a.region_id.cmp(&b.region_id))
    });
    labels
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Projection;
    use crate::graph::{Graph, RegionInput};

    fn graph_with_regions() -> Graph {
        let regions = vec![
            RegionInput { id: 1, name: "Alpha".into(), x: Some(0.0), y: Some(0.0), z: Some(0.0) },
            RegionInput { id: 2, name: "Beta".into(), x: Some(100.0), y: Some(0.0), z: Some(100.0) },
        ];
        let projection = Projection {
            width: 128,
            height: 128,
            offset_x: -64.0,
            offset_y: -64.0,
            scale: 1.0,
        };
        Graph::build(&projection, &[], &[], &[], &regions, &[])
    }

    fn filled_buffer(width: u32, height: u32, owner_id: i32, x0: u32, y0: u32, w: u32, h: u32) -> Vec<i32> {
        let mut buf = vec![SENTINEL; (width * height) as usize];
        for y in y0..(y0 + h) {
            for x in x0..(x0 + w) {
                buf[(y * width + x) as usize] = owner_id;
            }
        }
        buf
    }

    #[test]
    fn finds_largest_component_and_centroid() {
        let graph = graph_with_regions();
        let owner_ids = filled_buffer(128, 128, 1, 10, 10, 5, 5);
        let labels = compute_labels(128, 128, &owner_ids, &graph, DEFAULT_MIN_LABEL_AREA);
        assert_eq!(labels.len(), 1);
        assert_eq!(labels[0].owner_id, 1);
        assert_eq!(labels[0].pixel_count, 25);
        assert_eq!(labels[0].centroid, (12, 12));
    }

    #[test]
    fn components_below_min_area_are_dropped() {
        let graph = graph_with_regions();
        let owner_ids = filled_buffer(128, 128, 1, 10, 10, 2, 2);
        let labels = compute_labels(128, 128, &owner_ids, &graph, DEFAULT_MIN_LABEL_AREA);
        assert!(labels.is_empty());
    }

    #[test]
    fn distinct_regions_produce_distinct_labels() {
        let graph = graph_with_regions();
        let mut owner_ids = filled_buffer(128, 128, 1, 0, 0, 8, 8);
        for (i, v) in filled_buffer(128, 128, 1, 120, 120, 8, 8).into_iter().enumerate() {
            if v != SENTINEL {
                owner_ids[i] = v;
            }
        }
        let labels = compute_labels(128, 128, &owner_ids, &graph, DEFAULT_MIN_LABEL_AREA);
        assert_eq!(labels.len(), 2);
        assert!(labels.iter().any(|l| l.region_id == 1));
        assert!(labels.iter().any(|l| l.region_id == 2));
    }
}
