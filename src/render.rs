//! The parallel column-striped renderer (spec.md §4.5).
//!
//! Each stripe is rendered by one rayon task into its own private buffer —
//! mirroring the teacher's tile-then-composite pattern in
//! `xray/src/generation.rs`'s `build_parent` — and the stripes are copied
//! into the shared output buffers sequentially afterwards. This keeps the
//! "disjoint region per worker" guarantee of spec.md §4.5/§5 without any
//! `unsafe` slicing of a row-major buffer by column.

use fnv::FnvHashMap;
use image::{Rgba, RgbaImage};
use rayon::prelude::*;

use crate::error::Error;
use crate::functions::{FirstError, Functions};
use crate::graph::Graph;
use crate::resolver::{resolve_cell, PixelResolution, SENTINEL};
use crate::spatial_grid::SpatialGrid;

pub struct RenderOutput {
    pub rgba: RgbaImage,
    pub owner_ids: Vec<i32>,
}

#[derive(Debug, Clone, Copy)]
struct Stripe {
    start_x: u32,
    end_x: u32,
}

impl Stripe {
    fn width(&self) -> u32 {
        self.end_x - self.start_x
    }
}

/// Splits `[0, width)` into `thread_count` stripes aligned to `sample_rate`
/// boundaries, the last stripe absorbing any remainder (spec.md §4.5).
fn make_stripes(width: u32, thread_count: u32, sample_rate: u32) -> Vec<Stripe> {
    let sample_rate = sample_rate.max(1);
    let thread_count = thread_count.max(1);
    let cells = (width + sample_rate - 1) / sample_rate;
    let cells_per_stripe = ((cells + thread_count - 1) / thread_count).max(1);
    let stripe_width = (cells_per_stripe * sample_rate).max(sample_rate);

    let mut stripes = Vec::new();
    let mut x = 0;
    while x < width {
        let end = (x + stripe_width).min(width);
        stripes.push(Stripe { start_x: x, end_x: end });
        x = end;
    }
    debug_assert_eq!(
        stripes.iter().map(Stripe::width).sum::<u32>(),
        width,
        "stripes must cover the raster width exactly once"
    );
    stripes
}

#[allow(clippy::too_many_arguments)]
fn render_stripe(
    stripe: Stripe,
    width: u32,
    height: u32,
    sample_rate: u32,
    graph: &Graph,
    grid: &SpatialGrid,
    radii: &FnvHashMap<u32, f64>,
    functions: &Functions,
    old_owner_ids: Option<&[i32]>,
) -> Result<(Vec<Rgba<u8>>, Vec<i32>), Error> {
    let sample_rate = sample_rate.max(1);
    let stripe_width = stripe.width() as usize;
    let mut pixels = vec![Rgba([0, 0, 0, 0]); stripe_width * height as usize];
    let mut owners = vec![SENTINEL; stripe_width * height as usize];

    let mut cy = 0;
    while cy < height {
        let mut cx = stripe.start_x;
        while cx < stripe.end_x {
            let old_owner_id = old_owner_ids.map(|buf| buf[(cy * width + cx) as usize]);
            let PixelResolution { rgba, owner_id } =
                resolve_cell(cx as i32, cy as i32, graph, grid, radii, functions, old_owner_id)?;

            let block_w = sample_rate.min(stripe.end_x - cx);
            let block_h = sample_rate.min(height - cy);
            for by in 0..block_h {
                for bx in 0..block_w {
                    let local_x = (cx - stripe.start_x + bx) as usize;
                    let local_y = (cy + by) as usize;
                    let idx = local_y * stripe_width + local_x;
                    pixels[idx] = rgba;
                    owners[idx] = owner_id;
                }
            }
            cx += sample_rate;
        }
        cy += sample_rate;
    }

    Ok((pixels, owners))
}

/// Renders the full raster. `thread_count` only affects scheduling, never
/// the result (spec.md P1/P5: the output is invariant under worker count).
#[allow(clippy::too_many_arguments)]
pub fn render(
    width: u32,
    height: u32,
    sample_rate: u32,
    graph: &Graph,
    grid: &SpatialGrid,
    radii: &FnvHashMap<u32, f64>,
    functions: &Functions,
    old_owner_ids: Option<&[i32]>,
    thread_count: usize,
) -> Result<RenderOutput, Error> {
    let stripes = make_stripes(width, thread_count.max(1) as u32, sample_rate);
    let first_error = FirstError::new();

    let results: Vec<Option<(Stripe, Vec<Rgba<u8>>, Vec<i32>)>> = stripes
        .par_iter()
        .map(|&stripe| {
            match render_stripe(stripe, width, height, sample_rate, graph, grid, radii, functions, old_owner_ids) {
                Ok((pixels, owners)) => Some((stripe, pixels, owners)),
                Err(err) => {
                    first_error.record(err);
                    None
                }
            }
        })
        .collect();

    first_error.into_result()?;

    let mut rgba = RgbaImage::new(width, height);
    let mut owner_ids = vec![SENTINEL; (width as usize) * (height as usize)];

    for (stripe, pixels, owners) in results.into_iter().flatten() {
        let stripe_width = stripe.width() as usize;
        for y in 0..height {
            for x in stripe.start_x..stripe.end_x {
                let local_idx = (y as usize) * stripe_width + (x - stripe.start_x) as usize;
                rgba.put_pixel(x, y, pixels[local_idx]);
                owner_ids[(y * width + x) as usize] = owners[local_idx];
            }
        }
    }

    Ok(RenderOutput { rgba, owner_ids })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Projection;
    use crate::graph::{OwnerInput, SystemInput};
    use crate::influence::{calculate_influence, radius_k, system_radius, max_influence, DEFAULT_HOP_CAP};

    fn projection() -> Projection {
        Projection {
            width: 32,
            height: 32,
            offset_x: -16.0,
            offset_y: -16.0,
            scale: 1.0,
        }
    }

    fn small_graph() -> Graph {
        let owners = vec![OwnerInput {
            id: 1,
            name: "A".into(),
            color: Some((255, 0, 0, 255)),
            npc: false,
        }];
        let systems = vec![SystemInput {
            id: 1,
            name: None,
            constellation_id: 1,
            region_id: 1,
            x: Some(0.0),
            y: Some(0.0),
            z: Some(0.0),
            has_station: false,
            sov_power: 6.0,
            owner: Some(1),
        }];
        Graph::build(&projection(), &owners, &systems, &[], &[], &[])
    }

    fn radii_for(graph: &Graph, sample_rate: u32) -> FnvHashMap<u32, f64> {
        let k = radius_k(sample_rate);
        graph
            .systems
            .values()
            .map(|s| (s.id, system_radius(max_influence(&s.influences), k)))
            .collect()
    }

    #[test]
    fn stripe_partition_covers_width_exactly_once() {
        let stripes = make_stripes(100, 7, 8);
        let total: u32 = stripes.iter().map(Stripe::width).sum();
        assert_eq!(total, 100);
        for w in stripes.iter().map(Stripe::width) {
            assert!(w > 0);
        }
    }

    #[test]
    fn render_is_invariant_under_thread_count() {
        let mut graph = small_graph();
        let functions = Functions::default();
        calculate_influence(&mut graph, &functions, DEFAULT_HOP_CAP).unwrap();
        let radii = radii_for(&graph, 4);
        let grid = SpatialGrid::build(
            4,
            graph.systems.values().map(|s| (s, radii[&s.id])),
        );

        let outputs: Vec<RenderOutput> = [1usize, 2, 4, 16]
            .iter()
            .map(|&n| render(32, 32, 4, &graph, &grid, &radii, &functions, None, n).unwrap())
            .collect();

        for output in &outputs[1..] {
            assert_eq!(output.owner_ids, outputs[0].owner_ids);
            assert_eq!(output.rgba.as_raw(), outputs[0].rgba.as_raw());
        }
    }

    #[test]
    fn owned_pixel_rgb_matches_owner_color() {
        let mut graph = small_graph();
        let functions = Functions::default();
        calculate_influence(&mut graph, &functions, DEFAULT_HOP_CAP).unwrap();
        let radii = radii_for(&graph, 4);
        let grid = SpatialGrid::build(4, graph.systems.values().map(|s| (s, radii[&s.id])));
        let output = render(32, 32, 4, &graph, &grid, &radii, &functions, None, 2).unwrap();

        for (idx, &owner_id) in output.owner_ids.iter().enumerate() {
            if owner_id == 1 {
                let x = (idx as u32) % 32;
                let y = (idx as u32) / 32;
                let pixel = output.rgba.get_pixel(x, y);
                assert_eq!(pixel[0], 255);
                assert_eq!(pixel[1], 0);
                assert_eq!(pixel[2], 0);
            }
        }
    }
}
