//! Farthest-point color synthesis for owners without a color (spec.md §4.2).
//!
//! The candidate set is a fixed, evenly-spaced grid of the RGB cube so runs
//! are reproducible (P1/P8); `rand` is used only to break ties among
//! equally-far candidates, keeping the crate's dependency on `rand` (the
//! teacher's root `Cargo.toml` carries it) load-bearing rather than vestigial.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::color::Color;

/// Fixed seed so tie-breaking is reproducible across runs (P1).
const TIE_BREAK_SEED: [u8; 32] = [7u8; 32];

/// Steps per channel in the candidate grid; `STEPS^3` candidates total.
const STEPS: u8 = 6;

fn candidate_grid() -> Vec<Color> {
    let mut candidates = Vec::with_capacity(usize::from(STEPS) * usize::from(STEPS) * usize::from(STEPS));
    for r in 0..STEPS {
        for g in 0..STEPS {
            for b in 0..STEPS {
                let scale = |v: u8| -> u8 { (u16::from(v) * 255 / u16::from(STEPS - 1)) as u8 };
                candidates.push(Color::opaque(scale(r), scale(g), scale(b)));
            }
        }
    }
    candidates
}

fn min_distance_sq(candidate: Color, existing: &[Color]) -> f64 {
    existing
        .iter()
        .map(|&c| candidate.rgb_distance_sq(c))
        .fold(f64::INFINITY, f64::min)
}

/// Assigns one new color per id in `missing`, maximizing the minimum
/// pairwise distance to `existing` colors and to colors already assigned
/// earlier in this call (spec.md §4.2). Returns `(id, color)` pairs in the
/// same order as `missing`.
pub fn assign_colors(missing: &[u32], existing: &[Color]) -> Vec<(u32, Color)> {
    if missing.is_empty() {
        return Vec::new();
    }

    let candidates = candidate_grid();
    let mut assigned: Vec<Color> = existing.to_vec();
    let mut rng = StdRng::from_seed(TIE_BREAK_SEED);
    let mut result = Vec::with_capacity(missing.len());

    for &id in missing {
        let mut best_distance = -1.0;
        let mut best_candidates: Vec<Color> = Vec::new();

        for &candidate in &candidates {
            let distance = if assigned.is_empty() {
                f64::INFINITY
            } else {
                min_distance_sq(candidate, &assigned)
            };
            if distance > best_distance {
                best_distance = distance;
                best_candidates.clear();
                best_candidates.push(candidate);
            } else if (distance - best_distance).abs() < f64::EPSILON {
                best_candidates.push(candidate);
            }
        }

        let chosen = if best_candidates.len() == 1 {
            best_candidates[0]
        } else {
            best_candidates[rng.gen_range(0, best_candidates.len())]
        };

        assigned.push(chosen);
        result.push((id, chosen));
    }

    result
}
