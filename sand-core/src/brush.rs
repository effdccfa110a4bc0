//! Brush placement of materials onto the current grid buffer.
//!
//! Painting is immediate: it writes the buffer the rule engine is about
//! to read, never a buffer mid-tick, so a stroke shows up on the very
//! next tick.

use crate::{
    cell::Cell,
    config::Config,
    grid::Grid,
    material::{DEFAULT_WOOD_TINT, Material},
};
use rand::Rng;
use std::time::{Duration, Instant};

/// Paints a material-sized footprint centered on `(center_x, center_y)`.
///
/// The footprint is a square whose half-extent comes from
/// [`Material::brush_half_extent`]: 3×3 for sand and water, 5×5 for
/// wood, a single cell for everything else. For each in-bounds footprint
/// cell:
/// - `Fire` gets a fresh uniform burn duration relative to `now`,
/// - `Wood` gets the fixed default tint,
/// - any other material just overwrites the cell, clearing stale timers
///   and tints.
///
/// Off-grid centers are not an error; footprint cells outside the grid
/// are silently skipped.
pub fn paint(
    grid: &mut Grid,
    material: Material,
    center_x: i32,
    center_y: i32,
    cfg: &Config,
    now: Instant,
    rng: &mut impl Rng,
) {
    let r = material.brush_half_extent();
    for dy in -r..=r {
        for dx in -r..=r {
            let (x, y) = (center_x + dx, center_y + dy);
            if !grid.in_bounds(x, y) {
                continue;
            }
            let cell = match material {
                Material::Fire => {
                    let lifetime =
                        Duration::from_millis(rng.random_range(cfg.burn_min_ms..cfg.burn_max_ms));
                    Cell::fire(now + lifetime)
                }
                Material::Wood => Cell::wood(DEFAULT_WOOD_TINT),
                other => Cell::of(other),
            };
            grid.set_current(x as usize, y as usize, cell);
        }
    }
}
