//! Per-tick update rules for the falling-sand grid.
//!
//! Each tick runs two strictly ordered passes over the *current* buffer,
//! writing into a next-state buffer seeded as a copy of it:
//! 1. [`fall_and_burn_phase`] — fire expiry and spread, plus gravity for
//!    sand and water, scanning rows bottom-to-top.
//! 2. [`drift_and_decay_phase`] — buoyant smoke drift and stochastic
//!    smoke/ember decay.
//!
//! [`step`] drives one full tick: begin, both passes, commit.
//!
//! The bottom-up scan in pass 1 means a particle that falls this tick has
//! already moved past the scan cursor and is not reprocessed at its new
//! row. Ignition reads strictly from the current buffer, so fire advances
//! at most one cell generation per tick.

use crate::{
    cell::Cell,
    claim_mask::ClaimMask,
    config::Config,
    grid::{Grid, NextState},
    material::Material,
};
use rand::Rng;
use std::time::{Duration, Instant};

/// Advances the grid by one tick.
///
/// Paint must not run concurrently with this call; it reads the current
/// buffer throughout and publishes the next generation only at the end,
/// via [`Grid::commit_tick`].
///
/// ### Parameters
/// - `grid` - The simulation grid; its current buffer is replaced.
/// - `claims` - Reusable per-tick movement claim mask. It is resized and
///   cleared here, so any previous contents are irrelevant.
/// - `cfg` - Rule constants (probabilities and burn durations).
/// - `now` - The wall-clock instant of this tick. Fire lifetimes compare
///   against this, so simulation speed is decoupled from tick rate.
/// - `rng` - Random source for every stochastic rule in this tick.
pub fn step(grid: &mut Grid, claims: &mut ClaimMask, cfg: &Config, now: Instant, rng: &mut impl Rng) {
    claims.ensure_dims(grid.width(), grid.height());
    let mut next = grid.begin_tick();

    fall_and_burn_phase(grid, &mut next, claims, cfg, now, rng);
    drift_and_decay_phase(grid, &mut next, cfg, rng);

    grid.commit_tick(next);
}

/// Pass 1: fire transitions and gravity for sand and water.
///
/// Iterates rows bottom-to-top and columns left-to-right, excluding the
/// outermost one-cell border in both axes.
///
/// - `Fire` whose deadline has elapsed becomes `Smoke` with probability
///   `cfg.smoke_over_ember_chance`, otherwise `Ember`; the deadline is
///   cleared. Fire that is still alive (or has no deadline) tries to
///   ignite each 4-connected neighbor independently: a neighbor ignites
///   with probability `cfg.ignite_chance` iff its *current*-buffer
///   material is `Wood`, receiving a fresh uniform burn duration.
/// - `Sand` and `Water` fall to the first unclaimed empty destination in
///   priority order: straight down, down-left, down-right. Water that is
///   blocked on all three additionally scans the row outward (left fully
///   before right); a scan direction aborts at the first non-empty cell
///   in its own row and succeeds at the first offset whose cell one row
///   below is empty and unclaimed. Sand has no such fallback. Every move
///   claims its destination so no two particles land on the same cell.
///
/// ### Parameters
/// - `grid` - Current buffer; read-only in this pass.
/// - `next` - Next-state buffer receiving all writes.
/// - `claims` - Movement claim mask for this tick; must already be
///   cleared and sized to the grid.
/// - `cfg` - Rule constants.
/// - `now` - Instant used for fire deadline comparison and for assigning
///   fresh deadlines to ignited wood.
/// - `rng` - Random source.
pub fn fall_and_burn_phase(
    grid: &Grid,
    next: &mut NextState,
    claims: &mut ClaimMask,
    cfg: &Config,
    now: Instant,
    rng: &mut impl Rng,
) {
    let (w, h) = (grid.width(), grid.height());

    for y in (1..h.saturating_sub(1)).rev() {
        for x in 1..w.saturating_sub(1) {
            let cell = grid.at(x, y);
            match cell.material {
                Material::Fire => {
                    if cell.burns_until.is_some_and(|deadline| now >= deadline) {
                        let product = if rng.random_bool(cfg.smoke_over_ember_chance) {
                            Material::Smoke
                        } else {
                            Material::Ember
                        };
                        next.set(x, y, Cell::of(product));
                    } else {
                        let (xi, yi) = (x as i32, y as i32);
                        try_ignite(grid, next, cfg, now, rng, xi - 1, yi);
                        try_ignite(grid, next, cfg, now, rng, xi + 1, yi);
                        try_ignite(grid, next, cfg, now, rng, xi, yi + 1);
                        try_ignite(grid, next, cfg, now, rng, xi, yi - 1);
                    }
                }
                Material::Sand => {
                    try_fall(grid, next, claims, x, y);
                }
                Material::Water => {
                    if !try_fall(grid, next, claims, x, y) {
                        try_spread(grid, next, claims, x, y);
                    }
                }
                _ => {}
            }
        }
    }
}

/// Pass 2: smoke drift and smoke/ember decay.
///
/// Smoke picks a sway in `{-1, 0, +1}` and rises one row if the swayed
/// destination is in bounds and empty in the current buffer; blocked
/// smoke instead dissipates with probability
/// `cfg.smoke_dissipate_chance` (otherwise it stays and retries next
/// tick). Embers decay to empty with probability
/// `cfg.ember_decay_chance`.
///
/// Scan order is irrelevant here; the pass only ever looks one row up in
/// the current buffer.
pub fn drift_and_decay_phase(
    grid: &Grid,
    next: &mut NextState,
    cfg: &Config,
    rng: &mut impl Rng,
) {
    let (w, h) = (grid.width(), grid.height());

    for y in 1..h {
        for x in 0..w {
            match grid.at(x, y).material {
                Material::Smoke => {
                    let sway = rng.random_range(-1i32..=1);
                    let nx = x as i32 + sway;
                    let ny = y as i32 - 1;
                    if grid.in_bounds(nx, ny) && grid.material_at(nx, ny) == Material::Empty {
                        next.set(nx as usize, ny as usize, Cell::of(Material::Smoke));
                        next.set(x, y, Cell::empty());
                    } else if rng.random_bool(cfg.smoke_dissipate_chance) {
                        next.set(x, y, Cell::empty());
                    }
                }
                Material::Ember => {
                    if rng.random_bool(cfg.ember_decay_chance) {
                        next.set(x, y, Cell::empty());
                    }
                }
                _ => {}
            }
        }
    }
}

/// Ignites the current-buffer cell at `(x, y)` if it is wood.
///
/// Out-of-bounds neighbors are skipped. Ignited wood becomes fire with a
/// fresh deadline drawn uniformly from the configured burn range.
fn try_ignite(
    grid: &Grid,
    next: &mut NextState,
    cfg: &Config,
    now: Instant,
    rng: &mut impl Rng,
    x: i32,
    y: i32,
) {
    if grid.material_at(x, y) == Material::Wood && rng.random_bool(cfg.ignite_chance) {
        let lifetime = Duration::from_millis(rng.random_range(cfg.burn_min_ms..cfg.burn_max_ms));
        next.set(x as usize, y as usize, Cell::fire(now + lifetime));
    }
}

/// Tries to move the particle at `(x, y)` one row down.
///
/// Destinations are tried in fixed priority order: straight down,
/// down-left, down-right. A destination is available when its
/// current-buffer material is empty and no other particle claimed it
/// this tick. Returns whether the particle moved.
fn try_fall(grid: &Grid, next: &mut NextState, claims: &mut ClaimMask, x: usize, y: usize) -> bool {
    for (dx, dy) in [(0i32, 1i32), (-1, 1), (1, 1)] {
        let (tx, ty) = (x as i32 + dx, y as i32 + dy);
        if move_if_open(grid, next, claims, x, y, tx, ty) {
            return true;
        }
    }
    false
}

/// Water-only horizontal spread for a particle blocked on all three fall
/// destinations.
///
/// Scans outward from `x` along row `y`, the full leftward run before
/// any rightward attempt. A direction aborts at the first non-empty cell
/// in row `y` (a wall) or at the grid edge; it succeeds by dropping into
/// `(x ± offset, y + 1)` at the first offset where that cell is empty
/// and unclaimed. Returns whether the particle moved.
fn try_spread(grid: &Grid, next: &mut NextState, claims: &mut ClaimMask, x: usize, y: usize) -> bool {
    for dir in [-1i32, 1] {
        let mut offset = 1i32;
        loop {
            let tx = x as i32 + dir * offset;
            let yi = y as i32;
            if !grid.in_bounds(tx, yi) || grid.material_at(tx, yi) != Material::Empty {
                break;
            }
            if move_if_open(grid, next, claims, x, y, tx, yi + 1) {
                return true;
            }
            offset += 1;
        }
    }
    false
}

/// Moves the particle at `(x, y)` to `(tx, ty)` when that destination is
/// in bounds, empty in the current buffer, and unclaimed; claims it on
/// success.
fn move_if_open(
    grid: &Grid,
    next: &mut NextState,
    claims: &mut ClaimMask,
    x: usize,
    y: usize,
    tx: i32,
    ty: i32,
) -> bool {
    if !grid.in_bounds(tx, ty) {
        return false;
    }
    let (tx, ty) = (tx as usize, ty as usize);
    if grid.material_at(tx as i32, ty as i32) != Material::Empty || claims.is_claimed(tx, ty) {
        return false;
    }
    next.set(tx, ty, *grid.at(x, y));
    next.set(x, y, Cell::empty());
    claims.claim(tx, ty);
    true
}
