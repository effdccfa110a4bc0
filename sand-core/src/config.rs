/// Default grid dimensions, matching the classic 300×225 toy canvas.
pub const DEFAULT_GRID_WIDTH: usize = 300;
pub const DEFAULT_GRID_HEIGHT: usize = 225;

/// Tunable rule constants for one simulation.
///
/// All probabilities are independent Bernoulli chances per affected cell
/// per tick; burn durations are uniform in `[burn_min_ms, burn_max_ms)`.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    /// Chance that a burning cell ignites a given orthogonal wood neighbor.
    pub ignite_chance: f64,
    /// Chance that expired fire becomes smoke instead of ember.
    pub smoke_over_ember_chance: f64,
    /// Chance that blocked smoke dissipates this tick.
    pub smoke_dissipate_chance: f64,
    /// Chance that an ember decays to empty this tick.
    pub ember_decay_chance: f64,
    /// Lower bound of a fresh burn duration, in milliseconds.
    pub burn_min_ms: u64,
    /// Upper bound (exclusive) of a fresh burn duration, in milliseconds.
    pub burn_max_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ignite_chance: 0.3,
            smoke_over_ember_chance: 0.3,
            smoke_dissipate_chance: 0.02,
            ember_decay_chance: 0.05,
            burn_min_ms: 500,
            burn_max_ms: 2000,
        }
    }
}
