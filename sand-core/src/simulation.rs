//! The top-level simulation facade tying grid, rules, brush and import
//! together behind the handful of entry points the platform layer uses.

use crate::{
    brush,
    claim_mask::ClaimMask,
    config::Config,
    grid::Grid,
    importer::{CancelToken, ImportError, ImportProgress, ImportSession, ImportStatus, PixelSource},
    material::{Material, Rgb},
    phases,
};
use rand::Rng;
use std::time::Instant;

/// One running simulation: the grid, its rule constants, the reusable
/// claim mask, the currently selected brush material, and (at most one)
/// in-flight progressive import.
///
/// While an import session is active the importer owns the grid
/// exclusively: [`Simulation::tick`] and [`Simulation::paint_at`] are
/// no-ops until the session reaches a terminal state.
#[derive(Debug)]
pub struct Simulation {
    grid: Grid,
    cfg: Config,
    claims: ClaimMask,
    active_material: Material,
    import: Option<ImportSession>,
}

impl Simulation {
    pub fn new(width: usize, height: usize, cfg: Config) -> Self {
        Self {
            grid: Grid::new(width, height),
            cfg,
            claims: ClaimMask::with_dims(width, height),
            active_material: Material::Fire,
            import: None,
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.grid.width()
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.grid.height()
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    pub fn active_material(&self) -> Material {
        self.active_material
    }

    pub fn set_active_material(&mut self, material: Material) {
        self.active_material = material;
    }

    /// Whether a progressive import currently owns the grid.
    pub fn importing(&self) -> bool {
        self.import.is_some()
    }

    /// Paints the active material at grid coordinates `(x, y)`.
    ///
    /// The platform layer converts pointer pixels to cell coordinates
    /// before calling this; off-grid centers still paint whatever part
    /// of their footprint lands in bounds. Ignored while an import is
    /// active.
    pub fn paint_at(&mut self, x: i32, y: i32, now: Instant, rng: &mut impl Rng) {
        if self.import.is_some() {
            return;
        }
        brush::paint(&mut self.grid, self.active_material, x, y, &self.cfg, now, rng);
    }

    /// Advances the simulation by one tick, unless an import is active.
    pub fn tick(&mut self, now: Instant, rng: &mut impl Rng) {
        if self.import.is_some() {
            return;
        }
        phases::step(&mut self.grid, &mut self.claims, &self.cfg, now, rng);
    }

    /// Starts a progressive import, suspending ticking until it ends.
    ///
    /// ### Returns
    /// [`ImportError::SourceDimensionMismatch`] when the source does not
    /// match the grid; the simulation state is untouched in that case.
    pub fn begin_import(&mut self, source: PixelSource, token: CancelToken) -> Result<(), ImportError> {
        let session = ImportSession::new(&mut self.grid, source, token)?;
        self.import = Some(session);
        Ok(())
    }

    /// Applies one row of the active import.
    ///
    /// Returns `None` when no import is active. A terminal status
    /// (completed or cancelled) ends the session, and normal ticking
    /// resumes on the next [`Simulation::tick`].
    pub fn import_step(&mut self) -> Option<ImportProgress> {
        let session = self.import.as_mut()?;
        let progress = session.step_row(&mut self.grid);
        if progress.status != ImportStatus::InProgress {
            self.import = None;
        }
        Some(progress)
    }

    /// Applies a whole-grid import in one step.
    ///
    /// Not valid while a progressive session is active; that session
    /// owns the grid.
    pub fn import_atomic(&mut self, source: &PixelSource) -> Result<(), ImportError> {
        debug_assert!(self.import.is_none(), "atomic import during a session");
        crate::importer::import_atomic(&mut self.grid, source)
    }

    /// Row-major display snapshot: one logical color per cell.
    ///
    /// The renderer owns all pixel scaling; this is the entire
    /// engine-to-renderer surface.
    pub fn snapshot_colors(&self) -> Vec<Rgb> {
        let mut colors = Vec::with_capacity(self.width() * self.height());
        for y in 0..self.height() {
            for x in 0..self.width() {
                // In-range by construction, so this cannot fail.
                if let Ok(cell) = self.grid.get(x, y) {
                    colors.push(cell.display_color());
                }
            }
        }
        colors
    }
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new(
            crate::config::DEFAULT_GRID_WIDTH,
            crate::config::DEFAULT_GRID_HEIGHT,
            Config::default(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::importer::Rgba;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn opaque_source(w: usize, h: usize) -> PixelSource {
        PixelSource::from_rgba(w, h, vec![Rgba::new(90, 40, 10, 255); w * h]).unwrap()
    }

    #[test]
    fn painting_then_ticking_moves_painted_sand() {
        let mut sim = Simulation::new(10, 10, Config::default());
        let mut rng = StdRng::seed_from_u64(1);
        let now = Instant::now();

        sim.set_active_material(Material::Sand);
        sim.paint_at(5, 2, now, &mut rng);
        // 3x3 sand footprint: nine grains.
        let sand_before = sim
            .snapshot_colors()
            .iter()
            .filter(|&&c| c == Material::Sand.base_color())
            .count();
        assert_eq!(sand_before, 9);

        sim.tick(now, &mut rng);

        // Gravity conserves the grains.
        let sand_after = sim
            .snapshot_colors()
            .iter()
            .filter(|&&c| c == Material::Sand.base_color())
            .count();
        assert_eq!(sand_after, 9);
    }

    #[test]
    fn ticking_is_suspended_while_importing() {
        let mut sim = Simulation::new(6, 6, Config::default());
        let mut rng = StdRng::seed_from_u64(2);
        let now = Instant::now();

        sim.begin_import(opaque_source(6, 6), CancelToken::new()).unwrap();
        assert!(sim.importing());

        // One row applied so far; ticking and painting must not disturb
        // the importer's exclusive ownership.
        sim.import_step();
        sim.tick(now, &mut rng);
        sim.set_active_material(Material::Sand);
        sim.paint_at(3, 3, now, &mut rng);

        assert_eq!(sim.grid().get(0, 0).unwrap().material, Material::Wood);
        assert_eq!(sim.grid().get(3, 3).unwrap().material, Material::Empty);
    }

    #[test]
    fn import_completion_resumes_ticking() {
        let mut sim = Simulation::new(4, 3, Config::default());
        sim.begin_import(opaque_source(4, 3), CancelToken::new()).unwrap();

        let mut last = None;
        while let Some(progress) = sim.import_step() {
            last = Some(progress);
            if progress.status != ImportStatus::InProgress {
                break;
            }
        }
        assert_eq!(last.unwrap().status, ImportStatus::Completed);
        assert!(!sim.importing());
    }

    #[test]
    fn cancelled_import_ends_the_session() {
        let mut sim = Simulation::new(4, 4, Config::default());
        let token = CancelToken::new();
        sim.begin_import(opaque_source(4, 4), token.clone()).unwrap();

        sim.import_step();
        token.cancel();
        let progress = sim.import_step().unwrap();

        assert_eq!(progress.status, ImportStatus::Cancelled);
        assert!(!sim.importing());
        // The applied prefix stays; the rest is the reset's empty state.
        assert_eq!(sim.grid().get(0, 0).unwrap().material, Material::Wood);
        assert_eq!(sim.grid().get(0, 3).unwrap().material, Material::Empty);
    }

    #[test]
    fn mismatched_import_leaves_simulation_usable() {
        let mut sim = Simulation::new(5, 5, Config::default());
        let err = sim
            .begin_import(opaque_source(4, 5), CancelToken::new())
            .unwrap_err();
        assert!(matches!(err, ImportError::SourceDimensionMismatch { .. }));
        assert!(!sim.importing());
    }

    #[test]
    fn import_step_without_a_session_returns_none() {
        let mut sim = Simulation::new(4, 4, Config::default());
        assert!(sim.import_step().is_none());
    }

    #[test]
    fn snapshot_exposes_one_color_per_cell() {
        let mut sim = Simulation::new(4, 3, Config::default());
        let mut rng = StdRng::seed_from_u64(3);
        sim.set_active_material(Material::Water);
        sim.paint_at(1, 1, Instant::now(), &mut rng);

        let colors = sim.snapshot_colors();
        assert_eq!(colors.len(), 12);
        // Row-major: (1, 1) sits at index 1 * 4 + 1.
        assert_eq!(colors[5], Material::Water.base_color());
        assert_eq!(colors[3], Material::Empty.base_color());
    }
}
