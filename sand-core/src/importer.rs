//! Image-to-grid import: opaque source pixels become tinted wood.
//!
//! The platform layer is responsible for decoding and nearest-neighbor
//! resizing; by the time anything crosses this boundary the pixel source
//! must already match the grid dimensions. Two modes exist:
//!
//! - [`import_atomic`] applies the whole replacement in one call.
//! - [`ImportSession`] applies one row per [`ImportSession::step_row`]
//!   call, yielding a completion fraction after each row and honoring a
//!   cooperative [`CancelToken`] at row boundaries. Cancellation keeps
//!   every row applied so far; nothing is rolled back.
//!
//! Normal ticking is suspended for the whole lifetime of a session; the
//! importer owns the grid exclusively until it reaches a terminal state.

use crate::{cell::Cell, grid::Grid, material::Rgb};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;

/// Source pixels with alpha strictly above this become wood.
const OPAQUE_ALPHA_THRESHOLD: u8 = 128;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ImportError {
    #[error("pixel source is {actual_width}x{actual_height}, expected {expected_width}x{expected_height}")]
    SourceDimensionMismatch {
        expected_width: usize,
        expected_height: usize,
        actual_width: usize,
        actual_height: usize,
    },
    #[error("pixel buffer holds {actual} pixels, expected {expected} for {width}x{height}")]
    BufferSizeMismatch {
        width: usize,
        height: usize,
        expected: usize,
        actual: usize,
    },
}

/// One RGBA source pixel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    fn is_opaque(self) -> bool {
        self.a > OPAQUE_ALPHA_THRESHOLD
    }

    fn rgb(self) -> Rgb {
        Rgb::new(self.r, self.g, self.b)
    }
}

/// A decoded, pre-resized pixel grid, row-major.
#[derive(Debug)]
pub struct PixelSource {
    width: usize,
    height: usize,
    pixels: Vec<Rgba>,
}

impl PixelSource {
    /// Wraps a row-major pixel buffer.
    ///
    /// ### Returns
    /// [`ImportError::BufferSizeMismatch`] if the buffer length does not
    /// equal `width * height`.
    pub fn from_rgba(width: usize, height: usize, pixels: Vec<Rgba>) -> Result<Self, ImportError> {
        if pixels.len() != width * height {
            return Err(ImportError::BufferSizeMismatch {
                width,
                height,
                expected: width * height,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    fn pixel(&self, x: usize, y: usize) -> Rgba {
        self.pixels[y * self.width + x]
    }
}

/// Terminal and in-flight states of a progressive import.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImportStatus {
    InProgress,
    Completed,
    Cancelled,
}

/// Progress after one [`ImportSession::step_row`] call.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ImportProgress {
    /// Fraction of rows applied so far, in `[0, 1]`.
    pub fraction: f32,
    pub status: ImportStatus,
}

/// Cooperative cancellation flag for a progressive import.
///
/// Clones share the flag, so the UI can keep one half and hand the other
/// to the session. Cancellation is checked once per row boundary, never
/// mid-row.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// An interruptible row-by-row import.
///
/// Creating the session validates dimensions and resets the whole grid
/// to empty; each [`ImportSession::step_row`] call then applies one row
/// and reports progress. The session never blocks: the host decides when
/// the next row runs (typically one row per frame, rendering a snapshot
/// in between).
#[derive(Debug)]
pub struct ImportSession {
    source: PixelSource,
    next_row: usize,
    token: CancelToken,
}

impl ImportSession {
    /// Starts a progressive import into `grid`.
    ///
    /// ### Parameters
    /// - `grid` - Target grid; it is fully reset to empty here, before
    ///   any row is applied.
    /// - `source` - Pre-resized pixel source; must match the grid
    ///   dimensions exactly.
    /// - `token` - Cancellation flag checked before each row.
    ///
    /// ### Returns
    /// The running session, or
    /// [`ImportError::SourceDimensionMismatch`] without touching the
    /// grid.
    pub fn new(grid: &mut Grid, source: PixelSource, token: CancelToken) -> Result<Self, ImportError> {
        check_dimensions(grid, &source)?;
        log::info!(
            "starting progressive import of {}x{} source",
            source.width,
            source.height
        );
        grid.reset();
        Ok(Self {
            source,
            next_row: 0,
            token,
        })
    }

    /// Applies the next row, or reports a terminal state.
    ///
    /// The cancellation token is consulted first: a cancelled session
    /// leaves all previously applied rows in place and all remaining
    /// rows untouched. Once every row is applied the status is
    /// [`ImportStatus::Completed`]; calling again after a terminal state
    /// just repeats it.
    pub fn step_row(&mut self, grid: &mut Grid) -> ImportProgress {
        let total = self.source.height;
        if self.token.is_cancelled() {
            log::info!("import cancelled after {} of {total} rows", self.next_row);
            return ImportProgress {
                fraction: self.fraction(),
                status: ImportStatus::Cancelled,
            };
        }
        if self.next_row >= total {
            return ImportProgress {
                fraction: 1.0,
                status: ImportStatus::Completed,
            };
        }

        apply_row(grid, &self.source, self.next_row);
        self.next_row += 1;

        let status = if self.next_row == total {
            log::info!("import completed ({total} rows)");
            ImportStatus::Completed
        } else {
            ImportStatus::InProgress
        };
        ImportProgress {
            fraction: self.fraction(),
            status,
        }
    }

    fn fraction(&self) -> f32 {
        if self.source.height == 0 {
            1.0
        } else {
            self.next_row as f32 / self.source.height as f32
        }
    }
}

/// Applies a whole-grid replacement in one step.
///
/// The grid is reset first, then every opaque source pixel becomes wood
/// tinted with the pixel color and every transparent pixel stays empty.
pub fn import_atomic(grid: &mut Grid, source: &PixelSource) -> Result<(), ImportError> {
    check_dimensions(grid, source)?;
    log::info!("atomic import of {}x{} source", source.width, source.height);
    grid.reset();
    for y in 0..source.height {
        apply_row(grid, source, y);
    }
    Ok(())
}

fn check_dimensions(grid: &Grid, source: &PixelSource) -> Result<(), ImportError> {
    if source.width != grid.width() || source.height != grid.height() {
        return Err(ImportError::SourceDimensionMismatch {
            expected_width: grid.width(),
            expected_height: grid.height(),
            actual_width: source.width,
            actual_height: source.height,
        });
    }
    Ok(())
}

fn apply_row(grid: &mut Grid, source: &PixelSource, y: usize) {
    for x in 0..source.width {
        let pixel = source.pixel(x, y);
        let cell = if pixel.is_opaque() {
            Cell::wood(pixel.rgb())
        } else {
            Cell::empty()
        };
        grid.set_current(x, y, cell);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::Material;

    /// A `w x h` source where every pixel in rows `0..opaque_rows` is
    /// opaque red and everything else is transparent.
    fn striped_source(w: usize, h: usize, opaque_rows: usize) -> PixelSource {
        let pixels = (0..w * h)
            .map(|i| {
                if i / w < opaque_rows {
                    Rgba::new(200, 10, 10, 255)
                } else {
                    Rgba::new(0, 0, 0, 0)
                }
            })
            .collect();
        PixelSource::from_rgba(w, h, pixels).unwrap()
    }

    #[test]
    fn from_rgba_rejects_wrong_buffer_length() {
        let err = PixelSource::from_rgba(4, 4, vec![Rgba::new(0, 0, 0, 0); 7]).unwrap_err();
        assert_eq!(
            err,
            ImportError::BufferSizeMismatch {
                width: 4,
                height: 4,
                expected: 16,
                actual: 7,
            }
        );
    }

    #[test]
    fn alpha_threshold_is_strictly_above_128() {
        let mut grid = Grid::new(2, 1);
        let source = PixelSource::from_rgba(
            2,
            1,
            vec![Rgba::new(50, 60, 70, 128), Rgba::new(50, 60, 70, 129)],
        )
        .unwrap();

        import_atomic(&mut grid, &source).unwrap();

        assert_eq!(grid.get(0, 0).unwrap().material, Material::Empty);
        let wood = grid.get(1, 0).unwrap();
        assert_eq!(wood.material, Material::Wood);
        assert_eq!(wood.tint, Some(Rgb::new(50, 60, 70)));
    }

    #[test]
    fn atomic_import_rejects_mismatched_source() {
        let mut grid = Grid::new(6, 4);
        let source = striped_source(5, 4, 2);

        let err = import_atomic(&mut grid, &source).unwrap_err();
        assert_eq!(
            err,
            ImportError::SourceDimensionMismatch {
                expected_width: 6,
                expected_height: 4,
                actual_width: 5,
                actual_height: 4,
            }
        );
        // A failed import must not touch committed state.
        grid.set_current(0, 0, Cell::of(Material::Sand));
        assert_eq!(grid.get(0, 0).unwrap().material, Material::Sand);
    }

    #[test]
    fn atomic_import_resets_previous_contents() {
        let mut grid = Grid::new(4, 4);
        grid.set_current(3, 3, Cell::of(Material::Sand));
        let source = striped_source(4, 4, 1);

        import_atomic(&mut grid, &source).unwrap();

        // Row 0 is wood, everything else (including the old sand) is empty.
        for x in 0..4 {
            assert_eq!(grid.get(x, 0).unwrap().material, Material::Wood);
        }
        for y in 1..4 {
            for x in 0..4 {
                assert_eq!(grid.get(x, y).unwrap().material, Material::Empty);
            }
        }
    }

    #[test]
    fn progressive_import_reports_row_fractions_and_completes() {
        let mut grid = Grid::new(3, 4);
        let source = striped_source(3, 4, 4);
        let mut session = ImportSession::new(&mut grid, source, CancelToken::new()).unwrap();

        let p = session.step_row(&mut grid);
        assert_eq!(p.status, ImportStatus::InProgress);
        assert!((p.fraction - 0.25).abs() < 1e-6);

        session.step_row(&mut grid);
        session.step_row(&mut grid);
        let last = session.step_row(&mut grid);
        assert_eq!(last.status, ImportStatus::Completed);
        assert!((last.fraction - 1.0).abs() < 1e-6);

        for y in 0..4 {
            for x in 0..3 {
                assert_eq!(grid.get(x, y).unwrap().material, Material::Wood);
            }
        }

        // Stepping past completion keeps reporting the terminal state.
        let again = session.step_row(&mut grid);
        assert_eq!(again.status, ImportStatus::Completed);
    }

    #[test]
    fn cancellation_keeps_the_applied_prefix() {
        let mut grid = Grid::new(3, 6);
        let source = striped_source(3, 6, 5);
        let token = CancelToken::new();
        let mut session = ImportSession::new(&mut grid, source, token.clone()).unwrap();

        // Apply rows 0, 1 and 2, then request cancellation.
        session.step_row(&mut grid);
        session.step_row(&mut grid);
        session.step_row(&mut grid);
        token.cancel();

        let p = session.step_row(&mut grid);
        assert_eq!(p.status, ImportStatus::Cancelled);
        assert!((p.fraction - 0.5).abs() < 1e-6);

        // Rows 0..=2 are wood; rows 3+ stay as the session's reset left
        // them. No rollback.
        for y in 0..3 {
            for x in 0..3 {
                assert_eq!(grid.get(x, y).unwrap().material, Material::Wood);
            }
        }
        for y in 3..6 {
            for x in 0..3 {
                assert_eq!(grid.get(x, y).unwrap().material, Material::Empty);
            }
        }
    }

    #[test]
    fn session_creation_resets_the_grid_before_any_row() {
        let mut grid = Grid::new(3, 3);
        grid.set_current(1, 1, Cell::of(Material::Water));
        let source = striped_source(3, 3, 0);

        let _session = ImportSession::new(&mut grid, source, CancelToken::new()).unwrap();
        assert_eq!(grid.get(1, 1).unwrap().material, Material::Empty);
    }

    #[test]
    fn mismatched_session_leaves_the_grid_alone() {
        let mut grid = Grid::new(3, 3);
        grid.set_current(1, 1, Cell::of(Material::Water));
        let source = striped_source(2, 3, 1);

        let err = ImportSession::new(&mut grid, source, CancelToken::new()).unwrap_err();
        assert!(matches!(err, ImportError::SourceDimensionMismatch { .. }));
        assert_eq!(grid.get(1, 1).unwrap().material, Material::Water);
    }
}
