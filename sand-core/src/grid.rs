use crate::cell::Cell;
use crate::material::Material;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GridError {
    #[error("coordinate ({x}, {y}) is outside the {width}x{height} grid")]
    OutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },
}

/// Fixed-size 2D cell container with a double-buffered tick protocol.
///
/// The grid only ever exposes its *current* buffer. Each tick, the rule
/// engine calls [`Grid::begin_tick`] to obtain a [`NextState`] seeded as
/// a copy of the current buffer, writes the new generation into it, and
/// publishes it with [`Grid::commit_tick`]. After commit, no cell memory
/// is shared between the published buffer and any later `NextState`.
///
/// Painting bypasses this protocol on purpose: [`Grid::set_current`]
/// writes the current buffer in place, so paint takes effect on the very
/// next tick.
#[derive(Debug)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

/// The in-progress next generation produced by [`Grid::begin_tick`].
#[derive(Debug)]
pub struct NextState {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl Grid {
    /// Creates a grid with every cell [`Material::Empty`].
    pub fn new(width: usize, height: usize) -> Self {
        log::debug!("creating {width}x{height} grid");
        Self {
            width,
            height,
            cells: vec![Cell::empty(); width * height],
        }
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
    fn index(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    #[inline]
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && (x as usize) < self.width && y >= 0 && (y as usize) < self.height
    }

    /// Bounds-checked cell access.
    ///
    /// ### Returns
    /// The cell at `(x, y)`, or [`GridError::OutOfBounds`] if the
    /// coordinate is outside `[0, width) × [0, height)`.
    pub fn get(&self, x: usize, y: usize) -> Result<&Cell, GridError> {
        if x < self.width && y < self.height {
            Ok(&self.cells[self.index(x, y)])
        } else {
            Err(GridError::OutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            })
        }
    }

    /// Material at `(x, y)`, treating everything outside the grid as
    /// permanently [`Material::Empty`] and non-interactive.
    ///
    /// Neighbor reads in the rule engine go through this so boundary
    /// cells never need special-casing.
    #[inline]
    pub fn material_at(&self, x: i32, y: i32) -> Material {
        if self.in_bounds(x, y) {
            self.cells[self.index(x as usize, y as usize)].material
        } else {
            Material::Empty
        }
    }

    /// Infallible interior access for the rule engine's scan loops,
    /// which only ever produce in-range coordinates.
    #[inline]
    pub(crate) fn at(&self, x: usize, y: usize) -> &Cell {
        &self.cells[self.index(x, y)]
    }

    /// Writes a cell into the *current* buffer immediately.
    ///
    /// Out-of-range coordinates are silently ignored; the paint boundary
    /// never fails on them.
    pub fn set_current(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            let idx = self.index(x, y);
            self.cells[idx] = cell;
        }
    }

    /// Resets every cell to [`Material::Empty`].
    pub fn reset(&mut self) {
        self.cells.fill(Cell::empty());
    }

    /// Starts a tick: the next-state buffer begins as a copy of the
    /// current buffer, so rules only need to write the cells that change.
    pub fn begin_tick(&self) -> NextState {
        NextState {
            width: self.width,
            height: self.height,
            cells: self.cells.clone(),
        }
    }

    /// Publishes a fully-computed next generation as the new current
    /// buffer. The prior current buffer is discarded.
    pub fn commit_tick(&mut self, next: NextState) {
        debug_assert_eq!(next.width, self.width);
        debug_assert_eq!(next.height, self.height);
        self.cells = next.cells;
    }
}

impl NextState {
    #[inline]
    fn index(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, cell: Cell) {
        debug_assert!(x < self.width && y < self.height);
        let idx = self.index(x, y);
        self.cells[idx] = cell;
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> &Cell {
        &self.cells[self.index(x, y)]
    }
}
