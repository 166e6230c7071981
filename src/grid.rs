//! Fixed-size square lattice of [`Cell`]s.

use std::ops::Index;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::cell::{Cell, MutationKind};

/// Side length used by the reference layout.
pub const DEFAULT_GRID_SIZE: usize = 200;

/// Orthogonal offsets in (row, col) order: up, down, left, right.
static DIRECTIONS: [(isize, isize); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// Alive cells broken down by mutation kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Census {
    pub normal: usize,
    pub fast: usize,
    pub immortal: usize,
    pub double_life: usize,
}

impl Census {
    pub fn total(&self) -> usize {
        self.normal + self.fast + self.immortal + self.double_life
    }

    fn add(mut self, kind: MutationKind) -> Self {
        match kind {
            MutationKind::None => self.normal += 1,
            MutationKind::Fast => self.fast += 1,
            MutationKind::Immortal => self.immortal += 1,
            MutationKind::DoubleLife => self.double_life += 1,
        }
        self
    }

    fn merge(self, other: Census) -> Self {
        Census {
            normal: self.normal + other.normal,
            fast: self.fast + other.fast,
            immortal: self.immortal + other.immortal,
            double_life: self.double_life + other.double_life,
        }
    }
}

/// The lattice, stored row-major in a flat vector.
///
/// Coordinates are `(row, col)`, both in `[0, size)`. Indexing out of range is
/// a contract violation and panics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawGrid")]
pub struct Grid {
    size: usize,
    cells: Vec<Cell>,
}

/// Unchecked wire form of a [`Grid`].
#[derive(Deserialize)]
struct RawGrid {
    size: usize,
    cells: Vec<Cell>,
}

impl TryFrom<RawGrid> for Grid {
    type Error = String;

    fn try_from(raw: RawGrid) -> Result<Self, Self::Error> {
        if raw.size == 0 {
            return Err("grid side length must be non-zero".to_string());
        }
        if raw.cells.len() != raw.size * raw.size {
            return Err(format!(
                "grid of side {} needs {} cells, got {}",
                raw.size,
                raw.size * raw.size,
                raw.cells.len()
            ));
        }
        Ok(Grid {
            size: raw.size,
            cells: raw.cells,
        })
    }
}

impl Grid {
    /// Creates an all-dead grid.
    ///
    /// # Arguments
    ///
    /// * `size` - Side length of the square lattice
    /// * `base_lifespan_ms` - Reset lifespan stored on every dead cell
    ///
    /// # Panics
    ///
    /// Panics if `size` is zero.
    pub fn new(size: usize, base_lifespan_ms: u64) -> Self {
        assert!(size > 0, "grid side length must be non-zero");
        Grid {
            size,
            cells: vec![Cell::dead(base_lifespan_ms); size * size],
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Row-major view of every cell.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub(crate) fn cells_mut(&mut self) -> &mut [Cell] {
        &mut self.cells
    }

    pub fn in_bounds(&self, row: usize, col: usize) -> bool {
        row < self.size && col < self.size
    }

    fn offset(&self, row: usize, col: usize) -> usize {
        assert!(
            self.in_bounds(row, col),
            "cell ({row}, {col}) is outside the {size}x{size} grid",
            size = self.size
        );
        row * self.size + col
    }

    /// Non-panicking lookup.
    pub fn get(&self, row: usize, col: usize) -> Option<&Cell> {
        if self.in_bounds(row, col) {
            self.cells.get(row * self.size + col)
        } else {
            None
        }
    }

    /// # Panics
    ///
    /// Panics if `(row, col)` is out of bounds.
    pub fn set(&mut self, row: usize, col: usize, cell: Cell) {
        let idx = self.offset(row, col);
        self.cells[idx] = cell;
    }

    /// # Panics
    ///
    /// Panics if `(row, col)` is out of bounds.
    pub fn cell_mut(&mut self, row: usize, col: usize) -> &mut Cell {
        let idx = self.offset(row, col);
        &mut self.cells[idx]
    }

    pub fn is_alive(&self, row: usize, col: usize) -> bool {
        self[(row, col)].alive
    }

    /// In-bounds orthogonal neighbours of `(row, col)`: up, down, left, right.
    ///
    /// Positions that would fall off the edge are simply omitted.
    pub fn neighbors4(&self, row: usize, col: usize) -> impl Iterator<Item = (usize, usize)> + '_ {
        DIRECTIONS.iter().filter_map(move |&(dr, dc)| {
            let r = row.checked_add_signed(dr)?;
            let c = col.checked_add_signed(dc)?;
            self.in_bounds(r, c).then_some((r, c))
        })
    }

    /// Coordinates of every alive cell, in row-major order.
    pub fn alive_coords(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| cell.alive)
            .map(|(idx, _)| (idx / self.size, idx % self.size))
    }

    /// Counts the total number of living cells in the grid.
    pub fn population(&self) -> usize {
        self.cells.par_iter().filter(|cell| cell.alive).count()
    }

    pub fn census(&self) -> Census {
        self.cells
            .par_iter()
            .filter(|cell| cell.alive)
            .fold(Census::default, |census, cell| census.add(cell.mutation))
            .reduce(Census::default, Census::merge)
    }
}

impl Index<(usize, usize)> for Grid {
    type Output = Cell;

    fn index(&self, (row, col): (usize, usize)) -> &Cell {
        &self.cells[self.offset(row, col)]
    }
}
