//! Grid model: 5x5 tile values, seeding and leftover refill.

use rand::Rng;
use rand::seq::IndexedRandom;

/// Rows and columns of the board.
pub const GRID_SIZE: usize = 5;

/// Values for cascade spawns and the post-move refill, whatever the difficulty.
pub const REFILL_VALUES: [u64; 6] = [2, 4, 8, 16, 32, 64];

/// Cell position. Row 0 is the top row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Coord {
    pub row: usize,
    pub col: usize,
}

impl Coord {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Chebyshev (king-move) distance.
    pub fn distance(self, other: Self) -> usize {
        self.row.abs_diff(other.row).max(self.col.abs_diff(other.col))
    }

    /// All board coordinates in row-major order.
    pub fn all() -> impl Iterator<Item = Self> {
        (0..GRID_SIZE).flat_map(|row| (0..GRID_SIZE).map(move |col| Self::new(row, col)))
    }
}

/// Settled board. `0` is an empty cell; anything else is a power of two >= 2.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Grid {
    cells: [[u64; GRID_SIZE]; GRID_SIZE],
}

impl Grid {
    #[cfg(test)]
    pub fn from_rows(cells: [[u64; GRID_SIZE]; GRID_SIZE]) -> Self {
        Self { cells }
    }

    /// Every cell drawn independently and uniformly from `values`.
    pub fn seeded<R: Rng + ?Sized>(values: &[u64], rng: &mut R) -> Self {
        let mut grid = Self::default();
        for at in Coord::all() {
            grid.set(at, values.choose(rng).copied().unwrap_or(0));
        }
        grid
    }

    #[inline]
    pub fn get(&self, at: Coord) -> u64 {
        self.cells
            .get(at.row)
            .and_then(|row| row.get(at.col))
            .copied()
            .unwrap_or(0)
    }

    #[inline]
    pub fn set(&mut self, at: Coord, value: u64) {
        if let Some(cell) = self.cells.get_mut(at.row).and_then(|row| row.get_mut(at.col)) {
            *cell = value;
        }
    }

    #[inline]
    pub fn is_empty(&self, at: Coord) -> bool {
        self.get(at) == 0
    }

    /// Fill every empty cell straight from [`REFILL_VALUES`]. Returns how many were filled.
    pub fn fill_empty<R: Rng + ?Sized>(&mut self, rng: &mut R) -> usize {
        let mut filled = 0;
        for at in Coord::all() {
            if self.is_empty(at) {
                self.set(at, REFILL_VALUES.choose(rng).copied().unwrap_or(2));
                filled += 1;
            }
        }
        filled
    }
}
