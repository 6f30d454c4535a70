//! Gravity cascade after a merge and the falling-tile animation.

use crate::grid::{Coord, GRID_SIZE, Grid, REFILL_VALUES};
use rand::Rng;
use rand::seq::IndexedRandom;

/// Progress added to every falling tile per tick (20 ticks per fall).
pub const FALL_STEP: f32 = 0.05;

/// Virtual start row of a tile spawned above the board.
pub const SPAWN_ROW: i32 = -1;

/// A tile in flight from `start` to `end`.
#[derive(Debug, Clone, PartialEq)]
pub struct FallingCell {
    pub start_row: i32,
    pub start_col: usize,
    pub end: Coord,
    /// 0.0 at `start`, 1.0 on landing.
    pub progress: f32,
    pub value: u64,
}

impl FallingCell {
    pub fn fall(from: Coord, to: Coord, value: u64) -> Self {
        Self {
            start_row: from.row as i32,
            start_col: from.col,
            end: to,
            progress: 0.0,
            value,
        }
    }

    pub fn spawn(to: Coord, value: u64) -> Self {
        Self {
            start_row: SPAWN_ROW,
            start_col: to.col,
            end: to,
            progress: 0.0,
            value,
        }
    }

    /// Interpolated (row, col) for drawing.
    pub fn position(&self) -> (f32, f32) {
        let row = self.start_row as f32 + (self.end.row as f32 - self.start_row as f32) * self.progress;
        let col = self.start_col as f32 + (self.end.col as f32 - self.start_col as f32) * self.progress;
        (row, col)
    }
}

/// Let tiles fall into the gaps left by a merge.
///
/// Each column is scanned bottom-up; every empty cell pulls the nearest tile
/// above it, whose source is emptied at once. A gap with nothing above it ends
/// that column. Destinations stay empty in the grid until the fall settles.
pub fn collapse(grid: &mut Grid) -> Vec<FallingCell> {
    let mut falls = Vec::new();
    for col in 0..GRID_SIZE {
        for row in (0..GRID_SIZE).rev() {
            let to = Coord::new(row, col);
            if !grid.is_empty(to) {
                continue;
            }
            let source = (0..row).rev().map(|r| Coord::new(r, col)).find(|&c| !grid.is_empty(c));
            let Some(from) = source else {
                break;
            };
            falls.push(FallingCell::fall(from, to, grid.get(from)));
            grid.set(from, 0);
        }
    }
    falls
}

/// One new tile per column that still has a hole, dropped onto its topmost empty cell.
pub fn spawn_tiles<R: Rng + ?Sized>(grid: &Grid, rng: &mut R) -> Vec<FallingCell> {
    (0..GRID_SIZE)
        .filter_map(|col| {
            let row = (0..GRID_SIZE).find(|&row| grid.is_empty(Coord::new(row, col)))?;
            let value = REFILL_VALUES.choose(rng).copied().unwrap_or(2);
            Some(FallingCell::spawn(Coord::new(row, col), value))
        })
        .collect()
}

/// Owns the tiles currently in flight.
#[derive(Debug, Clone, Default)]
pub struct FallAnimator {
    cells: Vec<FallingCell>,
}

impl FallAnimator {
    pub fn extend(&mut self, cells: impl IntoIterator<Item = FallingCell>) {
        self.cells.extend(cells);
    }

    pub fn cells(&self) -> &[FallingCell] {
        &self.cells
    }

    pub fn is_idle(&self) -> bool {
        self.cells.is_empty()
    }

    /// The falling tile headed for `at`, if any; the renderer draws it instead of the grid cell.
    pub fn landing_at(&self, at: Coord) -> Option<&FallingCell> {
        self.cells.iter().find(|c| c.end == at)
    }

    /// Advance every tile one step. Landed tiles are written into `grid` and dropped.
    /// Returns how many landed.
    pub fn tick(&mut self, grid: &mut Grid) -> usize {
        let before = self.cells.len();
        self.cells.retain_mut(|cell| {
            cell.progress += FALL_STEP;
            if cell.progress >= 1.0 {
                cell.progress = 1.0;
                grid.set(cell.end, cell.value);
                false
            } else {
                true
            }
        });
        before - self.cells.len()
    }
}
