//! Drag selection: the chain of cells the player is dragging across.

use crate::grid::{Coord, Grid};

/// In-progress drag path. Every cell shares the value of the first one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionChain {
    cells: Vec<Coord>,
    /// Fixed when the first coordinate goes in.
    value: Option<u64>,
}

impl SelectionChain {
    /// Start a new chain holding just `at`.
    pub fn begin(&mut self, at: Coord, grid: &Grid) {
        self.cells.clear();
        self.cells.push(at);
        self.value = Some(grid.get(at));
    }

    /// Apply one pointer-motion update for the cell under the pointer.
    ///
    /// A cell of another value is ignored, the second-to-last cell backtracks,
    /// and any cell not yet in the chain is appended. Adjacency is left to the
    /// merge step.
    pub fn extend(&mut self, at: Coord, grid: &Grid) {
        let Some(value) = self.value else {
            self.begin(at, grid);
            return;
        };
        if grid.get(at) != value {
            return;
        }
        if self.cells.len() >= 2 && self.cells[self.cells.len() - 2] == at {
            self.cells.pop();
        } else if !self.cells.contains(&at) {
            self.cells.push(at);
        }
    }

    /// Undo the last step (secondary button).
    pub fn remove_last(&mut self) -> Option<Coord> {
        let last = self.cells.pop();
        if self.cells.is_empty() {
            self.value = None;
        }
        last
    }

    pub fn reset(&mut self) {
        self.cells.clear();
        self.value = None;
    }

    pub fn cells(&self) -> &[Coord] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn contains(&self, at: Coord) -> bool {
        self.cells.contains(&at)
    }

    pub fn last(&self) -> Option<Coord> {
        self.cells.last().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> Grid {
        Grid::from_rows([
            [4, 4, 8, 2, 2],
            [4, 4, 8, 2, 2],
            [2, 2, 2, 2, 2],
            [8, 8, 8, 8, 8],
            [16, 16, 16, 16, 16],
        ])
    }

    #[test]
    fn test_begin_fixes_value() {
        let g = grid();
        let mut chain = SelectionChain::default();
        chain.begin(Coord::new(0, 0), &g);
        chain.extend(Coord::new(0, 2), &g);
        assert_eq!(chain.cells(), &[Coord::new(0, 0)]);
        chain.extend(Coord::new(0, 1), &g);
        assert_eq!(chain.cells(), &[Coord::new(0, 0), Coord::new(0, 1)]);
    }

    #[test]
    fn test_extend_backtracks_on_second_to_last() {
        let g = grid();
        let mut chain = SelectionChain::default();
        chain.begin(Coord::new(0, 0), &g);
        chain.extend(Coord::new(0, 1), &g);
        chain.extend(Coord::new(1, 1), &g);
        chain.extend(Coord::new(0, 1), &g);
        assert_eq!(chain.cells(), &[Coord::new(0, 0), Coord::new(0, 1)]);
    }

    #[test]
    fn test_extend_never_repeats() {
        let g = grid();
        let mut chain = SelectionChain::default();
        chain.begin(Coord::new(0, 0), &g);
        chain.extend(Coord::new(0, 1), &g);
        chain.extend(Coord::new(1, 1), &g);
        chain.extend(Coord::new(0, 0), &g);
        chain.extend(Coord::new(1, 1), &g);
        assert_eq!(chain.len(), 3);
    }

    #[test]
    fn test_extend_does_not_check_adjacency() {
        let g = grid();
        let mut chain = SelectionChain::default();
        chain.begin(Coord::new(2, 0), &g);
        chain.extend(Coord::new(2, 4), &g);
        assert_eq!(chain.cells(), &[Coord::new(2, 0), Coord::new(2, 4)]);
    }

    #[test]
    fn test_extend_on_empty_chain_starts_it() {
        let g = grid();
        let mut chain = SelectionChain::default();
        chain.extend(Coord::new(3, 3), &g);
        assert_eq!(chain.cells(), &[Coord::new(3, 3)]);
        chain.extend(Coord::new(4, 4), &g);
        assert_eq!(chain.len(), 1);
    }

    #[test]
    fn test_remove_last_and_reset() {
        let g = grid();
        let mut chain = SelectionChain::default();
        chain.begin(Coord::new(4, 0), &g);
        chain.extend(Coord::new(4, 1), &g);
        assert_eq!(chain.remove_last(), Some(Coord::new(4, 1)));
        assert_eq!(chain.remove_last(), Some(Coord::new(4, 0)));
        assert_eq!(chain.remove_last(), None);
        // value is released once the chain empties
        chain.extend(Coord::new(0, 3), &g);
        assert_eq!(chain.cells(), &[Coord::new(0, 3)]);
        chain.reset();
        assert!(chain.is_empty());
        assert_eq!(chain.last(), None);
    }
}
