//! Game state: grid, score, drag chain, falling tiles, refill and game-over.

use crate::Difficulty;
use crate::cascade::{self, FallAnimator};
use crate::grid::{Coord, GRID_SIZE, Grid};
use crate::merge::{self, MergeOutcome};
use crate::selection::SelectionChain;
use log::debug;
use rand::SeedableRng;
use rand::rngs::SmallRng;

/// Orthogonal neighbour offsets (up, down, left, right).
const NEIGHBOURS_4: [(isize, isize); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// True if no cell has an equal up/down/left/right neighbour.
///
/// Diagonal pairs do not count even though drags may run diagonally.
pub fn no_moves_left(grid: &Grid) -> bool {
    !Coord::all().any(|at| {
        NEIGHBOURS_4.iter().any(|&(dr, dc)| {
            let (Some(row), Some(col)) = (at.row.checked_add_signed(dr), at.col.checked_add_signed(dc)) else {
                return false;
            };
            row < GRID_SIZE && col < GRID_SIZE && grid.get(Coord::new(row, col)) == grid.get(at)
        })
    })
}

/// Everything one game owns. Driven by the app one event / tick at a time.
#[derive(Debug)]
pub struct GameState {
    pub grid: Grid,
    pub score: u64,
    pub difficulty: Difficulty,
    pub chain: SelectionChain,
    pub falling: FallAnimator,
    /// Left button is held.
    dragging: bool,
    /// A merge happened; fill leftover holes once the cascade has landed.
    refill_pending: bool,
    pub moves: u32,
    rng: SmallRng,
}

impl GameState {
    /// New game seeded from the difficulty's value set. `seed` makes it reproducible.
    pub fn new(difficulty: Difficulty, seed: Option<u64>) -> Self {
        let mut rng = match seed {
            Some(s) => SmallRng::seed_from_u64(s),
            None => SmallRng::from_os_rng(),
        };
        let grid = Grid::seeded(difficulty.seed_values(), &mut rng);
        Self::with_grid(grid, difficulty, rng)
    }

    pub fn with_grid(grid: Grid, difficulty: Difficulty, rng: SmallRng) -> Self {
        Self {
            grid,
            score: 0,
            difficulty,
            chain: SelectionChain::default(),
            falling: FallAnimator::default(),
            dragging: false,
            refill_pending: false,
            moves: 0,
            rng,
        }
    }

    /// No tiles in flight and no refill owed.
    pub fn is_settled(&self) -> bool {
        self.falling.is_idle() && !self.refill_pending
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Game over is only judged on a settled board.
    pub fn is_game_over(&self) -> bool {
        self.is_settled() && no_moves_left(&self.grid)
    }

    /// Primary button down. `at` is `None` when the press landed outside the board.
    /// Ignored while a cascade is still running.
    pub fn press(&mut self, at: Option<Coord>) {
        if !self.is_settled() {
            return;
        }
        self.dragging = true;
        self.chain.reset();
        if let Some(at) = at {
            self.chain.begin(at, &self.grid);
        }
    }

    /// Pointer moved over the cell `at` (already proximity-gated by the caller).
    pub fn drag(&mut self, at: Coord) {
        if self.dragging {
            self.chain.extend(at, &self.grid);
        }
    }

    /// Secondary button: drop the last chain cell.
    pub fn undo(&mut self) {
        if self.dragging {
            self.chain.remove_last();
        }
    }

    /// Primary button up: try to merge the chain, then start the cascade.
    /// The chain is discarded either way.
    pub fn release(&mut self) -> Option<MergeOutcome> {
        if !self.dragging {
            return None;
        }
        self.dragging = false;
        let chain = std::mem::take(&mut self.chain);
        let outcome = merge::resolve(&mut self.grid, &mut self.score, chain.cells())?;
        self.moves += 1;
        debug!(
            "merged {} cells into {} at {:?} (score {})",
            outcome.chain_len, outcome.value, outcome.survivor, self.score
        );

        let falls = cascade::collapse(&mut self.grid);
        let spawns = cascade::spawn_tiles(&self.grid, &mut self.rng);
        debug!("cascade: {} falls, {} spawns", falls.len(), spawns.len());
        self.falling.extend(falls);
        self.falling.extend(spawns);
        self.refill_pending = true;
        Some(outcome)
    }

    /// One fixed-rate tick: advance falls; once they have landed, fill what is still empty.
    pub fn tick(&mut self) {
        self.falling.tick(&mut self.grid);
        if self.refill_pending && self.falling.is_idle() {
            let filled = self.grid.fill_empty(&mut self.rng);
            if filled > 0 {
                debug!("refilled {filled} empty cells");
            }
            self.refill_pending = false;
        }
    }

    /// Run `ticks` ticks.
    pub fn advance(&mut self, ticks: u32) {
        for _ in 0..ticks {
            self.tick();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::REFILL_VALUES;

    fn state(rows: [[u64; GRID_SIZE]; GRID_SIZE]) -> GameState {
        GameState::with_grid(Grid::from_rows(rows), Difficulty::Medium, SmallRng::seed_from_u64(11))
    }

    /// Board with no equal orthogonal or diagonal neighbours except where a test puts them.
    fn checker() -> [[u64; GRID_SIZE]; GRID_SIZE] {
        [
            [2, 4, 8, 16, 32],
            [64, 128, 256, 512, 1024],
            [2, 4, 8, 16, 32],
            [64, 128, 256, 512, 1024],
            [2, 4, 8, 16, 32],
        ]
    }

    #[test]
    fn test_no_moves_left_on_distinct_neighbours() {
        assert!(no_moves_left(&Grid::from_rows(checker())));
    }

    #[test]
    fn test_orthogonal_pair_keeps_game_alive() {
        let mut rows = checker();
        rows[4][4] = 16;
        assert!(!no_moves_left(&Grid::from_rows(rows)));
        let mut rows = checker();
        rows[1][0] = 2;
        assert!(!no_moves_left(&Grid::from_rows(rows)));
    }

    #[test]
    fn test_diagonal_pair_does_not_keep_game_alive() {
        let mut rows = checker();
        rows[1][1] = 2;
        assert!(no_moves_left(&Grid::from_rows(rows)));
    }

    #[test]
    fn test_new_game_is_full_and_settled() {
        let game = GameState::new(Difficulty::Easy, Some(5));
        assert!(game.is_settled());
        for at in Coord::all() {
            assert!(Difficulty::Easy.seed_values().contains(&game.grid.get(at)));
        }
        assert_eq!(game.score, 0);
    }

    #[test]
    fn test_drag_merge_cascade_refill_leaves_no_holes() {
        let mut rows = checker();
        rows[0][0] = 4;
        rows[0][1] = 4;
        rows[1][0] = 4;
        let mut game = state(rows);

        game.press(Some(Coord::new(1, 0)));
        game.drag(Coord::new(0, 0));
        game.drag(Coord::new(0, 1));
        let outcome = game.release().expect("three adjacent fours");
        assert_eq!(outcome.survivor, Coord::new(0, 1));
        assert_eq!(outcome.value, 16);
        assert_eq!(game.score, 16);
        assert!(game.chain.is_empty());
        assert!(!game.is_settled());
        assert!(!game.is_game_over());

        game.advance(25);
        assert!(game.is_settled());
        for at in Coord::all() {
            assert!(!game.grid.is_empty(at), "{at:?} left empty");
        }
        assert_eq!(game.grid.get(Coord::new(0, 1)), 16);
        // nothing sits above the cleared cells of column 0: no falls, one spawn
        // lands on row 0 and the refill covers row 1
        assert_eq!(game.grid.get(Coord::new(2, 0)), 2);
        assert!(REFILL_VALUES.contains(&game.grid.get(Coord::new(0, 0))));
    }

    #[test]
    fn test_cascade_moves_tiles_down_before_refill() {
        let mut rows = checker();
        rows[2][2] = 4;
        rows[3][2] = 4;
        let mut game = state(rows);
        game.press(Some(Coord::new(2, 2)));
        game.drag(Coord::new(3, 2));
        game.release().expect("vertical pair");
        // (2,2) emptied: the 256 above falls one row, the 8 on top falls one row
        assert_eq!(game.falling.landing_at(Coord::new(2, 2)).map(|c| c.value), Some(256));
        assert_eq!(game.falling.landing_at(Coord::new(1, 2)).map(|c| c.value), Some(8));
        assert!(game.grid.is_empty(Coord::new(2, 2)));
        game.advance(25);
        assert_eq!(game.grid.get(Coord::new(3, 2)), 8);
        assert_eq!(game.grid.get(Coord::new(2, 2)), 256);
        assert_eq!(game.grid.get(Coord::new(1, 2)), 8);
        assert!(REFILL_VALUES.contains(&game.grid.get(Coord::new(0, 2))));
    }

    #[test]
    fn test_invalid_release_changes_nothing() {
        let mut game = state(checker());
        let before = game.grid.clone();
        game.press(Some(Coord::new(0, 0)));
        game.drag(Coord::new(0, 1));
        assert_eq!(game.chain.len(), 1);
        assert!(game.release().is_none());
        assert_eq!(game.grid, before);
        assert_eq!(game.score, 0);
        assert!(game.is_settled());
        assert!(game.is_game_over());
    }

    #[test]
    fn test_undo_pops_last_step() {
        let mut game = state([[2; GRID_SIZE]; GRID_SIZE]);
        game.press(Some(Coord::new(0, 0)));
        game.drag(Coord::new(0, 1));
        game.drag(Coord::new(0, 2));
        game.undo();
        assert_eq!(game.chain.cells(), &[Coord::new(0, 0), Coord::new(0, 1)]);
    }

    #[test]
    fn test_press_ignored_while_cascade_runs() {
        let mut game = state([[2; GRID_SIZE]; GRID_SIZE]);
        game.press(Some(Coord::new(4, 0)));
        game.drag(Coord::new(4, 1));
        assert!(game.release().is_some());
        game.press(Some(Coord::new(4, 3)));
        assert!(!game.is_dragging());
        assert!(game.chain.is_empty());
    }

    #[test]
    fn test_press_outside_board_then_drag_starts_chain() {
        let mut game = state([[2; GRID_SIZE]; GRID_SIZE]);
        game.press(None);
        assert!(game.chain.is_empty());
        game.drag(Coord::new(1, 1));
        assert_eq!(game.chain.cells(), &[Coord::new(1, 1)]);
    }
}
