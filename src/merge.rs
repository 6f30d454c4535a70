//! Merge resolution: validate a finished chain, merge it into the last cell, score.

use crate::grid::{Coord, Grid};

/// Result of a successful merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeOutcome {
    /// Last cell of the chain; holds the merged value.
    pub survivor: Coord,
    /// New value of the survivor, also the points scored.
    pub value: u64,
    pub chain_len: usize,
}

/// Value multiplier for a chain of `len` cells.
pub fn chain_multiplier(len: usize) -> u64 {
    match len {
        0 | 1 => 1,
        2 => 2,
        3 | 4 => 4,
        _ => 8,
    }
}

/// True if `chain` may be merged on `grid` as it stands now.
pub fn is_mergeable(grid: &Grid, chain: &[Coord]) -> bool {
    let Some(&first) = chain.first() else {
        return false;
    };
    if chain.len() < 2 {
        return false;
    }
    if chain.windows(2).any(|w| w[0].distance(w[1]) != 1) {
        return false;
    }
    let value = grid.get(first);
    value != 0 && chain.iter().all(|&at| grid.get(at) == value)
}

/// Merge `chain` if it is legal; otherwise nothing changes and `None` is returned.
///
/// The last coordinate keeps `value * multiplier`, the rest are emptied, and the
/// same amount is added to `score`. Gravity and refill are up to the caller.
pub fn resolve(grid: &mut Grid, score: &mut u64, chain: &[Coord]) -> Option<MergeOutcome> {
    if !is_mergeable(grid, chain) {
        return None;
    }
    let (&survivor, rest) = chain.split_last()?;
    let merged = grid.get(survivor) * chain_multiplier(chain.len());
    for &at in rest {
        grid.set(at, 0);
    }
    grid.set(survivor, merged);
    *score += merged;
    Some(MergeOutcome {
        survivor,
        value: merged,
        chain_len: chain.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uniform(value: u64) -> Grid {
        Grid::from_rows([[value; 5]; 5])
    }

    fn row_chain(len: usize) -> Vec<Coord> {
        (0..len).map(|i| Coord::new(i / 5, if (i / 5) % 2 == 0 { i % 5 } else { 4 - i % 5 })).collect()
    }

    #[test]
    fn test_multiplier_table() {
        for (len, expected) in [(2, 2), (3, 4), (4, 4), (5, 8), (6, 8), (25, 8)] {
            let mut grid = uniform(4);
            let mut score = 10;
            let chain = row_chain(len);
            let outcome = resolve(&mut grid, &mut score, &chain).expect("snake chain is adjacent");
            assert_eq!(outcome.value, 4 * expected, "len {len}");
            assert_eq!(score, 10 + 4 * expected, "len {len}");
            assert_eq!(grid.get(*chain.last().unwrap()), 4 * expected);
            for at in &chain[..len - 1] {
                assert_eq!(grid.get(*at), 0);
            }
        }
    }

    #[test]
    fn test_two_fours_merge_into_second_cell() {
        let mut grid = uniform(2);
        grid.set(Coord::new(0, 0), 4);
        grid.set(Coord::new(0, 1), 4);
        let mut score = 0;
        let outcome = resolve(&mut grid, &mut score, &[Coord::new(0, 0), Coord::new(0, 1)]);
        assert_eq!(outcome.map(|o| o.survivor), Some(Coord::new(0, 1)));
        assert_eq!(grid.get(Coord::new(0, 1)), 8);
        assert_eq!(grid.get(Coord::new(0, 0)), 0);
        assert_eq!(score, 8);
    }

    #[test]
    fn test_five_twos_merge_into_sixteen() {
        let mut grid = uniform(2);
        let mut score = 0;
        let chain = [
            Coord::new(4, 0),
            Coord::new(3, 1),
            Coord::new(2, 2),
            Coord::new(2, 3),
            Coord::new(1, 4),
        ];
        assert!(resolve(&mut grid, &mut score, &chain).is_some());
        assert_eq!(grid.get(Coord::new(1, 4)), 16);
        assert_eq!(chain[..4].iter().filter(|&&at| grid.get(at) == 0).count(), 4);
        assert_eq!(score, 16);
    }

    #[test]
    fn test_survivor_follows_drag_direction() {
        let mut grid = uniform(8);
        let mut score = 0;
        resolve(&mut grid, &mut score, &[Coord::new(3, 3), Coord::new(3, 2)]);
        assert_eq!(grid.get(Coord::new(3, 2)), 16);
        assert_eq!(grid.get(Coord::new(3, 3)), 0);
    }

    #[test]
    fn test_rejections_leave_grid_untouched() {
        let mut base = uniform(2);
        base.set(Coord::new(1, 1), 4);
        let cases: [&[Coord]; 5] = [
            &[],
            &[Coord::new(0, 0)],
            &[Coord::new(0, 0), Coord::new(0, 2)],
            &[Coord::new(0, 0), Coord::new(1, 1)],
            &[Coord::new(0, 0), Coord::new(0, 0)],
        ];
        for chain in cases {
            let mut grid = base.clone();
            let mut score = 5;
            assert_eq!(resolve(&mut grid, &mut score, chain), None, "{chain:?}");
            assert_eq!(grid, base);
            assert_eq!(score, 5);
        }
    }

    #[test]
    fn test_value_changed_since_selection_is_rejected() {
        let mut grid = uniform(2);
        let chain = [Coord::new(0, 0), Coord::new(0, 1), Coord::new(0, 2)];
        grid.set(Coord::new(0, 2), 32);
        let before = grid.clone();
        let mut score = 0;
        assert!(resolve(&mut grid, &mut score, &chain).is_none());
        assert_eq!(grid, before);
    }

    #[test]
    fn test_empty_cells_never_merge() {
        let mut grid = Grid::default();
        let mut score = 0;
        assert!(resolve(&mut grid, &mut score, &[Coord::new(0, 0), Coord::new(0, 1)]).is_none());
    }
}
