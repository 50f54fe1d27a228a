//! Column compaction after tiles are removed
//!
//! Only the lowest vacated row of each column is tracked: everything below
//! it is already packed, so the scan starts there and counts gaps upward.

use std::collections::BTreeMap;

use glam::IVec2;

use super::grid::Grid;
use super::movement::TileMover;
use super::tile::TileId;

/// Lowest vacated row per column
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VacatedRows {
    lowest: BTreeMap<i32, i32>,
}

impl VacatedRows {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, cell: IVec2) {
        self.lowest
            .entry(cell.x)
            .and_modify(|row| *row = (*row).min(cell.y))
            .or_insert(cell.y);
    }

    pub fn lowest_row(&self, column: i32) -> Option<i32> {
        self.lowest.get(&column).copied()
    }

    pub fn columns(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.lowest.iter().map(|(&x, &y)| (x, y))
    }

    pub fn is_empty(&self) -> bool {
        self.lowest.is_empty()
    }
}

/// Start drop moves closing every gap at or above the vacated rows
///
/// Returns `(tile, from, to)` for each move started.
pub fn compact_columns(
    grid: &mut Grid,
    mover: &mut TileMover,
    vacated: &VacatedRows,
) -> Vec<(TileId, IVec2, IVec2)> {
    let mut drops = Vec::new();
    for (x, lowest) in vacated.columns() {
        let mut gap = 0;
        for y in lowest..grid.height() {
            let cell = IVec2::new(x, y);
            match grid.id_at(cell) {
                None => gap += 1,
                Some(id) => {
                    if gap > 0 {
                        let dest = IVec2::new(x, y - gap);
                        mover.move_tile(grid, id, dest);
                        drops.push((id, cell, dest));
                    }
                }
            }
        }
        if gap > 0 {
            log::debug!("Column {x}: closing {gap} gap(s) from row {lowest}");
        }
    }
    drops
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn settle(grid: &mut Grid, mover: &mut TileMover) {
        let mut ticks = 0;
        while mover.is_any_tile_moving() {
            mover.update(grid, crate::consts::SIM_DT);
            ticks += 1;
            assert!(ticks < 10_000);
        }
    }

    #[test]
    fn test_vacated_rows_keep_minimum() {
        let mut vacated = VacatedRows::new();
        vacated.record(IVec2::new(2, 5));
        vacated.record(IVec2::new(2, 3));
        vacated.record(IVec2::new(2, 4));
        vacated.record(IVec2::new(0, 1));
        assert_eq!(vacated.lowest_row(2), Some(3));
        assert_eq!(vacated.lowest_row(0), Some(1));
        assert_eq!(vacated.lowest_row(1), None);
    }

    #[test]
    fn test_column_collapses_over_gap() {
        // Bottom to top: A, B, _, _, C
        let mut grid = Grid::from_rows(&[
            "C", //
            ".", //
            ".", //
            "G", //
            "R", //
        ]);
        let c = grid.id_at(IVec2::new(0, 4)).unwrap();
        let mut mover = TileMover::new(10.0);
        let mut vacated = VacatedRows::new();
        vacated.record(IVec2::new(0, 3));
        vacated.record(IVec2::new(0, 2));

        let drops = compact_columns(&mut grid, &mut mover, &vacated);
        assert_eq!(drops, vec![(c, IVec2::new(0, 4), IVec2::new(0, 2))]);
        settle(&mut grid, &mut mover);

        assert_eq!(
            grid.rows(),
            vec![".", ".", "C", "G", "R"]
                .into_iter()
                .map(String::from)
                .collect::<Vec<_>>()
        );
        assert!(grid.is_consistent());
    }

    #[test]
    fn test_multiple_gaps_and_columns() {
        let mut grid = Grid::from_rows(&[
            "YM", //
            ".B", //
            "G.", //
            "..", //
            "RC", //
        ]);
        let mut mover = TileMover::new(12.0);
        let mut vacated = VacatedRows::new();
        vacated.record(IVec2::new(0, 1));
        vacated.record(IVec2::new(0, 3));
        vacated.record(IVec2::new(1, 1));

        let drops = compact_columns(&mut grid, &mut mover, &vacated);
        assert_eq!(drops.len(), 4);
        settle(&mut grid, &mut mover);

        assert_eq!(
            grid.rows(),
            vec!["..", "..", "YM", "GB", "RC"]
                .into_iter()
                .map(String::from)
                .collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_untouched_columns_stay_put() {
        let mut grid = Grid::from_rows(&["R.", ".G"]);
        let mut mover = TileMover::new(10.0);
        let mut vacated = VacatedRows::new();
        vacated.record(IVec2::new(1, 1));
        let drops = compact_columns(&mut grid, &mut mover, &vacated);
        assert!(drops.is_empty());
        assert!(!mover.is_any_tile_moving());
        assert_eq!(grid.rows(), vec!["R.".to_string(), ".G".to_string()]);
    }

    proptest! {
        #[test]
        fn prop_compaction_preserves_order(column in prop::collection::vec(
            prop::sample::select(vec!['R', 'G', 'B', '.']), 1..10,
        )) {
            // column[0] is the bottom cell
            let rows: Vec<String> = column.iter().rev().map(|c| c.to_string()).collect();
            let refs: Vec<&str> = rows.iter().map(|s| s.as_str()).collect();
            let mut grid = Grid::from_rows(&refs);
            let mut mover = TileMover::new(20.0);
            let mut vacated = VacatedRows::new();
            vacated.record(IVec2::new(0, 0));

            compact_columns(&mut grid, &mut mover, &vacated);
            settle(&mut grid, &mut mover);

            let expected: String = column.iter().filter(|c| **c != '.').collect();
            let height = column.len();
            let mut packed: String = grid.rows().concat().chars().rev().collect();
            packed.truncate(expected.len());
            prop_assert_eq!(&packed, &expected);
            let tail: String = grid.rows().concat().chars().rev().skip(expected.len()).collect();
            prop_assert_eq!(tail, ".".repeat(height - expected.len()));
            prop_assert!(grid.is_consistent());
        }
    }
}
