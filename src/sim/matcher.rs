//! Match detection
//!
//! Runs are collected by walking outward from a reference tile along one
//! axis. Empty cells are stepped over; a differently colored tile or an
//! unplayable cell ends the walk. The vertical axis is always tried first
//! and a qualifying vertical run is returned without looking horizontally.

use glam::IVec2;
use serde::{Deserialize, Serialize};

use super::grid::Grid;
use super::tile::{TileColor, TileId};
use crate::consts::MIN_MATCH;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchAxis {
    Vertical,
    Horizontal,
}

impl MatchAxis {
    /// Walk directions, in the order they are explored
    fn directions(&self) -> [IVec2; 2] {
        match self {
            MatchAxis::Vertical => [IVec2::Y, IVec2::NEG_Y],
            MatchAxis::Horizontal => [IVec2::NEG_X, IVec2::X],
        }
    }
}

/// Same-colored tiles connected along one axis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSet {
    pub color: TileColor,
    pub axis: MatchAxis,
    /// Reference tile first, then in walk order; no duplicates
    pub tiles: Vec<TileId>,
}

impl MatchSet {
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }
}

/// Collect same-colored tiles from `start` stepping by `dir`
fn walk(grid: &Grid, start: IVec2, dir: IVec2, color: TileColor, out: &mut Vec<TileId>) {
    let mut cell = start;
    while grid.is_valid_position(cell) {
        match grid.get(cell) {
            None => {}
            Some(tile) if tile.color == color && !out.contains(&tile.id) => out.push(tile.id),
            Some(_) => return,
        }
        cell += dir;
    }
}

/// Connected run through a reference tile along one axis, whatever its size
pub fn connected_run(grid: &Grid, reference: TileId, axis: MatchAxis) -> Vec<TileId> {
    let Some(tile) = grid.tile(reference) else {
        return Vec::new();
    };
    let origin = tile.cell();
    if !grid.is_valid_position(origin) || grid.id_at(origin) != Some(reference) {
        return Vec::new();
    }
    let mut run = vec![reference];
    for dir in axis.directions() {
        walk(grid, origin + dir, dir, tile.color, &mut run);
    }
    run
}

/// Match through a reference tile, vertical first
pub fn find_match(grid: &Grid, reference: TileId) -> Option<MatchSet> {
    let color = grid.tile(reference)?.color;
    [MatchAxis::Vertical, MatchAxis::Horizontal]
        .into_iter()
        .find_map(|axis| {
            let tiles = connected_run(grid, reference, axis);
            (tiles.len() >= MIN_MATCH).then_some(MatchSet { color, axis, tiles })
        })
}

/// First match found scanning cells row by row from the bottom-left
pub fn find_first_match(grid: &Grid) -> Option<MatchSet> {
    for y in 0..grid.height() {
        for x in 0..grid.width() {
            let Some(id) = grid.id_at(IVec2::new(x, y)) else {
                continue;
            };
            if let Some(set) = find_match(grid, id) {
                return Some(set);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::sim::grid::CellValidity;
    use proptest::prelude::*;

    fn id(grid: &Grid, x: i32, y: i32) -> TileId {
        grid.id_at(IVec2::new(x, y)).unwrap()
    }

    #[test]
    fn test_vertical_wins_tie_break() {
        // Plus shape centered on (1, 1)
        let grid = Grid::from_rows(&[
            "GRG", //
            "RRR", //
            "GRB", //
        ]);
        let center = id(&grid, 1, 1);
        let set = find_match(&grid, center).unwrap();
        assert_eq!(set.axis, MatchAxis::Vertical);
        assert_eq!(set.tiles, vec![center, id(&grid, 1, 2), id(&grid, 1, 0)]);
    }

    #[test]
    fn test_horizontal_fallback() {
        let grid = Grid::from_rows(&[
            "GBG", //
            "RRR", //
            "GYB", //
        ]);
        let set = find_match(&grid, id(&grid, 0, 1)).unwrap();
        assert_eq!(set.axis, MatchAxis::Horizontal);
        assert_eq!(set.color, TileColor::Red);
        assert_eq!(set.tiles.len(), 3);
    }

    #[test]
    fn test_gap_is_skipped_but_pair_is_not_a_match() {
        let grid = Grid::from_rows(&[
            "R", //
            ".", //
            "R", //
        ]);
        let bottom = id(&grid, 0, 0);
        let run = connected_run(&grid, bottom, MatchAxis::Vertical);
        assert_eq!(run, vec![bottom, id(&grid, 0, 2)]);
        assert!(find_match(&grid, bottom).is_none());
    }

    #[test]
    fn test_gap_is_skipped_into_a_match() {
        let grid = Grid::from_rows(&[
            "R", //
            "R", //
            ".", //
            "R", //
        ]);
        let set = find_match(&grid, id(&grid, 0, 0)).unwrap();
        assert_eq!(set.tiles.len(), 3);
    }

    #[test]
    fn test_other_color_breaks_run() {
        let grid = Grid::from_rows(&[
            "R", //
            "R", //
            "B", //
            "R", //
        ]);
        assert!(find_match(&grid, id(&grid, 0, 0)).is_none());
        assert_eq!(
            connected_run(&grid, id(&grid, 0, 2), MatchAxis::Vertical).len(),
            2
        );
    }

    #[test]
    fn test_hidden_rows_never_match() {
        let config = GameConfig {
            max_visible_row: 2,
            ..GameConfig::with_size(1, 4)
        };
        let mut grid = Grid::from_config(&config);
        for y in 0..4 {
            grid.spawn_tile(IVec2::new(0, y), TileColor::Blue);
        }
        assert_eq!(grid.validity(), CellValidity::VisibleRows(2));
        // Only two playable rows, so the column can't form a run of three
        assert!(find_first_match(&grid).is_none());
        assert!(find_match(&grid, id(&grid, 0, 3)).is_none());
    }

    #[test]
    fn test_first_match_scans_bottom_row_first() {
        let grid = Grid::from_rows(&[
            "YYYB", //
            "GBRC", //
            "MMMC", //
        ]);
        let set = find_first_match(&grid).unwrap();
        assert_eq!(set.color, TileColor::Magenta);
    }

    #[test]
    fn test_no_match_on_checkerboard() {
        let grid = Grid::from_rows(&["RGRG", "GRGR", "RGRG", "GRGR"]);
        assert!(find_first_match(&grid).is_none());
    }

    fn arb_rows() -> impl Strategy<Value = Vec<String>> {
        prop::collection::vec(
            prop::collection::vec(prop::sample::select(vec!['R', 'G', 'B', '.']), 5),
            5,
        )
        .prop_map(|rows: Vec<Vec<char>>| -> Vec<String> {
            rows.into_iter().map(|r| r.into_iter().collect::<String>()).collect()
        })
    }

    proptest! {
        #[test]
        fn prop_match_sets_are_well_formed(rows in arb_rows()) {
            let refs: Vec<&str> = rows.iter().map(|s| s.as_str()).collect();
            let grid = Grid::from_rows(&refs);
            for tile in grid.tiles() {
                if let Some(set) = find_match(&grid, tile.id) {
                    prop_assert!(set.len() >= MIN_MATCH);
                    prop_assert_eq!(set.tiles[0], tile.id);
                    let mut unique = set.tiles.clone();
                    unique.sort_unstable();
                    unique.dedup();
                    prop_assert_eq!(unique.len(), set.len());
                    for member in &set.tiles {
                        let t = grid.tile(*member).unwrap();
                        prop_assert_eq!(t.color, tile.color);
                        match set.axis {
                            MatchAxis::Vertical => { prop_assert_eq!(t.x, tile.x); }
                            MatchAxis::Horizontal => { prop_assert_eq!(t.y, tile.y); }
                        }
                    }
                }
            }
        }
    }
}
