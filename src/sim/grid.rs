//! Grid store: cell -> tile mapping plus the tiles themselves
//!
//! Tiles are owned by the grid while resident or mid-move. A cell is cleared
//! eagerly when its tile starts moving, so during a move the tile exists in
//! `tiles` without occupying any cell.

use std::collections::BTreeMap;
use std::fmt;

use glam::{IVec2, Vec2, Vec3};

use super::layout::{CellLayout, UniformLayout};
use super::tile::{Tile, TileColor, TileFactory, TileId};
use crate::config::GameConfig;

/// Which cells count as playable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellValidity {
    /// Every stored cell
    Full,
    /// Only rows below the given row; rows above are a hidden buffer
    VisibleRows(i32),
}

pub struct Grid {
    width: i32,
    height: i32,
    validity: CellValidity,
    layout: Box<dyn CellLayout>,
    /// Column-major
    cells: Vec<Option<TileId>>,
    tiles: BTreeMap<TileId, Tile>,
    next_id: TileId,
}

impl fmt::Debug for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Grid")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("validity", &self.validity)
            .field("tiles", &self.tiles.len())
            .finish()
    }
}

impl Grid {
    pub fn new(
        width: i32,
        height: i32,
        validity: CellValidity,
        layout: Box<dyn CellLayout>,
    ) -> Self {
        assert!(width > 0 && height > 0, "grid must be at least 1x1");
        Self {
            width,
            height,
            validity,
            layout,
            cells: vec![None; (width * height) as usize],
            tiles: BTreeMap::new(),
            next_id: 1,
        }
    }

    /// Empty grid with the config's size, visibility and uniform layout
    pub fn from_config(config: &GameConfig) -> Self {
        let validity = if config.has_hidden_rows() {
            CellValidity::VisibleRows(config.max_visible_row)
        } else {
            CellValidity::Full
        };
        Self::new(
            config.width,
            config.height,
            validity,
            Box::new(UniformLayout::new(config.origin, config.cell_size)),
        )
    }

    /// Build a fully visible grid from a picture, top row first
    ///
    /// Letters are palette colors (see [`TileColor::from_char`]); anything
    /// else is an empty cell. Rows shorter than the widest row are padded
    /// with empty cells.
    pub fn from_rows(rows: &[&str]) -> Self {
        let height = rows.len().max(1) as i32;
        let width = rows
            .iter()
            .map(|r| r.chars().count())
            .max()
            .unwrap_or(0)
            .max(1) as i32;
        let mut grid = Self::new(
            width,
            height,
            CellValidity::Full,
            Box::new(UniformLayout::default()),
        );
        for (row_index, row) in rows.iter().enumerate() {
            let y = height - 1 - row_index as i32;
            for (x, c) in row.chars().enumerate() {
                if let Some(color) = TileColor::from_char(c) {
                    grid.spawn_tile(IVec2::new(x as i32, y), color);
                }
            }
        }
        grid
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn validity(&self) -> CellValidity {
        self.validity
    }

    pub fn set_validity(&mut self, validity: CellValidity) {
        self.validity = validity;
    }

    #[inline]
    pub fn in_bounds(&self, cell: IVec2) -> bool {
        cell.x >= 0 && cell.x < self.width && cell.y >= 0 && cell.y < self.height
    }

    /// Whether a cell is playable (selectable and matchable)
    pub fn is_valid_position(&self, cell: IVec2) -> bool {
        match self.validity {
            CellValidity::Full => self.in_bounds(cell),
            CellValidity::VisibleRows(max_row) => self.in_bounds(cell) && cell.y < max_row,
        }
    }

    fn idx(&self, cell: IVec2) -> usize {
        (cell.x * self.height + cell.y) as usize
    }

    /// Tile id in a cell; out of bounds reads as empty
    pub fn id_at(&self, cell: IVec2) -> Option<TileId> {
        if self.in_bounds(cell) {
            self.cells[self.idx(cell)]
        } else {
            None
        }
    }

    /// Tile in a cell; out of bounds reads as empty
    pub fn get(&self, cell: IVec2) -> Option<&Tile> {
        self.id_at(cell).and_then(|id| self.tiles.get(&id))
    }

    pub fn tile(&self, id: TileId) -> Option<&Tile> {
        self.tiles.get(&id)
    }

    pub fn tile_mut(&mut self, id: TileId) -> Option<&mut Tile> {
        self.tiles.get_mut(&id)
    }

    /// All owned tiles, resident or mid-move, in id order
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.values()
    }

    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    /// Put a tile into a cell and sync its coordinates
    ///
    /// Out-of-bounds cells and unknown ids are logic errors.
    pub fn place(&mut self, cell: IVec2, id: TileId) {
        assert!(self.in_bounds(cell), "place outside grid at {cell}");
        let idx = self.idx(cell);
        let Some(tile) = self.tiles.get_mut(&id) else {
            panic!("place of unknown tile {id} at {cell}");
        };
        tile.x = cell.x;
        tile.y = cell.y;
        self.cells[idx] = Some(id);
    }

    /// Empty a cell, returning what it held
    pub fn clear(&mut self, cell: IVec2) -> Option<TileId> {
        if !self.in_bounds(cell) {
            return None;
        }
        let idx = self.idx(cell);
        self.cells[idx].take()
    }

    /// Create a tile resting in `cell`
    pub fn spawn_tile(&mut self, cell: IVec2, color: TileColor) -> TileId {
        let id = self.next_id;
        self.next_id += 1;
        let pos = self.cell_to_world(cell).extend(0.0);
        self.tiles.insert(id, Tile::new(id, cell, color, pos));
        self.place(cell, id);
        id
    }

    /// Give every empty cell a new tile; returns the created ids
    ///
    /// A full grid is left untouched.
    pub fn fill_missing_cells(&mut self, factory: &mut dyn TileFactory) -> Vec<TileId> {
        let mut created = Vec::new();
        for y in 0..self.height {
            for x in 0..self.width {
                let cell = IVec2::new(x, y);
                if self.id_at(cell).is_none() {
                    let color = factory.pick_color(cell);
                    created.push(self.spawn_tile(cell, color));
                }
            }
        }
        if !created.is_empty() {
            log::debug!("Filled {} empty cells", created.len());
        }
        created
    }

    /// Remove a tile from the grid entirely, handing ownership to the caller
    pub fn detach(&mut self, id: TileId) -> Option<Tile> {
        let tile = self.tiles.remove(&id)?;
        if self.id_at(tile.cell()) == Some(id) {
            self.clear(tile.cell());
        }
        Some(tile)
    }

    #[inline]
    pub fn cell_to_world(&self, cell: IVec2) -> Vec2 {
        self.layout.cell_to_world(cell)
    }

    #[inline]
    pub fn world_to_cell(&self, world: Vec2) -> IVec2 {
        self.layout.world_to_cell(world)
    }

    /// World position of a cell at a given depth
    pub fn cell_to_world_3d(&self, cell: IVec2, z: f32) -> Vec3 {
        self.cell_to_world(cell).extend(z)
    }

    /// Every occupied cell holds a tile that reports that cell
    pub fn is_consistent(&self) -> bool {
        (0..self.width).all(|x| {
            (0..self.height).all(|y| {
                let cell = IVec2::new(x, y);
                match self.id_at(cell) {
                    Some(id) => self.tiles.get(&id).is_some_and(|t| t.cell() == cell),
                    None => true,
                }
            })
        })
    }

    /// Colors column-major, for comparisons and hashing
    pub fn colors(&self) -> Vec<Option<TileColor>> {
        self.cells
            .iter()
            .map(|slot| slot.and_then(|id| self.tiles.get(&id)).map(|t| t.color))
            .collect()
    }

    /// Picture of the board, top row first, matching [`Grid::from_rows`]
    pub fn rows(&self) -> Vec<String> {
        (0..self.height)
            .rev()
            .map(|y| {
                (0..self.width)
                    .map(|x| {
                        self.get(IVec2::new(x, y))
                            .map_or('.', |t| t.color.as_char())
                    })
                    .collect()
            })
            .collect()
    }
}
