//! Tile movement controller
//!
//! Constant-speed, straight-line moves from a tile's current world position
//! to a destination cell. The source cell is released when the move starts;
//! the destination cell is claimed when it finishes. A move finishes on the
//! first tick where the remaining distance stops shrinking, so overshoot
//! counts as arrival regardless of timestep size.

use glam::{IVec2, Vec3};

use super::grid::Grid;
use super::tile::TileId;
use crate::consts::DEFAULT_LAYER_OFFSET;

/// Runs synchronously in the tick that detects arrival
pub type MoveCompletion = Box<dyn FnOnce(&mut Grid, TileId)>;

/// One in-flight move
struct ActiveMove {
    tile: TileId,
    dest: IVec2,
    /// Position along the path, at the move's layer depth
    pos: Vec3,
    dest_pos: Vec3,
    /// Depth to restore on arrival
    original_z: f32,
    velocity: Vec3,
    last_distance: f32,
    on_complete: Option<MoveCompletion>,
}

impl ActiveMove {
    /// Advance one step; returns true on arrival
    fn step(&mut self, dt: f32) -> bool {
        self.pos += self.velocity * dt;
        let distance = self.dest_pos.distance(self.pos);
        if distance >= self.last_distance {
            self.pos = self.dest_pos.truncate().extend(self.original_z);
            return true;
        }
        self.last_distance = distance;
        false
    }
}

/// Set of concurrently animating tiles
pub struct TileMover {
    speed: f32,
    moves: Vec<ActiveMove>,
}

impl std::fmt::Debug for TileMover {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TileMover")
            .field("speed", &self.speed)
            .field("active", &self.moves.len())
            .finish()
    }
}

impl TileMover {
    pub fn new(speed: f32) -> Self {
        Self {
            speed,
            moves: Vec::new(),
        }
    }

    /// Move a tile to `dest` with the default layer offset
    pub fn move_tile(&mut self, grid: &mut Grid, tile: TileId, dest: IVec2) {
        self.move_tile_layered(grid, tile, dest, DEFAULT_LAYER_OFFSET);
    }

    /// Move a tile to `dest`, drawn at `layer_offset` relative depth meanwhile
    ///
    /// The tile's cell is cleared now. On arrival the tile is placed in
    /// `dest` and its coordinates updated.
    pub fn move_tile_layered(&mut self, grid: &mut Grid, tile: TileId, dest: IVec2, layer_offset: f32) {
        self.move_tile_then(
            grid,
            tile,
            dest,
            layer_offset,
            Box::new(move |grid: &mut Grid, id: TileId| grid.place(dest, id)),
        );
    }

    /// Start a move with a custom completion
    ///
    /// Panics if the tile does not exist; moving a missing tile means the
    /// caller's view of the grid is already broken.
    pub fn move_tile_then(
        &mut self,
        grid: &mut Grid,
        tile: TileId,
        dest: IVec2,
        layer_offset: f32,
        on_complete: MoveCompletion,
    ) {
        let Some(target) = grid.tile(tile) else {
            panic!("move_tile called with missing tile {tile} (dest {dest})");
        };
        let source = target.cell();
        let original_z = target.pos.z;
        let layer_z = original_z + layer_offset;
        let pos = target.pos.truncate().extend(layer_z);
        let dest_pos = grid.cell_to_world_3d(dest, layer_z);

        if grid.id_at(source) == Some(tile) {
            grid.clear(source);
        }

        let distance = dest_pos.distance(pos);
        if distance <= f32::EPSILON {
            log::debug!("Tile {tile} already at {dest}, completing move immediately");
            if let Some(t) = grid.tile_mut(tile) {
                t.pos = dest_pos.truncate().extend(original_z);
            }
            on_complete(grid, tile);
            return;
        }

        log::debug!("Tile {tile} moving {source} -> {dest} ({distance:.2} units)");
        self.moves.push(ActiveMove {
            tile,
            dest,
            pos,
            dest_pos,
            original_z,
            velocity: (dest_pos - pos).normalize() * self.speed,
            last_distance: distance,
            on_complete: Some(on_complete),
        });
    }

    /// Advance every active move; returns tiles that arrived, in arrival order
    pub fn update(&mut self, grid: &mut Grid, dt: f32) -> Vec<(TileId, IVec2)> {
        let mut arrived = Vec::new();
        let mut i = 0;
        while i < self.moves.len() {
            let done = self.moves[i].step(dt);
            let m = &self.moves[i];
            if let Some(tile) = grid.tile_mut(m.tile) {
                tile.pos = m.pos;
            }
            if done {
                let mut finished = self.moves.remove(i);
                if let Some(on_complete) = finished.on_complete.take() {
                    on_complete(grid, finished.tile);
                }
                arrived.push((finished.tile, finished.dest));
            } else {
                i += 1;
            }
        }
        arrived
    }

    pub fn is_any_tile_moving(&self) -> bool {
        !self.moves.is_empty()
    }

    pub fn is_tile_moving(&self, tile: TileId) -> bool {
        self.moves.iter().any(|m| m.tile == tile)
    }

    pub fn active_count(&self) -> usize {
        self.moves.len()
    }
}
