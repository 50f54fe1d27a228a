//! Tile Cascade - simulation core for a match-3 swapping puzzle
//!
//! Core modules:
//! - `sim`: Deterministic simulation (grid, movement, matching, turn cycle)
//! - `config`: Data-driven board and animation settings

pub mod config;
pub mod sim;

pub use config::{ConfigError, GameConfig};
pub use sim::{Game, GameEvent, GamePhase, TickInput};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz, one tick per frame)
    pub const SIM_DT: f32 = 1.0 / 60.0;

    /// Default board dimensions
    pub const DEFAULT_WIDTH: i32 = 8;
    pub const DEFAULT_HEIGHT: i32 = 8;

    /// Tile movement speed in world units per second
    pub const DEFAULT_TILE_SPEED: f32 = 10.0;
    /// Exit animation speed in world units per second
    pub const DEFAULT_DESTROY_SPEED: f32 = 10.0;

    /// How often a suspended turn re-checks for settled movement (seconds)
    pub const SETTLE_POLL_INTERVAL: f32 = 0.1;

    /// Depth offset applied while a tile moves normally
    pub const DEFAULT_LAYER_OFFSET: f32 = 1.0;
    /// Depth offset for the leading tile of a swap (lower depth draws in front)
    pub const FRONT_LAYER_OFFSET: f32 = -1.0;

    /// Smallest number of tiles that counts as a match
    pub const MIN_MATCH: usize = 3;
}
