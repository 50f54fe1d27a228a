//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by tile ID, then row-major scans)
//! - No rendering or platform dependencies

pub mod cascade;
pub mod destroyer;
pub mod grid;
pub mod layout;
pub mod matcher;
pub mod movement;
pub mod state;
pub mod tick;
pub mod tile;

pub use cascade::{VacatedRows, compact_columns};
pub use destroyer::TileDestroyer;
pub use grid::{CellValidity, Grid};
pub use layout::{CellLayout, UniformLayout};
pub use matcher::{MatchAxis, MatchSet, connected_run, find_first_match, find_match};
pub use movement::{MoveCompletion, TileMover};
pub use state::{GameEvent, GamePhase, Resume, SettleWatch, TurnState};
pub use tick::{Game, PointerSource, ScriptedPointer, TickInput, neighbor_toward};
pub use tile::{RandomPalette, ScriptedPalette, Tile, TileColor, TileFactory, TileId};
