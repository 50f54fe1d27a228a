//! Turn state, phases and events
//!
//! Everything the state machine carries between ticks lives here.

use glam::IVec2;
use serde::{Deserialize, Serialize};

use super::matcher::{MatchAxis, MatchSet};
use super::tile::{TileColor, TileId};

/// Current phase of the turn cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Reset selections and refill empty cells
    Initialize,
    /// Waiting for the player to pick a cell
    SelectFirstTile,
    /// Waiting for a drag toward a neighboring cell
    SelectSecondTile,
    /// Start the swap moves
    SwapFirstSecondTile,
    /// Look for a match anywhere on the board
    ResolveGrid,
    /// Remove the pending match and drop columns
    DestroyTiles,
    /// Swap back after a swap that matched nothing
    UndoSwap,
    /// Suspended until every tile move has finished
    Wait,
}

impl GamePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            GamePhase::Initialize => "Initialize",
            GamePhase::SelectFirstTile => "SelectFirstTile",
            GamePhase::SelectSecondTile => "SelectSecondTile",
            GamePhase::SwapFirstSecondTile => "SwapFirstSecondTile",
            GamePhase::ResolveGrid => "ResolveGrid",
            GamePhase::DestroyTiles => "DestroyTiles",
            GamePhase::UndoSwap => "UndoSwap",
            GamePhase::Wait => "Wait",
        }
    }
}

/// The two selected cells of the current turn
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnState {
    pub first: Option<IVec2>,
    pub second: Option<IVec2>,
}

impl TurnState {
    pub fn clear(&mut self) {
        self.first = None;
        self.second = None;
    }

    pub fn is_unset(&self) -> bool {
        self.first.is_none() && self.second.is_none()
    }

    /// Both cells, when a swap is pending
    pub fn pair(&self) -> Option<(IVec2, IVec2)> {
        self.first.zip(self.second)
    }
}

/// Where the turn goes once movement settles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resume {
    pub next: GamePhase,
    /// Forget the selected cells before resuming
    pub clear_selection: bool,
}

/// Cooperative poller owned by the state machine while in [`GamePhase::Wait`]
///
/// Checks for settled movement on the first waiting tick and then every
/// `interval` seconds. It never writes the phase itself; it hands back a
/// [`Resume`] for the tick to apply.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SettleWatch {
    pub resume: Resume,
    pub interval: f32,
    next_check_in: f32,
}

impl SettleWatch {
    pub fn new(resume: Resume, interval: f32) -> Self {
        Self {
            resume,
            interval,
            next_check_in: 0.0,
        }
    }

    /// Advance by `dt`; returns the resume once a check sees nothing moving
    pub fn poll(&mut self, dt: f32, moving: bool) -> Option<Resume> {
        self.next_check_in -= dt;
        if self.next_check_in > 0.0 {
            return None;
        }
        if moving {
            self.next_check_in = self.interval;
            None
        } else {
            Some(self.resume)
        }
    }
}

/// Notifications for observers (renderers, audio, logging)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    PhaseChanged {
        from: GamePhase,
        to: GamePhase,
    },
    TileSpawned {
        tile: TileId,
        cell: IVec2,
        color: TileColor,
    },
    FirstSelected {
        cell: IVec2,
    },
    SecondSelected {
        cell: IVec2,
    },
    SwapStarted {
        first: IVec2,
        second: IVec2,
    },
    TileArrived {
        tile: TileId,
        cell: IVec2,
    },
    MatchFound {
        color: TileColor,
        axis: MatchAxis,
        tiles: Vec<TileId>,
    },
    TileDropped {
        tile: TileId,
        from: IVec2,
        to: IVec2,
    },
    TileDisposed {
        tile: TileId,
    },
    SwapUndone {
        first: IVec2,
        second: IVec2,
    },
    /// A resolution cycle ended with no matches left
    TurnSettled,
}

impl GameEvent {
    pub fn match_found(set: &MatchSet) -> Self {
        GameEvent::MatchFound {
            color: set.color,
            axis: set.axis,
            tiles: set.tiles.clone(),
        }
    }
}
