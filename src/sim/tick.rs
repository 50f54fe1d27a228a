//! Fixed timestep simulation tick
//!
//! One tick advances tile moves, then exit animations, then the turn state
//! machine. The state machine evaluates at most one phase per tick. Phases
//! that start moves suspend into [`GamePhase::Wait`]; a settle watch posts
//! the follow-up phase into the inbox, and the tick applies it.

use std::collections::VecDeque;

use glam::{IVec2, Vec2};

use super::cascade::{VacatedRows, compact_columns};
use super::destroyer::TileDestroyer;
use super::grid::Grid;
use super::matcher::{MatchSet, find_first_match};
use super::movement::TileMover;
use super::state::{GameEvent, GamePhase, Resume, SettleWatch, TurnState};
use super::tile::{RandomPalette, TileFactory, TileId};
use crate::config::GameConfig;
use crate::consts::FRONT_LAYER_OFFSET;

/// Input for a single tick
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TickInput {
    /// World position of the primary pointer while pressed
    pub pointer: Option<Vec2>,
}

impl TickInput {
    pub fn pointer(world: Vec2) -> Self {
        Self {
            pointer: Some(world),
        }
    }

    pub fn from_source(source: &mut dyn PointerSource) -> Self {
        Self {
            pointer: source.poll_primary_pointer(),
        }
    }
}

/// Raw input supplied by the host
pub trait PointerSource {
    /// World position of the primary pointer if it is pressed this frame
    fn poll_primary_pointer(&mut self) -> Option<Vec2>;
}

/// Replays a fixed pointer sequence, then reports no press
#[derive(Debug, Clone, Default)]
pub struct ScriptedPointer {
    samples: VecDeque<Option<Vec2>>,
}

impl ScriptedPointer {
    pub fn new(samples: impl IntoIterator<Item = Option<Vec2>>) -> Self {
        Self {
            samples: samples.into_iter().collect(),
        }
    }

    pub fn push(&mut self, sample: Option<Vec2>) {
        self.samples.push_back(sample);
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

impl PointerSource for ScriptedPointer {
    fn poll_primary_pointer(&mut self) -> Option<Vec2> {
        self.samples.pop_front().flatten()
    }
}

/// Neighbor of `first` in the direction of `target`, vertical checked first
///
/// Returns `first` itself when `target` is the same cell. Coordinates are
/// compared rather than subtracted, so a pointer mapped to the far edge of
/// `i32` still yields an adjacent cell.
pub fn neighbor_toward(first: IVec2, target: IVec2) -> IVec2 {
    let step = |from: i32, to: i32| i32::from(to > from) - i32::from(to < from);
    let dy = step(first.y, target.y);
    let dx = step(first.x, target.x);
    if dy != 0 {
        first + IVec2::new(0, dy)
    } else if dx != 0 {
        first + IVec2::new(dx, 0)
    } else {
        first
    }
}

/// The whole simulation: board, animations and turn cycle
pub struct Game {
    config: GameConfig,
    grid: Grid,
    mover: TileMover,
    destroyer: TileDestroyer,
    factory: Box<dyn TileFactory>,
    phase: GamePhase,
    turn: TurnState,
    /// Match waiting for `DestroyTiles`
    pending: Option<MatchSet>,
    watch: Option<SettleWatch>,
    inbox: VecDeque<Resume>,
    events: Vec<GameEvent>,
    time_ticks: u64,
    destroy_cycles: u64,
}

impl Game {
    /// Empty board with a seeded random palette; filled on the first tick
    pub fn new(config: GameConfig, seed: u64) -> Self {
        let grid = Grid::from_config(&config);
        Self::with_parts(config, grid, Box::new(RandomPalette::new(seed)), seed)
    }

    /// Game over a prepared board
    ///
    /// The board's own size and validity are used; `config` supplies speeds,
    /// exit animation and poll interval.
    pub fn with_parts(
        config: GameConfig,
        grid: Grid,
        factory: Box<dyn TileFactory>,
        seed: u64,
    ) -> Self {
        let mover = TileMover::new(config.tile_speed);
        let destroyer = TileDestroyer::new(
            config.destroy_speed,
            config.destroy_anchor,
            config.scatter_radius,
            seed.wrapping_add(0x9E37_79B9_7F4A_7C15),
        );
        Self {
            config,
            grid,
            mover,
            destroyer,
            factory,
            phase: GamePhase::Initialize,
            turn: TurnState::default(),
            pending: None,
            watch: None,
            inbox: VecDeque::new(),
            events: Vec::new(),
            time_ticks: 0,
            destroy_cycles: 0,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn mover(&self) -> &TileMover {
        &self.mover
    }

    pub fn destroyer(&self) -> &TileDestroyer {
        &self.destroyer
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn turn(&self) -> TurnState {
        self.turn
    }

    /// Phase the turn resumes in after the current wait
    pub fn resume_phase(&self) -> Option<GamePhase> {
        self.watch.map(|w| w.resume.next)
    }

    pub fn time_ticks(&self) -> u64 {
        self.time_ticks
    }

    /// Number of `DestroyTiles` passes so far
    pub fn destroy_cycles(&self) -> u64 {
        self.destroy_cycles
    }

    /// Events raised by the most recent tick
    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    /// Take the most recent tick's events
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Waiting for a first selection with nothing animating on the board
    pub fn is_idle(&self) -> bool {
        self.phase == GamePhase::SelectFirstTile && !self.mover.is_any_tile_moving()
    }

    /// Advance the simulation by one timestep
    ///
    /// Events from the previous tick are discarded first; read or drain them
    /// between ticks.
    pub fn tick(&mut self, input: &TickInput, dt: f32) {
        self.time_ticks += 1;
        self.events.clear();

        for (tile, cell) in self.mover.update(&mut self.grid, dt) {
            self.events.push(GameEvent::TileArrived { tile, cell });
        }

        for tile in self.destroyer.update(dt, self.factory.as_mut()) {
            self.events.push(GameEvent::TileDisposed { tile });
        }

        self.step(input, dt);
    }

    fn step(&mut self, input: &TickInput, dt: f32) {
        if let Some(watch) = self.watch.as_mut() {
            if let Some(resume) = watch.poll(dt, self.mover.is_any_tile_moving()) {
                self.watch = None;
                self.inbox.push_back(resume);
            }
        }

        if let Some(resume) = self.inbox.pop_front() {
            if resume.clear_selection {
                self.turn.clear();
            }
            self.set_phase(resume.next);
            return;
        }

        match self.phase {
            GamePhase::Initialize => self.initialize(),
            GamePhase::SelectFirstTile => self.select_first_tile(input),
            GamePhase::SelectSecondTile => self.select_second_tile(input),
            GamePhase::SwapFirstSecondTile => self.swap_first_second_tile(),
            GamePhase::ResolveGrid => self.resolve_grid(),
            GamePhase::DestroyTiles => self.destroy_tiles(),
            GamePhase::UndoSwap => self.undo_swap(),
            GamePhase::Wait => {}
        }
    }

    fn set_phase(&mut self, to: GamePhase) {
        let from = self.phase;
        if from == to {
            return;
        }
        log::debug!("Phase {} -> {}", from.as_str(), to.as_str());
        self.phase = to;
        self.events.push(GameEvent::PhaseChanged { from, to });
    }

    /// Enter `Wait`, resuming in `next` once nothing moves
    fn suspend(&mut self, next: GamePhase, clear_selection: bool) {
        self.watch = Some(SettleWatch::new(
            Resume {
                next,
                clear_selection,
            },
            self.config.settle_poll_interval,
        ));
        self.set_phase(GamePhase::Wait);
    }

    fn initialize(&mut self) {
        self.turn.clear();
        self.pending = None;

        for id in self.grid.fill_missing_cells(self.factory.as_mut()) {
            if let Some(tile) = self.grid.tile(id) {
                self.events.push(GameEvent::TileSpawned {
                    tile: id,
                    cell: tile.cell(),
                    color: tile.color,
                });
            }
        }

        self.set_phase(GamePhase::SelectFirstTile);
    }

    fn pointer_cell(&self, input: &TickInput) -> Option<IVec2> {
        input.pointer.map(|world| self.grid.world_to_cell(world))
    }

    fn select_first_tile(&mut self, input: &TickInput) {
        let Some(cell) = self.pointer_cell(input) else {
            return;
        };
        if self.grid.is_valid_position(cell) {
            self.turn.first = Some(cell);
            self.events.push(GameEvent::FirstSelected { cell });
            self.set_phase(GamePhase::SelectSecondTile);
        }
    }

    fn select_second_tile(&mut self, input: &TickInput) {
        let (Some(first), Some(target)) = (self.turn.first, self.pointer_cell(input)) else {
            return;
        };
        let second = neighbor_toward(first, target);
        if self.grid.is_valid_position(second) && second != first {
            self.turn.second = Some(second);
            self.events.push(GameEvent::SecondSelected { cell: second });
            self.set_phase(GamePhase::SwapFirstSecondTile);
        }
    }

    fn tile_at(&self, cell: IVec2) -> TileId {
        match self.grid.id_at(cell) {
            Some(id) => id,
            None => panic!("expected a tile at {cell} in phase {}", self.phase.as_str()),
        }
    }

    /// Exchange the tiles in the selected cells
    ///
    /// The first move clears the first cell right away, so the second lookup
    /// still finds the other tile in its own cell.
    fn swap_selected(&mut self) -> (IVec2, IVec2) {
        let Some((first, second)) = self.turn.pair() else {
            panic!("swap without two selected cells in phase {}", self.phase.as_str());
        };
        let a = self.tile_at(first);
        self.mover
            .move_tile_layered(&mut self.grid, a, second, FRONT_LAYER_OFFSET);
        let b = self.tile_at(second);
        self.mover.move_tile(&mut self.grid, b, first);
        (first, second)
    }

    fn swap_first_second_tile(&mut self) {
        let (first, second) = self.swap_selected();
        self.events.push(GameEvent::SwapStarted { first, second });
        self.suspend(GamePhase::ResolveGrid, false);
    }

    fn resolve_grid(&mut self) {
        if let Some(set) = find_first_match(&self.grid) {
            log::debug!("Found {:?} match of {} {:?} tiles", set.axis, set.len(), set.color);
            self.events.push(GameEvent::match_found(&set));
            self.pending = Some(set);
            self.set_phase(GamePhase::DestroyTiles);
        } else if self.turn.is_unset() {
            self.events.push(GameEvent::TurnSettled);
            self.set_phase(GamePhase::Initialize);
        } else {
            self.set_phase(GamePhase::UndoSwap);
        }
    }

    fn destroy_tiles(&mut self) {
        let Some(set) = self.pending.take() else {
            panic!("DestroyTiles entered without a pending match");
        };

        let mut vacated = VacatedRows::new();
        for id in &set.tiles {
            let Some(tile) = self.grid.detach(*id) else {
                panic!("matched tile {id} is no longer on the board");
            };
            vacated.record(tile.cell());
            self.destroyer.destroy(tile);
        }

        let drops = compact_columns(&mut self.grid, &mut self.mover, &vacated);
        self.destroy_cycles += 1;
        log::info!(
            "Destroy cycle {}: removed {} {:?} tiles, dropped {}",
            self.destroy_cycles,
            set.len(),
            set.color,
            drops.len()
        );
        for (tile, from, to) in drops {
            self.events.push(GameEvent::TileDropped { tile, from, to });
        }

        self.suspend(GamePhase::ResolveGrid, true);
    }

    fn undo_swap(&mut self) {
        let (first, second) = self.swap_selected();
        log::info!("Swap {first} <-> {second} matched nothing, undoing");
        self.events.push(GameEvent::SwapUndone { first, second });
        self.suspend(GamePhase::Initialize, false);
    }
}
