//! Tile Cascade headless runner
//!
//! Plays the simulation with a random gesture bot at a fixed timestep and
//! logs what happens. Useful for soak testing and for eyeballing cascades.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use glam::{IVec2, Vec2};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use tile_cascade::GameConfig;
use tile_cascade::consts::SIM_DT;
use tile_cascade::sim::{Game, GameEvent, PointerSource, ScriptedPointer, TickInput};

/// Headless match-3 simulation runner.
#[derive(Debug, Parser)]
#[command(name = "tile-cascade", version, about)]
struct Args {
    /// JSON config file. Built-in defaults when omitted.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Seed for tile colors, exit scatter and the gesture bot.
    #[arg(short, long, default_value = "1")]
    seed: u64,

    /// Number of swaps the bot attempts before stopping.
    #[arg(short, long, default_value = "20")]
    turns: u32,

    /// Hard cap on simulation ticks.
    #[arg(long, default_value = "200000")]
    ticks: u64,

    /// Timestep in seconds.
    #[arg(long, default_value_t = SIM_DT)]
    dt: f32,

    /// Print the effective config as JSON and exit.
    #[arg(long)]
    dump_config: bool,
}

/// Presses a random playable cell, then drags toward a random neighbor
struct GestureBot {
    rng: Pcg32,
    script: ScriptedPointer,
}

impl GestureBot {
    fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            script: ScriptedPointer::default(),
        }
    }

    /// Queue a press and drag; false when the board has no playable pair
    fn queue_swap(&mut self, game: &Game) -> bool {
        let grid = game.grid();
        let visible_rows = game.config().max_visible_row;
        let cell = IVec2::new(
            self.rng.random_range(0..grid.width()),
            self.rng.random_range(0..visible_rows),
        );
        let dirs: Vec<IVec2> = [IVec2::X, IVec2::NEG_X, IVec2::Y, IVec2::NEG_Y]
            .into_iter()
            .filter(|d| grid.is_valid_position(cell + *d))
            .collect();
        if dirs.is_empty() {
            return false;
        }
        let dir = dirs[self.rng.random_range(0..dirs.len())];
        let half = Vec2::splat(game.config().cell_size * 0.5);
        log::debug!("Bot swipes {cell} toward {}", cell + dir);
        self.script.push(Some(grid.cell_to_world(cell) + half));
        self.script.push(Some(grid.cell_to_world(cell + dir) + half));
        self.script.push(None);
        true
    }

    fn is_idle(&self) -> bool {
        self.script.is_empty()
    }
}

impl PointerSource for GestureBot {
    fn poll_primary_pointer(&mut self) -> Option<Vec2> {
        self.script.poll_primary_pointer()
    }
}

#[derive(Debug, Default)]
struct Summary {
    swaps: u32,
    undone: u32,
    matches: u32,
    tiles_removed: usize,
}

impl Summary {
    fn record(&mut self, event: &GameEvent) {
        match event {
            GameEvent::SwapStarted { first, second } => {
                self.swaps += 1;
                log::info!("Swap #{}: {first} <-> {second}", self.swaps);
            }
            GameEvent::SwapUndone { .. } => self.undone += 1,
            GameEvent::MatchFound { color, axis, tiles } => {
                self.matches += 1;
                self.tiles_removed += tiles.len();
                log::info!("  {axis:?} match: {} x {color:?}", tiles.len());
            }
            _ => {}
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = match &args.config {
        // Validated while loading
        Some(path) => GameConfig::load(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => {
            let config = GameConfig::default();
            config.validate().context("invalid default config")?;
            config
        }
    };

    if args.dump_config {
        println!("{}", config.to_json()?);
        return Ok(());
    }

    log::info!(
        "Starting {}x{} board (seed {}, {} turns)",
        config.width,
        config.max_visible_row,
        args.seed,
        args.turns
    );

    let mut game = Game::new(config, args.seed);
    let mut bot = GestureBot::new(args.seed.wrapping_mul(31).wrapping_add(7));
    let mut summary = Summary::default();

    while game.time_ticks() < args.ticks {
        if game.is_idle() && bot.is_idle() {
            if summary.swaps >= args.turns {
                break;
            }
            if !bot.queue_swap(&game) {
                log::warn!("Board has no adjacent playable cells, stopping");
                break;
            }
        }
        let input = TickInput::from_source(&mut bot);
        game.tick(&input, args.dt);
        for event in game.drain_events() {
            summary.record(&event);
        }
    }

    log::info!(
        "Finished after {} ticks: {} swaps, {} undone, {} matches, {} tiles removed, {} destroy cycles",
        game.time_ticks(),
        summary.swaps,
        summary.undone,
        summary.matches,
        summary.tiles_removed,
        game.destroy_cycles()
    );
    for row in game.grid().rows() {
        log::info!("  {row}");
    }

    Ok(())
}
