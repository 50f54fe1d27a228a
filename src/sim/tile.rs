//! Tile entities and the tile factory seam
//!
//! A tile's color is fixed at creation. Its cell coordinates change only when
//! a move completes; its world position changes every tick while animating.

use glam::{IVec2, Vec3};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

/// Stable tile identity (never reused within a game)
pub type TileId = u32;

/// The fixed six-color palette
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TileColor {
    Red,
    Yellow,
    Blue,
    Green,
    Magenta,
    Cyan,
}

impl TileColor {
    pub const ALL: [TileColor; 6] = [
        TileColor::Red,
        TileColor::Yellow,
        TileColor::Blue,
        TileColor::Green,
        TileColor::Magenta,
        TileColor::Cyan,
    ];

    /// Single-letter tag used by board dumps and test layouts
    pub fn as_char(&self) -> char {
        match self {
            TileColor::Red => 'R',
            TileColor::Yellow => 'Y',
            TileColor::Blue => 'B',
            TileColor::Green => 'G',
            TileColor::Magenta => 'M',
            TileColor::Cyan => 'C',
        }
    }

    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'R' => Some(TileColor::Red),
            'Y' => Some(TileColor::Yellow),
            'B' => Some(TileColor::Blue),
            'G' => Some(TileColor::Green),
            'M' => Some(TileColor::Magenta),
            'C' => Some(TileColor::Cyan),
            _ => None,
        }
    }
}

/// A colored tile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    pub id: TileId,
    /// Grid column
    pub x: i32,
    /// Grid row (0 = bottom)
    pub y: i32,
    pub color: TileColor,
    /// World position; `z` is render depth
    pub pos: Vec3,
}

impl Tile {
    pub fn new(id: TileId, cell: IVec2, color: TileColor, pos: Vec3) -> Self {
        Self {
            id,
            x: cell.x,
            y: cell.y,
            color,
            pos,
        }
    }

    #[inline]
    pub fn cell(&self) -> IVec2 {
        IVec2::new(self.x, self.y)
    }
}

/// Source of new tile colors and sink for disposed tiles
///
/// Renderers attach and release visuals by observing game events, so the
/// simulation only needs a color policy here.
pub trait TileFactory {
    /// Color for a tile being created at `cell`
    fn pick_color(&mut self, cell: IVec2) -> TileColor;

    /// Called once a removed tile has finished its exit animation
    fn dispose(&mut self, _tile: &Tile) {}
}

/// Uniform pick from the full palette, seeded for reproducibility
#[derive(Debug, Clone)]
pub struct RandomPalette {
    rng: Pcg32,
}

impl RandomPalette {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
        }
    }
}

impl TileFactory for RandomPalette {
    fn pick_color(&mut self, _cell: IVec2) -> TileColor {
        TileColor::ALL[self.rng.random_range(0..TileColor::ALL.len())]
    }
}

/// Hands out a fixed color sequence, cycling when exhausted
///
/// Used to script boards; `dispose` records what was released.
#[derive(Debug, Clone, Default)]
pub struct ScriptedPalette {
    colors: Vec<TileColor>,
    next: usize,
    pub disposed: Vec<TileId>,
}

impl ScriptedPalette {
    pub fn new(colors: Vec<TileColor>) -> Self {
        Self {
            colors,
            next: 0,
            disposed: Vec::new(),
        }
    }

    /// Build from letters such as `"RGBY"`; unknown letters are ignored
    pub fn from_letters(letters: &str) -> Self {
        Self::new(letters.chars().filter_map(TileColor::from_char).collect())
    }
}

impl TileFactory for ScriptedPalette {
    fn pick_color(&mut self, _cell: IVec2) -> TileColor {
        if self.colors.is_empty() {
            return TileColor::Red;
        }
        let color = self.colors[self.next % self.colors.len()];
        self.next += 1;
        color
    }

    fn dispose(&mut self, tile: &Tile) {
        self.disposed.push(tile.id);
    }
}
