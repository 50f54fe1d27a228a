//! Exit animation for removed tiles
//!
//! Each removed tile scatters to a random nearby point, then converges on
//! the anchor and is disposed. Runs independently of the grid and the turn
//! cycle; the state machine never waits on it.

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::tile::{Tile, TileFactory, TileId};

/// Steps toward a target, re-aiming each tick, until distance stops shrinking
#[derive(Debug, Clone)]
struct ExitMover {
    tile: Tile,
    dest: Vec3,
    last_distance: f32,
}

impl ExitMover {
    fn new(tile: Tile, dest: Vec3) -> Self {
        Self {
            tile,
            dest,
            last_distance: f32::MAX,
        }
    }

    /// Returns true once the tile has arrived
    fn step(&mut self, speed: f32, dt: f32) -> bool {
        let offset = self.dest - self.tile.pos;
        let distance = offset.length();
        if distance < self.last_distance {
            self.last_distance = distance;
            self.tile.pos += offset.normalize_or_zero() * speed * dt;
            false
        } else {
            true
        }
    }
}

#[derive(Debug, Clone)]
pub struct TileDestroyer {
    speed: f32,
    anchor: Vec3,
    scatter_radius: f32,
    rng: Pcg32,
    /// Phase one, dropped as soon as they arrive
    scattering: Vec<ExitMover>,
    /// Phase two, disposed on arrival
    converging: Vec<ExitMover>,
}

impl TileDestroyer {
    pub fn new(speed: f32, anchor: Vec3, scatter_radius: f32, seed: u64) -> Self {
        Self {
            speed,
            anchor,
            scatter_radius,
            rng: Pcg32::seed_from_u64(seed),
            scattering: Vec::new(),
            converging: Vec::new(),
        }
    }

    pub fn anchor(&self) -> Vec3 {
        self.anchor
    }

    /// Take ownership of a removed tile and start its exit
    pub fn destroy(&mut self, mut tile: Tile) {
        tile.pos.z = self.anchor.z;
        let r = self.scatter_radius;
        let offset = Vec3::new(
            self.rng.random_range(-r..=r),
            self.rng.random_range(-r..=r),
            0.0,
        );
        let dest = tile.pos + offset;
        log::debug!("Tile {} scattering to {dest}", tile.id);
        self.scattering.push(ExitMover::new(tile, dest));
    }

    /// Advance every exit; returns ids disposed this tick
    pub fn update(&mut self, dt: f32, factory: &mut dyn TileFactory) -> Vec<TileId> {
        let speed = self.speed;
        let anchor = self.anchor;

        let mut i = 0;
        while i < self.scattering.len() {
            if self.scattering[i].step(speed, dt) {
                let mover = self.scattering.swap_remove(i);
                self.converging.push(ExitMover::new(mover.tile, anchor));
            } else {
                i += 1;
            }
        }

        let mut disposed = Vec::new();
        let mut i = 0;
        while i < self.converging.len() {
            if self.converging[i].step(speed, dt) {
                let mover = self.converging.remove(i);
                factory.dispose(&mover.tile);
                disposed.push(mover.tile.id);
            } else {
                i += 1;
            }
        }
        disposed
    }

    /// Whether any removed tile is still animating
    pub fn is_busy(&self) -> bool {
        !self.scattering.is_empty() || !self.converging.is_empty()
    }

    pub fn scattering_count(&self) -> usize {
        self.scattering.len()
    }

    pub fn converging_count(&self) -> usize {
        self.converging.len()
    }

    /// Tiles currently owned by the sequencer
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.scattering.iter().chain(&self.converging).map(|m| &m.tile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::sim::tile::{ScriptedPalette, TileColor};
    use glam::IVec2;

    fn tile(id: TileId, x: f32, y: f32) -> Tile {
        Tile::new(id, IVec2::ZERO, TileColor::Red, Vec3::new(x, y, 0.0))
    }

    #[test]
    fn test_scatter_then_converge_then_dispose() {
        let anchor = Vec3::new(-3.0, -3.0, -5.0);
        let mut destroyer = TileDestroyer::new(20.0, anchor, 1.0, 3);
        let mut palette = ScriptedPalette::default();
        destroyer.destroy(tile(7, 2.0, 2.0));
        assert_eq!(destroyer.scattering_count(), 1);
        assert_eq!(destroyer.tiles().next().unwrap().pos.z, anchor.z);

        let mut saw_converging = false;
        let mut ticks = 0;
        while destroyer.is_busy() {
            let disposed = destroyer.update(SIM_DT, &mut palette);
            if destroyer.converging_count() > 0 {
                saw_converging = true;
                assert_eq!(destroyer.scattering_count(), 0);
            }
            if !disposed.is_empty() {
                assert_eq!(disposed, vec![7]);
            }
            ticks += 1;
            assert!(ticks < 10_000);
        }

        assert!(saw_converging);
        assert_eq!(palette.disposed, vec![7]);
    }

    #[test]
    fn test_tile_ends_near_anchor() {
        let mut destroyer = TileDestroyer::new(6.0, Vec3::new(4.0, 0.0, -1.0), 0.5, 11);
        let anchor = destroyer.anchor();
        let mut palette = ScriptedPalette::default();
        destroyer.destroy(tile(1, 0.0, 0.0));

        let mut last_pos = Vec3::ZERO;
        while destroyer.is_busy() {
            if let Some(t) = destroyer.tiles().next() {
                last_pos = t.pos;
            }
            destroyer.update(SIM_DT, &mut palette);
        }
        assert!(last_pos.distance(anchor) <= 6.0 * SIM_DT + 1e-4);
    }

    #[test]
    fn test_zero_scatter_still_completes() {
        let mut destroyer = TileDestroyer::new(10.0, Vec3::ZERO, 0.0, 1);
        let mut palette = ScriptedPalette::default();
        destroyer.destroy(tile(2, 1.0, 0.0));
        let mut ticks = 0;
        while destroyer.is_busy() {
            destroyer.update(SIM_DT, &mut palette);
            ticks += 1;
            assert!(ticks < 1_000);
        }
        assert_eq!(palette.disposed, vec![2]);
    }

    #[test]
    fn test_many_tiles_all_disposed() {
        let mut destroyer = TileDestroyer::new(15.0, Vec3::new(0.0, -2.0, 0.0), 1.0, 5);
        let mut palette = ScriptedPalette::default();
        for id in 1..=6 {
            destroyer.destroy(tile(id, id as f32, 3.0));
        }
        while destroyer.is_busy() {
            destroyer.update(SIM_DT, &mut palette);
        }
        let mut disposed = palette.disposed.clone();
        disposed.sort_unstable();
        assert_eq!(disposed, (1..=6).collect::<Vec<_>>());
    }
}
