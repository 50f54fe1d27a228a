//! Mapping between world space and grid cells

use glam::{IVec2, Vec2};

/// World <-> cell conversion supplied by the host
pub trait CellLayout {
    /// Cell containing a world position (may be out of bounds)
    fn world_to_cell(&self, world: Vec2) -> IVec2;
    /// World position of a cell's anchor corner
    fn cell_to_world(&self, cell: IVec2) -> Vec2;
}

/// Square cells laid out from `origin`, +y up
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UniformLayout {
    pub origin: Vec2,
    pub cell_size: f32,
}

impl UniformLayout {
    pub fn new(origin: Vec2, cell_size: f32) -> Self {
        Self { origin, cell_size }
    }
}

impl Default for UniformLayout {
    fn default() -> Self {
        Self::new(Vec2::ZERO, 1.0)
    }
}

impl CellLayout for UniformLayout {
    fn world_to_cell(&self, world: Vec2) -> IVec2 {
        ((world - self.origin) / self.cell_size).floor().as_ivec2()
    }

    fn cell_to_world(&self, cell: IVec2) -> Vec2 {
        self.origin + cell.as_vec2() * self.cell_size
    }
}
