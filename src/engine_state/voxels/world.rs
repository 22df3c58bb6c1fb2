//! # World Module
//!
//! The voxel world is a single, flat layer of blocks: a square grid of cells
//! addressed by `(x, z)`, each either empty or holding a [`BlockId`].
//!
//! ## Coordinates
//!
//! Cell `(0, 0)` is the north-west corner. When meshed, the grid is centred on
//! the world origin, so cell `(x, z)` occupies world X `x - width / 2` and
//! world Z `z - width / 2`, sitting on top of the plane elevation `plane_y`.
//!
//! Coordinates outside `[0, width)` are always empty: reads return `None` and
//! writes are ignored.

use super::block::block_registry::BlockId;

/// Default side length of the grid, in cells.
pub const DEFAULT_WORLD_WIDTH: usize = 64;

/// A square, single-layer grid of optional block references.
///
/// The grid does not own the blocks it refers to; they live in a
/// [`BlockRegistry`](super::block::block_registry::BlockRegistry).
#[derive(Clone, Debug, PartialEq)]
pub struct VoxelGrid {
    width: usize,
    plane_y: i32,
    cells: Vec<Option<BlockId>>,
}

impl VoxelGrid {
    /// Creates an empty grid.
    ///
    /// # Arguments
    /// * `width` - Side length in cells
    /// * `plane_y` - World elevation of the bottom of the layer
    pub fn new(width: usize, plane_y: i32) -> Self {
        Self {
            width,
            plane_y,
            cells: vec![None; width * width],
        }
    }

    /// Side length in cells.
    pub fn width(&self) -> usize {
        self.width
    }

    /// World elevation of the bottom of the layer.
    pub fn plane_y(&self) -> i32 {
        self.plane_y
    }

    fn cell_index(&self, x: i32, z: i32) -> Option<usize> {
        let width = self.width as i64;
        let (x, z) = (x as i64, z as i64);
        if x < 0 || z < 0 || x >= width || z >= width {
            return None;
        }
        Some((x + z * width) as usize)
    }

    /// Gets the block at `(x, z)`, `None` if the cell is empty or out of bounds.
    pub fn get_block_at(&self, x: i32, z: i32) -> Option<BlockId> {
        self.cell_index(x, z).and_then(|index| self.cells[index])
    }

    /// Sets or clears the block at `(x, z)`. Out of bounds writes are ignored.
    ///
    /// # Returns
    /// `true` if the cell changed and the mesh needs rebuilding
    pub fn set_block_at(&mut self, x: i32, z: i32, block: Option<BlockId>) -> bool {
        match self.cell_index(x, z) {
            Some(index) if self.cells[index] != block => {
                self.cells[index] = block;
                true
            }
            _ => false,
        }
    }

    /// Whether `(x, z)` is empty. Out of bounds cells are empty.
    pub fn is_empty_at(&self, x: i32, z: i32) -> bool {
        self.get_block_at(x, z).is_none()
    }

    /// Puts `block` in every cell.
    pub fn fill(&mut self, block: BlockId) {
        self.cells.fill(Some(block));
    }

    /// Empties every cell.
    pub fn clear(&mut self) {
        self.cells.fill(None);
    }

    /// Number of occupied cells.
    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_some()).count()
    }

    /// Iterates over occupied cells as `(x, z, block)`, rows of increasing `z`
    /// with `x` increasing within a row.
    pub fn occupied_cells(&self) -> impl Iterator<Item = (i32, i32, BlockId)> + '_ {
        let width = self.width.max(1);
        self.cells.iter().enumerate().filter_map(move |(index, cell)| {
            cell.map(|block| ((index % width) as i32, (index / width) as i32, block))
        })
    }
}

impl Default for VoxelGrid {
    fn default() -> Self {
        Self::new(DEFAULT_WORLD_WIDTH, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::block::{block_registry::BlockRegistry, Block};

    fn stone() -> BlockId {
        BlockRegistry::new().register(Block::new("Stone"))
    }

    #[test]
    fn new_grid_is_empty() {
        let grid = VoxelGrid::new(8, 0);
        assert_eq!(grid.occupied_count(), 0);
        assert!(grid.is_empty_at(3, 3));
    }

    #[test]
    fn set_then_get_round_trips_in_bounds() {
        let mut grid = VoxelGrid::new(8, 0);
        assert!(grid.set_block_at(2, 5, Some(stone())));
        assert_eq!(grid.get_block_at(2, 5), Some(stone()));
        assert_eq!(grid.get_block_at(5, 2), None);
    }

    #[test]
    fn out_of_bounds_reads_are_empty_and_writes_ignored() {
        let mut grid = VoxelGrid::new(4, 0);
        grid.fill(stone());

        for (x, z) in [(-1, 0), (0, -1), (4, 0), (0, 4), (i32::MIN, i32::MAX)] {
            assert_eq!(grid.get_block_at(x, z), None);
            assert!(!grid.set_block_at(x, z, None));
        }
        assert_eq!(grid.occupied_count(), 16);
    }

    #[test]
    fn writing_same_value_reports_no_change() {
        let mut grid = VoxelGrid::new(4, 0);
        assert!(grid.set_block_at(1, 1, Some(stone())));
        assert!(!grid.set_block_at(1, 1, Some(stone())));
        assert!(grid.set_block_at(1, 1, None));
    }

    #[test]
    fn occupied_cells_are_row_major() {
        let mut grid = VoxelGrid::new(3, 0);
        grid.set_block_at(2, 0, Some(stone()));
        grid.set_block_at(0, 1, Some(stone()));
        grid.set_block_at(1, 0, Some(stone()));

        let cells: Vec<(i32, i32)> = grid.occupied_cells().map(|(x, z, _)| (x, z)).collect();
        assert_eq!(cells, vec![(1, 0), (2, 0), (0, 1)]);
    }

    #[test]
    fn clear_empties_every_cell() {
        let mut grid = VoxelGrid::new(5, 2);
        grid.fill(stone());
        grid.clear();
        assert_eq!(grid.occupied_count(), 0);
        assert_eq!(grid.plane_y(), 2);
    }
}
