//! # Block Module
//!
//! This module provides the block records of the voxel engine: identity,
//! physical flags and the atlas tile used by each face.

use block_side::{BlockSide, SIDE_COUNT};
use cgmath::Vector3;

pub mod block_registry;
pub mod block_side;
pub mod block_type;

/// Numeric id of a block that was never given one.
pub const UNSET_NUMERIC_ID: i32 = -1;

/// Describes one type of voxel block.
///
/// Blocks are owned by a [`block_registry::BlockRegistry`]; the grid only
/// stores their [`block_registry::BlockId`].
///
/// The tile table always holds one atlas tile index per [`BlockSide`], in the
/// order [TOP, BOTTOM, NORTH, SOUTH, WEST, EAST].
#[derive(Clone, Debug, PartialEq)]
pub struct Block {
    numeric_id: i32,
    id: String,
    display_name: String,
    hardness: f32,
    solid: bool,
    transparent: bool,
    face_tiles: [i32; SIDE_COUNT],
}

impl Block {
    /// Creates a solid, opaque block with hardness 1.0 whose display name is
    /// its string id and whose faces all use tile 0.
    ///
    /// # Arguments
    /// * `id` - Unique string id of the block
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Block {
            numeric_id: UNSET_NUMERIC_ID,
            display_name: id.clone(),
            id,
            hardness: 1.0,
            solid: true,
            transparent: false,
            face_tiles: [0; SIDE_COUNT],
        }
    }

    /// Creates a block with every property given explicitly. All faces use tile 0.
    pub fn with_properties(
        numeric_id: i32,
        id: impl Into<String>,
        display_name: impl Into<String>,
        hardness: f32,
        solid: bool,
        transparent: bool,
    ) -> Self {
        Block {
            numeric_id,
            id: id.into(),
            display_name: display_name.into(),
            hardness,
            solid,
            transparent,
            face_tiles: [0; SIDE_COUNT],
        }
    }

    /// Numeric id, [`UNSET_NUMERIC_ID`] if none was assigned.
    pub fn numeric_id(&self) -> i32 {
        self.numeric_id
    }

    /// Sets the numeric id.
    pub fn set_numeric_id(&mut self, numeric_id: i32) {
        self.numeric_id = numeric_id;
    }

    /// Unique string id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Sets the unique string id.
    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = id.into();
    }

    /// Human readable name.
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Sets the human readable name.
    pub fn set_display_name(&mut self, display_name: impl Into<String>) {
        self.display_name = display_name.into();
    }

    /// Hardness, never negative.
    pub fn hardness(&self) -> f32 {
        self.hardness
    }

    /// Sets the hardness. Negative values are clamped to zero.
    pub fn set_hardness(&mut self, hardness: f32) {
        self.hardness = hardness.max(0.0);
    }

    /// Whether the block is solid.
    pub fn is_solid(&self) -> bool {
        self.solid
    }

    /// Sets whether the block is solid.
    pub fn set_solid(&mut self, solid: bool) {
        self.solid = solid;
    }

    /// Whether the block is transparent.
    pub fn is_transparent(&self) -> bool {
        self.transparent
    }

    /// Sets whether the block is transparent.
    pub fn set_transparent(&mut self, transparent: bool) {
        self.transparent = transparent;
    }

    /// Flat colour used when the block is drawn without an atlas.
    pub fn color(&self) -> Vector3<f32> {
        block_type::fallback_color(&self.id)
    }

    /// Uses the same atlas tile on all six faces.
    pub fn set_tile_for_all_faces(&mut self, tile: i32) {
        self.face_tiles = [tile; SIDE_COUNT];
    }

    /// Sets the atlas tile of one face.
    ///
    /// Face indices outside `0..6` are ignored.
    pub fn set_tile_for_face(&mut self, face: i32, tile: i32) {
        if let Some(side) = BlockSide::from_index(face) {
            self.set_tile_for_side(side, tile);
        }
    }

    /// Sets the atlas tile of one face.
    pub fn set_tile_for_side(&mut self, side: BlockSide, tile: i32) {
        self.face_tiles[side.index()] = tile;
    }

    /// Atlas tile of one face.
    ///
    /// Face indices outside `0..6` yield the TOP tile rather than an error.
    pub fn tile_for_face(&self, face: i32) -> i32 {
        BlockSide::from_index(face)
            .map(|side| self.tile_for_side(side))
            .unwrap_or(self.face_tiles[BlockSide::TOP.index()])
    }

    /// Atlas tile of one face.
    pub fn tile_for_side(&self, side: BlockSide) -> i32 {
        self.face_tiles[side.index()]
    }

    /// The complete tile table.
    pub fn face_tiles(&self) -> &[i32; SIDE_COUNT] {
        &self.face_tiles
    }
}

impl Default for Block {
    fn default() -> Self {
        Block::new("Block")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_block_uses_documented_defaults() {
        let block = Block::new("Marble");
        assert_eq!(block.numeric_id(), UNSET_NUMERIC_ID);
        assert_eq!(block.display_name(), "Marble");
        assert_eq!(block.hardness(), 1.0);
        assert!(block.is_solid());
        assert!(!block.is_transparent());
        assert_eq!(block.face_tiles(), &[0; 6]);
    }

    #[test]
    fn face_tiles_are_set_per_face_and_uniformly() {
        let mut block = Block::new("Grass");
        block.set_tile_for_all_faces(2);
        block.set_tile_for_face(0, 7);
        block.set_tile_for_side(BlockSide::EAST, 9);

        assert_eq!(block.tile_for_face(0), 7);
        assert_eq!(block.tile_for_face(1), 2);
        assert_eq!(block.tile_for_side(BlockSide::EAST), 9);
    }

    #[test]
    fn out_of_range_faces_are_ignored_on_write_and_read_top() {
        let mut block = Block::new("Grass");
        block.set_tile_for_face(0, 4);
        block.set_tile_for_face(6, 11);
        block.set_tile_for_face(-1, 11);

        assert_eq!(block.face_tiles(), &[4, 0, 0, 0, 0, 0]);
        assert_eq!(block.tile_for_face(-3), 4);
        assert_eq!(block.tile_for_face(42), 4);
    }

    #[test]
    fn negative_hardness_is_clamped() {
        let mut block = Block::new("Glass");
        block.set_hardness(-2.0);
        assert_eq!(block.hardness(), 0.0);
    }
}
