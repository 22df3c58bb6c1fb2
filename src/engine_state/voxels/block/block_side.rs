//! # Block Side Module
//!
//! This module defines the six faces of a voxel block and the geometric data
//! that belongs to each of them (outward normal and neighbour offset).

use cgmath::Vector3;
use num_derive::FromPrimitive;

/// Represents the six possible faces of a voxel block.
///
/// Each variant carries the index used for the per-face tile table of a
/// [`Block`](super::Block). The order is: [TOP, BOTTOM, NORTH, SOUTH, WEST, EAST]
#[derive(PartialEq, Eq, Hash, Copy, Clone, Debug, FromPrimitive)]
pub enum BlockSide {
    /// The top face (facing positive Y)
    TOP = 0,

    /// The bottom face (facing negative Y)
    BOTTOM = 1,

    /// The north face (facing negative Z)
    NORTH = 2,

    /// The south face (facing positive Z)
    SOUTH = 3,

    /// The west face (facing negative X)
    WEST = 4,

    /// The east face (facing positive X)
    EAST = 5,
}

/// Number of faces on a block.
pub const SIDE_COUNT: usize = 6;

impl BlockSide {
    /// Returns an array containing all six block faces in tile-table order.
    ///
    /// This is also the order in which the mesher emits the faces of a cell.
    pub fn all() -> [BlockSide; SIDE_COUNT] {
        [
            BlockSide::TOP,
            BlockSide::BOTTOM,
            BlockSide::NORTH,
            BlockSide::SOUTH,
            BlockSide::WEST,
            BlockSide::EAST,
        ]
    }

    /// Converts a raw face index into a `BlockSide`.
    ///
    /// # Returns
    /// `None` for any index outside `0..6`
    pub fn from_index(index: i32) -> Option<Self> {
        num::FromPrimitive::from_i32(index)
    }

    /// Index of this face in a block's tile table.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Outward facing unit normal of this face.
    pub fn normal(self) -> Vector3<f32> {
        match self {
            BlockSide::TOP => Vector3::new(0.0, 1.0, 0.0),
            BlockSide::BOTTOM => Vector3::new(0.0, -1.0, 0.0),
            BlockSide::NORTH => Vector3::new(0.0, 0.0, -1.0),
            BlockSide::SOUTH => Vector3::new(0.0, 0.0, 1.0),
            BlockSide::WEST => Vector3::new(-1.0, 0.0, 0.0),
            BlockSide::EAST => Vector3::new(1.0, 0.0, 0.0),
        }
    }

    /// Offset `(dx, dz)` of the grid cell that can hide this face.
    ///
    /// The grid is a single layer, so TOP and BOTTOM have no occluding
    /// neighbour and return `None`.
    pub fn neighbour_offset(self) -> Option<(i32, i32)> {
        match self {
            BlockSide::TOP | BlockSide::BOTTOM => None,
            BlockSide::NORTH => Some((0, -1)),
            BlockSide::SOUTH => Some((0, 1)),
            BlockSide::WEST => Some((-1, 0)),
            BlockSide::EAST => Some((1, 0)),
        }
    }

    /// Looks up the face addressed by a key of the block definition file.
    ///
    /// `left`/`right` are west/east and `forward(s)`/`back(wards)` are
    /// north/south.
    pub fn from_definition_key(key: &str) -> Option<Self> {
        match key {
            "top" => Some(BlockSide::TOP),
            "bottom" => Some(BlockSide::BOTTOM),
            "forwards" | "forward" => Some(BlockSide::NORTH),
            "backwards" | "back" => Some(BlockSide::SOUTH),
            "left" => Some(BlockSide::WEST),
            "right" => Some(BlockSide::EAST),
            _ => None,
        }
    }
}
