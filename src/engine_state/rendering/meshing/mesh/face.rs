use cgmath::{Vector3, Zero};

use crate::engine_state::voxels::block::block_side::BlockSide;

/// Represents a single quad face of a block in the mesh.
///
/// A face is defined by four corner points in quad winding order. The first
/// two corners form the bottom edge in texture space and the last two the top
/// edge, so corner `n` pairs with corner `n` of
/// [`TileUv::corners`](crate::engine_state::rendering::atlas::TileUv::corners).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Face {
    /// Corner positions in world space
    pub corners: [Vector3<f32>; 4],
    /// Which side of the block this face represents
    pub block_side: BlockSide,
}

impl Face {
    /// Creates a new face for a unit block whose minimum corner is `origin`.
    ///
    /// # Arguments
    /// * `origin` - World position of the block's minimum corner
    /// * `block_side` - Which side of the block this face represents
    ///
    /// # Returns
    /// A new `Face` instance with corners offset from `origin` according to
    /// [`corner_offsets`]
    pub fn new(origin: Vector3<f32>, block_side: BlockSide) -> Self {
        let offsets = corner_offsets(block_side);
        let mut corners = [Vector3::zero(); 4];
        for (corner, offset) in corners.iter_mut().zip(offsets) {
            *corner = origin + offset;
        }

        Face {
            corners,
            block_side,
        }
    }

    /// Unit normal of the face.
    pub fn normal(&self) -> Vector3<f32> {
        self.block_side.normal()
    }
}

/// Corner offsets of each side within the unit cube.
pub fn corner_offsets(block_side: BlockSide) -> [Vector3<f32>; 4] {
    let v = |x: f32, y: f32, z: f32| Vector3::new(x, y, z);
    match block_side {
        BlockSide::TOP => [v(0., 1., 0.), v(1., 1., 0.), v(1., 1., 1.), v(0., 1., 1.)],
        BlockSide::BOTTOM => [v(0., 0., 1.), v(1., 0., 1.), v(1., 0., 0.), v(0., 0., 0.)],
        BlockSide::NORTH => [v(1., 0., 0.), v(0., 0., 0.), v(0., 1., 0.), v(1., 1., 0.)],
        BlockSide::SOUTH => [v(0., 0., 1.), v(1., 0., 1.), v(1., 1., 1.), v(0., 1., 1.)],
        BlockSide::WEST => [v(0., 0., 0.), v(0., 0., 1.), v(0., 1., 1.), v(0., 1., 0.)],
        BlockSide::EAST => [v(1., 0., 1.), v(1., 0., 0.), v(1., 1., 0.), v(1., 1., 1.)],
    }
}
