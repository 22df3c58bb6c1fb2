//! Mesh generation for the voxel plane.
//!
//! This module converts the block grid into a single triangle mesh that can be
//! drawn with one indexed draw call.
//!
//! # Architecture
//! - [`PlaneMesher`]: Walks the grid and emits the visible faces of every block
//! - `mesh/`: The [`Mesh`] and [`Face`] geometry types
//! - [`MeshBuffers`] and [`MeshingRenderer`]: GPU side of a built mesh
//!
//! # Face Selection
//! The grid is one block tall, so TOP and BOTTOM faces are always visible.
//! A side face is emitted only when the neighbouring cell in that direction is
//! empty or outside the grid; faces between two occupied cells are hidden.
//!
//! # Placement
//! The grid is centred on the origin. Cell `(x, z)` is the unit cube whose
//! minimum corner is `(x - width / 2, plane_y, z - width / 2)`.

use cgmath::Vector3;
use log::debug;
use thiserror::Error;

use crate::engine_state::{
    rendering::atlas::{TileUv, TileUvSource},
    voxels::{
        block::{block_registry::BlockRegistry, block_side::BlockSide},
        world::VoxelGrid,
    },
};

mod mesh;
mod renderer;

pub use mesh::*;
pub use renderer::*;

/// Default upper bound on the number of indices in one mesh.
pub const MAX_MESH_INDICES: usize = 100_000_000;

/// Errors produced while building a mesh.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum MeshError {
    /// The mesh would exceed the index ceiling.
    #[error("mesh needs more than {limit} indices (reached {count})")]
    TooManyIndices {
        /// Indices the mesh would have held when the build stopped
        count: usize,
        /// Configured ceiling
        limit: usize,
    },
    /// A grid cell refers to a block the registry does not know.
    #[error("cell ({x}, {z}) refers to unregistered block {index}")]
    UnknownBlock {
        /// Cell X coordinate
        x: i32,
        /// Cell Z coordinate
        z: i32,
        /// Registry index of the missing block
        index: usize,
    },
}

/// Builds flat-plane surface meshes.
///
/// Building is a pure function of the registry, the grid and the atlas: the
/// same inputs always produce the same vertices and indices in the same order.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PlaneMesher {
    max_indices: usize,
}

impl Default for PlaneMesher {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaneMesher {
    /// Creates a mesher with the default index ceiling.
    pub fn new() -> Self {
        Self::with_max_indices(MAX_MESH_INDICES)
    }

    /// Creates a mesher that refuses meshes with more than `max_indices` indices.
    ///
    /// Indices are 32-bit, so the ceiling never exceeds `u32::MAX`.
    pub fn with_max_indices(max_indices: usize) -> Self {
        Self {
            max_indices: max_indices.min(u32::MAX as usize),
        }
    }

    /// Lowers the ceiling so both buffers of any accepted mesh fit in
    /// `max_buffer_size` bytes.
    ///
    /// # Arguments
    /// * `max_buffer_size` - Largest buffer the device allows, see [`wgpu::Limits::max_buffer_size`]
    pub fn with_buffer_limit(self, max_buffer_size: u64) -> Self {
        let max_quads = max_buffer_size / VERTEX_BYTES_PER_QUAD;
        let limit = max_quads.saturating_mul(INDICES_PER_QUAD as u64);
        Self {
            max_indices: self.max_indices.min(usize::try_from(limit).unwrap_or(usize::MAX)),
        }
    }

    /// The index ceiling.
    pub fn max_indices(&self) -> usize {
        self.max_indices
    }

    /// Builds the mesh of every occupied cell.
    ///
    /// Cells are visited row by row (increasing Z, then increasing X) and each
    /// emits its faces in the order TOP, BOTTOM, NORTH, SOUTH, WEST, EAST.
    ///
    /// # Arguments
    /// * `registry` - Owner of the blocks the grid refers to
    /// * `grid` - The cells to mesh
    /// * `atlas` - Tile coordinates source; `None` or an invalid atlas maps
    ///   every face to the full texture rectangle
    ///
    /// # Returns
    /// The complete mesh, or an error with no partial result
    pub fn build(
        &self,
        registry: &BlockRegistry,
        grid: &VoxelGrid,
        atlas: Option<&dyn TileUvSource>,
    ) -> Result<Mesh, MeshError> {
        let atlas = atlas.filter(|atlas| atlas.is_valid());
        let half = (grid.width() / 2) as i64;
        let plane_y = grid.plane_y() as f32;

        let mut mesh = Mesh::with_quad_capacity(grid.occupied_count() * 2);

        for (x, z, block_id) in grid.occupied_cells() {
            let block = registry.get(block_id).ok_or(MeshError::UnknownBlock {
                x,
                z,
                index: block_id.index(),
            })?;
            let origin = Vector3::new(
                (x as i64 - half) as f32,
                plane_y,
                (z as i64 - half) as f32,
            );
            let color = block.color();

            for side in BlockSide::all() {
                let visible = match side.neighbour_offset() {
                    Some((dx, dz)) => grid.is_empty_at(x + dx, z + dz),
                    None => true,
                };
                if !visible {
                    continue;
                }

                let count = mesh.index_count() + INDICES_PER_QUAD;
                if count > self.max_indices {
                    return Err(MeshError::TooManyIndices {
                        count,
                        limit: self.max_indices,
                    });
                }

                let uv = match atlas {
                    Some(atlas) => atlas.tile_uv(block.tile_for_side(side)),
                    None => TileUv::FULL,
                };
                mesh.push_quad(&Face::new(origin, side), color, uv);
            }
        }

        debug!(
            "Built plane mesh: {} quads, {} vertices, {} indices",
            mesh.quad_count(),
            mesh.vertices.len(),
            mesh.index_count()
        );

        Ok(mesh)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::{
        rendering::atlas::AtlasLayout,
        voxels::block::{block_registry::BlockId, Block},
    };

    fn registry_with_grass() -> (BlockRegistry, BlockId) {
        let mut registry = BlockRegistry::new();
        let mut grass = Block::new("Grass");
        grass.set_tile_for_all_faces(1);
        grass.set_tile_for_side(BlockSide::TOP, 0);
        grass.set_tile_for_side(BlockSide::BOTTOM, 2);
        let id = registry.register(grass);
        (registry, id)
    }

    fn normals(mesh: &Mesh) -> Vec<[f32; 3]> {
        mesh.vertices
            .iter()
            .step_by(VERTICES_PER_QUAD)
            .map(|vertex| vertex.normal)
            .collect()
    }

    #[test]
    fn single_block_emits_all_six_faces() {
        let (registry, grass) = registry_with_grass();
        let mut grid = VoxelGrid::new(4, 0);
        grid.set_block_at(1, 1, Some(grass));

        let mesh = PlaneMesher::new().build(&registry, &grid, None).unwrap();

        assert_eq!(mesh.vertices.len(), 24);
        assert_eq!(mesh.index_count(), 36);
        assert_eq!(
            normals(&mesh),
            vec![
                [0.0, 1.0, 0.0],
                [0.0, -1.0, 0.0],
                [0.0, 0.0, -1.0],
                [0.0, 0.0, 1.0],
                [-1.0, 0.0, 0.0],
                [1.0, 0.0, 0.0],
            ]
        );
    }

    #[test]
    fn shared_side_between_neighbours_is_hidden() {
        let (registry, grass) = registry_with_grass();
        let mut grid = VoxelGrid::new(4, 0);
        grid.set_block_at(1, 1, Some(grass));
        grid.set_block_at(2, 1, Some(grass));

        let mesh = PlaneMesher::new().build(&registry, &grid, None).unwrap();

        assert_eq!(mesh.quad_count(), 10);
        let normals = normals(&mesh);
        // The first cell has no EAST face and the second no WEST face.
        assert!(!normals[..5].contains(&[1.0, 0.0, 0.0]));
        assert!(!normals[5..].contains(&[-1.0, 0.0, 0.0]));
    }

    #[test]
    fn full_grid_only_keeps_border_sides() {
        let (registry, grass) = registry_with_grass();
        let mut grid = VoxelGrid::new(3, 0);
        grid.fill(grass);

        let mesh = PlaneMesher::new().build(&registry, &grid, None).unwrap();

        // Nine tops, nine bottoms and three sides along each of four edges.
        assert_eq!(mesh.quad_count(), 9 * 2 + 3 * 4);
    }

    #[test]
    fn empty_grid_builds_empty_mesh() {
        let (registry, _) = registry_with_grass();
        let mesh = PlaneMesher::new()
            .build(&registry, &VoxelGrid::new(16, 0), None)
            .unwrap();
        assert!(mesh.is_empty());
        assert!(mesh.vertices.is_empty());
    }

    #[test]
    fn repeated_builds_are_identical() {
        let (registry, grass) = registry_with_grass();
        let mut grid = VoxelGrid::new(8, 2);
        for (x, z) in [(0, 0), (3, 4), (4, 4), (7, 7), (5, 1)] {
            grid.set_block_at(x, z, Some(grass));
        }
        let atlas = AtlasLayout::new(64, 64, 16, 16).unwrap();
        let mesher = PlaneMesher::new();

        let first = mesher.build(&registry, &grid, Some(&atlas)).unwrap();
        let second = mesher.build(&registry, &grid, Some(&atlas)).unwrap();

        assert_eq!(
            bytemuck::cast_slice::<_, u8>(&first.vertices),
            bytemuck::cast_slice::<_, u8>(&second.vertices)
        );
        assert_eq!(first.indices, second.indices);
    }

    #[test]
    fn grid_is_centred_on_origin() {
        let (registry, grass) = registry_with_grass();
        let mut grid = VoxelGrid::new(64, 3);
        grid.set_block_at(0, 0, Some(grass));

        let mesh = PlaneMesher::new().build(&registry, &grid, None).unwrap();

        // First corner of the TOP face is the minimum corner raised by one.
        assert_eq!(mesh.vertices[0].position, [-32.0, 4.0, -32.0]);
        let min_y = mesh
            .vertices
            .iter()
            .map(|vertex| vertex.position[1])
            .fold(f32::INFINITY, f32::min);
        assert_eq!(min_y, 3.0);
    }

    #[test]
    fn faces_use_block_tiles_from_atlas() {
        let (registry, grass) = registry_with_grass();
        let mut grid = VoxelGrid::new(2, 0);
        grid.set_block_at(0, 0, Some(grass));
        let atlas = AtlasLayout::new(64, 64, 16, 16).unwrap();

        let mesh = PlaneMesher::new()
            .build(&registry, &grid, Some(&atlas))
            .unwrap();

        let top: Vec<[f32; 2]> = mesh.vertices[0..4].iter().map(|v| v.uv).collect();
        assert_eq!(top, vec![[0.0, 0.75], [0.25, 0.75], [0.25, 1.0], [0.0, 1.0]]);

        // BOTTOM uses tile 2, NORTH uses tile 1.
        assert_eq!(mesh.vertices[4].uv, [0.5, 0.75]);
        assert_eq!(mesh.vertices[8].uv, [0.25, 0.75]);
    }

    #[test]
    fn missing_atlas_maps_full_texture() {
        let (registry, grass) = registry_with_grass();
        let mut grid = VoxelGrid::new(2, 0);
        grid.set_block_at(1, 1, Some(grass));
        let unloaded = crate::engine_state::rendering::atlas::TextureAtlas::new();

        let mesh = PlaneMesher::new()
            .build(&registry, &grid, Some(&unloaded))
            .unwrap();

        let uvs: Vec<[f32; 2]> = mesh.vertices[0..4].iter().map(|v| v.uv).collect();
        assert_eq!(uvs, vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]]);
    }

    #[test]
    fn vertex_colour_is_block_fallback_colour() {
        let (registry, grass) = registry_with_grass();
        let mut grid = VoxelGrid::new(2, 0);
        grid.set_block_at(0, 1, Some(grass));

        let mesh = PlaneMesher::new().build(&registry, &grid, None).unwrap();
        let expected: [f32; 3] = registry.get(grass).unwrap().color().into();
        assert!(mesh.vertices.iter().all(|vertex| vertex.color == expected));
    }

    #[test]
    fn exceeding_index_ceiling_fails() {
        let (registry, grass) = registry_with_grass();
        let mut grid = VoxelGrid::new(2, 0);
        grid.set_block_at(0, 0, Some(grass));

        assert!(PlaneMesher::with_max_indices(36)
            .build(&registry, &grid, None)
            .is_ok());
        assert_eq!(
            PlaneMesher::with_max_indices(35).build(&registry, &grid, None),
            Err(MeshError::TooManyIndices {
                count: 36,
                limit: 35
            })
        );
    }

    #[test]
    fn index_ceiling_fits_in_u32() {
        assert_eq!(
            PlaneMesher::with_max_indices(usize::MAX).max_indices(),
            u32::MAX as usize
        );
        assert_eq!(PlaneMesher::with_max_indices(600).max_indices(), 600);
    }

    #[test]
    fn buffer_limit_lowers_ceiling() {
        let (registry, grass) = registry_with_grass();
        let mut grid = VoxelGrid::new(3, 0);
        grid.fill(grass);

        // A full 3x3 grid needs 30 quads.
        let mesher = PlaneMesher::new().with_buffer_limit(29 * VERTEX_BYTES_PER_QUAD);
        assert_eq!(mesher.max_indices(), 29 * INDICES_PER_QUAD);
        assert!(matches!(
            mesher.build(&registry, &grid, None),
            Err(MeshError::TooManyIndices { .. })
        ));

        let mesh = PlaneMesher::new()
            .with_buffer_limit(30 * VERTEX_BYTES_PER_QUAD)
            .build(&registry, &grid, None)
            .unwrap();
        assert!(mesh.fits_buffer_limit(30 * VERTEX_BYTES_PER_QUAD));
    }

    #[test]
    fn default_device_limit_rejects_very_wide_plane() {
        // A filled 900x900 plane has 4 * 900 + 2 * 810_000 quads.
        let wide_plane_indices = (4 * 900 + 2 * 900 * 900) * INDICES_PER_QUAD;
        assert!(wide_plane_indices < MAX_MESH_INDICES);

        let mesher = PlaneMesher::new().with_buffer_limit(wgpu::Limits::default().max_buffer_size);
        assert!(mesher.max_indices() < wide_plane_indices);
        assert!(
            (mesher.max_indices() / INDICES_PER_QUAD) as u64 * VERTEX_BYTES_PER_QUAD
                <= wgpu::Limits::default().max_buffer_size
        );
    }

    #[test]
    fn unregistered_block_fails() {
        let mut other = BlockRegistry::new();
        other.register(Block::new("Stone"));
        let foreign = other.register(Block::new("Dirt"));

        let (registry, _) = registry_with_grass();
        let mut grid = VoxelGrid::new(2, 0);
        grid.set_block_at(1, 0, Some(foreign));

        assert!(matches!(
            PlaneMesher::new().build(&registry, &grid, None),
            Err(MeshError::UnknownBlock { x: 1, z: 0, .. })
        ));
    }
}
