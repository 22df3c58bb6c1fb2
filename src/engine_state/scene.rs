//! # Scene
//!
//! The block registry, the grid that refers to it and the last mesh built from
//! both. Everything that reads or changes the world goes through a [`Scene`].
//!
//! The scene never rebuilds on its own. Mutators return `true` when the grid
//! changed, and the caller decides when to call [`Scene::build_mesh`].

use std::path::Path;

use log::{info, warn};

use super::{
    rendering::{
        atlas::TileUvSource,
        meshing::{Mesh, MeshError, PlaneMesher},
    },
    voxels::{
        block::block_registry::{load_blocks_from_file, BlockId, BlockLoadError, BlockRegistry},
        world::VoxelGrid,
    },
};

/// World state owned by the engine.
#[derive(Debug, Default)]
pub struct Scene {
    registry: BlockRegistry,
    grid: VoxelGrid,
    mesh: Option<Mesh>,
}

impl Scene {
    /// Creates a scene from an existing registry and grid.
    pub fn new(registry: BlockRegistry, grid: VoxelGrid) -> Self {
        Self {
            registry,
            grid,
            mesh: None,
        }
    }

    /// Loads block definitions and fills a `width` x `width` grid with the
    /// default block.
    ///
    /// A definition file that cannot be read is logged and leaves the registry
    /// empty, in which case the built-in stone block is used.
    ///
    /// # Arguments
    /// * `blocks_path` - Block definition file
    /// * `default_block` - String id of the block to fill the grid with
    /// * `width` - Side length of the grid
    /// * `plane_y` - Elevation of the block layer
    pub fn load(
        blocks_path: impl AsRef<Path>,
        default_block: &str,
        width: usize,
        plane_y: i32,
    ) -> Self {
        let blocks_path = blocks_path.as_ref();
        let mut registry = match BlockRegistry::load_from_file(blocks_path) {
            Ok(registry) => {
                info!("Loaded {} block definitions from {}", registry.len(), blocks_path.display());
                registry
            }
            Err(err) => {
                warn!("{err}");
                BlockRegistry::new()
            }
        };

        let fill = registry.default_block(default_block);
        let mut grid = VoxelGrid::new(width, plane_y);
        grid.fill(fill);

        Self::new(registry, grid)
    }

    /// The block registry.
    pub fn registry(&self) -> &BlockRegistry {
        &self.registry
    }

    /// The block grid.
    pub fn grid(&self) -> &VoxelGrid {
        &self.grid
    }

    /// The mesh from the last successful build, `None` before the first build
    /// or after a failed one.
    pub fn mesh(&self) -> Option<&Mesh> {
        self.mesh.as_ref()
    }

    /// Sets or clears one cell.
    ///
    /// # Returns
    /// `true` if the cell changed and the mesh needs rebuilding
    pub fn set_block(&mut self, x: i32, z: i32, block: Option<BlockId>) -> bool {
        self.grid.set_block_at(x, z, block)
    }

    /// Puts `block` in every cell.
    ///
    /// # Returns
    /// `true` if any cell changed
    pub fn fill(&mut self, block: BlockId) -> bool {
        let changed = self.grid.occupied_cells().any(|(_, _, id)| id != block)
            || self.grid.occupied_count() != self.grid.width() * self.grid.width();
        self.grid.fill(block);
        changed
    }

    /// Empties every cell.
    ///
    /// # Returns
    /// `true` if any cell changed
    pub fn clear(&mut self) -> bool {
        let changed = self.grid.occupied_count() > 0;
        self.grid.clear();
        changed
    }

    /// Re-reads the block definition file into the registry.
    ///
    /// Blocks whose string id is already registered are replaced in place, so
    /// the grid keeps referring to the same blocks with their new tiles.
    ///
    /// # Returns
    /// The number of definitions read
    pub fn reload_blocks(&mut self, blocks_path: impl AsRef<Path>) -> Result<usize, BlockLoadError> {
        let blocks = load_blocks_from_file(blocks_path)?;
        Ok(self.registry.register_all(blocks).len())
    }

    /// Rebuilds the mesh from the current grid.
    ///
    /// On failure the previous mesh is discarded as well, so a stale mesh is
    /// never mistaken for the current grid.
    pub fn build_mesh(
        &mut self,
        mesher: &PlaneMesher,
        atlas: Option<&dyn TileUvSource>,
    ) -> Result<&Mesh, MeshError> {
        self.mesh = None;
        let mesh = mesher.build(&self.registry, &self.grid, atlas)?;
        Ok(self.mesh.insert(mesh))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::block::Block;

    fn write_blocks(contents: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blocks.json");
        std::fs::write(&path, contents).unwrap();
        (dir, path)
    }

    #[test]
    fn load_fills_grid_with_default_block() {
        let (_dir, path) = write_blocks(
            r#"[{ "name": "Stone", "tile": 3 }, { "name": "Grass", "tile": 1, "top": 0 }]"#,
        );
        let scene = Scene::load(&path, "Grass", 4, 0);

        let grass = scene.registry().find("Grass").unwrap();
        assert_eq!(scene.grid().occupied_count(), 16);
        assert!(scene.grid().occupied_cells().all(|(_, _, id)| id == grass));
    }

    #[test]
    fn missing_definitions_fall_back_to_stone() {
        let dir = tempfile::tempdir().unwrap();
        let scene = Scene::load(dir.path().join("missing.json"), "Grass", 2, 0);

        let stone = scene.registry().find("Stone").unwrap();
        assert_eq!(scene.registry().get(stone).unwrap().hardness(), 1.5);
        assert_eq!(scene.grid().get_block_at(1, 1), Some(stone));
    }

    #[test]
    fn mutators_report_changes() {
        let mut registry = BlockRegistry::new();
        let stone = registry.register(Block::new("Stone"));
        let mut scene = Scene::new(registry, VoxelGrid::new(2, 0));

        assert!(scene.fill(stone));
        assert!(!scene.fill(stone));
        assert!(scene.set_block(0, 0, None));
        assert!(!scene.set_block(9, 9, Some(stone)));
        assert!(scene.clear());
        assert!(!scene.clear());
    }

    #[test]
    fn build_keeps_last_mesh_and_discards_it_on_failure() {
        let mut registry = BlockRegistry::new();
        let stone = registry.register(Block::new("Stone"));
        let mut grid = VoxelGrid::new(2, 0);
        grid.set_block_at(0, 0, Some(stone));
        let mut scene = Scene::new(registry, grid);

        let quads = scene.build_mesh(&PlaneMesher::new(), None).unwrap().quad_count();
        assert_eq!(quads, 6);
        assert!(scene.mesh().is_some());

        let result = scene.build_mesh(&PlaneMesher::with_max_indices(6), None);
        assert!(result.is_err());
        assert!(scene.mesh().is_none());
    }

    #[test]
    fn reloading_blocks_keeps_ids_and_updates_tiles() {
        let (_dir, path) = write_blocks(r#"[{ "name": "Grass", "tile": 1 }]"#);
        let mut scene = Scene::load(&path, "Grass", 2, 0);
        let grass = scene.registry().find("Grass").unwrap();

        std::fs::write(&path, r#"[{ "name": "Grass", "tile": 5 }, { "name": "Sand" }]"#).unwrap();
        assert_eq!(scene.reload_blocks(&path).unwrap(), 2);

        assert_eq!(scene.registry().find("Grass"), Some(grass));
        assert_eq!(scene.registry().get(grass).unwrap().tile_for_face(0), 5);
        assert_eq!(scene.registry().len(), 2);
    }
}
