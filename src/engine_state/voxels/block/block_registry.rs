//! # Block Registry Module
//!
//! Owns every [`Block`] known to the engine and hands out stable
//! [`BlockId`]s for the grid to store. Also loads block definitions from
//! the JSON definition file.
//!
//! The definition file is a top-level array of objects:
//!
//! ```json
//! [
//!     { "id": 1, "name": "Grass", "hardness": 0.6, "tile": 2, "top": 0, "bottom": 1 },
//!     { "id": 2, "name": "Stone", "displayName": "Smooth Stone", "tile": 3 }
//! ]
//! ```
//!
//! Every field is optional. A missing or mistyped field falls back to its
//! default instead of failing the load.

use std::{collections::HashMap, fs, path::Path};

use log::{info, warn};
use serde_json::{Map, Value};
use thiserror::Error;

use super::{block_side::BlockSide, Block, UNSET_NUMERIC_ID};

/// Stable handle to a block stored in a [`BlockRegistry`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId(u32);

impl BlockId {
    /// Position of the block inside its registry.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Errors produced while reading a block definition file.
#[derive(Error, Debug)]
pub enum BlockLoadError {
    /// The file could not be read.
    #[error("failed to read block definitions from {path}: {source}")]
    Io {
        /// File that was being read
        path: String,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },
    /// The file is not valid JSON.
    #[error("block definitions are not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// The document is JSON but its top level is not an array.
    #[error("block definitions must be a JSON array at the top level")]
    NotAnArray,
}

/// Append-only arena of block records.
///
/// Blocks are never removed, so a [`BlockId`] handed out by a registry stays
/// valid for the registry's whole lifetime.
#[derive(Debug, Default)]
pub struct BlockRegistry {
    blocks: Vec<Block>,
    by_id: HashMap<String, BlockId>,
}

impl BlockRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a block and returns its id.
    ///
    /// A block whose string id is already registered replaces the existing
    /// record in place and keeps the existing `BlockId`.
    pub fn register(&mut self, block: Block) -> BlockId {
        if let Some(&existing) = self.by_id.get(block.id()) {
            warn!("Block '{}' registered twice, replacing previous definition", block.id());
            self.blocks[existing.index()] = block;
            return existing;
        }

        let block_id = BlockId(self.blocks.len() as u32);
        self.by_id.insert(block.id().to_string(), block_id);
        self.blocks.push(block);
        block_id
    }

    /// Registers every block of `blocks` in order.
    pub fn register_all(&mut self, blocks: impl IntoIterator<Item = Block>) -> Vec<BlockId> {
        blocks.into_iter().map(|block| self.register(block)).collect()
    }

    /// Gets a block by id.
    pub fn get(&self, block_id: BlockId) -> Option<&Block> {
        self.blocks.get(block_id.index())
    }

    /// Finds a block by its string id.
    pub fn find(&self, id: &str) -> Option<BlockId> {
        self.by_id.get(id).copied()
    }

    /// Finds the first block with the given numeric id.
    pub fn find_by_numeric_id(&self, numeric_id: i32) -> Option<BlockId> {
        self.blocks
            .iter()
            .position(|block| block.numeric_id() == numeric_id)
            .map(|index| BlockId(index as u32))
    }

    /// Number of registered blocks.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Whether no block has been registered.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Iterates over all blocks in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (BlockId, &Block)> {
        self.blocks
            .iter()
            .enumerate()
            .map(|(index, block)| (BlockId(index as u32), block))
    }

    /// Loads a registry from a block definition file.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, BlockLoadError> {
        let mut registry = Self::new();
        registry.register_all(load_blocks_from_file(path)?);
        Ok(registry)
    }

    /// Picks the block the flat plane is filled with.
    ///
    /// Prefers `preferred`, then the first registered block. If the registry is
    /// empty a built-in stone block is registered and returned.
    pub fn default_block(&mut self, preferred: &str) -> BlockId {
        if let Some(block_id) = self.find(preferred) {
            return block_id;
        }
        if !self.is_empty() {
            warn!("Default block '{}' not defined, using '{}'", preferred, self.blocks[0].id());
            return BlockId(0);
        }

        info!("No block definitions available, using built-in stone block");
        let mut stone = Block::new("Stone");
        stone.set_hardness(1.5);
        stone.set_solid(true);
        self.register(stone)
    }
}

/// Reads block definitions from a file, see [`parse_blocks`].
pub fn load_blocks_from_file(path: impl AsRef<Path>) -> Result<Vec<Block>, BlockLoadError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|source| BlockLoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_blocks(&contents)
}

/// Parses the contents of a block definition file.
///
/// Only the document structure can fail: entries of the top-level array that
/// are not objects are skipped, and each field of an object falls back to its
/// default when it is missing or has the wrong type.
pub fn parse_blocks(contents: &str) -> Result<Vec<Block>, BlockLoadError> {
    let document: Value = serde_json::from_str(contents)?;
    let Value::Array(entries) = document else {
        return Err(BlockLoadError::NotAnArray);
    };

    let mut blocks = Vec::with_capacity(entries.len());
    for (position, entry) in entries.iter().enumerate() {
        match entry {
            Value::Object(fields) => blocks.push(block_from_fields(fields)),
            other => warn!("Skipping block definition #{position}: expected an object, found {other}"),
        }
    }
    Ok(blocks)
}

fn block_from_fields(fields: &Map<String, Value>) -> Block {
    let numeric_id = int_field(fields, "id").unwrap_or(UNSET_NUMERIC_ID);
    let name = str_field(fields, "name").unwrap_or("Unknown");
    let display_name = str_field(fields, "displayName").unwrap_or(name);
    let hardness = fields
        .get("hardness")
        .and_then(Value::as_f64)
        .filter(|hardness| *hardness >= 0.0)
        .unwrap_or(1.0) as f32;
    let solid = fields.get("solid").and_then(Value::as_bool).unwrap_or(true);
    let transparent = fields
        .get("transparent")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    let mut block =
        Block::with_properties(numeric_id, name, display_name, hardness, solid, transparent);

    if let Some(tile) = int_field(fields, "tile") {
        block.set_tile_for_all_faces(tile);
    }

    // First spelling wins when both aliases of a face are present.
    let face_keys = [
        "top", "bottom", "left", "right", "forwards", "forward", "backwards", "back",
    ];
    let mut overridden = [false; 6];
    for key in face_keys {
        let Some(side) = BlockSide::from_definition_key(key) else {
            continue;
        };
        if overridden[side.index()] {
            continue;
        }
        if let Some(tile) = int_field(fields, key) {
            block.set_tile_for_side(side, tile);
            overridden[side.index()] = true;
        }
    }

    block
}

fn str_field<'a>(fields: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    fields.get(key).and_then(Value::as_str)
}

/// Numbers are truncated toward zero, so `2.7` reads as tile 2.
fn int_field(fields: &Map<String, Value>, key: &str) -> Option<i32> {
    fields.get(key).and_then(Value::as_f64).map(|value| value as i32)
}
