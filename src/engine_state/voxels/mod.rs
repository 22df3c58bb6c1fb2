//! # Voxel Data
//!
//! This module contains the data side of the engine: what a block is and
//! where blocks are placed.
//!
//! ## Architecture
//!
//! * **Block**: Block records, their faces and per-face atlas tiles
//! * **Block Registry**: The arena owning every block record, plus the definition file loader
//! * **World**: The flat grid of cells referring to registered blocks
//!
//! ## Ownership
//!
//! Grid cells hold [`block::block_registry::BlockId`] handles rather than
//! references. The registry never removes blocks, so a handle cannot dangle
//! while the registry is alive.

pub mod block;
pub mod world;
