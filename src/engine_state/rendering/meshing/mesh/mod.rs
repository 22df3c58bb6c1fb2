//! Mesh geometry for block rendering.
//!
//! # Architecture
//! - [`Mesh`]: Vertex and index lists built one quad at a time
//! - [`Face`]: The four world-space corners of one block side
//!
//! # Usage
//! ```ignore
//! let face = Face::new(Vector3::new(0.0, 0.0, 0.0), BlockSide::TOP);
//! let mut mesh = Mesh::new();
//! mesh.push_quad(&face, block.color(), atlas.tile_uv(block.tile_for_side(BlockSide::TOP)));
//! ```

mod face;
#[allow(clippy::module_inception)]
mod mesh;

pub use face::{corner_offsets, Face};
pub use mesh::*;
