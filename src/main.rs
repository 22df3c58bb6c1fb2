//! # Voxel Plane Application Entry Point
//!
//! Calls into the library's `run()` function to start the application.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --release -- config.json
//! ```

fn main() {
    voxel_plane::run();
}
