//! Texture atlas handling.
//!
//! An atlas is a single image divided into equally sized tiles. Tiles are
//! addressed by a linear index, row by row, starting at the top-left tile:
//!
//! ```text
//! +----+----+----+----+
//! |  0 |  1 |  2 |  3 |   row 0 (top of the image)
//! +----+----+----+----+
//! |  4 |  5 |  6 |  7 |   row 1
//! +----+----+----+----+
//! ```
//!
//! The image is stored bottom row first (it is flipped on load), so `v = 1`
//! is the top edge of the image and tile rows count downwards from there.
//!
//! [`AtlasLayout`] holds the tile arithmetic and needs no GPU. [`TextureAtlas`]
//! pairs a layout with the uploaded texture.

use std::path::Path;

use image::RgbaImage;
use log::info;
use thiserror::Error;
use wgpu::{Device, Queue};

use super::texture::Texture;

/// Errors produced while loading an atlas.
#[derive(Error, Debug)]
pub enum AtlasError {
    /// The image could not be opened or decoded.
    #[error("failed to load atlas image {path}: {source}")]
    Decode {
        /// File that was being loaded
        path: String,
        /// Underlying decoder error
        #[source]
        source: image::ImageError,
    },
    /// A tile dimension was zero or negative.
    #[error("invalid atlas tile size {tile_width}x{tile_height}")]
    InvalidTileSize {
        /// Requested tile width in pixels
        tile_width: i32,
        /// Requested tile height in pixels
        tile_height: i32,
    },
    /// The image cannot hold a single tile.
    #[error("atlas image {width}x{height} is smaller than one {tile_width}x{tile_height} tile")]
    TooSmall {
        /// Image width in pixels
        width: u32,
        /// Image height in pixels
        height: u32,
        /// Tile width in pixels
        tile_width: u32,
        /// Tile height in pixels
        tile_height: u32,
    },
}

/// A rectangle in normalized texture coordinates.
///
/// `(u0, v0)` is the bottom-left corner and `(u1, v1)` the top-right corner.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TileUv {
    /// Left edge
    pub u0: f32,
    /// Bottom edge
    pub v0: f32,
    /// Right edge
    pub u1: f32,
    /// Top edge
    pub v1: f32,
}

impl TileUv {
    /// The whole texture, used when there is no usable atlas.
    pub const FULL: TileUv = TileUv {
        u0: 0.0,
        v0: 0.0,
        u1: 1.0,
        v1: 1.0,
    };

    /// Corners of the rectangle in quad winding order: bottom-left,
    /// bottom-right, top-right, top-left.
    pub fn corners(&self) -> [[f32; 2]; 4] {
        [
            [self.u0, self.v0],
            [self.u1, self.v0],
            [self.u1, self.v1],
            [self.u0, self.v1],
        ]
    }
}

/// Anything that can turn a tile index into texture coordinates.
pub trait TileUvSource {
    /// Whether the source describes a usable atlas.
    fn is_valid(&self) -> bool;

    /// Texture coordinates of a tile. Sources that are not valid return
    /// [`TileUv::FULL`].
    fn tile_uv(&self, tile_index: i32) -> TileUv;
}

/// Tile arithmetic for an atlas image.
///
/// A layout always has at least one column and one row.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct AtlasLayout {
    width: u32,
    height: u32,
    tile_width: u32,
    tile_height: u32,
    columns: u32,
    rows: u32,
}

impl AtlasLayout {
    /// Creates the layout of a `width` x `height` image cut into
    /// `tile_width` x `tile_height` tiles. Partial tiles at the right and
    /// bottom edges are ignored.
    pub fn new(
        width: u32,
        height: u32,
        tile_width: i32,
        tile_height: i32,
    ) -> Result<Self, AtlasError> {
        if tile_width <= 0 || tile_height <= 0 {
            return Err(AtlasError::InvalidTileSize {
                tile_width,
                tile_height,
            });
        }
        let (tile_width, tile_height) = (tile_width as u32, tile_height as u32);
        let columns = width / tile_width;
        let rows = height / tile_height;
        if columns == 0 || rows == 0 {
            return Err(AtlasError::TooSmall {
                width,
                height,
                tile_width,
                tile_height,
            });
        }

        Ok(Self {
            width,
            height,
            tile_width,
            tile_height,
            columns,
            rows,
        })
    }

    /// Number of tile columns.
    pub fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of tile rows.
    pub fn rows(&self) -> u32 {
        self.rows
    }

    /// Number of addressable tiles.
    pub fn tile_count(&self) -> u32 {
        self.columns * self.rows
    }

    /// Image size in pixels.
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Column and row of a tile index.
    ///
    /// Negative indices become 0. The row is clamped to the last row, so
    /// indices past the end land on the bottom row rather than wrapping.
    pub fn tile_position(&self, tile_index: i32) -> (u32, u32) {
        let index = tile_index.max(0) as u32;
        let column = (index % self.columns).min(self.columns - 1);
        let row = (index / self.columns).min(self.rows - 1);
        (column, row)
    }
}

impl TileUvSource for AtlasLayout {
    fn is_valid(&self) -> bool {
        true
    }

    fn tile_uv(&self, tile_index: i32) -> TileUv {
        let (column, row) = self.tile_position(tile_index);
        let width = self.width as f32;
        let height = self.height as f32;

        TileUv {
            u0: (column * self.tile_width) as f32 / width,
            u1: ((column + 1) * self.tile_width) as f32 / width,
            v0: 1.0 - ((row + 1) * self.tile_height) as f32 / height,
            v1: 1.0 - (row * self.tile_height) as f32 / height,
        }
    }
}

/// A decoded atlas image that has not been uploaded yet.
pub struct AtlasImage {
    /// Tile arithmetic for the image
    pub layout: AtlasLayout,
    /// RGBA8 pixels, bottom row first when loaded flipped
    pub pixels: RgbaImage,
}

impl AtlasImage {
    /// Decodes an image file and validates it against the tile size.
    ///
    /// # Arguments
    /// * `path` - Image file to decode
    /// * `tile_width`, `tile_height` - Size of one tile in pixels
    /// * `flip_vertically` - Store the bottom image row first, which makes tile
    ///   row 0 the top row of the picture
    pub fn decode(
        path: impl AsRef<Path>,
        tile_width: i32,
        tile_height: i32,
        flip_vertically: bool,
    ) -> Result<Self, AtlasError> {
        let path = path.as_ref();
        let mut pixels = image::open(path)
            .map_err(|source| AtlasError::Decode {
                path: path.display().to_string(),
                source,
            })?
            .to_rgba8();

        let layout = AtlasLayout::new(pixels.width(), pixels.height(), tile_width, tile_height)?;

        if flip_vertically {
            image::imageops::flip_vertical_in_place(&mut pixels);
        }

        Ok(Self { layout, pixels })
    }
}

/// An atlas image resident on the GPU together with its layout.
struct LoadedAtlas {
    layout: AtlasLayout,
    texture: Texture,
}

/// The block texture atlas.
///
/// Starts out invalid. While invalid every tile maps to [`TileUv::FULL`] and
/// blocks are drawn with their flat colours.
#[derive(Default)]
pub struct TextureAtlas {
    loaded: Option<LoadedAtlas>,
}

impl TextureAtlas {
    /// Creates an invalid atlas.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads an atlas image and uploads it as a mipmapped texture.
    ///
    /// Any previously loaded texture is released first. On failure the atlas
    /// stays invalid and keeps nothing of the failed load.
    pub fn load_from_file(
        &mut self,
        device: &Device,
        queue: &Queue,
        path: impl AsRef<Path>,
        tile_width: i32,
        tile_height: i32,
        flip_vertically: bool,
    ) -> Result<(), AtlasError> {
        self.loaded = None;

        let path = path.as_ref();
        let AtlasImage { layout, pixels } =
            AtlasImage::decode(path, tile_width, tile_height, flip_vertically)?;

        let (width, height) = layout.size();
        info!(
            "Atlas {}: {}x{} pixels, {}x{} tiles",
            path.display(),
            width,
            height,
            layout.columns(),
            layout.rows()
        );

        let texture = Texture::create_atlas_texture(device, queue, &pixels, "Block Atlas");
        self.loaded = Some(LoadedAtlas { layout, texture });
        Ok(())
    }

    /// Releases the texture, leaving the atlas invalid.
    pub fn unload(&mut self) {
        self.loaded = None;
    }

    /// Tile layout, `None` while invalid.
    pub fn layout(&self) -> Option<&AtlasLayout> {
        self.loaded.as_ref().map(|loaded| &loaded.layout)
    }

    /// GPU texture, `None` while invalid.
    pub fn texture(&self) -> Option<&Texture> {
        self.loaded.as_ref().map(|loaded| &loaded.texture)
    }
}

impl TileUvSource for TextureAtlas {
    fn is_valid(&self) -> bool {
        self.loaded.is_some()
    }

    fn tile_uv(&self, tile_index: i32) -> TileUv {
        match self.layout() {
            Some(layout) => layout.tile_uv(tile_index),
            None => TileUv::FULL,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout_64() -> AtlasLayout {
        AtlasLayout::new(64, 64, 16, 16).unwrap()
    }

    #[test]
    fn first_tile_is_top_left() {
        let uv = layout_64().tile_uv(0);
        assert_eq!(
            uv,
            TileUv {
                u0: 0.0,
                v0: 0.75,
                u1: 0.25,
                v1: 1.0
            }
        );
    }

    #[test]
    fn tiles_advance_across_then_down() {
        let layout = layout_64();
        let uv = layout.tile_uv(6);
        assert_eq!((uv.u0, uv.u1), (0.5, 0.75));
        assert_eq!((uv.v0, uv.v1), (0.5, 0.75));
    }

    #[test]
    fn every_valid_tile_is_a_proper_sub_rectangle() {
        let layout = AtlasLayout::new(96, 48, 16, 16).unwrap();
        for index in 0..layout.tile_count() as i32 {
            let uv = layout.tile_uv(index);
            assert!(0.0 <= uv.u0 && uv.u0 < uv.u1 && uv.u1 <= 1.0, "tile {index}: {uv:?}");
            assert!(0.0 <= uv.v0 && uv.v0 < uv.v1 && uv.v1 <= 1.0, "tile {index}: {uv:?}");
        }
    }

    #[test]
    fn adjacent_tiles_share_edges_exactly() {
        let layout = layout_64();
        assert_eq!(layout.tile_uv(0).u1, layout.tile_uv(1).u0);
        assert_eq!(layout.tile_uv(0).v0, layout.tile_uv(4).v1);
    }

    #[test]
    fn out_of_range_indices_clamp_to_boundary_tiles() {
        let layout = layout_64();
        assert_eq!(layout.tile_uv(-1), layout.tile_uv(0));

        // 21 is column 1 of row 5, which clamps to row 3.
        let past_end = layout.tile_count() as i32 + 5;
        assert_eq!(layout.tile_position(past_end), (1, 3));
        assert_eq!(layout.tile_uv(past_end), layout.tile_uv(13));

        let uv = layout.tile_uv(i32::MAX);
        for c in [uv.u0, uv.u1, uv.v0, uv.v1] {
            assert!((0.0..=1.0).contains(&c));
        }
    }

    #[test]
    fn partial_tiles_are_ignored() {
        let layout = AtlasLayout::new(70, 40, 16, 16).unwrap();
        assert_eq!((layout.columns(), layout.rows()), (4, 2));
    }

    #[test]
    fn invalid_tile_sizes_are_rejected() {
        assert!(matches!(
            AtlasLayout::new(64, 64, 0, 16),
            Err(AtlasError::InvalidTileSize { .. })
        ));
        assert!(matches!(
            AtlasLayout::new(64, 64, 16, -4),
            Err(AtlasError::InvalidTileSize { .. })
        ));
        assert!(matches!(
            AtlasLayout::new(8, 64, 16, 16),
            Err(AtlasError::TooSmall { .. })
        ));
    }

    #[test]
    fn unloaded_atlas_maps_everything_to_full_rectangle() {
        let atlas = TextureAtlas::new();
        assert!(!atlas.is_valid());
        for index in [-1, 0, 5, 1000] {
            assert_eq!(atlas.tile_uv(index), TileUv::FULL);
        }
    }

    #[test]
    fn decoding_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = AtlasImage::decode(dir.path().join("atlas.png"), 16, 16, true);
        assert!(matches!(result, Err(AtlasError::Decode { .. })));
    }

    #[test]
    fn decoding_flips_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("atlas.png");
        let mut source = RgbaImage::new(32, 32);
        source.put_pixel(0, 0, image::Rgba([255, 0, 0, 255]));
        source.save(&path).unwrap();

        let flipped = AtlasImage::decode(&path, 16, 16, true).unwrap();
        assert_eq!(flipped.layout.tile_count(), 4);
        assert_eq!(flipped.pixels.get_pixel(0, 31).0, [255, 0, 0, 255]);

        let upright = AtlasImage::decode(&path, 16, 16, false).unwrap();
        assert_eq!(upright.pixels.get_pixel(0, 0).0, [255, 0, 0, 255]);
    }

    #[test]
    fn decoding_rejects_image_smaller_than_a_tile() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tiny.png");
        RgbaImage::new(8, 8).save(&path).unwrap();

        let result = AtlasImage::decode(&path, 16, 16, true);
        assert!(matches!(result, Err(AtlasError::TooSmall { .. })));
    }

    #[test]
    fn quad_corners_follow_winding_order() {
        let uv = layout_64().tile_uv(0);
        assert_eq!(
            uv.corners(),
            [[0.0, 0.75], [0.25, 0.75], [0.25, 1.0], [0.0, 1.0]]
        );
    }
}
