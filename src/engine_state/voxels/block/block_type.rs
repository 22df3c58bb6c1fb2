//! # Block Type Module
//!
//! Well-known block types and the flat colours used to draw blocks when no
//! texture atlas is available.

use cgmath::Vector3;

/// Enumerates the block types that have a hand-picked fallback colour.
///
/// Any other block is coloured from a hash of its string id, see
/// [`fallback_color`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BlockType {
    /// Grey stone, also the built-in block used when no definitions load.
    STONE,

    /// Brown dirt.
    DIRT,

    /// Green grass.
    GRASS,
}

impl BlockType {
    /// Resolves a block string id to a well-known type.
    ///
    /// # Returns
    /// `None` if the id is not one of the well-known ids (matching is case sensitive)
    pub fn from_id(id: &str) -> Option<Self> {
        match id {
            "Stone" => Some(BlockType::STONE),
            "Dirt" => Some(BlockType::DIRT),
            "Grass" => Some(BlockType::GRASS),
            _ => None,
        }
    }

    /// The string id this type is registered under.
    pub fn id(self) -> &'static str {
        match self {
            BlockType::STONE => "Stone",
            BlockType::DIRT => "Dirt",
            BlockType::GRASS => "Grass",
        }
    }

    /// The fixed colour of this type.
    pub fn color(self) -> Vector3<f32> {
        match self {
            BlockType::STONE => Vector3::new(0.5, 0.5, 0.55),
            BlockType::DIRT => Vector3::new(0.45, 0.32, 0.15),
            BlockType::GRASS => Vector3::new(0.2, 0.7, 0.2),
        }
    }
}

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// 64-bit FNV-1a hash of a string.
///
/// Used instead of `std::hash` because the result must be stable across
/// builds and platforms.
pub fn id_hash(id: &str) -> u64 {
    id.bytes().fold(FNV_OFFSET_BASIS, |hash, byte| {
        (hash ^ byte as u64).wrapping_mul(FNV_PRIME)
    })
}

/// Flat colour for a block id.
///
/// Well-known ids use their fixed colour. Every other id derives each channel
/// from one byte of [`id_hash`], mapped into `0.3..=1.0` so blocks never
/// render black.
pub fn fallback_color(id: &str) -> Vector3<f32> {
    if let Some(block_type) = BlockType::from_id(id) {
        return block_type.color();
    }

    let hash = id_hash(id);
    let channel = |shift: u32| 0.3 + ((hash >> shift) & 0xFF) as f32 / 255.0 * 0.7;
    Vector3::new(channel(0), channel(8), channel(16))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_ids_use_fixed_colors() {
        assert_eq!(fallback_color("Stone"), Vector3::new(0.5, 0.5, 0.55));
        assert_eq!(fallback_color("Dirt"), Vector3::new(0.45, 0.32, 0.15));
        assert_eq!(fallback_color("Grass"), Vector3::new(0.2, 0.7, 0.2));
        for block_type in [BlockType::STONE, BlockType::DIRT, BlockType::GRASS] {
            assert_eq!(BlockType::from_id(block_type.id()), Some(block_type));
        }
    }

    #[test]
    fn hash_matches_reference_fnv1a() {
        assert_eq!(id_hash(""), 0xcbf29ce484222325);
        assert_eq!(id_hash("a"), 0xaf63dc4c8601ec8c);
    }

    #[test]
    fn unknown_ids_are_deterministic_and_in_range() {
        let a = fallback_color("Sandstone");
        assert_eq!(a, fallback_color("Sandstone"));
        for c in [a.x, a.y, a.z] {
            assert!((0.3..=1.0).contains(&c));
        }
        assert_ne!(a, fallback_color("Cobblestone"));
    }

    #[test]
    fn lookup_is_case_sensitive() {
        assert_eq!(BlockType::from_id("stone"), None);
    }
}
