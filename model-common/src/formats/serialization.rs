//! Binary serialization trait for format headers.
//!
//! Every file header implements `BinarySerializable` so tools that sniff a
//! file's magic can parse any header through one generic function, while
//! each header keeps its type-specific `to_bytes()` returning a fixed array.

/// Trait for binary-serializable file headers.
///
/// The trait uses `Vec<u8>` for the return type because associated const
/// generics in return types (`[u8; Self::SIZE]`) are not yet stable.
pub trait BinarySerializable: Sized {
    /// Size of the serialized header in bytes, magic included.
    const SIZE: usize;

    /// Magic number identifying the file format.
    const MAGIC: u32;

    /// Serialize to bytes.
    fn serialize(&self) -> Vec<u8>;

    /// Deserialize from bytes.
    ///
    /// Returns `None` if the byte slice is too short or the magic does not match.
    fn deserialize(bytes: &[u8]) -> Option<Self>;
}

impl BinarySerializable for super::ModelHeader {
    const SIZE: usize = Self::SIZE;
    const MAGIC: u32 = super::MODEL_MAGIC;

    fn serialize(&self) -> Vec<u8> {
        self.to_bytes().to_vec()
    }

    fn deserialize(bytes: &[u8]) -> Option<Self> {
        Self::from_bytes(bytes)
    }
}

impl BinarySerializable for super::SceneHeader {
    const SIZE: usize = Self::SIZE;
    const MAGIC: u32 = super::SCENE_MAGIC;

    fn serialize(&self) -> Vec<u8> {
        self.to_bytes().to_vec()
    }

    fn deserialize(bytes: &[u8]) -> Option<Self> {
        Self::from_bytes(bytes)
    }
}

impl BinarySerializable for super::AnimationHeader {
    const SIZE: usize = Self::SIZE;
    const MAGIC: u32 = super::ANIMATION_MAGIC;

    fn serialize(&self) -> Vec<u8> {
        self.to_bytes().to_vec()
    }

    fn deserialize(bytes: &[u8]) -> Option<Self> {
        Self::from_bytes(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::{AnimationHeader, ModelHeader, SceneHeader};

    #[test]
    fn test_serialized_sizes() {
        assert_eq!(ModelHeader::new(3, 9, 3).serialize().len(), 20);
        assert_eq!(SceneHeader::new([0.0; 3], [0.0; 3]).serialize().len(), 28);
        assert_eq!(AnimationHeader::new(1, 1, 1).serialize().len(), 16);
    }

    #[test]
    fn test_magic_leads_every_header() {
        fn magic_of<T: BinarySerializable>(header: &T) -> u32 {
            let bytes = header.serialize();
            u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
        }

        assert_eq!(magic_of(&ModelHeader::new(0, 9, 0)), ModelHeader::MAGIC);
        assert_eq!(magic_of(&SceneHeader::new([0.0; 3], [1.0; 3])), SceneHeader::MAGIC);
        assert_eq!(magic_of(&AnimationHeader::new(2, 3, 4)), AnimationHeader::MAGIC);
    }

    #[test]
    fn test_deserialize_rejects_other_formats() {
        let model = ModelHeader::new(3, 9, 3).serialize();
        assert!(AnimationHeader::deserialize(&model).is_none());
        assert!(SceneHeader::deserialize(&model).is_none());
        assert!(ModelHeader::deserialize(&model).is_some());
    }
}
