//! Block state data type

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Mask for the 4-bit auxiliary data value
pub const DATA_MASK: u8 = 0x0F;

/// Well-known block ids
pub mod ids {
    pub const AIR: u16 = 0;
    pub const STONE: u16 = 1;
    pub const GRASS: u16 = 2;
    pub const DIRT: u16 = 3;
    pub const COBBLESTONE: u16 = 4;
    pub const PLANKS: u16 = 5;
    pub const BEDROCK: u16 = 7;
    pub const WATER: u16 = 9;
    pub const SAND: u16 = 12;
    pub const LOG: u16 = 17;
    pub const LEAVES: u16 = 18;
    pub const GLASS: u16 = 20;
    pub const WOOL: u16 = 35;
    pub const SNOW_LAYER: u16 = 78;
    pub const VINE: u16 = 106;
}

/// A block's type plus auxiliary data
///
/// Two states are equal when type id and data match; the `extra` payload
/// (tile data and the like) rides along but is not compared. Data is always
/// within 0-15, so the fields are only reachable through accessors.
#[derive(Clone, Default)]
pub struct BlockState {
    id: u16,
    data: u8,
    extra: Option<Arc<[u8]>>,
}

impl BlockState {
    /// Air block
    pub const AIR: BlockState = BlockState {
        id: ids::AIR,
        data: 0,
        extra: None,
    };

    /// Create a block state; data is truncated to 4 bits
    pub const fn new(id: u16, data: u8) -> Self {
        Self {
            id,
            data: data & DATA_MASK,
            extra: None,
        }
    }

    /// Block state with zero data
    pub const fn of(id: u16) -> Self {
        Self::new(id, 0)
    }

    /// Copy of this state with different data
    pub fn with_data(&self, data: u8) -> Self {
        Self {
            data: data & DATA_MASK,
            ..self.clone()
        }
    }

    /// Copy of this state carrying an extra payload
    pub fn with_extra(&self, extra: impl Into<Arc<[u8]>>) -> Self {
        Self {
            extra: Some(extra.into()),
            ..self.clone()
        }
    }

    /// Block type id
    pub fn id(&self) -> u16 {
        self.id
    }

    /// Auxiliary data (0-15)
    pub fn data(&self) -> u8 {
        self.data
    }

    /// Opaque payload attached by the platform
    pub fn extra(&self) -> Option<&[u8]> {
        self.extra.as_deref()
    }

    pub fn is_air(&self) -> bool {
        self.id == ids::AIR
    }

    /// Pack type and data into one word (`id << 4 | data`); extra is dropped
    pub fn pack(&self) -> u32 {
        ((self.id as u32) << 4) | (self.data & DATA_MASK) as u32
    }

    /// Inverse of [`BlockState::pack`]
    pub fn unpack(packed: u32) -> Self {
        Self::new((packed >> 4) as u16, (packed & DATA_MASK as u32) as u8)
    }
}

impl PartialEq for BlockState {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.data == other.data
    }
}

impl Eq for BlockState {}

impl Hash for BlockState {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
        self.data.hash(state);
    }
}

impl fmt::Debug for BlockState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.extra {
            Some(extra) => write!(f, "{}:{} (+{} bytes)", self.id, self.data, extra.len()),
            None => write!(f, "{}:{}", self.id, self.data),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_data_is_masked() {
        let block = BlockState::new(35, 0x1F);
        assert_eq!(block.data(), 0x0F);
        assert_eq!(block.with_data(17).data(), 1);

        // Out of range data compares equal to what the world stores
        let wide = BlockState::new(ids::WOOL, 200);
        assert_eq!(BlockState::unpack(wide.pack()), wide);
    }

    #[test]
    fn test_equality_ignores_extra() {
        let plain = BlockState::new(54, 2);
        let tagged = plain.with_extra(vec![1u8, 2, 3]);
        assert_eq!(plain, tagged);
        assert_eq!(tagged.extra(), Some(&[1u8, 2, 3][..]));
        assert_eq!(plain.extra(), None);

        let mut set = HashSet::new();
        set.insert(plain.clone());
        assert!(set.contains(&tagged));

        assert_ne!(plain, BlockState::new(54, 3));
        assert_ne!(plain, BlockState::new(55, 2));
    }

    #[test]
    fn test_pack_unpack() {
        let block = BlockState::new(ids::WOOL, 14);
        assert_eq!(block.pack(), (35 << 4) | 14);
        assert_eq!(BlockState::unpack(block.pack()), block);
        assert_eq!(BlockState::unpack(0), BlockState::AIR);
    }

    #[test]
    fn test_air() {
        assert!(BlockState::AIR.is_air());
        assert!(BlockState::default().is_air());
        assert!(!BlockState::of(ids::STONE).is_air());
    }

    #[test]
    fn test_debug_format() {
        assert_eq!(format!("{:?}", BlockState::new(1, 2)), "1:2");
        assert_eq!(
            format!("{:?}", BlockState::new(1, 2).with_extra(vec![0u8; 4])),
            "1:2 (+4 bytes)"
        );
    }
}
