//! Immutable block id <-> name table

use std::collections::HashMap;
use std::sync::LazyLock;

use super::block::ids;

/// Highest id the builtin registry knows about
pub const MAX_BUILTIN_ID: u16 = 255;

static BUILTIN: LazyLock<BlockRegistry> = LazyLock::new(BlockRegistry::with_builtin_names);

/// Lookup table of known block types.
///
/// Built once and then only read; share it by reference.
#[derive(Debug, Clone)]
pub struct BlockRegistry {
    names: HashMap<u16, &'static str>,
    by_name: HashMap<&'static str, u16>,
    max_id: u16,
}

impl BlockRegistry {
    /// Registry covering ids `0..=max_id` with no names
    pub fn new(max_id: u16) -> Self {
        Self {
            names: HashMap::new(),
            by_name: HashMap::new(),
            max_id,
        }
    }

    /// The process-wide builtin registry
    pub fn builtin() -> &'static BlockRegistry {
        &BUILTIN
    }

    fn with_builtin_names() -> Self {
        let mut registry = Self::new(MAX_BUILTIN_ID);
        for (id, name) in [
            (ids::AIR, "air"),
            (ids::STONE, "stone"),
            (ids::GRASS, "grass"),
            (ids::DIRT, "dirt"),
            (ids::COBBLESTONE, "cobblestone"),
            (ids::PLANKS, "planks"),
            (6, "sapling"),
            (ids::BEDROCK, "bedrock"),
            (8, "flowing_water"),
            (ids::WATER, "water"),
            (10, "flowing_lava"),
            (11, "lava"),
            (ids::SAND, "sand"),
            (13, "gravel"),
            (14, "gold_ore"),
            (15, "iron_ore"),
            (16, "coal_ore"),
            (ids::LOG, "log"),
            (ids::LEAVES, "leaves"),
            (ids::GLASS, "glass"),
            (ids::WOOL, "wool"),
            (46, "tnt"),
            (49, "obsidian"),
            (50, "torch"),
            (54, "chest"),
            (ids::SNOW_LAYER, "snow_layer"),
            (ids::VINE, "vine"),
        ] {
            registry.register(id, name);
        }
        registry
    }

    /// Attach a name to an id; ids above the current ceiling raise it
    pub fn register(&mut self, id: u16, name: &'static str) {
        self.max_id = self.max_id.max(id);
        self.names.insert(id, name);
        self.by_name.insert(name, id);
    }

    /// Whether `id` is a valid block type
    pub fn is_known(&self, id: u16) -> bool {
        id <= self.max_id
    }

    pub fn name(&self, id: u16) -> Option<&'static str> {
        self.names.get(&id).copied()
    }

    pub fn id_by_name(&self, name: &str) -> Option<u16> {
        self.by_name.get(name.to_ascii_lowercase().as_str()).copied()
    }

    pub fn max_id(&self) -> u16 {
        self.max_id
    }
}
