//! The world capability surface consumed by the edit engine, and an
//! in-memory implementation of it.

use std::collections::{HashMap, HashSet};

use crate::config::EditConfig;
use crate::core::types::BlockPos;
use super::block::BlockState;
use super::chunk::{column_index, ChunkCoord, ChunkCubeCoord, CHUNK_AREA, CHUNK_EDGE};
use super::generator::{ChunkGenerator, FlatGenerator};
use super::registry::BlockRegistry;

/// Capability flags a world declares up front
pub mod flags {
    /// Native chunk regeneration is available
    pub const REGENERATE: u32 = 1 << 0;
    /// The world is segmented vertically into 16-high cubes
    pub const CUBIC_CHUNKS: u32 = 1 << 1;
    /// Lighting can be recomputed after fast-mode writes
    pub const LIGHTING: u32 = 1 << 2;
}

/// Versioned capability set negotiated once when an edit session opens
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Capabilities {
    pub version: u16,
    pub flags: u32,
}

impl Capabilities {
    /// Current capability protocol version
    pub const VERSION: u16 = 1;

    pub const fn new(flags: u32) -> Self {
        Self {
            version: Self::VERSION,
            flags,
        }
    }

    pub fn has(&self, flag: u32) -> bool {
        self.flags & flag == flag
    }

    pub fn can_regenerate(&self) -> bool {
        self.has(flags::REGENERATE)
    }

    pub fn is_cubic(&self) -> bool {
        self.has(flags::CUBIC_CHUNKS)
    }
}

/// Everything the edit engine needs from a concrete world.
///
/// Implementations are thread confined: all calls happen on the world's own
/// update thread (see `platform::dispatch`).
pub trait WorldAccess {
    /// World name, used in logs and errors
    fn name(&self) -> &str;

    /// Validity token; false once the world has been unloaded
    fn is_valid(&self) -> bool;

    fn capabilities(&self) -> Capabilities;

    fn block(&self, pos: BlockPos) -> BlockState;

    /// Best effort write. `false` means the world did not accept the change,
    /// which does not guarantee that nothing changed.
    fn set_block(&mut self, pos: BlockPos, block: &BlockState, notify_and_light: bool) -> bool;

    fn min_y(&self) -> i32;

    fn max_y(&self) -> i32;

    fn is_valid_block_type(&self, id: u16) -> bool;

    /// Make sure the chunk containing `pos` is resident. May be slow.
    fn check_loaded_chunk(&mut self, pos: BlockPos);

    fn is_chunk_loaded(&self, chunk: ChunkCoord) -> bool;

    /// Reset a whole chunk column to its generated state
    fn regenerate_chunk(&mut self, chunk: ChunkCoord) -> bool;

    /// Reset a single chunk cube; only meaningful for cubic worlds
    fn regenerate_cube(&mut self, _cube: ChunkCubeCoord) -> bool {
        false
    }

    /// Correct lighting and send notifications after fast-mode writes
    fn fix_after_fast_mode(&mut self, chunks: &[ChunkCoord]);

    fn fix_lighting(&mut self, chunks: &[ChunkCoord]);

    /// Combined light level (0-15)
    fn light_level(&self, pos: BlockPos) -> u8;
}

/// Startup settings for a [`MemoryWorld`]
#[derive(Clone, Debug)]
pub struct MemoryWorldSettings {
    pub name: String,
    pub min_y: i32,
    pub max_y: i32,
    pub cubic_chunks: bool,
    /// Highest valid block id
    pub max_block_id: u16,
}

impl Default for MemoryWorldSettings {
    fn default() -> Self {
        Self {
            name: "world".to_string(),
            min_y: 0,
            max_y: 127,
            cubic_chunks: false,
            max_block_id: BlockRegistry::builtin().max_id(),
        }
    }
}

impl MemoryWorldSettings {
    /// Settings for a world named `name`, taking the chunk layout from configuration
    pub fn from_config(name: impl Into<String>, config: &EditConfig) -> Self {
        Self {
            name: name.into(),
            cubic_chunks: config.cubic_chunks,
            ..Default::default()
        }
    }
}

/// Packed block storage for one loaded chunk column
struct Column {
    blocks: Vec<u32>,
}

/// Counters exposed for inspection
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WorldStats {
    pub notified_writes: usize,
    pub silent_writes: usize,
    pub chunk_loads: usize,
    pub regenerations: usize,
    pub fast_mode_fixes: usize,
    pub lighting_fixes: usize,
}

/// Sparse in-memory world made of lazily generated chunk columns
pub struct MemoryWorld {
    settings: MemoryWorldSettings,
    generator: Box<dyn ChunkGenerator>,
    /// Resident columns
    loaded: HashMap<ChunkCoord, Column>,
    /// Columns that were unloaded and keep their edited content
    stored: HashMap<ChunkCoord, Column>,
    /// Columns that refuse to load
    blocked: HashSet<ChunkCoord>,
    valid: bool,
    stats: WorldStats,
}

impl MemoryWorld {
    /// Create a world with a flat generator
    pub fn new(settings: MemoryWorldSettings) -> Self {
        Self::with_generator(settings, Box::new(FlatGenerator::default()))
    }

    pub fn with_generator(settings: MemoryWorldSettings, generator: Box<dyn ChunkGenerator>) -> Self {
        Self {
            settings,
            generator,
            loaded: HashMap::new(),
            stored: HashMap::new(),
            blocked: HashSet::new(),
            valid: true,
            stats: WorldStats::default(),
        }
    }

    pub fn settings(&self) -> &MemoryWorldSettings {
        &self.settings
    }

    pub fn stats(&self) -> &WorldStats {
        &self.stats
    }

    /// Number of resident columns
    pub fn loaded_count(&self) -> usize {
        self.loaded.len()
    }

    /// Unload a column, keeping its content for a later reload
    pub fn unload_chunk(&mut self, chunk: ChunkCoord) {
        if let Some(column) = self.loaded.remove(&chunk) {
            self.stored.insert(chunk, column);
        }
    }

    /// Unload a column and refuse to load it again until unblocked
    pub fn block_chunk(&mut self, chunk: ChunkCoord) {
        self.unload_chunk(chunk);
        self.blocked.insert(chunk);
    }

    pub fn unblock_chunk(&mut self, chunk: ChunkCoord) {
        self.blocked.remove(&chunk);
    }

    /// Drop the validity token, as if the world had been unloaded
    pub fn invalidate(&mut self) {
        self.valid = false;
    }

    fn height(&self) -> usize {
        (self.settings.max_y - self.settings.min_y + 1).max(0) as usize
    }

    fn in_height(&self, y: i32) -> bool {
        y >= self.settings.min_y && y <= self.settings.max_y
    }

    fn index(&self, pos: BlockPos) -> usize {
        (pos.y - self.settings.min_y) as usize * CHUNK_AREA + column_index(pos)
    }

    fn generate_column(&self, chunk: ChunkCoord) -> Column {
        let mut blocks = vec![0u32; self.height() * CHUNK_AREA];
        for y in self.settings.min_y..=self.settings.max_y {
            self.fill_layer(&mut blocks, chunk, y);
        }
        Column { blocks }
    }

    fn fill_layer(&self, blocks: &mut [u32], chunk: ChunkCoord, y: i32) {
        let origin = chunk.min_block(y);
        for z in 0..CHUNK_EDGE {
            for x in 0..CHUNK_EDGE {
                let pos = origin + BlockPos::new(x, 0, z);
                blocks[self.index(pos)] = self.generator.generate(pos).pack();
            }
        }
    }

    /// Load or generate a column; false if it is blocked
    fn ensure_loaded(&mut self, chunk: ChunkCoord) -> bool {
        if self.loaded.contains_key(&chunk) {
            return true;
        }
        if self.blocked.contains(&chunk) {
            log::warn!("Chunk {:?} in '{}' refused to load", chunk, self.settings.name);
            return false;
        }
        let column = match self.stored.remove(&chunk) {
            Some(column) => column,
            None => self.generate_column(chunk),
        };
        self.loaded.insert(chunk, column);
        self.stats.chunk_loads += 1;
        true
    }

    fn is_transparent(block: &BlockState) -> bool {
        block.is_air() || block.id() == super::block::ids::GLASS
    }
}

impl WorldAccess for MemoryWorld {
    fn name(&self) -> &str {
        &self.settings.name
    }

    fn is_valid(&self) -> bool {
        self.valid
    }

    fn capabilities(&self) -> Capabilities {
        let mut bits = flags::REGENERATE | flags::LIGHTING;
        if self.settings.cubic_chunks {
            bits |= flags::CUBIC_CHUNKS;
        }
        Capabilities::new(bits)
    }

    fn block(&self, pos: BlockPos) -> BlockState {
        if !self.in_height(pos.y) {
            return BlockState::AIR;
        }
        let chunk = ChunkCoord::from_block(pos);
        match self.loaded.get(&chunk).or_else(|| self.stored.get(&chunk)) {
            Some(column) => BlockState::unpack(column.blocks[self.index(pos)]),
            None => self.generator.generate(pos),
        }
    }

    fn set_block(&mut self, pos: BlockPos, block: &BlockState, notify_and_light: bool) -> bool {
        if !self.valid || !self.in_height(pos.y) || !self.is_valid_block_type(block.id()) {
            return false;
        }
        let chunk = ChunkCoord::from_block(pos);
        if !self.ensure_loaded(chunk) {
            return false;
        }
        let index = self.index(pos);
        let Some(column) = self.loaded.get_mut(&chunk) else {
            return false;
        };
        column.blocks[index] = block.pack();
        if notify_and_light {
            self.stats.notified_writes += 1;
        } else {
            self.stats.silent_writes += 1;
        }
        true
    }

    fn min_y(&self) -> i32 {
        self.settings.min_y
    }

    fn max_y(&self) -> i32 {
        self.settings.max_y
    }

    fn is_valid_block_type(&self, id: u16) -> bool {
        id <= self.settings.max_block_id
    }

    fn check_loaded_chunk(&mut self, pos: BlockPos) {
        self.ensure_loaded(ChunkCoord::from_block(pos));
    }

    fn is_chunk_loaded(&self, chunk: ChunkCoord) -> bool {
        self.loaded.contains_key(&chunk)
    }

    fn regenerate_chunk(&mut self, chunk: ChunkCoord) -> bool {
        if !self.valid || self.blocked.contains(&chunk) {
            return false;
        }
        self.stored.remove(&chunk);
        let column = self.generate_column(chunk);
        self.loaded.insert(chunk, column);
        self.stats.regenerations += 1;
        true
    }

    fn regenerate_cube(&mut self, cube: ChunkCubeCoord) -> bool {
        if !self.valid || !self.settings.cubic_chunks {
            return false;
        }
        let chunk = cube.column();
        if !self.ensure_loaded(chunk) {
            return false;
        }
        let Some(mut column) = self.loaded.remove(&chunk) else {
            return false;
        };
        let base = cube.min_block().y;
        for y in base..base + CHUNK_EDGE {
            if self.in_height(y) {
                self.fill_layer(&mut column.blocks, chunk, y);
            }
        }
        self.loaded.insert(chunk, column);
        self.stats.regenerations += 1;
        true
    }

    fn fix_after_fast_mode(&mut self, chunks: &[ChunkCoord]) {
        self.stats.fast_mode_fixes += chunks.len();
        self.fix_lighting(chunks);
    }

    fn fix_lighting(&mut self, chunks: &[ChunkCoord]) {
        log::debug!("Relighting {} chunks in '{}'", chunks.len(), self.settings.name);
        self.stats.lighting_fixes += chunks.len();
    }

    fn light_level(&self, pos: BlockPos) -> u8 {
        let open_sky = (pos.y + 1..=self.settings.max_y)
            .all(|y| Self::is_transparent(&self.block(BlockPos::new(pos.x, y, pos.z))));
        if open_sky { 15 } else { 0 }
    }
}
