//! Chunk tracking for an edit session: which columns were written (and need
//! a lighting pass after fast mode) and which were already checked for residency.

use std::collections::{BTreeSet, HashSet};

use crate::core::types::BlockPos;
use crate::voxel::chunk::ChunkCoord;

/// Tracks chunks touched by edits.
///
/// Touched columns are kept sorted for deterministic fixups.
#[derive(Debug, Default)]
pub struct ChunkInvalidator {
    /// Columns written to
    touched: BTreeSet<ChunkCoord>,
    /// Columns already passed through `check_loaded_chunk`
    resident: HashSet<ChunkCoord>,
}

impl ChunkInvalidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a write at `pos`.
    pub fn mark_dirty(&mut self, pos: BlockPos) {
        self.touched.insert(ChunkCoord::from_block(pos));
    }

    /// Mark a whole column as touched, e.g. after it was rewritten wholesale.
    pub fn mark_chunk_dirty(&mut self, coord: ChunkCoord) {
        self.touched.insert(coord);
    }

    /// Returns true the first time a column is seen, meaning the caller
    /// still has to make it resident.
    pub fn needs_load_check(&mut self, pos: BlockPos) -> bool {
        self.resident.insert(ChunkCoord::from_block(pos))
    }

    /// Forget a residency check, e.g. after the chunk was regenerated.
    pub fn forget_resident(&mut self, coord: ChunkCoord) {
        self.resident.remove(&coord);
    }

    /// Touched columns in sorted order
    pub fn dirty_chunks(&self) -> Vec<ChunkCoord> {
        self.touched.iter().copied().collect()
    }
}
