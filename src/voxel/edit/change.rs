//! Change records and replayable change sets.

use std::collections::{BTreeSet, HashMap, HashSet};

use crate::core::error::Error;
use crate::core::types::{BlockPos, Result};
use crate::voxel::block::BlockState;
use crate::voxel::chunk::ChunkCoord;
use crate::voxel::world::WorldAccess;

/// One block mutation
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Change {
    pub pos: BlockPos,
    pub before: BlockState,
    pub after: BlockState,
}

/// Outcome of replaying a change set
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RestoreReport {
    /// Positions set to the requested state
    pub restored: usize,
    /// Positions that could not be restored (chunk gone, invalid type, out of range)
    pub failed: usize,
}

impl RestoreReport {
    pub fn is_complete(&self) -> bool {
        self.failed == 0
    }
}

/// Ordered log of block changes for one edit operation.
///
/// Recording is append-only and bounded by an optional limit. Finalizing
/// compacts the log to one entry per position holding the first `before`
/// and the last `after`.
#[derive(Clone, Debug, Default)]
pub struct ChangeSet {
    changes: Vec<Change>,
    limit: Option<usize>,
    finalized: bool,
}

impl ChangeSet {
    /// Create a change set accepting at most `limit` records (`None` = unlimited)
    pub fn new(limit: Option<usize>) -> Self {
        Self {
            changes: Vec::new(),
            limit,
            finalized: false,
        }
    }

    pub fn unlimited() -> Self {
        Self::new(None)
    }

    /// Append a change. Fails without recording once the limit is reached,
    /// so callers check this before mutating the world.
    pub fn record(&mut self, pos: BlockPos, before: BlockState, after: BlockState) -> Result<()> {
        if let Some(limit) = self.limit {
            if self.changes.len() >= limit {
                return Err(Error::ChangeLimitExceeded {
                    limit,
                    changed: self.changes.len(),
                });
            }
        }
        self.finalized = false;
        self.changes.push(Change { pos, before, after });
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Change> {
        self.changes.iter()
    }

    /// Chunk columns touched by this set
    pub fn chunks(&self) -> BTreeSet<ChunkCoord> {
        self.changes.iter().map(|c| ChunkCoord::from_block(c.pos)).collect()
    }

    /// Compact to one entry per position (first `before`, last `after`,
    /// first-seen order) and drop entries that end where they started.
    pub fn finalize(&mut self) {
        if self.finalized {
            return;
        }
        let mut slots: HashMap<BlockPos, usize> = HashMap::with_capacity(self.changes.len());
        let mut compacted: Vec<Change> = Vec::with_capacity(self.changes.len());
        for change in self.changes.drain(..) {
            match slots.get(&change.pos) {
                Some(&slot) => compacted[slot].after = change.after,
                None => {
                    slots.insert(change.pos, compacted.len());
                    compacted.push(change);
                }
            }
        }
        compacted.retain(|c| c.before != c.after);
        self.changes = compacted;
        self.finalized = true;
    }

    /// Consume and return the finalized set
    pub fn into_finalized(mut self) -> Self {
        self.finalize();
        self
    }

    /// Replay in reverse, restoring every `before`
    pub fn undo(&self, world: &mut dyn WorldAccess) -> Result<RestoreReport> {
        let report = replay(world, self.changes.iter().rev().map(|c| (c.pos, &c.before)))?;
        log::debug!("Undo of {} changes: {:?}", self.changes.len(), report);
        Ok(report)
    }

    /// Replay forward, applying every `after`
    pub fn redo(&self, world: &mut dyn WorldAccess) -> Result<RestoreReport> {
        let report = replay(world, self.changes.iter().map(|c| (c.pos, &c.after)))?;
        log::debug!("Redo of {} changes: {:?}", self.changes.len(), report);
        Ok(report)
    }
}

impl<'a> IntoIterator for &'a ChangeSet {
    type Item = &'a Change;
    type IntoIter = std::slice::Iter<'a, Change>;

    fn into_iter(self) -> Self::IntoIter {
        self.changes.iter()
    }
}

/// Apply states to the world, tallying failures instead of stopping at the first.
fn replay<'a>(
    world: &mut dyn WorldAccess,
    entries: impl Iterator<Item = (BlockPos, &'a BlockState)>,
) -> Result<RestoreReport> {
    if !world.is_valid() {
        return Err(Error::WorldUnloaded(world.name().to_string()));
    }

    let mut report = RestoreReport::default();
    let mut checked: HashSet<ChunkCoord> = HashSet::new();
    let (min_y, max_y) = (world.min_y(), world.max_y());

    for (pos, state) in entries {
        let chunk = ChunkCoord::from_block(pos);
        if checked.insert(chunk) {
            world.check_loaded_chunk(pos);
        }

        let restorable = pos.y >= min_y
            && pos.y <= max_y
            && world.is_valid_block_type(state.id())
            && world.is_chunk_loaded(chunk);
        let applied = restorable
            && (world.set_block(pos, state, true) || world.block(pos) == *state);

        if applied {
            report.restored += 1;
        } else {
            report.failed += 1;
        }
    }

    if report.failed > 0 {
        log::warn!(
            "Could not restore {} of {} blocks in '{}'",
            report.failed,
            report.failed + report.restored,
            world.name()
        );
    }
    Ok(report)
}
