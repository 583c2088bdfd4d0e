//! Transactional edit session: every mutation is recorded before it is applied.

use std::collections::{HashSet, VecDeque};

use crate::core::error::Error;
use crate::core::types::{BlockPos, Result};
use crate::math::aabb::BlockBox;
use crate::region::{self, Region};
use crate::voxel::block::{ids, BlockState};
use crate::voxel::chunk::{ChunkCoord, ChunkCubeCoord, CHUNK_EDGE};
use crate::voxel::world::{Capabilities, WorldAccess};
use super::change::ChangeSet;
use super::invalidator::ChunkInvalidator;
use super::mask::Mask;
use super::pattern::Pattern;

/// Lifecycle of an edit session
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    /// Bound to a world, nothing recorded yet
    Open,
    /// At least one mutation attempted
    Recording,
    /// Finished normally
    Committed,
    /// Stopped by the change limit; applied changes are kept
    Aborted,
}

/// Observable result of a finished edit
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EditReport {
    /// Distinct positions whose state changed
    pub changed: usize,
    pub limit_hit: bool,
    /// Chunk columns written to, sorted
    pub touched_chunks: Vec<ChunkCoord>,
}

/// Everything a finished session hands back to its owner
#[derive(Debug)]
pub struct EditOutcome {
    pub report: EditReport,
    /// Finalized change set, ready for history
    pub changes: ChangeSet,
    pub state: SessionState,
}

impl EditOutcome {
    /// Run the deferred lighting and notification pass over the touched chunks
    pub fn fix_lighting(&self, world: &mut dyn WorldAccess) {
        if !self.report.touched_chunks.is_empty() {
            world.fix_after_fast_mode(&self.report.touched_chunks);
        }
    }
}

/// One logical edit operation bound to a world.
///
/// Not meant to be shared: the session borrows the world mutably for its
/// whole lifetime and is consumed by [`EditSession::finish`].
pub struct EditSession<'w> {
    world: &'w mut dyn WorldAccess,
    changes: ChangeSet,
    chunks: ChunkInvalidator,
    capabilities: Capabilities,
    fast_mode: bool,
    mask: Option<Box<dyn Mask>>,
    state: SessionState,
}

impl<'w> EditSession<'w> {
    /// Open a session; `limit` caps the number of recorded changes
    pub fn new(world: &'w mut dyn WorldAccess, limit: Option<usize>) -> Self {
        let capabilities = world.capabilities();
        log::debug!(
            "Edit session on '{}' (limit {:?}, capabilities {:#x} v{})",
            world.name(),
            limit,
            capabilities.flags,
            capabilities.version
        );
        Self {
            world,
            changes: ChangeSet::new(limit),
            chunks: ChunkInvalidator::new(),
            capabilities,
            fast_mode: false,
            mask: None,
            state: SessionState::Open,
        }
    }

    /// Skip lighting and notifications on writes; see [`EditOutcome::fix_lighting`]
    pub fn with_fast_mode(mut self, fast_mode: bool) -> Self {
        self.fast_mode = fast_mode;
        self
    }

    /// Only positions passing `mask` are written
    pub fn with_mask(mut self, mask: Box<dyn Mask>) -> Self {
        self.mask = Some(mask);
        self
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_fast_mode(&self) -> bool {
        self.fast_mode
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    pub fn world(&self) -> &dyn WorldAccess {
        &*self.world
    }

    pub fn changes(&self) -> &ChangeSet {
        &self.changes
    }

    /// Changes recorded so far
    pub fn change_count(&self) -> usize {
        self.changes.len()
    }

    pub fn change_limit(&self) -> Option<usize> {
        self.changes.limit()
    }

    pub fn touched_chunks(&self) -> Vec<ChunkCoord> {
        self.chunks.dirty_chunks()
    }

    /// Block at `pos`, loading its chunk first
    pub fn block(&mut self, pos: BlockPos) -> Result<BlockState> {
        self.check_world()?;
        self.ensure_resident(pos);
        Ok(self.world.block(pos))
    }

    /// Block at `pos` straight from the world
    pub fn raw_block(&self, pos: BlockPos) -> BlockState {
        self.world.block(pos)
    }

    /// Set a block with lighting and notifications. Returns whether it changed.
    pub fn set_block(&mut self, pos: BlockPos, block: &BlockState) -> Result<bool> {
        self.apply(pos, block, true)
    }

    /// Set a block, deferring lighting in fast mode
    pub fn smart_set_block(&mut self, pos: BlockPos, block: &BlockState) -> Result<bool> {
        let notify = !self.fast_mode;
        self.apply(pos, block, notify)
    }

    /// Record a change made elsewhere without touching the world
    pub fn remember_change(&mut self, pos: BlockPos, before: BlockState, after: BlockState) -> Result<()> {
        self.check_usable()?;
        self.state = SessionState::Recording;
        self.record(pos, before, after)?;
        self.chunks.mark_dirty(pos);
        Ok(())
    }

    /// Fill a region from a pattern. Returns the number of blocks changed.
    pub fn set_blocks(&mut self, region: &dyn Region, pattern: &dyn Pattern) -> Result<usize> {
        self.check_usable()?;
        self.validate_pattern(pattern)?;
        if region.is_degenerate() {
            return Ok(0);
        }

        let mut changed = 0;
        for pos in region::iter(region) {
            if self.smart_set_block(pos, &pattern.apply(pos))? {
                changed += 1;
            }
        }
        log::debug!("Set {} blocks in {:?}", changed, region);
        Ok(changed)
    }

    /// Replace blocks matching `mask` inside a region
    pub fn replace_blocks(&mut self, region: &dyn Region, mask: &dyn Mask, pattern: &dyn Pattern) -> Result<usize> {
        self.check_usable()?;
        self.validate_pattern(pattern)?;
        if region.is_degenerate() {
            return Ok(0);
        }

        let mut changed = 0;
        for pos in region::iter(region) {
            self.ensure_resident(pos);
            if !mask.test(&*self.world, pos) {
                continue;
            }
            if self.smart_set_block(pos, &pattern.apply(pos))? {
                changed += 1;
            }
        }
        log::debug!("Replaced {} blocks in {:?}", changed, region);
        Ok(changed)
    }

    /// Count positions in a region matching `mask`
    pub fn count_blocks(&mut self, region: &dyn Region, mask: &dyn Mask) -> Result<usize> {
        self.check_world()?;
        let mut count = 0;
        for pos in region::iter(region) {
            self.ensure_resident(pos);
            if mask.test(&*self.world, pos) {
                count += 1;
            }
        }
        Ok(count)
    }

    /// Fill the contiguous body of blocks sharing the state at `origin`,
    /// staying within `range` blocks of it.
    pub fn flood_fill(&mut self, origin: BlockPos, pattern: &dyn Pattern, range: u32) -> Result<usize> {
        self.check_usable()?;
        self.validate_pattern(pattern)?;

        let target = self.block(origin)?;
        let mut changed = 0;
        self.walk(origin, range, |session, pos| {
            if session.block(pos)? != target {
                return Ok(Walk::Skip);
            }
            if session.smart_set_block(pos, &pattern.apply(pos))? {
                changed += 1;
            }
            Ok(Walk::Enter)
        })?;
        log::debug!("Flood filled {} blocks from {}", changed, origin);
        Ok(changed)
    }

    /// Clear the body of logs and leaves connected to `origin` if it floats.
    ///
    /// Air, snow layers and vines around the body are passed over; reaching
    /// any other block means the tree stands on something and nothing is
    /// removed. Returns `None` in that case, or when `origin` is not part of
    /// a tree.
    pub fn remove_floating_tree(&mut self, origin: BlockPos, range: u32) -> Result<Option<usize>> {
        self.check_usable()?;
        if !is_tree_block(&self.block(origin)?) {
            return Ok(None);
        }

        let mut body = Vec::new();
        let floating = self.walk(origin, range, |session, pos| {
            let block = session.block(pos)?;
            if is_tree_block(&block) {
                body.push(pos);
                Ok(Walk::Enter)
            } else if block.is_air() || matches!(block.id(), ids::SNOW_LAYER | ids::VINE) {
                Ok(Walk::Skip)
            } else {
                Ok(Walk::Stop)
            }
        })?;
        if !floating {
            log::debug!("Tree at {} is grounded", origin);
            return Ok(None);
        }

        let mut changed = 0;
        for pos in body {
            if self.smart_set_block(pos, &BlockState::AIR)? {
                changed += 1;
            }
        }
        log::debug!("Removed floating tree of {} blocks at {}", changed, origin);
        Ok(Some(changed))
    }

    /// Breadth-first walk over the 6-connected neighbours of `origin`,
    /// staying within `range` blocks of it and inside the world's height.
    ///
    /// `visit` sees every reached position once. Returns false when it asked
    /// to stop.
    fn walk<F>(&mut self, origin: BlockPos, range: u32, mut visit: F) -> Result<bool>
    where
        F: FnMut(&mut Self, BlockPos) -> Result<Walk>,
    {
        let (min_y, max_y) = (self.world.min_y(), self.world.max_y());
        let range_sq = i64::from(range) * i64::from(range);

        let mut visited: HashSet<BlockPos> = HashSet::new();
        let mut queue = VecDeque::from([origin]);
        visited.insert(origin);

        while let Some(pos) = queue.pop_front() {
            match visit(self, pos)? {
                Walk::Stop => return Ok(false),
                Walk::Skip => continue,
                Walk::Enter => {}
            }
            for dir in NEIGHBOURS {
                let Some(next) = region::offset(pos, dir).ok() else {
                    continue;
                };
                let offset = next.as_i64vec3() - origin.as_i64vec3();
                if next.y < min_y || next.y > max_y || offset.length_squared() > range_sq {
                    continue;
                }
                if visited.insert(next) {
                    queue.push_back(next);
                }
            }
        }
        Ok(true)
    }

    /// Reset a region to its generated state.
    ///
    /// The world can only regenerate whole chunks (or cubes), so each unit is
    /// snapshotted first. Afterwards positions outside the region get their
    /// old value back and positions inside are recorded as changes.
    pub fn regenerate(&mut self, region: &dyn Region) -> Result<usize> {
        self.check_usable()?;
        if region.is_degenerate() {
            return Ok(0);
        }
        if !self.capabilities.can_regenerate() {
            return Err(Error::RegionOperation(format!(
                "world '{}' cannot regenerate chunks",
                self.world.name()
            )));
        }

        let (min_y, max_y) = (self.world.min_y(), self.world.max_y());
        let mut changed = 0;
        if self.capabilities.is_cubic() {
            for cube in region.chunk_cubes() {
                let origin = cube.min_block();
                let low = origin.y.max(min_y);
                let high = (origin.y + CHUNK_EDGE - 1).min(max_y);
                if low > high {
                    continue;
                }
                let unit = BlockBox {
                    min: BlockPos::new(origin.x, low, origin.z),
                    max: BlockPos::new(origin.x + CHUNK_EDGE - 1, high, origin.z + CHUNK_EDGE - 1),
                };
                changed += self.regenerate_unit(region, unit, RegenUnit::Cube(cube))?;
            }
        } else {
            for chunk in region.chunks() {
                let origin = chunk.min_block(min_y);
                let unit = BlockBox {
                    min: origin,
                    max: BlockPos::new(origin.x + CHUNK_EDGE - 1, max_y, origin.z + CHUNK_EDGE - 1),
                };
                changed += self.regenerate_unit(region, unit, RegenUnit::Column(chunk))?;
            }
        }
        log::info!("Regenerated {} blocks in '{}'", changed, self.world.name());
        Ok(changed)
    }

    fn regenerate_unit(&mut self, region: &dyn Region, unit: BlockBox, target: RegenUnit) -> Result<usize> {
        self.ensure_resident(unit.min);
        let snapshot: Vec<(BlockPos, BlockState)> =
            unit.iter().map(|pos| (pos, self.world.block(pos))).collect();

        let regenerated = match target {
            RegenUnit::Column(chunk) => self.world.regenerate_chunk(chunk),
            RegenUnit::Cube(cube) => self.world.regenerate_cube(cube),
        };
        if !regenerated {
            log::warn!("Could not regenerate {:?} in '{}'", target, self.world.name());
            return Ok(0);
        }
        self.state = SessionState::Recording;
        let column = ChunkCoord::from_block(unit.min);
        // The whole unit was rewritten, even where nothing ends up changed
        self.chunks.mark_chunk_dirty(column);
        self.chunks.forget_resident(column);
        self.ensure_resident(unit.min);

        let notify = !self.fast_mode;
        let mut changed = 0;
        let mut limit_error = None;
        for (pos, before) in snapshot {
            if region.contains(pos) && limit_error.is_none() {
                let after = self.world.block(pos);
                if before == after {
                    continue;
                }
                match self.record(pos, before.clone(), after) {
                    Ok(()) => changed += 1,
                    Err(err) => {
                        self.world.set_block(pos, &before, notify);
                        limit_error = Some(err);
                    }
                }
            } else {
                // Leaked or unrecorded: put the old block back
                self.world.set_block(pos, &before, notify);
            }
        }

        match limit_error {
            Some(err) => Err(err),
            None => Ok(changed),
        }
    }

    /// Close the session and hand back the finalized changes
    pub fn finish(self) -> EditOutcome {
        let state = match self.state {
            SessionState::Aborted => SessionState::Aborted,
            _ => SessionState::Committed,
        };
        let touched_chunks = self.chunks.dirty_chunks();
        let changes = self.changes.into_finalized();
        let report = EditReport {
            changed: changes.len(),
            limit_hit: state == SessionState::Aborted,
            touched_chunks,
        };

        if report.limit_hit {
            log::warn!(
                "Edit in '{}' stopped at the change limit after {} blocks",
                self.world.name(),
                report.changed
            );
        } else {
            log::info!(
                "Committed {} changes across {} chunks in '{}'",
                report.changed,
                report.touched_chunks.len(),
                self.world.name()
            );
        }
        EditOutcome { report, changes, state }
    }

    fn apply(&mut self, pos: BlockPos, block: &BlockState, notify: bool) -> Result<bool> {
        self.check_usable()?;
        if pos.y < self.world.min_y() || pos.y > self.world.max_y() {
            return Ok(false);
        }
        if !self.world.is_valid_block_type(block.id()) {
            return Err(Error::InvalidBlockType(block.id()));
        }
        self.state = SessionState::Recording;
        self.ensure_resident(pos);
        if let Some(mask) = &self.mask {
            if !mask.test(&*self.world, pos) {
                return Ok(false);
            }
        }

        let before = self.world.block(pos);
        if before == *block {
            return Ok(false);
        }
        self.record(pos, before, block.clone())?;
        if !self.world.set_block(pos, block, notify) {
            log::debug!("World refused block {:?} at {}", block, pos);
        }
        self.chunks.mark_dirty(pos);
        Ok(true)
    }

    fn record(&mut self, pos: BlockPos, before: BlockState, after: BlockState) -> Result<()> {
        self.changes.record(pos, before, after).inspect_err(|_| {
            self.state = SessionState::Aborted;
        })
    }

    fn check_world(&self) -> Result<()> {
        if !self.world.is_valid() {
            return Err(Error::WorldUnloaded(self.world.name().to_string()));
        }
        Ok(())
    }

    fn check_usable(&self) -> Result<()> {
        self.check_world()?;
        if self.state == SessionState::Aborted {
            return Err(Error::ChangeLimitExceeded {
                limit: self.changes.limit().unwrap_or(self.changes.len()),
                changed: self.changes.len(),
            });
        }
        Ok(())
    }

    fn validate_pattern(&self, pattern: &dyn Pattern) -> Result<()> {
        for block in pattern.blocks() {
            if !self.world.is_valid_block_type(block.id()) {
                return Err(Error::InvalidBlockType(block.id()));
            }
        }
        Ok(())
    }

    fn ensure_resident(&mut self, pos: BlockPos) {
        if self.chunks.needs_load_check(pos) {
            self.world.check_loaded_chunk(pos);
        }
    }
}

/// What a breadth-first walk does at a reached position
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Walk {
    /// Keep going through this position's neighbours
    Enter,
    /// Do not expand from here
    Skip,
    /// Abandon the walk
    Stop,
}

fn is_tree_block(block: &BlockState) -> bool {
    matches!(block.id(), ids::LOG | ids::LEAVES)
}

#[derive(Clone, Copy, Debug)]
enum RegenUnit {
    Column(ChunkCoord),
    Cube(ChunkCubeCoord),
}

const NEIGHBOURS: [BlockPos; 6] = [
    BlockPos::X,
    BlockPos::NEG_X,
    BlockPos::Y,
    BlockPos::NEG_Y,
    BlockPos::Z,
    BlockPos::NEG_Z,
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::{CuboidRegion, EllipsoidRegion, PolyhedronBuilder};
    use crate::voxel::edit::mask::{BlockMask, ExistingBlockMask, InvertMask};
    use crate::voxel::edit::pattern::BlockPattern;
    use crate::voxel::generator::EmptyGenerator;
    use crate::voxel::world::{MemoryWorld, MemoryWorldSettings};

    fn empty_world() -> MemoryWorld {
        MemoryWorld::with_generator(MemoryWorldSettings::default(), Box::new(EmptyGenerator))
    }

    fn stone() -> BlockPattern {
        BlockPattern::new(BlockState::of(ids::STONE))
    }

    #[test]
    fn test_fill_and_undo_cube() {
        let mut world = empty_world();
        let region = CuboidRegion::new(BlockPos::ZERO, BlockPos::splat(15));

        let mut session = EditSession::new(&mut world, None);
        assert_eq!(session.state(), SessionState::Open);
        assert_eq!(session.set_blocks(&region, &stone()).unwrap(), 4096);
        let outcome = session.finish();

        assert_eq!(outcome.state, SessionState::Committed);
        assert_eq!(outcome.report.changed, 4096);
        assert!(!outcome.report.limit_hit);
        assert_eq!(outcome.report.touched_chunks, vec![ChunkCoord::new(0, 0)]);
        assert!(region.iter().all(|p| world.block(p) == BlockState::of(ids::STONE)));

        let report = outcome.changes.undo(&mut world).unwrap();
        assert_eq!(report.restored, 4096);
        assert!(region.iter().all(|p| world.block(p).is_air()));
    }

    #[test]
    fn test_limit_aborts_and_keeps_partial() {
        let mut world = empty_world();
        let region = CuboidRegion::new(BlockPos::ZERO, BlockPos::splat(4));

        let mut session = EditSession::new(&mut world, Some(10));
        let err = session.set_blocks(&region, &stone()).unwrap_err();
        assert!(matches!(err, Error::ChangeLimitExceeded { limit: 10, changed: 10 }));
        assert_eq!(session.state(), SessionState::Aborted);
        assert!(session.set_block(BlockPos::new(50, 50, 50), &BlockState::of(1)).is_err());

        let outcome = session.finish();
        assert_eq!(outcome.state, SessionState::Aborted);
        assert!(outcome.report.limit_hit);
        assert_eq!(outcome.changes.len(), 10);

        let unchanged = region.iter().filter(|p| world.block(*p).is_air()).count();
        assert_eq!(unchanged, 115);
    }

    #[test]
    fn test_degenerate_region_is_noop() {
        let mut world = empty_world();
        let mut builder = PolyhedronBuilder::new();
        for p in [BlockPos::ZERO, BlockPos::new(8, 0, 0), BlockPos::new(0, 8, 0)] {
            builder.add_point(p).unwrap();
        }
        let poly = builder.build();

        let mut session = EditSession::new(&mut world, Some(5));
        assert_eq!(session.set_blocks(&poly, &stone()).unwrap(), 0);
        assert_eq!(session.regenerate(&poly).unwrap(), 0);
        let outcome = session.finish();
        assert_eq!(outcome.report.changed, 0);
        assert_eq!(world.stats().notified_writes, 0);
    }

    #[test]
    fn test_fast_mode_defers_lighting() {
        let mut world = empty_world();
        let region = CuboidRegion::new(BlockPos::new(0, 10, 0), BlockPos::new(20, 10, 3));

        let mut session = EditSession::new(&mut world, None).with_fast_mode(true);
        session.set_blocks(&region, &stone()).unwrap();
        // Plain set_block always notifies
        session.set_block(BlockPos::new(0, 40, 0), &BlockState::of(ids::DIRT)).unwrap();
        let outcome = session.finish();

        assert_eq!(world.stats().silent_writes, 84);
        assert_eq!(world.stats().notified_writes, 1);
        outcome.fix_lighting(&mut world);
        assert_eq!(world.stats().fast_mode_fixes, 2);
    }

    #[test]
    fn test_unchanged_blocks_not_recorded() {
        let mut world = empty_world();
        let pos = BlockPos::new(3, 3, 3);
        world.set_block(pos, &BlockState::of(ids::STONE), true);

        let mut session = EditSession::new(&mut world, None);
        assert!(!session.set_block(pos, &BlockState::of(ids::STONE)).unwrap());
        assert!(!session.set_block(BlockPos::new(0, 500, 0), &BlockState::of(ids::STONE)).unwrap());
        assert_eq!(session.change_count(), 0);
    }

    #[test]
    fn test_rewriting_wide_data_records_once() {
        let mut world = empty_world();
        let pos = BlockPos::new(4, 4, 4);
        let wool = BlockState::new(ids::WOOL, 200);

        let mut session = EditSession::new(&mut world, None);
        assert!(session.set_block(pos, &wool).unwrap());
        assert!(!session.set_block(pos, &wool).unwrap());
        assert_eq!(session.change_count(), 1);
        session.finish();
        assert_eq!(world.block(pos), wool);
        assert_eq!(world.block(pos).data(), 8);
    }

    #[test]
    fn test_invalid_block_type_rejected_before_mutation() {
        let mut world = empty_world();
        let region = CuboidRegion::new(BlockPos::ZERO, BlockPos::splat(2));
        let mut session = EditSession::new(&mut world, None);
        let bad = BlockPattern::new(BlockState::of(9000));
        assert!(matches!(session.set_blocks(&region, &bad), Err(Error::InvalidBlockType(9000))));
        assert_eq!(session.change_count(), 0);
    }

    #[test]
    fn test_world_unloaded() {
        let mut world = empty_world();
        world.invalidate();
        let mut session = EditSession::new(&mut world, None);
        let result = session.set_block(BlockPos::ZERO, &BlockState::of(ids::STONE));
        assert!(matches!(result, Err(Error::WorldUnloaded(_))));
    }

    #[test]
    fn test_global_mask() {
        let mut world = empty_world();
        world.set_block(BlockPos::new(1, 1, 1), &BlockState::of(ids::DIRT), true);
        let region = CuboidRegion::new(BlockPos::ZERO, BlockPos::splat(2));

        let mut session = EditSession::new(&mut world, None).with_mask(Box::new(ExistingBlockMask));
        assert_eq!(session.set_blocks(&region, &stone()).unwrap(), 1);
        session.finish();
        assert_eq!(world.block(BlockPos::new(1, 1, 1)), BlockState::of(ids::STONE));
        assert!(world.block(BlockPos::ZERO).is_air());
    }

    #[test]
    fn test_replace_and_count() {
        let mut world = MemoryWorld::new(MemoryWorldSettings::default());
        let region = CuboidRegion::new(BlockPos::new(0, 0, 0), BlockPos::new(3, 9, 3));
        let dirt = BlockMask::new().with_id(ids::DIRT);

        let mut session = EditSession::new(&mut world, None);
        assert_eq!(session.count_blocks(&region, &dirt).unwrap(), 32);
        let sand = BlockPattern::new(BlockState::of(ids::SAND));
        assert_eq!(session.replace_blocks(&region, &dirt, &sand).unwrap(), 32);
        assert_eq!(session.count_blocks(&region, &dirt).unwrap(), 0);

        let air = InvertMask::new(Box::new(ExistingBlockMask));
        assert_eq!(session.count_blocks(&region, &air).unwrap(), 32);
    }

    #[test]
    fn test_remember_change() {
        let mut world = empty_world();
        let mut session = EditSession::new(&mut world, Some(1));
        session
            .remember_change(BlockPos::ZERO, BlockState::AIR, BlockState::of(ids::STONE))
            .unwrap();
        assert!(session
            .remember_change(BlockPos::ONE, BlockState::AIR, BlockState::of(ids::STONE))
            .is_err());
        assert_eq!(session.finish().changes.len(), 1);
        assert_eq!(world.stats().notified_writes, 0);
    }

    #[test]
    fn test_flood_fill_stays_in_body_and_range() {
        let mut world = empty_world();
        // A 1-high floor of dirt with a stone wall splitting it
        let floor = CuboidRegion::new(BlockPos::new(0, 5, 0), BlockPos::new(20, 5, 20));
        let wall = CuboidRegion::new(BlockPos::new(10, 5, 0), BlockPos::new(10, 5, 20));
        {
            let mut session = EditSession::new(&mut world, None);
            session.set_blocks(&floor, &BlockPattern::new(BlockState::of(ids::DIRT))).unwrap();
            session.set_blocks(&wall, &stone()).unwrap();
        }

        let origin = BlockPos::new(2, 5, 2);
        let mut session = EditSession::new(&mut world, None);
        let changed = session
            .flood_fill(origin, &BlockPattern::new(BlockState::of(ids::SAND)), 4)
            .unwrap();
        session.finish();

        let reach = EllipsoidRegion::sphere(origin, 3.5).unwrap();
        let expected = floor
            .iter()
            .filter(|p| p.x < 10)
            .filter(|p| (*p - origin).as_i64vec3().length_squared() <= 16)
            .count();
        assert_eq!(changed, expected);
        assert_eq!(world.block(BlockPos::new(11, 5, 2)), BlockState::of(ids::DIRT));
        assert_eq!(world.block(BlockPos::new(10, 5, 2)), BlockState::of(ids::STONE));
        assert!(reach.contains(BlockPos::new(6, 5, 2)));
        assert_eq!(world.block(BlockPos::new(6, 5, 2)), BlockState::of(ids::SAND));
        assert_eq!(world.block(BlockPos::new(7, 5, 2)), BlockState::of(ids::DIRT));
    }

    /// 4-high trunk at x=5 z=5 from y=20 under a 3x3x3 crown, with a vine on the trunk
    fn tree_world() -> MemoryWorld {
        let mut world = empty_world();
        let crown = CuboidRegion::new(BlockPos::new(4, 23, 4), BlockPos::new(6, 25, 6));
        let trunk = CuboidRegion::new(BlockPos::new(5, 20, 5), BlockPos::new(5, 23, 5));
        let mut session = EditSession::new(&mut world, None);
        session.set_blocks(&crown, &BlockPattern::new(BlockState::of(ids::LEAVES))).unwrap();
        session.set_blocks(&trunk, &BlockPattern::new(BlockState::of(ids::LOG))).unwrap();
        session.set_block(BlockPos::new(6, 21, 5), &BlockState::of(ids::VINE)).unwrap();
        session.finish();
        world
    }

    #[test]
    fn test_remove_floating_tree() {
        let mut world = tree_world();
        let mut session = EditSession::new(&mut world, None);
        assert_eq!(session.remove_floating_tree(BlockPos::new(5, 21, 5), 100).unwrap(), Some(30));
        let outcome = session.finish();
        assert_eq!(outcome.report.changed, 30);

        let area = CuboidRegion::new(BlockPos::new(4, 20, 4), BlockPos::new(6, 25, 6));
        assert!(area.iter().filter(|p| *p != BlockPos::new(6, 21, 5)).all(|p| world.block(p).is_air()));
        assert_eq!(world.block(BlockPos::new(6, 21, 5)), BlockState::of(ids::VINE));

        outcome.changes.undo(&mut world).unwrap();
        assert_eq!(world.block(BlockPos::new(5, 20, 5)), BlockState::of(ids::LOG));
    }

    #[test]
    fn test_grounded_tree_is_left_alone() {
        let mut world = tree_world();
        world.set_block(BlockPos::new(5, 19, 5), &BlockState::of(ids::DIRT), true);

        let mut session = EditSession::new(&mut world, None);
        assert_eq!(session.remove_floating_tree(BlockPos::new(5, 24, 5), 100).unwrap(), None);
        // Not a tree at all
        assert_eq!(session.remove_floating_tree(BlockPos::new(5, 19, 5), 100).unwrap(), None);
        assert_eq!(session.finish().report.changed, 0);
        assert_eq!(world.block(BlockPos::new(5, 20, 5)), BlockState::of(ids::LOG));
    }

    fn glass_world() -> MemoryWorld {
        let mut world = MemoryWorld::new(MemoryWorldSettings::default());
        let slab = CuboidRegion::new(BlockPos::new(0, 20, 0), BlockPos::new(31, 22, 15));
        let mut session = EditSession::new(&mut world, None);
        session.set_blocks(&slab, &BlockPattern::new(BlockState::of(ids::GLASS))).unwrap();
        session.finish();
        world
    }

    #[test]
    fn test_regenerate_only_inside_region() {
        let mut world = glass_world();
        let region = CuboidRegion::new(BlockPos::new(4, 20, 4), BlockPos::new(19, 21, 7));

        let mut session = EditSession::new(&mut world, None);
        let changed = session.regenerate(&region).unwrap();
        let outcome = session.finish();
        assert_eq!(changed, 16 * 2 * 4);
        assert_eq!(outcome.report.touched_chunks, vec![ChunkCoord::new(0, 0), ChunkCoord::new(1, 0)]);

        for pos in CuboidRegion::new(BlockPos::new(0, 20, 0), BlockPos::new(31, 22, 15)).iter() {
            let expected = if region.contains(pos) { BlockState::AIR } else { BlockState::of(ids::GLASS) };
            assert_eq!(world.block(pos), expected, "at {pos}");
        }

        outcome.changes.undo(&mut world).unwrap();
        assert!(region.iter().all(|p| world.block(p) == BlockState::of(ids::GLASS)));
    }

    #[test]
    fn test_regenerate_unchanged_chunk_still_relit() {
        let mut world = MemoryWorld::new(MemoryWorldSettings::default());
        // Untouched generated terrain regenerates to identical blocks
        let region = CuboidRegion::new(BlockPos::new(2, 3, 2), BlockPos::new(5, 9, 5));

        let mut session = EditSession::new(&mut world, None).with_fast_mode(true);
        assert_eq!(session.regenerate(&region).unwrap(), 0);
        let outcome = session.finish();
        assert_eq!(outcome.report.changed, 0);
        assert_eq!(outcome.report.touched_chunks, vec![ChunkCoord::new(0, 0)]);
        assert!(world.stats().silent_writes > 0);

        outcome.fix_lighting(&mut world);
        assert_eq!(world.stats().fast_mode_fixes, 1);
    }

    #[test]
    fn test_regenerate_limit_restores_unrecorded() {
        let mut world = glass_world();
        let region = CuboidRegion::new(BlockPos::new(0, 20, 0), BlockPos::new(3, 20, 3));

        let mut session = EditSession::new(&mut world, Some(10));
        assert!(matches!(session.regenerate(&region), Err(Error::ChangeLimitExceeded { .. })));
        let outcome = session.finish();
        assert_eq!(outcome.changes.len(), 10);

        let regenerated = region.iter().filter(|p| world.block(*p).is_air()).count();
        assert_eq!(regenerated, 10);
        assert_eq!(world.block(BlockPos::new(8, 21, 8)), BlockState::of(ids::GLASS));
    }

    #[test]
    fn test_regenerate_cubic() {
        let settings = MemoryWorldSettings {
            cubic_chunks: true,
            ..Default::default()
        };
        let mut world = MemoryWorld::new(settings);
        let high = BlockPos::new(2, 40, 2);
        let low = BlockPos::new(2, 20, 2);
        world.set_block(high, &BlockState::of(ids::WOOL), true);
        world.set_block(low, &BlockState::of(ids::WOOL), true);

        let region = CuboidRegion::new(BlockPos::new(0, 32, 0), BlockPos::new(4, 47, 4));
        let mut session = EditSession::new(&mut world, None);
        assert_eq!(session.regenerate(&region).unwrap(), 1);
        session.finish();

        assert!(world.block(high).is_air());
        assert_eq!(world.block(low), BlockState::of(ids::WOOL));
        assert_eq!(world.stats().regenerations, 1);
    }
}
