//! Per-user editing state that outlives individual edit sessions

use std::collections::HashMap;

use crate::config::EditConfig;
use crate::core::error::Error;
use crate::core::types::{BlockPos, Result};
use crate::platform::Platform;
use crate::tool::{Tool, ToolOutcome};
use crate::voxel::world::WorldAccess;
use super::change::RestoreReport;
use super::history::History;
use super::session::{EditOutcome, EditSession};

/// A user's history, change limit, fast-mode preference and bound tools
#[derive(Debug)]
pub struct LocalSession {
    history: History,
    change_limit: Option<usize>,
    max_change_limit: Option<usize>,
    fast_mode: bool,
    /// Tools keyed by the item type they are bound to
    tools: HashMap<u16, Tool>,
}

impl LocalSession {
    pub fn new(config: &EditConfig) -> Self {
        Self {
            history: History::new(config.history_size),
            change_limit: config.default_change_limit(),
            max_change_limit: config.max_change_limit(),
            fast_mode: false,
            tools: HashMap::new(),
        }
    }

    pub fn change_limit(&self) -> Option<usize> {
        self.change_limit
    }

    /// Set the change limit for future sessions; `None` asks for unlimited
    pub fn set_change_limit(&mut self, limit: Option<usize>) -> Result<()> {
        if let Some(max) = self.max_change_limit {
            if limit.is_none_or(|value| value > max) {
                return Err(Error::LimitExceeded {
                    what: "change limit",
                    value: limit.map_or(-1, |v| v as i64),
                    max: max as i64,
                });
            }
        }
        self.change_limit = limit;
        Ok(())
    }

    pub fn is_fast_mode(&self) -> bool {
        self.fast_mode
    }

    pub fn set_fast_mode(&mut self, fast_mode: bool) {
        self.fast_mode = fast_mode;
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Bind `tool` to an item type, returning the tool it replaces
    pub fn set_tool(&mut self, item: u16, tool: Tool) -> Option<Tool> {
        log::debug!("Binding {:?} to item {}", tool, item);
        self.tools.insert(item, tool)
    }

    pub fn tool(&self, item: u16) -> Option<&Tool> {
        self.tools.get(&item)
    }

    /// Remove the tool bound to an item type
    pub fn unbind_tool(&mut self, item: u16) -> Option<Tool> {
        self.tools.remove(&item)
    }

    /// Use the tool bound to `item` on the block at `pos`.
    ///
    /// The edit runs in its own session with this user's limit and fast mode
    /// and lands in history, including the partial changes of an edit that
    /// hit the limit. Returns `None` when no tool is bound.
    pub fn use_tool(
        &mut self,
        item: u16,
        world: &mut dyn WorldAccess,
        platform: &mut dyn Platform,
        pos: BlockPos,
    ) -> Result<Option<ToolOutcome>> {
        let Some(tool) = self.tools.get(&item) else {
            return Ok(None);
        };
        let mut session = EditSession::new(world, self.change_limit).with_fast_mode(self.fast_mode);
        let result = tool.act(&mut session, platform, pos);
        let outcome = session.finish();
        if self.fast_mode {
            outcome.fix_lighting(world);
        }
        self.remember(outcome);
        result.map(Some)
    }

    /// Open an edit session with this user's limit and fast mode
    pub fn edit_session<'w>(&self, world: &'w mut dyn WorldAccess) -> EditSession<'w> {
        EditSession::new(world, self.change_limit).with_fast_mode(self.fast_mode)
    }

    /// Push a finished edit onto the undo stack. Aborted edits are kept so
    /// their partial changes can be undone; empty ones are dropped.
    pub fn remember(&mut self, outcome: EditOutcome) {
        if outcome.changes.is_empty() {
            return;
        }
        self.history.remember(outcome.changes);
    }

    pub fn undo(&mut self, world: &mut dyn WorldAccess) -> Result<Option<RestoreReport>> {
        self.history.undo(world)
    }

    pub fn redo(&mut self, world: &mut dyn WorldAccess) -> Result<Option<RestoreReport>> {
        self.history.redo(world)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::BlockPos;
    use crate::region::{CuboidRegion, Region};
    use crate::voxel::block::{ids, BlockState};
    use crate::platform::EffectQueue;
    use crate::voxel::edit::pattern::BlockPattern;
    use crate::voxel::generator::EmptyGenerator;
    use crate::voxel::world::{MemoryWorld, MemoryWorldSettings};

    fn world() -> MemoryWorld {
        MemoryWorld::with_generator(MemoryWorldSettings::default(), Box::new(EmptyGenerator))
    }

    #[test]
    fn test_limits_from_config() {
        let config = EditConfig {
            default_change_limit: 50,
            max_change_limit: 200,
            history_size: 20,
            ..Default::default()
        };
        let mut local = LocalSession::new(&config);
        assert_eq!(local.change_limit(), Some(50));
        assert_eq!(local.history().capacity(), 20);

        local.set_change_limit(Some(200)).unwrap();
        assert!(local.set_change_limit(Some(201)).is_err());
        assert!(local.set_change_limit(None).is_err());
        assert_eq!(local.change_limit(), Some(200));
    }

    #[test]
    fn test_edit_remember_undo() {
        let mut world = world();
        let mut local = LocalSession::new(&EditConfig::default());
        local.set_fast_mode(true);
        let region = CuboidRegion::new(BlockPos::ZERO, BlockPos::splat(2));

        let mut session = local.edit_session(&mut world);
        assert!(session.is_fast_mode());
        session.set_blocks(&region, &BlockPattern::new(BlockState::of(ids::STONE))).unwrap();
        let outcome = session.finish();
        outcome.fix_lighting(&mut world);
        local.remember(outcome);

        let report = local.undo(&mut world).unwrap().unwrap();
        assert_eq!(report.restored, 27);
        assert!(region.iter().all(|p| world.block(p).is_air()));
        local.redo(&mut world).unwrap().unwrap();
        assert!(region.iter().all(|p| world.block(p) == BlockState::of(ids::STONE)));
    }

    #[test]
    fn test_aborted_edit_is_undoable() {
        let mut world = world();
        let config = EditConfig {
            default_change_limit: 4,
            ..Default::default()
        };
        let mut local = LocalSession::new(&config);
        let region = CuboidRegion::new(BlockPos::ZERO, BlockPos::splat(3));

        let mut session = local.edit_session(&mut world);
        assert!(session.set_blocks(&region, &BlockPattern::new(BlockState::of(ids::DIRT))).is_err());
        local.remember(session.finish());

        local.undo(&mut world).unwrap().unwrap();
        assert!(region.iter().all(|p| world.block(p).is_air()));
    }

    #[test]
    fn test_bind_replace_unbind_tools() {
        const WAND: u16 = 268;
        let config = EditConfig::default();
        let mut local = LocalSession::new(&config);
        assert!(local.tool(WAND).is_none());

        assert!(local.set_tool(WAND, Tool::Query).is_none());
        assert_eq!(local.tool(WAND).map(Tool::name), Some("Query"));

        let replacer = Tool::replacer(&config, Box::new(BlockPattern::new(BlockState::of(ids::WOOL)))).unwrap();
        let previous = local.set_tool(WAND, replacer);
        assert_eq!(previous.as_ref().map(Tool::name), Some("Query"));
        assert_eq!(local.tool(WAND).map(Tool::name), Some("BlockReplacer"));

        local.set_tool(ids::LOG, Tool::DataCycler);
        assert_eq!(local.unbind_tool(WAND).map(|t| t.name()), Some("BlockReplacer"));
        assert!(local.tool(WAND).is_none());
        assert!(local.unbind_tool(WAND).is_none());
        assert_eq!(local.tool(ids::LOG).map(Tool::name), Some("DataCycler"));
    }

    #[test]
    fn test_use_bound_tool() {
        const WAND: u16 = 268;
        let mut world = world();
        let mut effects = EffectQueue::default();
        let config = EditConfig::default();
        let mut local = LocalSession::new(&config);
        let pos = BlockPos::new(1, 10, 1);

        assert!(local.use_tool(WAND, &mut world, &mut effects, pos).unwrap().is_none());

        let replacer = Tool::replacer(&config, Box::new(BlockPattern::new(BlockState::of(ids::PLANKS)))).unwrap();
        local.set_tool(WAND, replacer);
        let outcome = local.use_tool(WAND, &mut world, &mut effects, pos).unwrap();
        assert_eq!(outcome, Some(ToolOutcome::Changed(1)));
        assert_eq!(world.block(pos), BlockState::of(ids::PLANKS));
        assert_eq!(local.history().undo_len(), 1);

        // Nothing changed, nothing remembered
        local.set_tool(WAND, Tool::Query);
        let info = local.use_tool(WAND, &mut world, &mut effects, pos).unwrap();
        assert!(matches!(info, Some(ToolOutcome::Info(_))));
        assert_eq!(local.history().undo_len(), 1);

        local.undo(&mut world).unwrap().unwrap();
        assert!(world.block(pos).is_air());
    }

    #[test]
    fn test_empty_edit_not_remembered() {
        let mut world = world();
        let mut local = LocalSession::new(&EditConfig::default());
        let session = local.edit_session(&mut world);
        local.remember(session.finish());
        assert!(!local.history().can_undo());
    }
}
