//! Click tools bound by users, acting through an edit session.

use std::fmt;

use crate::config::EditConfig;
use crate::core::types::{BlockPos, Result};
use crate::platform::Platform;
use crate::voxel::block::{ids, BlockState, DATA_MASK};
use crate::voxel::edit::{EditSession, Pattern};
use crate::voxel::registry::BlockRegistry;

/// How far the floating tree remover follows a tree from the clicked block
pub const TREE_REMOVER_RANGE: u32 = 100;

/// What a tool did
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ToolOutcome {
    /// Number of blocks changed
    Changed(usize),
    /// Message for the user, nothing changed
    Info(String),
}

/// A tool bound to an item
pub enum Tool {
    /// Place a pattern at the clicked block
    BlockReplacer(Box<dyn Pattern>),
    /// Fill the body of blocks around the clicked one
    FloodFill { pattern: Box<dyn Pattern>, range: u32 },
    /// Step the clicked block's data value
    DataCycler,
    /// Report what the clicked block is
    Query,
    /// Break a single block
    SinglePickaxe,
    /// Clear a tree that no longer stands on anything
    FloatingTreeRemover,
}

impl fmt::Debug for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tool::FloodFill { range, .. } => write!(f, "FloodFill(range {range})"),
            other => f.write_str(other.name()),
        }
    }
}

impl Tool {
    pub fn replacer(config: &EditConfig, pattern: Box<dyn Pattern>) -> Result<Self> {
        check_pattern(config, pattern.as_ref())?;
        Ok(Tool::BlockReplacer(pattern))
    }

    /// Flood fill limited by the configured super pickaxe size
    pub fn flood_fill(config: &EditConfig, pattern: Box<dyn Pattern>, range: u32) -> Result<Self> {
        config.check_super_pickaxe_size(range)?;
        check_pattern(config, pattern.as_ref())?;
        Ok(Tool::FloodFill { pattern, range })
    }

    pub fn name(&self) -> &'static str {
        match self {
            Tool::BlockReplacer(_) => "BlockReplacer",
            Tool::FloodFill { .. } => "FloodFill",
            Tool::DataCycler => "DataCycler",
            Tool::Query => "Query",
            Tool::SinglePickaxe => "SinglePickaxe",
            Tool::FloatingTreeRemover => "FloatingTreeRemover",
        }
    }

    /// Apply the tool to the block at `pos`
    pub fn act(&self, session: &mut EditSession<'_>, platform: &mut dyn Platform, pos: BlockPos) -> Result<ToolOutcome> {
        log::debug!("{:?} used at {}", self, pos);
        match self {
            Tool::BlockReplacer(pattern) => {
                let changed = session.smart_set_block(pos, &pattern.apply(pos))?;
                Ok(ToolOutcome::Changed(usize::from(changed)))
            }
            Tool::FloodFill { pattern, range } => {
                let changed = session.flood_fill(pos, pattern.as_ref(), *range)?;
                Ok(ToolOutcome::Changed(changed))
            }
            Tool::DataCycler => {
                let block = session.block(pos)?;
                if block.is_air() {
                    return Ok(ToolOutcome::Info("Air has no data to cycle".to_string()));
                }
                let next = block.with_data(block.data().wrapping_add(1) & DATA_MASK);
                let changed = session.smart_set_block(pos, &next)?;
                Ok(ToolOutcome::Changed(usize::from(changed)))
            }
            Tool::Query => {
                let block = session.block(pos)?;
                let name = BlockRegistry::builtin().name(block.id()).unwrap_or("unknown");
                let light = session.world().light_level(pos);
                Ok(ToolOutcome::Info(format!(
                    "@{}: {} (#{}:{}) light {}",
                    pos, name, block.id(), block.data(), light
                )))
            }
            Tool::SinglePickaxe => {
                let block = session.block(pos)?;
                if block.is_air() {
                    return Ok(ToolOutcome::Changed(0));
                }
                if pos.y <= session.world().min_y() || block.id() == ids::BEDROCK {
                    return Ok(ToolOutcome::Info("Cannot break the world floor".to_string()));
                }
                let changed = session.set_block(pos, &BlockState::AIR)?;
                if changed {
                    let world = session.world().name().to_string();
                    platform.queue_block_break_effect(&world, pos, block.id(), 0.0);
                }
                Ok(ToolOutcome::Changed(usize::from(changed)))
            }
            Tool::FloatingTreeRemover => match session.remove_floating_tree(pos, TREE_REMOVER_RANGE)? {
                Some(changed) => Ok(ToolOutcome::Changed(changed)),
                None => Ok(ToolOutcome::Info("That's not a floating tree".to_string())),
            },
        }
    }
}

fn check_pattern(config: &EditConfig, pattern: &dyn Pattern) -> Result<()> {
    for block in pattern.blocks() {
        config.check_block_allowed(block.id())?;
    }
    Ok(())
}
