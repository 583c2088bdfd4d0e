//! Services the host platform offers besides world access.

pub mod dispatch;

use crate::core::types::BlockPos;

pub use dispatch::WorldDispatcher;

/// Host services used by tools
pub trait Platform {
    /// Request a block break particle/sound effect. Fire-and-forget.
    fn queue_block_break_effect(&mut self, world: &str, pos: BlockPos, block_id: u16, priority: f32);
}

/// A queued break effect
#[derive(Clone, Debug, PartialEq)]
pub struct BreakEffect {
    pub world: String,
    pub pos: BlockPos,
    pub block_id: u16,
    pub priority: f32,
}

/// Platform that collects effects for a host loop to drain.
///
/// Holds at most `capacity` effects; once full, new requests are dropped.
#[derive(Debug)]
pub struct EffectQueue {
    effects: Vec<BreakEffect>,
    capacity: usize,
    dropped: usize,
}

impl Default for EffectQueue {
    fn default() -> Self {
        Self::new(1024)
    }
}

impl EffectQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            effects: Vec::new(),
            capacity,
            dropped: 0,
        }
    }

    pub fn effects(&self) -> &[BreakEffect] {
        &self.effects
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    /// Requests refused because the queue was full
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// Take every queued effect
    pub fn drain(&mut self) -> Vec<BreakEffect> {
        std::mem::take(&mut self.effects)
    }
}

impl Platform for EffectQueue {
    fn queue_block_break_effect(&mut self, world: &str, pos: BlockPos, block_id: u16, priority: f32) {
        if self.effects.len() >= self.capacity {
            self.dropped += 1;
            return;
        }
        self.effects.push(BreakEffect {
            world: world.to_string(),
            pos,
            block_id,
            priority,
        });
    }
}
