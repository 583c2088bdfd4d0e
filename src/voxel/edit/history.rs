//! Bounded undo/redo stacks

use std::collections::VecDeque;

use crate::core::types::Result;
use crate::voxel::world::WorldAccess;
use super::change::{ChangeSet, RestoreReport};

/// Default number of change sets kept per user
pub const DEFAULT_HISTORY_SIZE: usize = 15;

/// Per-user undo and redo stacks.
///
/// Both stacks hold at most `capacity` change sets; pushing onto a full stack
/// evicts the oldest entry.
#[derive(Debug)]
pub struct History {
    undo: VecDeque<ChangeSet>,
    redo: VecDeque<ChangeSet>,
    capacity: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_SIZE)
    }
}

impl History {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            undo: VecDeque::with_capacity(capacity),
            redo: VecDeque::new(),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// Remember a finished change set. A new edit invalidates the redo stack.
    pub fn remember(&mut self, changes: ChangeSet) {
        self.redo.clear();
        push_bounded(&mut self.undo, changes.into_finalized(), self.capacity);
    }

    /// Undo the most recent change set. `None` when there is nothing to undo.
    ///
    /// A world error leaves the stacks untouched.
    pub fn undo(&mut self, world: &mut dyn WorldAccess) -> Result<Option<RestoreReport>> {
        let Some(changes) = self.undo.pop_back() else {
            return Ok(None);
        };
        match changes.undo(world) {
            Ok(report) => {
                log::info!("Undid {} changes in '{}'", changes.len(), world.name());
                push_bounded(&mut self.redo, changes, self.capacity);
                Ok(Some(report))
            }
            Err(err) => {
                self.undo.push_back(changes);
                Err(err)
            }
        }
    }

    /// Redo the most recently undone change set
    pub fn redo(&mut self, world: &mut dyn WorldAccess) -> Result<Option<RestoreReport>> {
        let Some(changes) = self.redo.pop_back() else {
            return Ok(None);
        };
        match changes.redo(world) {
            Ok(report) => {
                log::info!("Redid {} changes in '{}'", changes.len(), world.name());
                push_bounded(&mut self.undo, changes, self.capacity);
                Ok(Some(report))
            }
            Err(err) => {
                self.redo.push_back(changes);
                Err(err)
            }
        }
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}

fn push_bounded(stack: &mut VecDeque<ChangeSet>, changes: ChangeSet, capacity: usize) {
    while stack.len() >= capacity {
        stack.pop_front();
    }
    stack.push_back(changes);
}
