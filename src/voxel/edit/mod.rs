//! Block editing with change recording and undo/redo.
//!
//! An [`EditSession`] records every block it writes into a [`ChangeSet`].
//! Finished change sets go to a user's [`History`] through [`LocalSession`].

pub mod change;
pub mod history;
pub mod invalidator;
pub mod local;
pub mod mask;
pub mod pattern;
pub mod session;

pub use change::{Change, ChangeSet, RestoreReport};
pub use history::History;
pub use invalidator::ChunkInvalidator;
pub use local::LocalSession;
pub use mask::{BlockMask, ExistingBlockMask, InvertMask, Mask, RegionMask};
pub use pattern::{BlockPattern, Pattern, RandomPattern};
pub use session::{EditOutcome, EditReport, EditSession, SessionState};
