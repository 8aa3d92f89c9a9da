//! stride-engine - Migration execution for Stride
//!
//! This crate provides the apply/rollback/mark/unmark engine over a database
//! session, the squash compaction algorithm, and the interactive decision
//! port those operations confirm through.

pub mod decision;
pub mod engine;
pub mod error;
pub mod squash;

pub use decision::{AcceptAll, Decide, Decision, DeclineAll};
pub use engine::{Engine, HistoryEntry, RollbackTarget};
pub use error::{EngineError, EngineResult};
pub use squash::{SkipReason, SquashOutcome, Squasher};
