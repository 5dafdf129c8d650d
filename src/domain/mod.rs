//! Domain types for iterloop
//!
//! This module contains all core domain types:
//! - LoopState: the single active loop persisted per context
//! - IterationRecord: one entry of a loop's append-only history
//! - LoopOutcome: how a loop ended (completed, maxed, cancelled)
//! - ArchiveRecord: immutable snapshot written when a loop ends

pub mod archive;
pub mod loop_state;
pub mod outcome;

pub use archive::{ARCHIVE_PREFIX, ArchiveRecord, ArchiveSummary};
pub use loop_state::{IterationRecord, LoopState, StopReason};
pub use outcome::LoopOutcome;
