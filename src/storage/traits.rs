//! Storage trait definition.

use crate::domain::{ArchiveRecord, ArchiveSummary, LoopState};
use crate::error::Result;

/// Persistence for the single active loop slot and its archive.
pub trait LoopStore: Send + Sync {
    /// Load the active loop, if any.
    fn load(&self) -> Result<Option<LoopState>>;

    /// Replace the active loop.
    fn save(&self, state: &LoopState) -> Result<()>;

    /// Clear the active slot. Clearing an empty slot is not an error.
    fn delete(&self) -> Result<()>;

    /// Write an archive record and return the key it was stored under.
    ///
    /// Existing archives are never overwritten.
    fn archive(&self, record: &ArchiveRecord) -> Result<String>;

    /// The newest archives first, at most `limit` of them.
    fn recent_archives(&self, limit: usize) -> Result<Vec<ArchiveSummary>>;

    /// Run `f` while holding the store's write lock.
    ///
    /// Stores without cross-process sharing can rely on the default, which
    /// takes no lock.
    fn exclusive<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce() -> Result<T>,
    {
        f()
    }
}
