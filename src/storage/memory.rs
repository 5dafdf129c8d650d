//! In-memory loop store.

use std::sync::Mutex;

use super::traits::LoopStore;
use crate::domain::{ArchiveRecord, ArchiveSummary, LoopState};
use crate::error::{IterloopError, Result};

/// Loop store that keeps everything in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    active: Mutex<Option<LoopState>>,
    archives: Mutex<Vec<(String, ArchiveRecord)>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// All archives in write order, with their keys.
    pub fn archives(&self) -> Result<Vec<(String, ArchiveRecord)>> {
        Ok(self
            .archives
            .lock()
            .map_err(|e| IterloopError::Storage(e.to_string()))?
            .clone())
    }
}

impl LoopStore for MemoryStore {
    fn load(&self) -> Result<Option<LoopState>> {
        Ok(self
            .active
            .lock()
            .map_err(|e| IterloopError::Storage(e.to_string()))?
            .clone())
    }

    fn save(&self, state: &LoopState) -> Result<()> {
        *self.active.lock().map_err(|e| IterloopError::Storage(e.to_string()))? = Some(state.clone());
        Ok(())
    }

    fn delete(&self) -> Result<()> {
        *self.active.lock().map_err(|e| IterloopError::Storage(e.to_string()))? = None;
        Ok(())
    }

    fn archive(&self, record: &ArchiveRecord) -> Result<String> {
        let mut archives = self.archives.lock().map_err(|e| IterloopError::Storage(e.to_string()))?;

        let base = record.key();
        let mut key = base.clone();
        let mut n = 1;
        while archives.iter().any(|(existing, _)| *existing == key) {
            n += 1;
            key = format!("{base}-{n}");
        }

        archives.push((key.clone(), record.clone()));
        Ok(key)
    }

    fn recent_archives(&self, limit: usize) -> Result<Vec<ArchiveSummary>> {
        let archives = self.archives.lock().map_err(|e| IterloopError::Storage(e.to_string()))?;

        let mut summaries: Vec<ArchiveSummary> = archives
            .iter()
            .map(|(key, record)| ArchiveSummary::new(key.clone(), record))
            .collect();
        summaries.sort_by(|a, b| b.ended_at.cmp(&a.ended_at).then_with(|| b.key.cmp(&a.key)));
        summaries.truncate(limit);
        Ok(summaries)
    }
}
