//! JSON file storage in a context directory.

use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use log::{debug, warn};

use super::traits::LoopStore;
use crate::context::ContextResolver;
use crate::domain::{ARCHIVE_PREFIX, ArchiveRecord, ArchiveSummary, LoopState};
use crate::error::{IterloopError, Result};

/// File holding the active loop.
pub const STATE_FILE: &str = "iteration-loop.json";

/// Advisory lock taken around every read-modify-write.
pub const LOCK_FILE: &str = "iteration-loop.lock";

/// Temporary file suffix for atomic writes.
const TMP_SUFFIX: &str = ".tmp";

/// Upper bound on same-second archive collisions before giving up.
const MAX_ARCHIVE_SUFFIX: u32 = 1000;

/// File-backed loop store.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Create a store rooted at `dir`, creating the directory if needed.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Create a store at whatever directory the resolver picks.
    pub fn open(resolver: &impl ContextResolver) -> Result<Self> {
        Self::new(resolver.resolve()?)
    }

    /// The context directory this store writes to.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the active state file.
    pub fn state_path(&self) -> PathBuf {
        self.dir.join(STATE_FILE)
    }

    fn tmp_path(&self) -> PathBuf {
        self.dir.join(format!("{STATE_FILE}{TMP_SUFFIX}"))
    }

    fn lock_path(&self) -> PathBuf {
        self.dir.join(LOCK_FILE)
    }

    fn archive_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    fn malformed(&self, reason: impl Into<String>) -> IterloopError {
        IterloopError::MalformedState {
            path: self.state_path(),
            reason: reason.into(),
        }
    }
}

impl LoopStore for FileStore {
    fn load(&self) -> Result<Option<LoopState>> {
        let path = self.state_path();
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) if e.kind() == ErrorKind::InvalidData => return Err(self.malformed(e.to_string())),
            Err(e) => return Err(e.into()),
        };

        let state: LoopState = serde_json::from_str(&contents).map_err(|e| self.malformed(e.to_string()))?;
        state.validate().map_err(|reason| self.malformed(reason))?;

        debug!("Loaded loop state from {} at iteration {}", path.display(), state.iteration);
        Ok(Some(state))
    }

    fn save(&self, state: &LoopState) -> Result<()> {
        let tmp_path = self.tmp_path();
        let json = serde_json::to_string_pretty(state)?;

        let mut tmp_file = File::create(&tmp_path)?;
        tmp_file.write_all(json.as_bytes())?;
        tmp_file.sync_all()?;

        fs::rename(&tmp_path, self.state_path())?;
        debug!("Saved loop state at iteration {}", state.iteration);
        Ok(())
    }

    fn delete(&self) -> Result<()> {
        match fs::remove_file(self.state_path()) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn archive(&self, record: &ArchiveRecord) -> Result<String> {
        let base = record.key();
        let json = serde_json::to_string_pretty(record)?;

        for n in 1..=MAX_ARCHIVE_SUFFIX {
            let key = if n == 1 { base.clone() } else { format!("{base}-{n}") };
            let path = self.archive_path(&key);

            let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => file,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e.into()),
            };
            file.write_all(json.as_bytes())?;
            file.sync_all()?;

            debug!("Archived loop to {}", path.display());
            return Ok(key);
        }

        Err(IterloopError::Storage(format!(
            "Too many archives named {base} in {}",
            self.dir.display()
        )))
    }

    fn recent_archives(&self, limit: usize) -> Result<Vec<ArchiveSummary>> {
        let pattern = format!(
            "{}/{}*.json",
            glob::Pattern::escape(&self.dir.to_string_lossy()),
            ARCHIVE_PREFIX
        );
        let paths = glob::glob(&pattern).map_err(|e| IterloopError::Storage(e.to_string()))?;

        let mut summaries = Vec::new();
        for entry in paths {
            let path = match entry {
                Ok(path) => path,
                Err(e) => {
                    warn!("Skipping unreadable archive entry: {}", e);
                    continue;
                }
            };
            let Some(key) = path.file_stem().map(|s| s.to_string_lossy().into_owned()) else {
                continue;
            };

            let record = fs::read_to_string(&path)
                .map_err(|e| e.to_string())
                .and_then(|contents| serde_json::from_str::<ArchiveRecord>(&contents).map_err(|e| e.to_string()));
            match record {
                Ok(record) => summaries.push(ArchiveSummary::new(key, &record)),
                Err(e) => warn!("Skipping malformed archive {}: {}", path.display(), e),
            }
        }

        summaries.sort_by(|a, b| b.ended_at.cmp(&a.ended_at).then_with(|| b.key.cmp(&a.key)));
        summaries.truncate(limit);
        Ok(summaries)
    }

    fn exclusive<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce() -> Result<T>,
    {
        let lock_file = File::create(self.lock_path())?;
        FileExt::lock_exclusive(&lock_file)
            .map_err(|e| IterloopError::Storage(format!("Failed to acquire loop lock: {e}")))?;

        let result = f();

        if let Err(e) = FileExt::unlock(&lock_file) {
            warn!("Failed to release loop lock: {}", e);
        }
        result
    }
}
