//! Archive records for loops that have left the active slot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::loop_state::LoopState;
use super::outcome::LoopOutcome;

/// Prefix shared by every archive key
pub const ARCHIVE_PREFIX: &str = "iteration-loop-";

/// Immutable terminal snapshot of a loop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveRecord {
    #[serde(flatten)]
    pub state: LoopState,
    pub outcome: LoopOutcome,
    pub ended_at: DateTime<Utc>,
}

impl ArchiveRecord {
    /// Seal a loop state with its outcome, stamped now.
    pub fn new(state: LoopState, outcome: LoopOutcome) -> Self {
        Self {
            state,
            outcome,
            ended_at: Utc::now(),
        }
    }

    /// Key derived from outcome and archive time.
    ///
    /// Format: `iteration-loop-{outcome}-{YYYYmmdd-HHMMSS}`
    pub fn key(&self) -> String {
        format!(
            "{}{}-{}",
            ARCHIVE_PREFIX,
            self.outcome.tag(),
            self.ended_at.format("%Y%m%d-%H%M%S")
        )
    }

    /// Number of `check` cycles the loop went through
    pub fn iterations(&self) -> usize {
        self.state.history.len()
    }
}

/// Condensed view of an archive for status listings
#[derive(Debug, Clone, PartialEq)]
pub struct ArchiveSummary {
    pub key: String,
    pub outcome: LoopOutcome,
    pub iterations: usize,
    pub ended_at: DateTime<Utc>,
}

impl ArchiveSummary {
    pub fn new(key: impl Into<String>, record: &ArchiveRecord) -> Self {
        Self {
            key: key.into(),
            outcome: record.outcome,
            iterations: record.iterations(),
            ended_at: record.ended_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample(outcome: LoopOutcome) -> ArchiveRecord {
        let mut state = LoopState::new("Ship it", Some("DONE"), 10);
        state.record(false, None);
        state.advance();
        state.record(true, None);
        ArchiveRecord {
            state,
            outcome,
            ended_at: Utc.with_ymd_and_hms(2026, 3, 14, 15, 9, 26).unwrap(),
        }
    }

    #[test]
    fn test_key_format() {
        assert_eq!(
            sample(LoopOutcome::Completed).key(),
            "iteration-loop-completed-20260314-150926"
        );
        assert_eq!(sample(LoopOutcome::Maxed).key(), "iteration-loop-maxed-20260314-150926");
    }

    #[test]
    fn test_archive_flattens_state() {
        let value = serde_json::to_value(sample(LoopOutcome::Completed)).unwrap();
        assert_eq!(value["prompt"], "Ship it");
        assert_eq!(value["completionPromise"], "DONE");
        assert_eq!(value["outcome"], "completed");
        assert!(value["endedAt"].is_string());
        assert_eq!(value["history"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_archive_parses_back() {
        let record = sample(LoopOutcome::Cancelled);
        let json = serde_json::to_string_pretty(&record).unwrap();
        let parsed: ArchiveRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, record);
    }

    #[test]
    fn test_summary_counts_history() {
        let record = sample(LoopOutcome::Completed);
        let summary = ArchiveSummary::new(record.key(), &record);
        assert_eq!(summary.iterations, 2);
        assert_eq!(summary.outcome, LoopOutcome::Completed);
        assert_eq!(summary.key, "iteration-loop-completed-20260314-150926");
    }
}
