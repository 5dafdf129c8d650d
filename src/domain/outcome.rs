//! Loop termination outcome types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How a loop left the active slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoopOutcome {
    /// The agent echoed the completion promise
    Completed,
    /// The iteration cap was reached without completion
    Maxed,
    /// The loop was cancelled by the user
    Cancelled,
}

impl LoopOutcome {
    /// Tag used in archive file names.
    pub fn tag(&self) -> &'static str {
        match self {
            LoopOutcome::Completed => "completed",
            LoopOutcome::Maxed => "maxed",
            LoopOutcome::Cancelled => "cancelled",
        }
    }

    /// Glyph shown in status summaries.
    pub fn glyph(&self) -> &'static str {
        match self {
            LoopOutcome::Completed => "✅",
            LoopOutcome::Maxed => "🛑",
            LoopOutcome::Cancelled => "❌",
        }
    }
}

impl fmt::Display for LoopOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_tags() {
        assert_eq!(LoopOutcome::Completed.tag(), "completed");
        assert_eq!(LoopOutcome::Maxed.tag(), "maxed");
        assert_eq!(LoopOutcome::Cancelled.tag(), "cancelled");
    }

    #[test]
    fn test_outcome_glyphs_are_distinct() {
        assert_ne!(LoopOutcome::Completed.glyph(), LoopOutcome::Maxed.glyph());
        assert_ne!(LoopOutcome::Maxed.glyph(), LoopOutcome::Cancelled.glyph());
        assert_ne!(LoopOutcome::Completed.glyph(), LoopOutcome::Cancelled.glyph());
    }

    #[test]
    fn test_outcome_serialization() {
        assert_eq!(serde_json::to_string(&LoopOutcome::Completed).unwrap(), "\"completed\"");
        assert_eq!(serde_json::to_string(&LoopOutcome::Maxed).unwrap(), "\"maxed\"");
        assert_eq!(serde_json::to_string(&LoopOutcome::Cancelled).unwrap(), "\"cancelled\"");
    }

    #[test]
    fn test_outcome_display_matches_tag() {
        assert_eq!(LoopOutcome::Maxed.to_string(), "maxed");
    }
}
