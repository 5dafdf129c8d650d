//! Loop state and iteration history
//!
//! A `LoopState` is the only record that lives in the active slot of a
//! context. It is created by `start`, advanced by `check`, and leaves the
//! slot by being archived.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::promise::normalize_whitespace;

/// The persisted state of the active loop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoopState {
    /// The instruction repeated every iteration
    pub prompt: String,

    /// Phrase the agent must echo inside `<promise>` tags to complete
    pub completion_promise: Option<String>,

    /// Hard cap on iterations; 0 means unbounded
    pub max_iterations: u32,

    /// Current iteration number (1-based)
    pub iteration: u32,

    pub started_at: DateTime<Utc>,

    /// Append-only log, one entry per `check`
    #[serde(default)]
    pub history: Vec<IterationRecord>,
}

/// One entry in a loop's history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IterationRecord {
    pub iteration: u32,
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<StopReason>,
    pub timestamp: DateTime<Utc>,
}

/// Why an iteration ended the loop without completing it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    MaxIterations,
}

impl LoopState {
    /// Create a fresh loop at iteration 1.
    ///
    /// A promise that is empty after whitespace normalization is treated as
    /// no promise at all, since `<promise></promise>` would otherwise complete
    /// the loop trivially.
    pub fn new(prompt: impl Into<String>, promise: Option<&str>, max_iterations: u32) -> Self {
        let completion_promise = promise
            .filter(|p| !normalize_whitespace(p).is_empty())
            .map(str::to_string);

        Self {
            prompt: prompt.into(),
            completion_promise,
            max_iterations,
            iteration: 1,
            started_at: Utc::now(),
            history: Vec::new(),
        }
    }

    /// Returns true if the loop has no iteration cap
    pub fn is_unbounded(&self) -> bool {
        self.max_iterations == 0
    }

    /// Returns true if the current iteration is the last one allowed
    pub fn max_reached(&self) -> bool {
        !self.is_unbounded() && self.iteration >= self.max_iterations
    }

    /// Iterations left after the current one, or None when unbounded
    pub fn remaining(&self) -> Option<u32> {
        if self.is_unbounded() {
            None
        } else {
            Some(self.max_iterations.saturating_sub(self.iteration))
        }
    }

    /// Append a history entry for the current iteration.
    pub fn record(&mut self, completed: bool, reason: Option<StopReason>) {
        self.history.push(IterationRecord {
            iteration: self.iteration,
            completed,
            reason,
            timestamp: Utc::now(),
        });
    }

    /// Move to the next iteration. Call only after `record`.
    pub fn advance(&mut self) {
        self.iteration += 1;
    }

    /// Check the invariants an active loop must hold.
    ///
    /// Returns a description of the first violation found.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.iteration == 0 {
            return Err("iteration must be at least 1".to_string());
        }
        if self.history.len() as u64 != u64::from(self.iteration) - 1 {
            return Err(format!(
                "iteration {} does not follow a history of {} entries",
                self.iteration,
                self.history.len()
            ));
        }
        for (index, entry) in self.history.iter().enumerate() {
            if entry.iteration as usize != index + 1 {
                return Err(format!(
                    "history entry {} records iteration {}",
                    index + 1,
                    entry.iteration
                ));
            }
        }
        if !self.is_unbounded() && self.iteration > self.max_iterations {
            return Err(format!(
                "iteration {} exceeds max iterations {}",
                self.iteration, self.max_iterations
            ));
        }
        Ok(())
    }
}
