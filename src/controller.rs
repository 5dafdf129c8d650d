//! Iteration loop controller
//!
//! The controller owns the single active loop of a context and decides, once
//! per `check`, whether the agent should run another iteration. It never runs
//! iterations itself.
//!
//! States are `NoLoop` (nothing in the store) and `Active`. Every operation
//! runs under the store's exclusive lock and performs at most one transition
//! and at most one archive write. On terminal transitions the archive is
//! written before the active state is deleted.

use log::{debug, info};

use crate::domain::{ArchiveRecord, LoopOutcome, LoopState, StopReason};
use crate::error::{IterloopError, Result};
use crate::promise::promise_matches;
use crate::report::Report;
use crate::storage::LoopStore;

/// Default number of archives surfaced by `status` when idle
pub const DEFAULT_RECENT_ARCHIVES: usize = 3;

/// Configuration for the LoopController
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// How many archives `status` lists when no loop is active
    pub recent_archives: usize,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            recent_archives: DEFAULT_RECENT_ARCHIVES,
        }
    }
}

/// Drives the start/check/cancel/status lifecycle over a `LoopStore`
pub struct LoopController<S: LoopStore> {
    store: S,
    config: ControllerConfig,
}

impl<S: LoopStore> LoopController<S> {
    pub fn new(store: S, config: ControllerConfig) -> Self {
        Self { store, config }
    }

    /// The underlying store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Start a new loop at iteration 1.
    ///
    /// Fails with `LoopAlreadyActive` if the context already has a loop; the
    /// existing state is left untouched.
    pub fn start(&self, prompt: &str, promise: Option<&str>, max_iterations: u32) -> Result<Report> {
        if prompt.trim().is_empty() {
            return Err(IterloopError::InvalidInput("prompt must not be empty".to_string()));
        }

        self.store.exclusive(|| {
            if self.store.load()?.is_some() {
                return Err(IterloopError::LoopAlreadyActive);
            }

            let state = LoopState::new(prompt, promise, max_iterations);
            self.store.save(&state)?;

            info!(
                "Started loop (max: {}, promise: {})",
                state.max_iterations,
                state.completion_promise.is_some()
            );
            Ok(Report::Started { state })
        })
    }

    /// Decide whether the loop continues after the agent's latest iteration.
    ///
    /// A matched promise wins over the iteration cap. The cap is compared
    /// against the iteration before it is incremented, so a loop with
    /// `max_iterations = N` sees exactly N checks.
    pub fn check(&self, last_output: Option<&str>) -> Result<Report> {
        self.store.exclusive(|| {
            let mut state = self.store.load()?.ok_or(IterloopError::NoActiveLoop)?;
            debug!("Checking loop at iteration {}", state.iteration);

            let completed = match (&state.completion_promise, last_output) {
                (Some(promise), Some(output)) => promise_matches(promise, output),
                _ => false,
            };

            if completed {
                state.record(true, None);
                let archive = self.finish(state.clone(), LoopOutcome::Completed)?;
                info!("Loop completed at iteration {}", state.iteration);
                return Ok(Report::Completed { state, archive });
            }

            if state.max_reached() {
                state.record(false, Some(StopReason::MaxIterations));
                let archive = self.finish(state.clone(), LoopOutcome::Maxed)?;
                info!(
                    "Loop stopped at iteration {} (max: {})",
                    state.iteration, state.max_iterations
                );
                return Ok(Report::MaxReached { state, archive });
            }

            state.record(false, None);
            state.advance();
            self.store.save(&state)?;

            info!("Loop continuing to iteration {}", state.iteration);
            Ok(Report::Continue { state })
        })
    }

    /// Cancel the active loop, archiving it as-is.
    pub fn cancel(&self) -> Result<Report> {
        self.store.exclusive(|| {
            let state = self.store.load()?.ok_or(IterloopError::NoActiveLoop)?;
            let archive = self.finish(state.clone(), LoopOutcome::Cancelled)?;

            info!("Cancelled loop at iteration {}", state.iteration);
            Ok(Report::Cancelled { state, archive })
        })
    }

    /// Report the active loop, or the most recent archives when idle.
    pub fn status(&self) -> Result<Report> {
        self.store.exclusive(|| match self.store.load()? {
            Some(state) => Ok(Report::Active { state }),
            None => Ok(Report::Idle {
                recent: self.store.recent_archives(self.config.recent_archives)?,
            }),
        })
    }

    /// Archive the loop, then clear the active slot.
    fn finish(&self, state: LoopState, outcome: LoopOutcome) -> Result<String> {
        let key = self.store.archive(&ArchiveRecord::new(state, outcome))?;
        self.store.delete()?;
        Ok(key)
    }
}
