//! iterloop - a persisted iteration loop controller
//!
//! iterloop drives a "repeat this prompt until done" workflow for an external
//! agent: each `check` either re-emits the prompt, or ends the loop when the
//! agent echoes its completion promise or the iteration cap is reached.

pub mod context;
pub mod controller;
pub mod domain;
pub mod error;
pub mod promise;
pub mod report;
pub mod storage;

pub use controller::{ControllerConfig, LoopController};
pub use error::{IterloopError, Result};
pub use report::Report;
