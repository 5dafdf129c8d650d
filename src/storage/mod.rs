//! Storage layer for iterloop.
//!
//! The controller only talks to the `LoopStore` trait. `FileStore` keeps the
//! active loop and its archives as JSON documents in a context directory;
//! `MemoryStore` keeps the same semantics in memory for tests.

mod file;
mod memory;
mod traits;

pub use file::{FileStore, LOCK_FILE, STATE_FILE};
pub use memory::MemoryStore;
pub use traits::LoopStore;
