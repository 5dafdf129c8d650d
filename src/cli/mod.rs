//! CLI module for iterloop - command-line interface and subcommands.
//!
//! Provides the main entry point with one subcommand per controller
//! operation: start, check, cancel, status.

pub mod commands;

pub use commands::Cli;
