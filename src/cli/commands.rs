//! CLI command definitions using clap.
//!
//! Defines the main CLI structure and subcommands:
//! - start: begin a new iteration loop
//! - check: decide whether the loop continues
//! - cancel: stop the active loop
//! - status: show the active loop or recent archives

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// iterloop - repeat a prompt until a completion promise is met
#[derive(Parser, Debug)]
#[command(name = "iterloop")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Optional config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Use this context directory instead of searching upward for one
    #[arg(short, long, global = true)]
    pub dir: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}

/// Main subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start a new iteration loop
    Start {
        /// The prompt to repeat each iteration
        prompt: String,

        /// Completion promise text (exact match required)
        #[arg(short, long)]
        promise: Option<String>,

        /// Max iterations (0 = unlimited)
        #[arg(short, long, default_value_t = 0)]
        max: u32,
    },

    /// Check if the loop should continue (exit 0 = continue, 1 = ended, 2 = error)
    Check {
        /// Last output to check for the promise (or pipe via stdin)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Cancel the active loop
    Cancel,

    /// Show loop status
    Status,
}
