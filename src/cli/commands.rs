//! CLI command definitions using clap.
//!
//! Defines the main CLI structure and subcommands:
//! - list: list registered tools
//! - show: print one tool descriptor
//! - run: open a session for a tool

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Promptlab - interactive prompt engineering tools backed by an LLM service
#[derive(Parser, Debug)]
#[command(name = "promptlab")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Optional config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Backend base URL, overrides the configured one
    #[arg(long, global = true)]
    pub base_url: Option<String>,

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
    /// List available tools
    List,

    /// Show a tool's descriptor
    Show {
        /// Tool slug (e.g. prompt-tutor)
        slug: String,
    },

    /// Open a session for a tool
    Run {
        /// Tool slug (e.g. prompt-tutor)
        slug: String,

        /// Submit this prompt, print the result and exit
        #[arg(short, long)]
        prompt: Option<String>,
    },
}
