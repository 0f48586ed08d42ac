//! CLI module for promptlab - command-line interface and subcommands.
//!
//! Provides the main entry point with subcommands for listing tools,
//! showing a descriptor, and running a tool session.

pub mod commands;

pub use commands::Cli;
