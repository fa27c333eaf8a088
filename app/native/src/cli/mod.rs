//! CLI module for zonesnap.
//!
//! The CLI inspects configured zones, runs zone detection with synthetic
//! monitors, and replays scenario scripts through the snapping engine against
//! a simulated desktop.

mod commands;
mod output;

use clap::Parser;
pub use commands::Cli;

use crate::error::ZoneSnapError;

/// Runs the CLI.
///
/// Parses command-line arguments and executes the appropriate command.
///
/// # Errors
///
/// Returns an error if the command execution fails.
pub fn run() -> Result<(), ZoneSnapError> {
    let cli = Cli::parse();
    cli.execute()
}
