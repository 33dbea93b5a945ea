//! Graph execution.
//!
//! The serialized graph is handed to ninja with no arguments; it picks up
//! `build.ninja` from the working directory, decides what is out of date via
//! timestamps and the emitted depfiles, and runs the minimal set of actions.
//! Its parallelism and up-to-date cache are entirely its own.

use anyhow::{Context, Result};
use colored::*;
use std::process::Command;

const EXECUTOR: &str = "ninja";

/// Run the executor against the graph in the current directory. A non-zero
/// exit is surfaced as-is; ninja's own output is the diagnostic.
pub fn run_ninja(verbose: bool) -> Result<()> {
    if verbose {
        println!("   {} {}", "→".cyan(), EXECUTOR);
    }

    let status = Command::new(EXECUTOR)
        .status()
        .context("Failed to launch ninja - is it installed and on PATH?")?;

    if !status.success() {
        anyhow::bail!("ninja exited with {status}");
    }
    Ok(())
}
