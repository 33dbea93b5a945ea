//! Build artifact cleanup.
//!
//! `cuikbuild clean` removes everything a build run writes into the working
//! directory: the object directory, the serialized graph, the compile
//! database, and the linked executable. Subsystem artifacts are theirs, not
//! ours, and are left alone.

use anyhow::{Context, Result};
use colored::*;
use std::fs;
use std::path::Path;

use crate::graph::{COMPILE_COMMANDS_FILE, EXE_NAME, GRAPH_FILE, OBJ_DIR};
use crate::platform::PlatformProfile;

pub fn clean(profile: &PlatformProfile) -> Result<()> {
    let mut cleaned = false;

    if Path::new(OBJ_DIR).exists() {
        fs::remove_dir_all(OBJ_DIR).context("Failed to remove object directory")?;
        cleaned = true;
    }

    let exe = format!("{EXE_NAME}{}", profile.exe_suffix);
    for file in [GRAPH_FILE, COMPILE_COMMANDS_FILE, exe.as_str()] {
        if Path::new(file).exists() {
            fs::remove_file(file).with_context(|| format!("Failed to remove {file}"))?;
            cleaned = true;
        }
    }

    if cleaned {
        println!("{} Clean complete.", "✓".green());
    } else {
        println!("{} Nothing to clean", "!".yellow());
    }
    Ok(())
}
