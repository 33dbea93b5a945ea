//! Dependency subsystem builds.
//!
//! The driver executable links against two prebuilt subsystems: TB (the
//! backend, `../tilde-backend`) and libCuik (the frontend, `../libCuik`).
//! Each ships its own `build.py`; this module runs them in that fixed order
//! and treats any non-zero exit as fatal, since a missing link artifact
//! would make the generated graph link against nothing.

use anyhow::{Context, Result};
use colored::*;
use std::process::Command;

/// Backend (TB) checkout, relative to the driver tree.
pub const BACKEND_DIR: &str = "../tilde-backend";

/// Frontend (libCuik) checkout, relative to the driver tree.
pub const FRONTEND_DIR: &str = "../libCuik";

const OPT_FLAG: &str = "--opt";

/// Arguments for the backend build: the target architectures, plus the
/// optimization flag when requested.
pub fn backend_args(archs: &[String], optimize: bool) -> Vec<String> {
    let mut args: Vec<String> = archs.to_vec();
    if optimize {
        args.push(OPT_FLAG.to_string());
    }
    args
}

/// Arguments for the frontend build: always `--usetb` (the driver integrates
/// the backend), plus the optimization flag when requested.
pub fn frontend_args(optimize: bool) -> Vec<String> {
    let mut args = vec!["--usetb".to_string()];
    if optimize {
        args.push(OPT_FLAG.to_string());
    }
    args
}

/// Shell command line a subsystem build runs as.
pub fn script_command_line(args: &[String]) -> String {
    if args.is_empty() {
        "build.py".to_string()
    } else {
        format!("build.py {}", args.join(" "))
    }
}

/// Build both subsystems, backend first. Fail-fast: the frontend build is
/// not attempted after a backend failure, and there is no retry.
pub fn build_all(archs: &[String], optimize: bool, verbose: bool) -> Result<()> {
    run_build_script(BACKEND_DIR, &backend_args(archs, optimize), verbose)?;
    run_build_script(FRONTEND_DIR, &frontend_args(optimize), verbose)?;
    Ok(())
}

fn run_build_script(dir: &str, args: &[String], verbose: bool) -> Result<()> {
    let command_line = script_command_line(args);

    if verbose {
        println!("   {} {} (in {})", "→".cyan(), command_line, dir);
    }

    // Child stdout/stderr stream through: the subsystem's own diagnostics are
    // the user-visible failure signal.
    let status = if cfg!(target_os = "windows") {
        Command::new("cmd")
            .args(["/C", &command_line])
            .current_dir(dir)
            .status()
    } else {
        Command::new("sh")
            .args(["-c", &command_line])
            .current_dir(dir)
            .status()
    }
    .with_context(|| format!("Failed to launch build script in {dir}"))?;

    if !status.success() {
        anyhow::bail!("Subsystem build failed in {dir}");
    }
    Ok(())
}
