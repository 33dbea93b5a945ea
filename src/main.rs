//! # cuikbuild CLI entry point
//!
//! Thin front over the build pipeline: parse arguments, then run the stages
//! in order (platform profile, subsystem builds, graph emission, ninja).

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::*;
use std::path::Path;

use cuikbuild::clean;
use cuikbuild::config;
use cuikbuild::exec;
use cuikbuild::graph::{self, BuildGraph};
use cuikbuild::platform::{Platform, PlatformProfile};
use cuikbuild::subsystems;

#[derive(Parser)]
#[command(name = "cuikbuild")]
#[command(about = "Build driver for the cuik executable", version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the subsystems, emit the build graph, and run ninja
    Build {
        /// Request optimized subsystem builds
        #[arg(long)]
        opt: bool,
        /// Echo the external commands being run
        #[arg(short, long)]
        verbose: bool,
        /// Print the graph and commands without running anything
        #[arg(long)]
        dry_run: bool,
        /// Reuse existing subsystem artifacts instead of rebuilding them
        #[arg(long)]
        skip_deps: bool,
    },
    /// Remove build artifacts
    Clean,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let profile = PlatformProfile::resolve(Platform::host());

    match cli.command {
        Some(Commands::Clean) => clean::clean(&profile),
        Some(Commands::Build {
            opt,
            verbose,
            dry_run,
            skip_deps,
        }) => run_build(&profile, opt, verbose, dry_run, skip_deps),
        // Bare `cuikbuild` is a plain debug build.
        None => run_build(&profile, false, false, false, false),
    }
}

fn run_build(
    profile: &PlatformProfile,
    opt: bool,
    verbose: bool,
    dry_run: bool,
    skip_deps: bool,
) -> Result<()> {
    let config = config::load_config()?;
    let archs = config.archs();

    println!(
        "{} Building {} ({})",
        "🚀".blue(),
        graph::EXE_NAME.bold(),
        if opt { "optimized" } else { "debug" }
    );

    // 1. Subsystem link artifacts must exist before the graph can execute.
    if dry_run {
        for (dir, args) in [
            (
                subsystems::BACKEND_DIR,
                subsystems::backend_args(&archs, opt),
            ),
            (subsystems::FRONTEND_DIR, subsystems::frontend_args(opt)),
        ] {
            println!(
                "   {} Would run: {} (in {})",
                "→".cyan(),
                subsystems::script_command_line(&args),
                dir
            );
        }
    } else if skip_deps {
        println!(
            "{} Skipping subsystem builds (reusing existing artifacts)",
            "!".yellow()
        );
    } else {
        subsystems::build_all(&archs, opt, verbose)?;
    }

    // 2. Discover sources and emit the graph.
    let sources = graph::discover_sources(Path::new(graph::SOURCE_DIR))?;
    let build_graph = BuildGraph::generate(
        &sources,
        profile,
        &config.compiler(),
        &config.extra_flags(),
    );
    if verbose || dry_run {
        println!(
            "   {} {} compile actions, 1 link action",
            "⚙".blue(),
            build_graph.compiles.len()
        );
    }

    if dry_run {
        print!("{}", build_graph.render());
        return Ok(());
    }
    build_graph.write(Path::new(graph::GRAPH_FILE))?;
    build_graph.write_compile_commands(Path::new(graph::COMPILE_COMMANDS_FILE))?;

    // 3. ninja decides what is out of date and does the work.
    exec::run_ninja(verbose)?;

    println!("{} Build finished", "✓".green());
    Ok(())
}
