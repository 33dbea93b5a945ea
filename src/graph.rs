//! Build graph generation and serialization.
//!
//! The heart of the driver: scan the local sources, derive one compile
//! action per translation unit plus a single link action, and serialize the
//! result in ninja syntax. ninja owns all incremental execution - each
//! compile action declares a Makefile-convention depfile (`$out.d`), so a
//! header edit retriggers exactly the objects that included it.
//!
//! The graph is rebuilt from scratch on every invocation; no state persists
//! on this side. Rendering is split from persistence so emission can be
//! checked for byte-identical output.

use anyhow::{Context, Result};
use colored::*;
use serde_json::json;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::platform::PlatformProfile;

/// Directory scanned for driver translation units.
pub const SOURCE_DIR: &str = "src";

/// Directory compile actions drop objects (and their depfiles) into.
pub const OBJ_DIR: &str = "bin";

/// Base name of the linked executable; the platform suffix is appended.
pub const EXE_NAME: &str = "cuik";

/// File the serialized graph is written to, where ninja looks for it.
pub const GRAPH_FILE: &str = "build.ninja";

pub const COMPILE_COMMANDS_FILE: &str = "compile_commands.json";

/// Link artifact produced by the backend subsystem build.
pub const BACKEND_LIB: &str = "../tilde-backend/tildebackend.lib";

/// Link artifact produced by the frontend subsystem build.
pub const FRONTEND_LIB: &str = "../libCuik/libcuik.lib";

const BASE_CFLAGS: &[&str] = &["-g", "-Wall", "-Werror", "-Wno-unused-function"];
const INCLUDE_DIRS: &[&str] = &["../libCuik/include", "../tilde-backend/include"];
const DEFINES: &[&str] = &["-DCUIK_USE_TB", "-D_CRT_SECURE_NO_WARNINGS"];

/// One translation unit, compiled to an object with a depfile beside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileAction {
    pub input: PathBuf,
    pub output: PathBuf,
    pub depfile: PathBuf,
}

/// The single link step combining every object with the subsystem artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkAction {
    pub inputs: Vec<PathBuf>,
    pub output: PathBuf,
}

/// Complete action graph for one invocation.
#[derive(Debug)]
pub struct BuildGraph {
    pub compiler: String,
    pub cflags: Vec<String>,
    pub compiles: Vec<CompileAction>,
    pub link: LinkAction,
}

/// Collect the `.c` files directly under `dir`, sorted by path so the
/// emitted graph is reproducible across runs and filesystems. An unreadable
/// directory is fatal: nothing downstream can proceed without the scan.
pub fn discover_sources(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut sources = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry
            .with_context(|| format!("Failed to scan source directory '{}'", dir.display()))?;
        let path = entry.path();
        if path.extension().is_some_and(|ext| ext == "c") {
            sources.push(path.to_owned());
        }
    }
    sources.sort();
    Ok(sources)
}

impl BuildGraph {
    /// Derive the full graph from the discovered sources. Platform extra
    /// sources are appended after the sorted scan result, so the Windows
    /// thread shim lands at the end of the compile list.
    pub fn generate(
        sources: &[PathBuf],
        profile: &PlatformProfile,
        compiler: &str,
        extra_flags: &[String],
    ) -> BuildGraph {
        let mut cflags: Vec<String> = BASE_CFLAGS.iter().map(|f| f.to_string()).collect();
        for dir in INCLUDE_DIRS {
            cflags.push("-I".to_string());
            cflags.push(dir.to_string());
        }
        cflags.extend(DEFINES.iter().map(|d| d.to_string()));
        for dir in &profile.extra_include_paths {
            cflags.push("-I".to_string());
            cflags.push(dir.display().to_string());
        }
        cflags.extend(extra_flags.iter().cloned());

        let mut compiles = Vec::new();
        let mut seen_stems = HashSet::new();
        for src in sources.iter().chain(profile.extra_sources.iter()) {
            // Object paths derive from the base name only, so same-named
            // files in different directories collide; the later statement
            // wins. Warn, but keep the emission as-is.
            let stem = src.file_stem().unwrap().to_string_lossy();
            if !seen_stems.insert(stem.to_string()) {
                println!(
                    "{} Duplicate base name '{}': its object path is emitted twice",
                    "!".yellow(),
                    stem
                );
            }
            let output = Path::new(OBJ_DIR).join(format!("{stem}.o"));
            let depfile = PathBuf::from(format!("{}.d", output.display()));
            compiles.push(CompileAction {
                input: src.clone(),
                output,
                depfile,
            });
        }

        let mut link_inputs: Vec<PathBuf> = compiles.iter().map(|c| c.output.clone()).collect();
        link_inputs.push(PathBuf::from(BACKEND_LIB));
        link_inputs.push(PathBuf::from(FRONTEND_LIB));

        BuildGraph {
            compiler: compiler.to_string(),
            cflags,
            compiles,
            link: LinkAction {
                inputs: link_inputs,
                output: PathBuf::from(format!("{EXE_NAME}{}", profile.exe_suffix)),
            },
        }
    }

    /// Serialize to ninja syntax: the shared flag variable, the two rule
    /// templates, then one build statement per compile action and the link
    /// statement last.
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("cflags = {}\n\n", self.cflags.join(" ")));
        out.push_str(&format!(
            "rule cc\n  depfile = $out.d\n  command = {cc} $in $cflags -MD -MF $out.d -c -o $out\n  description = CC $in $out\n\n",
            cc = self.compiler
        ));
        out.push_str(&format!(
            "rule link\n  command = {cc} $in -g -o $out\n  description = LINK $out\n\n",
            cc = self.compiler
        ));

        for c in &self.compiles {
            out.push_str(&format!(
                "build {}: cc {}\n",
                c.output.display(),
                c.input.display()
            ));
        }

        let link_inputs = self
            .link
            .inputs
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(" ");
        out.push_str(&format!(
            "build {}: link {}\n",
            self.link.output.display(),
            link_inputs
        ));
        out
    }

    /// Persist the graph where ninja expects it.
    pub fn write(&self, path: &Path) -> Result<()> {
        fs::write(path, self.render())
            .with_context(|| format!("Failed to write {}", path.display()))
    }

    /// Emit a compile database next to the graph for IDE integration: one
    /// entry per compile action with the fully expanded command line.
    pub fn write_compile_commands(&self, path: &Path) -> Result<()> {
        let directory = std::env::current_dir()
            .context("Failed to resolve current directory")?
            .display()
            .to_string();

        let entries: Vec<serde_json::Value> = self
            .compiles
            .iter()
            .map(|c| {
                json!({
                    "directory": directory,
                    "command": format!(
                        "{} {} {} -MD -MF {} -c -o {}",
                        self.compiler,
                        c.input.display(),
                        self.cflags.join(" "),
                        c.depfile.display(),
                        c.output.display()
                    ),
                    "file": c.input.display().to_string(),
                })
            })
            .collect();

        let json_str = serde_json::to_string_pretty(&entries)
            .context("Failed to serialize compile commands")?;
        fs::write(path, json_str).with_context(|| format!("Failed to write {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::Platform;

    fn sources(names: &[&str]) -> Vec<PathBuf> {
        names.iter().map(|n| Path::new("src").join(n)).collect()
    }

    fn other() -> PlatformProfile {
        PlatformProfile::resolve(Platform::Other)
    }

    #[test]
    fn test_one_compile_action_per_source() {
        let g = BuildGraph::generate(&sources(&["a.c", "b.c", "c.c"]), &other(), "clang", &[]);
        assert_eq!(g.compiles.len(), 3);
        assert_eq!(g.link.inputs.len(), 5);
    }

    #[test]
    fn test_output_paths_derive_from_base_name() {
        let g = BuildGraph::generate(&sources(&["a.c"]), &other(), "clang", &[]);
        assert_eq!(g.compiles[0].output, Path::new("bin").join("a.o"));
        assert_eq!(g.compiles[0].depfile, PathBuf::from("bin/a.o.d"));
    }

    #[test]
    fn test_link_inputs_end_with_backend_then_frontend() {
        let g = BuildGraph::generate(&sources(&["a.c"]), &other(), "clang", &[]);
        let n = g.link.inputs.len();
        assert_eq!(g.link.inputs[n - 2], PathBuf::from(BACKEND_LIB));
        assert_eq!(g.link.inputs[n - 1], PathBuf::from(FRONTEND_LIB));
    }

    #[test]
    fn test_zero_sources_still_links_the_subsystems() {
        let g = BuildGraph::generate(&[], &other(), "clang", &[]);
        assert!(g.compiles.is_empty());
        assert_eq!(
            g.link.inputs,
            vec![PathBuf::from(BACKEND_LIB), PathBuf::from(FRONTEND_LIB)]
        );
        assert!(g.render().contains(&format!(
            "build cuik: link {BACKEND_LIB} {FRONTEND_LIB}"
        )));
    }

    #[test]
    fn test_windows_profile_appends_shim_and_include() {
        let profile = PlatformProfile::resolve(Platform::Windows);
        let g = BuildGraph::generate(&sources(&["a.c", "b.c", "c.c"]), &profile, "clang", &[]);
        assert_eq!(g.compiles.len(), 4);
        assert_eq!(
            g.compiles[3].input,
            PathBuf::from("../c11threads/threads_msvc.c")
        );
        assert_eq!(g.compiles[3].output, Path::new("bin").join("threads_msvc.o"));
        assert!(g.cflags.windows(2).any(|w| w[0] == "-I" && w[1] == "../c11threads"));
        assert_eq!(g.link.output, PathBuf::from("cuik.exe"));
    }

    #[test]
    fn test_rule_templates_carry_depfile_and_debug_symbols() {
        let g = BuildGraph::generate(&sources(&["a.c"]), &other(), "clang", &[]);
        let text = g.render();
        assert!(text.contains("rule cc\n  depfile = $out.d\n"));
        assert!(text.contains("command = clang $in $cflags -MD -MF $out.d -c -o $out"));
        assert!(text.contains("rule link\n  command = clang $in -g -o $out"));
        assert!(text.contains("-DCUIK_USE_TB"));
        assert!(text.contains("-D_CRT_SECURE_NO_WARNINGS"));
    }

    #[test]
    fn test_extra_flags_land_at_the_end_of_cflags() {
        let extra = vec!["-fsanitize=address".to_string()];
        let g = BuildGraph::generate(&sources(&["a.c"]), &other(), "clang", &extra);
        assert_eq!(g.cflags.last().unwrap(), "-fsanitize=address");
    }

    #[test]
    fn test_render_is_deterministic() {
        let srcs = sources(&["c.c", "a.c", "b.c"]);
        let first = BuildGraph::generate(&srcs, &other(), "clang", &[]).render();
        let second = BuildGraph::generate(&srcs, &other(), "clang", &[]).render();
        assert_eq!(first, second);
    }

    #[test]
    fn test_duplicate_base_names_keep_last_writer_wins_emission() {
        let srcs = vec![
            PathBuf::from("src/main.c"),
            PathBuf::from("vendor/main.c"),
        ];
        let g = BuildGraph::generate(&srcs, &other(), "clang", &[]);
        // Both statements are emitted; the object path collides by design.
        assert_eq!(g.compiles.len(), 2);
        assert_eq!(g.compiles[0].output, g.compiles[1].output);
    }

    #[test]
    fn test_discovery_sorts_and_filters() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["zeta.c", "alpha.c", "beta.c", "notes.md", "header.h"] {
            fs::write(dir.path().join(name), "").unwrap();
        }
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested").join("deep.c"), "").unwrap();

        let found = discover_sources(dir.path()).unwrap();
        let names: Vec<_> = found
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        // Only the top level, only .c, lexicographic.
        assert_eq!(names, vec!["alpha.c", "beta.c", "zeta.c"]);
    }

    #[test]
    fn test_discovery_of_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(discover_sources(&dir.path().join("no_such_dir")).is_err());
    }
}
