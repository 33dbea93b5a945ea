//! Host platform profile resolution.
//!
//! The generated graph differs between platforms in exactly one place:
//! Windows' C runtime lacks C11 threads, so builds there pull in the
//! c11threads fallback shim (one extra source file and one extra include
//! path) and the executable carries an `.exe` suffix. Everything else is
//! identical everywhere.
//!
//! The profile is resolved once at startup and passed down explicitly, so no
//! stage reads ambient platform state mid-pipeline.

use std::path::PathBuf;

/// Host platform as far as the build graph is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    Other,
}

impl Platform {
    pub fn host() -> Platform {
        if cfg!(target_os = "windows") {
            Platform::Windows
        } else {
            Platform::Other
        }
    }
}

/// Per-platform additions to the build graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformProfile {
    /// Suffix appended to the executable base name.
    pub exe_suffix: &'static str,
    /// Sources compiled unconditionally on this platform, appended after the
    /// scanned source set.
    pub extra_sources: Vec<PathBuf>,
    /// Include paths added to every compile action's flags.
    pub extra_include_paths: Vec<PathBuf>,
}

impl PlatformProfile {
    /// Pure: same platform in, same profile out. No filesystem access.
    pub fn resolve(platform: Platform) -> PlatformProfile {
        match platform {
            Platform::Windows => PlatformProfile {
                exe_suffix: ".exe",
                extra_sources: vec![PathBuf::from("../c11threads/threads_msvc.c")],
                extra_include_paths: vec![PathBuf::from("../c11threads")],
            },
            Platform::Other => PlatformProfile {
                exe_suffix: "",
                extra_sources: Vec::new(),
                extra_include_paths: Vec::new(),
            },
        }
    }
}
