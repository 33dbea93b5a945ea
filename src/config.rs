//! Driver configuration (`cuik.toml`).
//!
//! The config file is optional; without it every knob falls back to the
//! defaults the subsystem checkouts expect. `[build]` can override the
//! compiler, append extra compile flags, and change the backend architecture
//! list.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

pub const CONFIG_FILE: &str = "cuik.toml";

/// Architectures requested of the backend build unless overridden.
pub const DEFAULT_ARCHS: &[&str] = &["x64", "aarch64"];

const DEFAULT_COMPILER: &str = "clang";

#[derive(Deserialize, Debug, Default)]
pub struct DriverConfig {
    pub build: Option<BuildSection>,
}

#[derive(Deserialize, Debug, Default)]
pub struct BuildSection {
    pub compiler: Option<String>,
    pub flags: Option<Vec<String>>,
    pub archs: Option<Vec<String>>,
}

impl DriverConfig {
    /// Compiler used by both rule templates: config value, then the `CC`
    /// environment variable, then clang.
    pub fn compiler(&self) -> String {
        if let Some(build) = &self.build
            && let Some(compiler) = &build.compiler
        {
            return compiler.clone();
        }
        if let Ok(env_cc) = std::env::var("CC") {
            return env_cc;
        }
        DEFAULT_COMPILER.to_string()
    }

    pub fn archs(&self) -> Vec<String> {
        if let Some(build) = &self.build
            && let Some(archs) = &build.archs
        {
            return archs.clone();
        }
        DEFAULT_ARCHS.iter().map(|s| s.to_string()).collect()
    }

    /// Extra cflags appended after the built-in set.
    pub fn extra_flags(&self) -> Vec<String> {
        self.build
            .as_ref()
            .and_then(|b| b.flags.clone())
            .unwrap_or_default()
    }
}

/// A missing config file means defaults; a present but broken one is fatal.
pub fn load_config() -> Result<DriverConfig> {
    if !Path::new(CONFIG_FILE).exists() {
        return Ok(DriverConfig::default());
    }
    let config_str = fs::read_to_string(CONFIG_FILE)
        .with_context(|| format!("Failed to read {CONFIG_FILE} - check file permissions"))?;
    toml::from_str(&config_str)
        .with_context(|| format!("Failed to parse {CONFIG_FILE} - check for syntax errors"))
}
