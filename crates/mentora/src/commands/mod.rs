//! Command implementations

pub mod config;
pub mod db;
pub mod media;

use anyhow::{Context, Result};
use camino::Utf8Path;
use mentora_core::{HierarchicalConfigLoader, RuntimeConfig};

/// Loader for `--config-dir`, or the default location
fn loader(config_dir: Option<&Utf8Path>) -> Result<HierarchicalConfigLoader> {
    match config_dir {
        Some(dir) => Ok(HierarchicalConfigLoader::with_dir(dir.to_path_buf())),
        None => HierarchicalConfigLoader::new().context("Failed to locate the config directory"),
    }
}

/// Load and validate runtime configuration
pub fn load_config(config_dir: Option<&Utf8Path>) -> Result<RuntimeConfig> {
    let loader = loader(config_dir)?;
    tracing::debug!(config_dir = %loader.config_dir(), "loading runtime config");
    loader
        .load_runtime_config()
        .with_context(|| format!("Failed to load {}", loader.runtime_config_path()))
}
