//! Hierarchical configuration loader with precedence
//!
//! Loads configuration from multiple sources with the following precedence (low to high):
//! 1. Embedded defaults (built into binary)
//! 2. Runtime config file (~/.mentora/runtime.yaml)
//! 3. Environment variables (MENTORA_* prefix, plus DATABASE_URL and CLOUDINARY_*)
//! 4. CLI flags (handled by caller)

use crate::error::{Error, Result};
use crate::types::{RetryPoliciesConfig, RuntimeConfig};
use camino::{Utf8Path, Utf8PathBuf};
use rust_embed::RustEmbed;
use serde::de::DeserializeOwned;
use std::env;
use std::fs;
use std::str::FromStr;

/// Embedded configuration files
#[derive(RustEmbed)]
#[folder = "$CARGO_MANIFEST_DIR/../../embedded/config/"]
#[prefix = ""]
struct EmbeddedConfigs;

/// Name of the runtime config file inside the config directory
const RUNTIME_CONFIG_FILE: &str = "runtime.yaml";

/// Configuration hierarchy loader
pub struct HierarchicalConfigLoader {
    /// Base directory for configuration files
    config_dir: Utf8PathBuf,
}

impl HierarchicalConfigLoader {
    /// Create a loader rooted at `~/.mentora` (or `$MENTORA_CONFIG_DIR`)
    pub fn new() -> Result<Self> {
        let config_dir = Self::get_config_dir()?;
        Ok(Self { config_dir })
    }

    /// Create a loader with a custom config directory
    pub fn with_dir(config_dir: Utf8PathBuf) -> Self {
        Self { config_dir }
    }

    fn get_config_dir() -> Result<Utf8PathBuf> {
        if let Ok(dir) = env::var("MENTORA_CONFIG_DIR") {
            return Ok(Utf8PathBuf::from(dir));
        }

        let home = env::var("HOME")
            .or_else(|_| env::var("USERPROFILE"))
            .map_err(|_| Error::invalid_config("Could not determine home directory"))?;

        Ok(Utf8PathBuf::from(home).join(".mentora"))
    }

    /// Load runtime configuration with hierarchical precedence
    pub fn load_runtime_config(&self) -> Result<RuntimeConfig> {
        let mut config = Self::load_embedded_config::<RuntimeConfig>("runtime-defaults.yaml")?;

        let runtime_config_path = self.runtime_config_path();
        if runtime_config_path.exists() {
            tracing::debug!(path = %runtime_config_path, "loading runtime config file");
            let file_config = self.load_yaml_file::<RuntimeConfig>(&runtime_config_path)?;
            config = Self::merge_runtime_config(config, file_config);
        }

        config = self.apply_env_overrides(config)?;
        config.validate()?;

        Ok(config)
    }

    /// Path of the runtime config file this loader reads
    pub fn runtime_config_path(&self) -> Utf8PathBuf {
        self.config_dir.join(RUNTIME_CONFIG_FILE)
    }

    fn load_embedded_config<T: DeserializeOwned>(filename: &str) -> Result<T> {
        let embedded_file = EmbeddedConfigs::get(filename).ok_or_else(|| {
            Error::config_not_found(format!("Embedded config not found: {}", filename))
        })?;

        let content = std::str::from_utf8(&embedded_file.data).map_err(|_| {
            Error::invalid_config(format!("Invalid UTF-8 in embedded config: {}", filename))
        })?;

        serde_yaml_ng::from_str(content).map_err(|e| {
            Error::invalid_config(format!(
                "Failed to parse embedded config {}: {}",
                filename, e
            ))
        })
    }

    fn load_yaml_file<T: DeserializeOwned>(&self, path: &Utf8Path) -> Result<T> {
        let content = fs::read_to_string(path)?;
        serde_yaml_ng::from_str(&content)
            .map_err(|e| Error::invalid_config(format!("Failed to parse {}: {}", path, e)))
    }

    /// Merge two runtime configs (base is overridden by overlay)
    fn merge_runtime_config(base: RuntimeConfig, overlay: RuntimeConfig) -> RuntimeConfig {
        RuntimeConfig {
            database: overlay.database,
            media: overlay.media,
            retry_policies: Self::merge_retry_policies(base.retry_policies, overlay.retry_policies),
        }
    }

    fn merge_retry_policies(
        mut base: RetryPoliciesConfig,
        overlay: RetryPoliciesConfig,
    ) -> RetryPoliciesConfig {
        for (key, policy) in overlay.operations {
            base.operations.insert(key, policy);
        }
        base.default = overlay.default;
        base
    }

    /// Apply environment variable overrides to runtime config
    fn apply_env_overrides(&self, mut config: RuntimeConfig) -> Result<RuntimeConfig> {
        // Database
        if let Some(val) = first_env(&["MENTORA_DATABASE_URL", "DATABASE_URL"]) {
            config.database.url = Some(val);
        }

        if let Ok(val) = env::var("MENTORA_DB_CONNECT_TIMEOUT_SECS") {
            config.database.connect_timeout_secs =
                parse_env("MENTORA_DB_CONNECT_TIMEOUT_SECS", &val)?;
        }

        // Media storage credentials
        if let Ok(val) = env::var("CLOUDINARY_CLOUD_NAME") {
            config.media.cloud_name = Some(val);
        }

        if let Ok(val) = env::var("CLOUDINARY_API_KEY") {
            config.media.api_key = Some(val);
        }

        if let Ok(val) = env::var("CLOUDINARY_API_SECRET") {
            config.media.api_secret = Some(val);
        }

        if let Ok(val) = env::var("MENTORA_MEDIA_API_BASE_URL") {
            config.media.api_base_url = val;
        }

        if let Ok(val) = env::var("MENTORA_UPLOAD_TIMEOUT_SECS") {
            config.media.upload_timeout_secs = parse_env("MENTORA_UPLOAD_TIMEOUT_SECS", &val)?;
        }

        // Retry defaults
        if let Ok(val) = env::var("MENTORA_RETRY_MAX_ATTEMPTS") {
            config.retry_policies.default.max_attempts =
                parse_env("MENTORA_RETRY_MAX_ATTEMPTS", &val)?;
        }

        Ok(config)
    }

    /// Get the config directory path
    pub fn config_dir(&self) -> &Utf8Path {
        &self.config_dir
    }
}

fn first_env(names: &[&str]) -> Option<String> {
    names.iter().find_map(|name| env::var(name).ok())
}

fn parse_env<T: FromStr>(name: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::invalid_config(format!("{} must be a valid number", name)))
}
