//! Config command

use anyhow::{Context, Result};
use camino::Utf8Path;
use mentora_core::types::{policy_names, RetryPolicy};
use mentora_media::Credentials;

use super::{load_config, loader};
use crate::cli::{ConfigCommands, ConfigShowArgs};
use crate::output;

pub fn run(cmd: ConfigCommands, config_dir: Option<&Utf8Path>) -> Result<()> {
    match cmd {
        ConfigCommands::Show(args) => show(args, config_dir),
        ConfigCommands::Validate => validate(config_dir),
    }
}

fn show(args: ConfigShowArgs, config_dir: Option<&Utf8Path>) -> Result<()> {
    let config = load_config(config_dir)?.redacted();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&config)?);
    } else {
        print!(
            "{}",
            serde_yaml_ng::to_string(&config).context("Failed to render configuration")?
        );
    }
    Ok(())
}

fn validate(config_dir: Option<&Utf8Path>) -> Result<()> {
    let loader = loader(config_dir)?;
    let config = load_config(config_dir)?;
    let path = loader.runtime_config_path();

    output::success("Configuration is valid");
    if path.exists() {
        output::kv("Config file", path.as_str());
    } else {
        output::kv("Config file", &format!("{} (not present, using defaults)", path));
    }

    for name in [
        policy_names::DB_STARTUP,
        policy_names::DB_QUERY,
        policy_names::MEDIA_UPLOAD,
    ] {
        output::kv(name, &describe(&config.retry_policies.policy_for(name)));
    }

    if config.database.url.is_none() {
        output::warning("No database URL configured (DATABASE_URL)");
    }
    match Credentials::from_config(&config.media) {
        Ok(_) => output::kv("Media uploads", "enabled"),
        Err(err) => output::warning(&format!("Media uploads disabled: {}", err)),
    }

    Ok(())
}

fn describe(policy: &RetryPolicy) -> String {
    format!(
        "{} attempts, {}, {}ms base delay",
        policy.max_attempts, policy.strategy, policy.initial_delay_ms
    )
}
