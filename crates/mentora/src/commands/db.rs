//! Database command

use anyhow::{bail, Context, Result};
use camino::Utf8Path;
use mentora_db::{ConnectionSupervisor, StartupOutcome, TcpCheckClient};

use super::load_config;
use crate::cli::{DbCheckArgs, DbCommands};
use crate::output;

pub async fn run(cmd: DbCommands, config_dir: Option<&Utf8Path>) -> Result<()> {
    match cmd {
        DbCommands::Check(args) => check(args, config_dir).await,
    }
}

async fn check(args: DbCheckArgs, config_dir: Option<&Utf8Path>) -> Result<()> {
    let mut config = load_config(config_dir)?;
    if let Some(url) = args.url {
        config.database.url = Some(url);
    }

    let client = TcpCheckClient::from_config(&config.database)
        .context("Cannot check the database")?;
    output::info(&format!("Checking {}:{}", client.host(), client.port()));

    let supervisor = ConnectionSupervisor::from_config(client, &config);
    match supervisor.connect_on_startup().await {
        StartupOutcome::Connected { attempts } => {
            output::success(&format!("Connected (attempt {})", attempts));
        }
        StartupOutcome::Deferred {
            attempts,
            last_error,
        } => bail!(
            "Database unreachable after {} attempts: {}",
            attempts,
            last_error
        ),
    }

    supervisor
        .health_check()
        .await
        .context("Health check failed")?;
    output::success("Health check passed");

    supervisor.shutdown().await.context("Failed to disconnect")?;
    Ok(())
}
