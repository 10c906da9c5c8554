//! Mentora CLI - operations entry point for the Mentora backend
//!
//! Inspects runtime configuration, checks database reachability through the
//! connection supervisor, and uploads or deletes media.

mod cli;
mod commands;
mod output;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize rustls crypto provider (required for rustls 0.23+)
    // This must be done before any TLS operations
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.quiet);

    let config_dir = cli.config_dir.as_deref();
    match cli.command {
        Commands::Config(cmd) => commands::config::run(cmd, config_dir),
        Commands::Db(cmd) => commands::db::run(cmd, config_dir).await,
        Commands::Media(cmd) => commands::media::run(cmd, config_dir).await,
    }
}

/// Initialize tracing with appropriate verbosity
fn init_tracing(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            // Retry warnings are visible by default
            0 => EnvFilter::new("warn"),
            1 => EnvFilter::new("info"),
            2 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}
