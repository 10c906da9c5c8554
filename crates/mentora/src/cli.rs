//! CLI argument parsing with clap

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};

/// Mentora - operations tooling for the Mentora learning platform
#[derive(Parser, Debug)]
#[command(name = "mentora")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Directory holding runtime.yaml (defaults to ~/.mentora)
    #[arg(short, long, global = true)]
    pub config_dir: Option<Utf8PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Runtime configuration
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Database connectivity
    #[command(subcommand)]
    Db(DbCommands),

    /// Media storage
    #[command(subcommand)]
    Media(MediaCommands),
}

// Config commands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show the resolved configuration (secrets masked)
    Show(ConfigShowArgs),

    /// Load and validate the configuration
    Validate,
}

#[derive(Args, Debug)]
pub struct ConfigShowArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

// Database commands
#[derive(Subcommand, Debug)]
pub enum DbCommands {
    /// Run the startup connection routine and a health check
    Check(DbCheckArgs),
}

#[derive(Args, Debug)]
pub struct DbCheckArgs {
    /// Database URL (overrides configuration)
    #[arg(long)]
    pub url: Option<String>,
}

// Media commands
#[derive(Subcommand, Debug)]
pub enum MediaCommands {
    /// Upload a file and print its public URL
    Upload(MediaUploadArgs),

    /// Delete an uploaded file by its public URL
    Delete(MediaDeleteArgs),
}

#[derive(Args, Debug)]
pub struct MediaUploadArgs {
    /// File to upload
    pub file: Utf8PathBuf,

    /// Destination folder (defaults to media.default-folder)
    #[arg(long)]
    pub folder: Option<String>,

    /// MIME type (guessed from the extension when omitted)
    #[arg(long)]
    pub content_type: Option<String>,
}

#[derive(Args, Debug)]
pub struct MediaDeleteArgs {
    /// Public URL returned by `media upload`
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["mentora", "db", "check", "-vv", "--config-dir", "/tmp/m"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.config_dir.as_deref().map(|p| p.as_str()), Some("/tmp/m"));
        assert!(matches!(
            cli.command,
            Commands::Db(DbCommands::Check(DbCheckArgs { url: None }))
        ));
    }

    #[test]
    fn test_media_upload_args() {
        let cli = Cli::try_parse_from([
            "mentora", "media", "upload", "avatar.png", "--folder", "learners",
        ])
        .unwrap();
        match cli.command {
            Commands::Media(MediaCommands::Upload(args)) => {
                assert_eq!(args.file, "avatar.png");
                assert_eq!(args.folder.as_deref(), Some("learners"));
                assert!(args.content_type.is_none());
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_upload_requires_file() {
        assert!(Cli::try_parse_from(["mentora", "media", "upload"]).is_err());
    }
}
