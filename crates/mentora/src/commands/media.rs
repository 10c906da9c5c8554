//! Media command

use anyhow::{Context, Result};
use camino::Utf8Path;
use mentora_media::{UploadOptions, UploadService};

use super::load_config;
use crate::cli::{MediaCommands, MediaDeleteArgs, MediaUploadArgs};
use crate::output;

pub async fn run(cmd: MediaCommands, config_dir: Option<&Utf8Path>) -> Result<()> {
    match cmd {
        MediaCommands::Upload(args) => upload(args, config_dir).await,
        MediaCommands::Delete(args) => delete(args, config_dir).await,
    }
}

async fn upload(args: MediaUploadArgs, config_dir: Option<&Utf8Path>) -> Result<()> {
    let config = load_config(config_dir)?;
    let service = UploadService::from_config(&config);

    let bytes = tokio::fs::read(&args.file)
        .await
        .with_context(|| format!("Failed to read {}", args.file))?;

    let options = UploadOptions {
        filename: args.file.file_name().map(str::to_string),
        folder: args.folder,
        content_type: args
            .content_type
            .or_else(|| guess_content_type(&args.file).map(str::to_string)),
    };

    let spinner = output::spinner(&format!("Uploading {}...", args.file));
    let result = service.upload(bytes, options).await;
    spinner.finish_and_clear();

    let asset = result.with_context(|| format!("Failed to upload {}", args.file))?;
    output::success(&format!("Uploaded {} ({} bytes)", asset.public_id, asset.bytes));
    println!("{}", asset.url);
    Ok(())
}

async fn delete(args: MediaDeleteArgs, config_dir: Option<&Utf8Path>) -> Result<()> {
    let config = load_config(config_dir)?;
    let service = UploadService::from_config(&config);

    service
        .delete(&args.url)
        .await
        .with_context(|| format!("Failed to delete {}", args.url))?;
    output::success("Deleted");
    Ok(())
}

fn guess_content_type(path: &Utf8Path) -> Option<&'static str> {
    let ext = path.extension()?.to_ascii_lowercase();
    Some(match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "pdf" => "application/pdf",
        "mp4" => "video/mp4",
        _ => return None,
    })
}
