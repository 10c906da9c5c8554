//! Status lines for commands
//!
//! Everything here goes to stderr. Stdout is reserved for command results
//! (an uploaded URL, the rendered config) so they can be piped.

use std::time::Duration;

use console::{style, StyledObject};
use indicatif::{ProgressBar, ProgressStyle};

fn status_line(marker: StyledObject<&str>, msg: &str) -> String {
    format!("{} {}", marker, msg)
}

pub fn success(msg: &str) {
    eprintln!("{}", status_line(style("✓").green().bold(), msg));
}

pub fn info(msg: &str) {
    eprintln!("{}", status_line(style("ℹ").cyan(), msg));
}

pub fn warning(msg: &str) {
    eprintln!("{}", status_line(style("⚠").yellow().bold(), msg));
}

/// Indented detail under the preceding status line
pub fn kv(key: &str, value: &str) {
    eprintln!("  {}: {}", style(key).dim(), value);
}

/// Spinner for a network call in flight; clear it before printing results
pub fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(template) = ProgressStyle::with_template("{spinner:.cyan} {msg} ({elapsed})") {
        pb.set_style(template);
    }
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}
