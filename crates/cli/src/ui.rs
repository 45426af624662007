//! Terminal UI helpers for consistent colored output.

use std::future::Future;

use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;

/// Print a success message with green checkmark.
pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Print an error message with red X.
fn error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// Print a hint/suggestion (dimmed, indented).
pub fn hint(msg: &str) {
    eprintln!("  {} {}", "→".dimmed(), msg.dimmed());
}

/// Format a value as bold (for IDs, group names, etc.).
pub fn bold(s: &str) -> String {
    s.bold().to_string()
}

/// Run an async operation with a spinner showing the given message.
pub async fn spin<T, F: Future<Output = T>>(msg: &str, fut: F) -> T {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.dim} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(msg.to_string());
    spinner.enable_steady_tick(std::time::Duration::from_millis(80));

    let result = fut.await;

    spinner.finish_and_clear();
    result
}

/// Returns a hint for a known error message, if any.
fn hint_for(msg: &str) -> Option<&'static str> {
    if msg.contains("Article not found") {
        Some("Check the id with: linkrank list")
    } else if msg.contains("Voting is closed") {
        Some("Votes are only accepted until the second the article was posted has passed.")
    } else if msg.contains("Already voted") {
        Some("Each user can vote on an article once.")
    } else if msg.contains("page") {
        Some("Pages start at 1.")
    } else if msg.contains("connect")
        || msg.contains("Connection")
        || msg.contains("dns")
        || msg.contains("timeout")
        || msg.contains("error sending request")
    {
        Some("Is the server running? Set LINKRANK_API_URL to point at it.")
    } else {
        None
    }
}

/// Display an error with contextual hints based on the error message.
pub fn print_error(err: &anyhow::Error) {
    let msg = err.to_string();
    error(&msg);

    if let Some(h) = hint_for(&msg) {
        hint(h);
    }
}
