//! Common utilities shared by the runner and the CLI

pub mod config;
pub mod error;
pub mod logging;
pub mod paths;

pub use error::{Error, Result};

/// Render argument tokens as a single shell-like line for messages
///
/// Tokens containing whitespace are single-quoted so the rendered line
/// reads unambiguously in failure reports.
pub fn render_command(tokens: &[String]) -> String {
    tokens
        .iter()
        .map(|t| {
            if t.is_empty() || t.chars().any(char::is_whitespace) {
                format!("'{t}'")
            } else {
                t.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
