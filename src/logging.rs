// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Tracing subscriber setup.
//!
//! Format: timestamp file:line LEVEL message
//! Example: 2025-11-29T23:45:00.123456Z main.rs:49 INFO Starting MongoDB primary labeler
//!
//! The level comes from the `DEBUG` setting unless `RUST_LOG` is set, in which
//! case `RUST_LOG` wins. `RUST_LOG_FORMAT=json` switches to JSON output.
//!
//! The subscriber is installed once, after configuration is known. Components
//! never touch it; they only emit events with structured fields.

use crate::constants::ENV_LOG_FORMAT;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Output format for log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Compact human-readable lines
    Text,
    /// One JSON object per line
    Json,
}

impl LogFormat {
    /// Parse a `RUST_LOG_FORMAT` value; anything but `json` means text.
    #[must_use]
    pub fn from_env_value(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Text,
        }
    }
}

/// Build the event filter: `RUST_LOG` directives if given, else `level`.
#[must_use]
pub fn build_filter(level: Level, rust_log: Option<&str>) -> EnvFilter {
    rust_log
        .filter(|directives| !directives.trim().is_empty())
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(level.as_str().to_ascii_lowercase()))
}

/// Install the global subscriber.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init(level: Level) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = build_filter(level, rust_log.as_deref());
    let format = LogFormat::from_env_value(std::env::var(ENV_LOG_FORMAT).ok().as_deref());

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(true)
        .with_line_number(true)
        .with_thread_names(true)
        .with_target(false);

    match format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Text => builder.with_ansi(true).compact().try_init(),
    }
}

#[cfg(test)]
#[path = "logging_tests.rs"]
mod logging_tests;
