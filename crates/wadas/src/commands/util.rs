//! Shared helpers for command handlers.

use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use indicatif::{ProgressBar, ProgressStyle};

use wadas_core::{Console, CoreError, FileSink};

use crate::config::Connection;
use crate::error::CliError;

/// Open a console for the resolved connection and log in.
pub async fn connect(connection: Connection) -> Result<Console, CliError> {
    let Connection {
        profile_name,
        config,
        username,
        password,
    } = connection;

    let console = Console::new(config)?;
    let role = console
        .login(&username, &password)
        .await
        .map_err(|e| match e {
            CoreError::AuthenticationFailed { message } => CliError::AuthFailed {
                profile: profile_name.clone(),
                message,
            },
            other => other.into(),
        })?;
    tracing::info!(profile = %profile_name, role = %role, "logged in");
    Ok(console)
}

/// Turn a view's settled state into a command result.
///
/// Views keep failures as an inline message and drop the session on
/// auth loss; both become a CLI error here.
pub fn settle(console: &Console, error: Option<String>) -> Result<(), CliError> {
    if !console.is_authenticated() {
        return Err(CliError::SessionExpired);
    }
    match error {
        Some(message) => Err(CliError::RequestFailed { message }),
        None => Ok(()),
    }
}

/// Parse `--since` / `--until`: RFC 3339, or a bare date at midnight UTC.
pub fn parse_instant(field: &str, raw: Option<&str>) -> Result<Option<DateTime<Utc>>, CliError> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Ok(Some(at.with_timezone(&Utc)));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| Some(dt.and_utc()))
        .ok_or_else(|| CliError::Validation {
            field: field.into(),
            reason: format!("expected RFC 3339 or YYYY-MM-DD, got '{raw}'"),
        })
}

/// Pick the export target: an existing directory keeps the server's file
/// name, anything else is taken as the file path.
pub fn export_sink(dest: Option<&Path>) -> FileSink {
    match dest {
        None => FileSink::directory("."),
        Some(path) if path.is_dir() => FileSink::directory(path),
        Some(path) => FileSink::file(path),
    }
}

/// Spinner on stderr, hidden in quiet mode.
pub fn spinner(message: &'static str, quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        bar.set_style(style);
    }
    bar.set_message(message);
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}
