//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and a stable exit code.

use miette::Diagnostic;
use thiserror::Error;

use wadas_config::ConfigError;
use wadas_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to WADAS server at {url}")]
    #[diagnostic(
        code(wadas::connection_failed),
        help(
            "Check that the web server is running and reachable.\n\
             Reason: {reason}\n\
             Self-signed certificate? Try --insecure (-k) or set ca_cert in your profile."
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Request timed out")]
    #[diagnostic(
        code(wadas::timeout),
        help("Increase the timeout with --timeout or check server responsiveness.")
    )]
    Timeout,

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(wadas::auth_failed),
        help(
            "Verify the username and password for profile '{profile}'.\n\
             Run: wadas config set-password --profile {profile}"
        )
    )]
    AuthFailed { profile: String, message: String },

    #[error("Session expired and could not be renewed")]
    #[diagnostic(
        code(wadas::session_expired),
        help("Log in again by re-running the command.")
    )]
    SessionExpired,

    #[error("No credentials configured for profile '{profile}'")]
    #[diagnostic(
        code(wadas::no_credentials),
        help(
            "Configure credentials with: wadas config init\n\
             Or set WADAS_USERNAME and WADAS_PASSWORD."
        )
    )]
    NoCredentials { profile: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{message}")]
    #[diagnostic(
        code(wadas::not_found),
        help("Run: wadas {list_command} to see what exists")
    )]
    NotFound {
        message: String,
        list_command: String,
    },

    // ── Server-side failures surfaced by a view ──────────────────────
    #[error("{message}")]
    #[diagnostic(code(wadas::request_failed))]
    RequestFailed { message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(wadas::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(wadas::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: wadas config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("Configuration file not found")]
    #[diagnostic(
        code(wadas::no_config),
        help(
            "Create one with: wadas config init\n\
             Or pass --server and --username.\n\
             Expected at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(wadas::config))]
    Config(ConfigError),

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Cannot render output: {0}")]
    Render(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } | Self::SessionExpired | Self::NoCredentials { .. } => {
                exit_code::AUTH
            }
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Timeout => exit_code::TIMEOUT,
            Self::Validation { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NoCredentials { profile } => CliError::NoCredentials { profile },
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            other => CliError::Config(other),
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Unauthorized => CliError::SessionExpired,
            CoreError::AuthenticationFailed { message } => CliError::AuthFailed {
                profile: "current".into(),
                message,
            },
            CoreError::ConnectionFailed { url, reason } => CliError::ConnectionFailed { url, reason },
            CoreError::Timeout => CliError::Timeout,
            CoreError::NotFound { message } => CliError::NotFound {
                message,
                list_command: "actuators list".into(),
            },
            CoreError::ValidationFailed { message } => CliError::Validation {
                field: "request".into(),
                reason: message,
            },
            CoreError::Io { path, source } => CliError::Io(std::io::Error::new(
                source.kind(),
                format!("{}: {source}", path.display()),
            )),
            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },
            other @ (CoreError::Api { .. } | CoreError::Internal(_)) => CliError::RequestFailed {
                message: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_loss_exits_with_auth_code() {
        let err = CliError::from(CoreError::Unauthorized);
        assert!(matches!(err, CliError::SessionExpired));
        assert_eq!(err.exit_code(), exit_code::AUTH);
    }

    #[test]
    fn missing_record_exits_with_not_found_code() {
        let err = CliError::from(CoreError::NotFound {
            message: "Actuator does not exist".into(),
        });
        assert_eq!(err.exit_code(), exit_code::NOT_FOUND);
        assert_eq!(err.to_string(), "Actuator does not exist");
    }

    #[test]
    fn api_failures_keep_core_wording() {
        let err = CliError::from(CoreError::Api {
            message: "boom".into(),
            status: Some(500),
        });
        assert_eq!(err.to_string(), "API error: boom");
        assert_eq!(err.exit_code(), exit_code::GENERAL);
    }
}
