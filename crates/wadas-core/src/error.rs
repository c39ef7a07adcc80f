// ── Core error types ──
//
// User-facing errors from wadas-core. Views never see raw HTTP status
// mapping; the `From<wadas_api::Error>` impl folds transport-layer
// failures into the variants a console can act on. `Unauthorized` is
// terminal for the session and always ends in a redirect to login.

use std::path::PathBuf;

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Session errors ───────────────────────────────────────────────
    /// The session is gone: refresh failed, the retried call was still
    /// rejected, or nobody was logged in.
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to WADAS server at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("WADAS server timed out")]
    Timeout,

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Delivery errors ──────────────────────────────────────────────
    #[error("Cannot write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Returns `true` for the terminal session failure that must end in
    /// a redirect to login instead of an inline message.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }

    /// Inline message a view shows for a failed load.
    pub fn user_message(&self) -> String {
        format!("Generic Error - {self}. Please contact the administrator.")
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<wadas_api::Error> for CoreError {
    fn from(err: wadas_api::Error) -> Self {
        match err {
            wadas_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            wadas_api::Error::TokenExpired
            | wadas_api::Error::RefreshRejected { .. }
            | wadas_api::Error::NotAuthenticated => CoreError::Unauthorized,
            wadas_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            wadas_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            wadas_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            wadas_api::Error::Api {
                status: 404,
                message,
            } => CoreError::NotFound { message },
            wadas_api::Error::Api { status, message } => CoreError::Api {
                message,
                status: Some(status),
            },
            wadas_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_failures_collapse_to_unauthorized() {
        for err in [
            wadas_api::Error::TokenExpired,
            wadas_api::Error::NotAuthenticated,
            wadas_api::Error::RefreshRejected {
                message: "expired".into(),
            },
        ] {
            assert!(CoreError::from(err).is_unauthorized());
        }
    }

    #[test]
    fn login_rejection_is_not_a_session_loss() {
        let err = CoreError::from(wadas_api::Error::Authentication {
            message: "bad password".into(),
        });
        assert!(!err.is_unauthorized());
        assert_eq!(err.to_string(), "Authentication failed: bad password");
    }

    #[test]
    fn server_message_is_preserved() {
        let err = CoreError::from(wadas_api::Error::Api {
            status: 500,
            message: "database unavailable".into(),
        });
        assert_eq!(err.to_string(), "API error: database unavailable");

        let err = CoreError::from(wadas_api::Error::Api {
            status: 404,
            message: "Actuator does not exist".into(),
        });
        assert!(matches!(err, CoreError::NotFound { .. }));
    }
}
