use thiserror::Error;

/// Top-level error type for the `wadas-api` crate.
///
/// Covers every failure mode of the WADAS REST surface: authentication,
/// token lifecycle, transport, and payload decoding. `wadas-core` maps
/// these into user-facing errors and decides which ones trigger a
/// token refresh.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Login rejected (wrong credentials, disabled account, etc.)
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// The server rejected the access token on an authenticated request.
    #[error("Access token expired or invalid")]
    TokenExpired,

    /// The refresh endpoint refused to issue a new access token.
    #[error("Token refresh rejected: {message}")]
    RefreshRejected { message: String },

    /// An authenticated request was attempted with an empty credential store.
    #[error("Not authenticated -- login required")]
    NotAuthenticated,

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS setup or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Server ──────────────────────────────────────────────────────
    /// Non-success response from the web server.
    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if the access token was rejected and a refresh
    /// might resolve it.
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, Self::TokenExpired)
    }

    /// Returns `true` if this is a transient network condition.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            Self::Api { status: 404, .. } => true,
            _ => false,
        }
    }

    /// HTTP status code, if the error carries one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::TokenExpired => Some(401),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_token_expired_is_auth_expired() {
        assert!(Error::TokenExpired.is_auth_expired());
        assert!(!Error::NotAuthenticated.is_auth_expired());
        assert!(
            !Error::RefreshRejected {
                message: "expired".into()
            }
            .is_auth_expired()
        );
        assert!(
            !Error::Api {
                status: 500,
                message: "boom".into()
            }
            .is_auth_expired()
        );
    }

    #[test]
    fn server_errors_are_transient() {
        let err = Error::Api {
            status: 503,
            message: "unavailable".into(),
        };
        assert!(err.is_transient());
        assert!(!err.is_not_found());

        let err = Error::Api {
            status: 404,
            message: "Actuator does not exist".into(),
        };
        assert!(err.is_not_found());
        assert!(!err.is_transient());
    }
}
