// ── Runtime console configuration ──
//
// Describes *where* the WADAS web server lives and how the console
// paces its requests. Never touches disk: the CLI (via wadas-config)
// builds a `ConsoleConfig` and hands it in.

use std::path::PathBuf;
use std::time::Duration;

use url::Url;
use wadas_api::{TlsMode, TransportConfig};

/// Rows per page in the event lists.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Cadence of the log tail.
pub const DEFAULT_LOG_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(PathBuf),
    /// Skip verification (self-signed certs on field installations).
    DangerAcceptInvalid,
}

/// Configuration for talking to a single WADAS web server.
#[derive(Debug, Clone)]
pub struct ConsoleConfig {
    /// Web server root (e.g., `https://wadas.local:8443`).
    pub url: Url,
    pub tls: TlsVerification,
    /// Per-request timeout.
    pub timeout: Duration,
    pub page_size: u32,
    pub log_poll_interval: Duration,
}

impl ConsoleConfig {
    /// Configuration for `url` with default tuning.
    pub fn new(url: Url) -> Self {
        Self {
            url,
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
            page_size: DEFAULT_PAGE_SIZE,
            log_poll_interval: DEFAULT_LOG_POLL_INTERVAL,
        }
    }

    pub(crate) fn transport(&self) -> TransportConfig {
        let tls = match &self.tls {
            TlsVerification::SystemDefaults => TlsMode::System,
            TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
            TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
        };
        TransportConfig {
            tls,
            timeout: self.timeout,
        }
    }
}
