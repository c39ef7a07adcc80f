// WADAS web server HTTP client
//
// Wraps `reqwest::Client` with URL construction under `/api/v1/`,
// bearer-token injection from the shared credential store, and status
// mapping. Endpoint groups (auth, devices, events, system) are
// implemented as inherent methods in sibling modules.

use bytes::Bytes;
use reqwest::StatusCode;
use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::auth::CredentialStore;
use crate::error::Error;
use crate::transport::TransportConfig;

const API_PREFIX: &str = "api/v1/";

/// FastAPI-style error body: `{"detail": "..."}`; some handlers use
/// `{"message": "..."}` instead.
#[derive(serde::Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    detail: Option<serde_json::Value>,
    #[serde(default)]
    message: Option<String>,
}

/// Raw HTTP client for the WADAS web server.
///
/// Reads the access token from the [`CredentialStore`] at send time, so
/// a retried request automatically carries a token rotated in between.
/// Holds no retry logic of its own.
pub struct WadasClient {
    http: reqwest::Client,
    base_url: Url,
    credentials: CredentialStore,
}

impl WadasClient {
    /// Create a client from a `TransportConfig`.
    ///
    /// `base_url` is the web server root (e.g. `https://wadas.local:8443`).
    pub fn new(
        base_url: Url,
        transport: &TransportConfig,
        credentials: CredentialStore,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self::with_client(http, base_url, credentials))
    }

    /// Create a client around a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url, credentials: CredentialStore) -> Self {
        Self {
            http,
            base_url: normalize_base_url(base_url),
            credentials,
        }
    }

    /// The web server base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The credential store this client authenticates from.
    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Join a relative path (e.g. `"actuators/3"`) onto `{base}/api/v1/`.
    pub(crate) fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(API_PREFIX)?.join(path)?)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Attach the current access token, or fail without touching the
    /// network when nobody is logged in.
    fn authorize(&self, builder: reqwest::RequestBuilder) -> Result<reqwest::RequestBuilder, Error> {
        let token = self.credentials.access_token().ok_or(Error::NotAuthenticated)?;
        Ok(builder.bearer_auth(token.expose_secret()))
    }

    /// Authenticated GET, JSON response.
    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("GET {url} params={params:?}");

        let resp = self.authorize(self.http.get(url).query(params))?.send().await?;
        handle_response(resp).await
    }

    /// Authenticated GET, raw body (file exports).
    pub(crate) async fn get_bytes(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<Bytes, Error> {
        let url = self.url(path)?;
        debug!("GET {url} params={params:?} (binary)");

        let resp = self.authorize(self.http.get(url).query(params))?.send().await?;
        let status = resp.status();
        if status.is_success() {
            let body = resp.bytes().await?;
            trace!(bytes = body.len(), "export body received");
            Ok(body)
        } else {
            Err(parse_error(status, resp).await)
        }
    }

    /// Authenticated POST with a JSON body; the response body is ignored.
    pub(crate) async fn post_ack<B: Serialize + Sync>(&self, path: &str, body: &B) -> Result<(), Error> {
        let url = self.url(path)?;
        debug!("POST {url}");

        let resp = self.authorize(self.http.post(url).json(body))?.send().await?;
        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(parse_error(status, resp).await)
        }
    }
}

/// Guarantee a trailing slash so relative joins append instead of
/// replacing the last path segment.
fn normalize_base_url(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

// ── Response handling ────────────────────────────────────────────────

pub(crate) async fn handle_response<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
    let status = resp.status();
    if status.is_success() {
        let body = resp.text().await?;
        decode_body(body)
    } else {
        Err(parse_error(status, resp).await)
    }
}

pub(crate) fn decode_body<T: DeserializeOwned>(body: String) -> Result<T, Error> {
    serde_json::from_str(&body).map_err(|e| {
        let preview: String = body.chars().take(200).collect();
        Error::Deserialization {
            message: format!("{e} (body preview: {preview:?})"),
            body,
        }
    })
}

/// Map a non-success response on an authenticated request.
///
/// 401 means the access token was rejected; everything else is a plain
/// API error carrying the server's message.
pub(crate) async fn parse_error(status: StatusCode, resp: reqwest::Response) -> Error {
    if status == StatusCode::UNAUTHORIZED {
        return Error::TokenExpired;
    }
    Error::Api {
        status: status.as_u16(),
        message: error_message(status, resp).await,
    }
}

pub(crate) async fn error_message(status: StatusCode, resp: reqwest::Response) -> String {
    let raw = resp.text().await.unwrap_or_default();

    let parsed = serde_json::from_str::<ErrorResponse>(&raw)
        .ok()
        .and_then(|e| match e.detail {
            Some(serde_json::Value::String(s)) => Some(s),
            Some(other) => Some(other.to_string()),
            None => e.message,
        });

    match parsed {
        Some(message) => message,
        None if raw.is_empty() => status.to_string(),
        None => raw,
    }
}
