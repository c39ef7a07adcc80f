// Token-based authentication against the web server.
//
// Login exchanges username/password for an access/refresh token pair
// plus the user's role. Refresh exchanges the refresh token for a new
// access token. Neither request carries a bearer token.

use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use crate::auth::{Credentials, Role, TokenPair};
use crate::error::Error;
use crate::v1::client::{WadasClient, decode_body, error_message};
use crate::v1::models::{LoginRequest, LoginResponse, RefreshResponse, RefreshTokenRequest};

impl WadasClient {
    /// Authenticate with username/password.
    ///
    /// Does not touch the credential store; callers decide whether the
    /// result becomes the active session.
    pub async fn login(&self, username: &str, password: &SecretString) -> Result<Credentials, Error> {
        let url = self.url("login")?;
        debug!("logging in at {url}");

        let body = LoginRequest {
            username,
            password: password.expose_secret(),
        };
        let resp = self.http().post(url).json(&body).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let message = error_message(status, resp).await;
            return Err(Error::Authentication {
                message: format!("login failed (HTTP {status}): {message}"),
            });
        }

        let login: LoginResponse = decode_body(resp.text().await?)?;
        debug!(role = %login.role, "login successful");
        Ok(Credentials {
            access_token: SecretString::from(login.access_token),
            refresh_token: SecretString::from(login.refresh_token),
            role: Role::new(login.role),
        })
    }

    /// Trade a refresh token for a new access token.
    ///
    /// Any non-success status is [`Error::RefreshRejected`]; the caller
    /// treats that as the end of the session.
    pub async fn refresh(&self, refresh_token: &SecretString) -> Result<TokenPair, Error> {
        let url = self.url("token/refresh")?;
        debug!("refreshing access token at {url}");

        let body = RefreshTokenRequest {
            refresh_token: refresh_token.expose_secret(),
        };
        let resp = self.http().post(url).json(&body).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let message = error_message(status, resp).await;
            return Err(Error::RefreshRejected {
                message: format!("HTTP {status}: {message}"),
            });
        }

        let refreshed: RefreshResponse = decode_body(resp.text().await?)?;
        Ok(TokenPair {
            access_token: SecretString::from(refreshed.access_token),
            refresh_token: refreshed.refresh_token.map(SecretString::from),
        })
    }
}
