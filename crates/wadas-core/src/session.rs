// ── Session: resilient calls over an expiring access token ──
//
// Every resource fetch runs through `Session::call`. An expired access
// token triggers exactly one refresh and one retry; concurrent expiries
// share a single refresh. Anything the refresh cannot fix ends the
// session: the credential store is cleared and the caller gets
// `CoreError::Unauthorized`, which views turn into a redirect to login.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures_util::future::BoxFuture;
use secrecy::SecretString;
use tokio::sync::{Mutex, broadcast};
use tracing::{debug, info, warn};
use wadas_api::{CredentialStore, Credentials, Role, TokenPair, WadasClient};

use crate::error::CoreError;

const REDIRECT_CHANNEL_SIZE: usize = 16;

// ── Auth backend seam ────────────────────────────────────────────────

/// The two token endpoints the session drives.
///
/// Implemented by [`WadasClient`]; tests substitute counting fakes.
pub trait AuthBackend: Send + Sync {
    fn login<'a>(
        &'a self,
        username: &'a str,
        password: &'a SecretString,
    ) -> BoxFuture<'a, Result<Credentials, wadas_api::Error>>;

    fn refresh<'a>(
        &'a self,
        refresh_token: &'a SecretString,
    ) -> BoxFuture<'a, Result<TokenPair, wadas_api::Error>>;
}

impl AuthBackend for WadasClient {
    fn login<'a>(
        &'a self,
        username: &'a str,
        password: &'a SecretString,
    ) -> BoxFuture<'a, Result<Credentials, wadas_api::Error>> {
        Box::pin(WadasClient::login(self, username, password))
    }

    fn refresh<'a>(
        &'a self,
        refresh_token: &'a SecretString,
    ) -> BoxFuture<'a, Result<TokenPair, wadas_api::Error>> {
        Box::pin(WadasClient::refresh(self, refresh_token))
    }
}

// ── Redirect signal ──────────────────────────────────────────────────

/// Navigation requests a presentation layer must honour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Redirect {
    Login,
}

// ── Session ──────────────────────────────────────────────────────────

/// Shared handle over the credential store and the refresh protocol.
///
/// Cheaply cloneable via `Arc<SessionInner>`.
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    credentials: CredentialStore,
    backend: Arc<dyn AuthBackend>,
    /// Serializes refreshes; holders re-check the store generation.
    refresh_lock: Mutex<()>,
    redirect_tx: broadcast::Sender<Redirect>,
    /// Set once a redirect went out for the current session.
    redirected: AtomicBool,
}

impl Session {
    pub fn new(credentials: CredentialStore, backend: Arc<dyn AuthBackend>) -> Self {
        let (redirect_tx, _) = broadcast::channel(REDIRECT_CHANNEL_SIZE);
        Self {
            inner: Arc::new(SessionInner {
                credentials,
                backend,
                refresh_lock: Mutex::new(()),
                redirect_tx,
                redirected: AtomicBool::new(false),
            }),
        }
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.inner.credentials
    }

    // ── Login / logout ───────────────────────────────────────────────

    /// Exchange username/password for a session and install it.
    pub async fn login(&self, username: &str, password: &SecretString) -> Result<Role, CoreError> {
        let credentials = self.inner.backend.login(username, password).await?;
        let role = credentials.role.clone();
        self.inner.credentials.set(credentials);
        self.inner.redirected.store(false, Ordering::SeqCst);
        info!(%role, "logged in");
        Ok(role)
    }

    /// Forget the session. In-flight refreshes will not resurrect it.
    pub fn logout(&self) {
        self.inner.credentials.clear();
        info!("logged out");
    }

    pub fn role(&self) -> Option<Role> {
        self.inner.credentials.role()
    }

    // ── Redirects ────────────────────────────────────────────────────

    /// Ask the presentation layer to navigate to the login entry point.
    ///
    /// Emitted at most once per lost session; the next login re-arms it.
    pub fn redirect_to_login(&self) {
        if self.inner.redirected.swap(true, Ordering::SeqCst) {
            debug!("redirect already sent for this session");
            return;
        }
        warn!("session ended, redirecting to login");
        // No subscribers just means nobody is rendering.
        let _ = self.inner.redirect_tx.send(Redirect::Login);
    }

    pub fn subscribe_redirects(&self) -> broadcast::Receiver<Redirect> {
        self.inner.redirect_tx.subscribe()
    }

    // ── Resilient call ───────────────────────────────────────────────

    /// Run `operation`, refreshing the access token and retrying once if
    /// the server reports it expired.
    ///
    /// `operation` must read the access token when invoked (as
    /// [`WadasClient`] does) so the retry carries the rotated token.
    pub async fn call<T, F, Fut>(&self, mut operation: F) -> Result<T, CoreError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, wadas_api::Error>>,
    {
        let observed = self.inner.credentials.generation();

        match operation().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_auth_expired() => {
                debug!("access token rejected, refreshing");
            }
            Err(e) => return Err(e.into()),
        }

        self.refresh_after(observed).await?;

        match operation().await {
            Ok(value) => Ok(value),
            Err(e) if e.is_auth_expired() => {
                warn!("request rejected again after token refresh");
                self.inner.credentials.clear();
                Err(CoreError::Unauthorized)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Make sure the store holds a token newer than the one seen at
    /// generation `observed`, refreshing at most once across all callers.
    async fn refresh_after(&self, observed: u64) -> Result<(), CoreError> {
        let _guard = self.inner.refresh_lock.lock().await;
        let store = &self.inner.credentials;

        if store.generation() != observed {
            // Rotated (or cleared) by someone else while we waited.
            return if store.is_authenticated() {
                debug!("token already refreshed by a concurrent call");
                Ok(())
            } else {
                Err(CoreError::Unauthorized)
            };
        }

        let Some(refresh_token) = store.refresh_token() else {
            return Err(CoreError::Unauthorized);
        };

        match self.inner.backend.refresh(&refresh_token).await {
            Ok(tokens) => {
                if store.rotate(tokens) {
                    info!("access token refreshed");
                    Ok(())
                } else {
                    debug!("session cleared during refresh");
                    Err(CoreError::Unauthorized)
                }
            }
            Err(e) => {
                warn!(error = %e, "token refresh failed");
                store.clear();
                Err(CoreError::Unauthorized)
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use secrecy::ExposeSecret;

    use super::*;

    /// Refresh fake: hands out `access-N` and counts invocations.
    struct FakeBackend {
        refreshes: AtomicUsize,
        reject: bool,
        rotate_refresh_token: bool,
    }

    impl FakeBackend {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                refreshes: AtomicUsize::new(0),
                reject: false,
                rotate_refresh_token: false,
            })
        }

        fn rejecting() -> Arc<Self> {
            Arc::new(Self {
                refreshes: AtomicUsize::new(0),
                reject: true,
                rotate_refresh_token: false,
            })
        }

        fn count(&self) -> usize {
            self.refreshes.load(Ordering::SeqCst)
        }
    }

    impl AuthBackend for FakeBackend {
        fn login<'a>(
            &'a self,
            username: &'a str,
            _password: &'a SecretString,
        ) -> BoxFuture<'a, Result<Credentials, wadas_api::Error>> {
            Box::pin(async move {
                Ok(Credentials {
                    access_token: "access-0".to_owned().into(),
                    refresh_token: "refresh-0".to_owned().into(),
                    role: Role::new(if username == "admin" { "Admin" } else { "Viewer" }),
                })
            })
        }

        fn refresh<'a>(
            &'a self,
            _refresh_token: &'a SecretString,
        ) -> BoxFuture<'a, Result<TokenPair, wadas_api::Error>> {
            Box::pin(async move {
                let n = self.refreshes.fetch_add(1, Ordering::SeqCst) + 1;
                tokio::task::yield_now().await;
                if self.reject {
                    return Err(wadas_api::Error::RefreshRejected {
                        message: "HTTP 401: expired".into(),
                    });
                }
                Ok(TokenPair {
                    access_token: format!("access-{n}").into(),
                    refresh_token: self
                        .rotate_refresh_token
                        .then(|| SecretString::from(format!("refresh-{n}"))),
                })
            })
        }
    }

    async fn logged_in(backend: Arc<FakeBackend>) -> Session {
        let session = Session::new(CredentialStore::new(), backend);
        session
            .login("admin", &SecretString::from("pw".to_owned()))
            .await
            .unwrap();
        session
    }

    fn current_token(session: &Session) -> String {
        session
            .credentials()
            .access_token()
            .map(|t| t.expose_secret().to_owned())
            .unwrap_or_default()
    }

    /// Operation fake: only `accepted` is a valid access token.
    fn guarded(
        session: &Session,
        accepted: &'static str,
    ) -> impl Future<Output = Result<&'static str, wadas_api::Error>> + use<> {
        let token = current_token(session);
        async move {
            tokio::task::yield_now().await;
            if token == accepted {
                Ok("rows")
            } else {
                Err(wadas_api::Error::TokenExpired)
            }
        }
    }

    #[tokio::test]
    async fn success_passes_through_without_refresh() {
        let backend = FakeBackend::new();
        let session = logged_in(backend.clone()).await;

        let result = session.call(|| guarded(&session, "access-0")).await;

        assert_eq!(result.unwrap(), "rows");
        assert_eq!(backend.count(), 0);
    }

    #[tokio::test]
    async fn expired_token_is_refreshed_and_retried_once() {
        let backend = FakeBackend::new();
        let session = logged_in(backend.clone()).await;
        let mut attempts = 0;

        let result = session
            .call(|| {
                attempts += 1;
                guarded(&session, "access-1")
            })
            .await;

        assert_eq!(result.unwrap(), "rows");
        assert_eq!(attempts, 2);
        assert_eq!(backend.count(), 1);
        // refresh token was not rotated, so the original one stays
        let refresh = session.credentials().refresh_token().unwrap();
        assert_eq!(refresh.expose_secret(), "refresh-0");
    }

    #[tokio::test]
    async fn second_expiry_clears_the_session() {
        let backend = FakeBackend::new();
        let session = logged_in(backend.clone()).await;
        let mut attempts = 0;

        let result = session
            .call(|| {
                attempts += 1;
                guarded(&session, "never")
            })
            .await;

        assert!(result.unwrap_err().is_unauthorized());
        assert_eq!(attempts, 2);
        assert_eq!(backend.count(), 1);
        assert!(!session.credentials().is_authenticated());
    }

    #[tokio::test]
    async fn rejected_refresh_clears_the_session() {
        let backend = FakeBackend::rejecting();
        let session = logged_in(backend.clone()).await;
        let mut attempts = 0;

        let result = session
            .call(|| {
                attempts += 1;
                guarded(&session, "access-1")
            })
            .await;

        assert!(result.unwrap_err().is_unauthorized());
        assert_eq!(attempts, 1);
        assert!(!session.credentials().is_authenticated());
    }

    #[tokio::test]
    async fn other_errors_are_not_retried() {
        let backend = FakeBackend::new();
        let session = logged_in(backend.clone()).await;
        let mut attempts = 0;

        let result: Result<(), _> = session
            .call(|| {
                attempts += 1;
                async {
                    Err(wadas_api::Error::Api {
                        status: 500,
                        message: "boom".into(),
                    })
                }
            })
            .await;

        assert!(matches!(result, Err(CoreError::Api { .. })));
        assert_eq!(attempts, 1);
        assert_eq!(backend.count(), 0);
        assert!(session.credentials().is_authenticated());
    }

    #[tokio::test]
    async fn empty_store_is_unauthorized_without_refresh() {
        let backend = FakeBackend::new();
        let session = Session::new(CredentialStore::new(), backend.clone());

        let result: Result<(), _> = session
            .call(|| async { Err(wadas_api::Error::NotAuthenticated) })
            .await;

        assert!(result.unwrap_err().is_unauthorized());
        assert_eq!(backend.count(), 0);
    }

    #[tokio::test]
    async fn concurrent_expiries_share_one_refresh() {
        let backend = FakeBackend::new();
        let session = logged_in(backend.clone()).await;

        let calls = (0..8).map(|_| {
            let session = session.clone();
            async move { session.call(|| guarded(&session, "access-1")).await }
        });
        let results = futures_util::future::join_all(calls).await;

        assert!(results.iter().all(Result::is_ok));
        assert_eq!(backend.count(), 1);
        assert_eq!(current_token(&session), "access-1");
    }

    #[tokio::test]
    async fn logout_and_role() {
        let session = logged_in(FakeBackend::new()).await;
        assert_eq!(session.role(), Some(Role::new("Admin")));

        let mut redirects = session.subscribe_redirects();
        session.logout();
        session.redirect_to_login();

        assert!(session.role().is_none());
        assert_eq!(redirects.recv().await.unwrap(), Redirect::Login);
    }

    #[tokio::test]
    async fn one_redirect_per_lost_session() {
        let session = logged_in(FakeBackend::new()).await;
        let mut redirects = session.subscribe_redirects();

        session.redirect_to_login();
        session.redirect_to_login();
        assert_eq!(redirects.try_recv().unwrap(), Redirect::Login);
        assert!(redirects.try_recv().is_err());

        session
            .login("admin", &SecretString::from("pw".to_owned()))
            .await
            .unwrap();
        session.redirect_to_login();
        assert_eq!(redirects.try_recv().unwrap(), Redirect::Login);
    }
}
