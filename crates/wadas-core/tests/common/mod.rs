// Shared fakes for the wadas-core integration tests.
#![allow(dead_code, clippy::unwrap_used)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use futures_util::future::BoxFuture;
use secrecy::SecretString;
use wadas_api::{CredentialStore, Credentials, Role, TokenPair};
use wadas_core::{AuthBackend, Session};

/// Auth fake: logs anyone in; refresh either rotates or is rejected.
pub struct StubBackend {
    pub refreshes: AtomicUsize,
    pub accept_refresh: bool,
}

impl StubBackend {
    pub fn new(accept_refresh: bool) -> Arc<Self> {
        Arc::new(Self {
            refreshes: AtomicUsize::new(0),
            accept_refresh,
        })
    }

    pub fn refresh_count(&self) -> usize {
        self.refreshes.load(Ordering::SeqCst)
    }
}

impl AuthBackend for StubBackend {
    fn login<'a>(
        &'a self,
        _username: &'a str,
        _password: &'a SecretString,
    ) -> BoxFuture<'a, Result<Credentials, wadas_api::Error>> {
        Box::pin(async {
            Ok(Credentials {
                access_token: "access-0".to_owned().into(),
                refresh_token: "refresh-0".to_owned().into(),
                role: Role::new("Admin"),
            })
        })
    }

    fn refresh<'a>(
        &'a self,
        _refresh_token: &'a SecretString,
    ) -> BoxFuture<'a, Result<TokenPair, wadas_api::Error>> {
        Box::pin(async move {
            let n = self.refreshes.fetch_add(1, Ordering::SeqCst) + 1;
            if self.accept_refresh {
                Ok(TokenPair {
                    access_token: format!("access-{n}").into(),
                    refresh_token: None,
                })
            } else {
                Err(wadas_api::Error::RefreshRejected {
                    message: "HTTP 401: refresh token expired".into(),
                })
            }
        })
    }
}

/// A logged-in session over `backend`.
pub async fn session(backend: Arc<StubBackend>) -> Session {
    let session = Session::new(CredentialStore::new(), backend);
    session
        .login("admin", &SecretString::from("pw".to_owned()))
        .await
        .unwrap();
    session
}
