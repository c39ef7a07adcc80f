// Session credentials and the shared credential store.
//
// The store is the only mutable state shared between concurrent
// requests. It is mutated by login, by the token refresh step, and by
// logout or an unrecoverable auth failure -- never by resource fetches.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use secrecy::SecretString;

/// Role label the server attached to the logged-in user.
///
/// Opaque on purpose: access gating by role belongs to whoever owns
/// routing, so no role string is interpreted here.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Role(String);

impl Role {
    pub fn new(role: impl Into<String>) -> Self {
        Self(role.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A freshly issued token pair from the refresh endpoint.
///
/// `refresh_token` is `None` when the server did not rotate it; the
/// store then keeps the refresh token it already has.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: SecretString,
    pub refresh_token: Option<SecretString>,
}

/// Everything a login hands back: both tokens plus the user's role.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub access_token: SecretString,
    pub refresh_token: SecretString,
    pub role: Role,
}

#[derive(Debug, Default)]
struct StoreState {
    credentials: Option<Credentials>,
    /// Bumped on every mutation so callers can tell whether the
    /// credentials changed since they last looked.
    generation: u64,
}

/// Process-wide holder of the current session credentials.
///
/// Cheaply cloneable; every clone shares the same state. Inject it into
/// the HTTP client (which reads the access token at send time) and into
/// the session that owns the refresh protocol.
#[derive(Debug, Clone, Default)]
pub struct CredentialStore {
    inner: Arc<RwLock<StoreState>>,
}

impl CredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the current credentials, if logged in.
    pub fn get(&self) -> Option<Credentials> {
        self.read(|s| s.credentials.clone())
    }

    /// Replace the credentials wholesale (login).
    pub fn set(&self, credentials: Credentials) {
        self.write(|s| s.credentials = Some(credentials));
    }

    /// Install a refreshed token pair, keeping the role.
    ///
    /// Returns `false` (and changes nothing) if the store was cleared in
    /// the meantime -- a logout wins over an in-flight refresh.
    pub fn rotate(&self, tokens: TokenPair) -> bool {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let Some(current) = guard.credentials.as_mut() else {
            return false;
        };
        current.access_token = tokens.access_token;
        if let Some(refresh) = tokens.refresh_token {
            current.refresh_token = refresh;
        }
        guard.generation += 1;
        true
    }

    /// Forget the session (logout or unrecoverable auth failure).
    pub fn clear(&self) {
        self.write(|s| s.credentials = None);
    }

    pub fn access_token(&self) -> Option<SecretString> {
        self.read(|s| s.credentials.as_ref().map(|c| c.access_token.clone()))
    }

    pub fn refresh_token(&self) -> Option<SecretString> {
        self.read(|s| s.credentials.as_ref().map(|c| c.refresh_token.clone()))
    }

    pub fn role(&self) -> Option<Role> {
        self.read(|s| s.credentials.as_ref().map(|c| c.role.clone()))
    }

    pub fn is_authenticated(&self) -> bool {
        self.read(|s| s.credentials.is_some())
    }

    /// Mutation counter; changes whenever credentials are set, rotated
    /// or cleared.
    pub fn generation(&self) -> u64 {
        self.read(|s| s.generation)
    }

    fn read<T>(&self, f: impl FnOnce(&StoreState) -> T) -> T {
        let guard = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        f(&guard)
    }

    fn write(&self, f: impl FnOnce(&mut StoreState)) {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard);
        guard.generation += 1;
    }
}

#[cfg(test)]
mod tests {
    use secrecy::ExposeSecret;

    use super::*;

    fn creds(access: &str, refresh: &str) -> Credentials {
        Credentials {
            access_token: access.to_owned().into(),
            refresh_token: refresh.to_owned().into(),
            role: Role::new("Admin"),
        }
    }

    #[test]
    fn clones_share_state() {
        let store = CredentialStore::new();
        let other = store.clone();
        store.set(creds("a1", "r1"));

        assert!(other.is_authenticated());
        assert_eq!(
            other.access_token().map(|t| t.expose_secret().to_owned()),
            Some("a1".to_owned())
        );
    }

    #[test]
    fn rotate_keeps_role_and_unrotated_refresh_token() {
        let store = CredentialStore::new();
        store.set(creds("a1", "r1"));
        let before = store.generation();

        let rotated = store.rotate(TokenPair {
            access_token: "a2".to_owned().into(),
            refresh_token: None,
        });

        assert!(rotated);
        assert!(store.generation() > before);
        let current = store.get().map(|c| {
            (
                c.access_token.expose_secret().to_owned(),
                c.refresh_token.expose_secret().to_owned(),
                c.role,
            )
        });
        assert_eq!(
            current,
            Some(("a2".to_owned(), "r1".to_owned(), Role::new("Admin")))
        );
    }

    #[test]
    fn rotate_after_clear_is_ignored() {
        let store = CredentialStore::new();
        store.set(creds("a1", "r1"));
        store.clear();

        assert!(!store.rotate(TokenPair {
            access_token: "a2".to_owned().into(),
            refresh_token: Some("r2".to_owned().into()),
        }));
        assert!(!store.is_authenticated());
    }

    #[test]
    fn every_mutation_bumps_generation() {
        let store = CredentialStore::new();
        let g0 = store.generation();
        store.set(creds("a1", "r1"));
        let g1 = store.generation();
        store.clear();
        let g2 = store.generation();
        assert!(g0 < g1 && g1 < g2);
    }
}
