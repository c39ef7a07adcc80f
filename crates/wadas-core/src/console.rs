// ── Console facade ──
//
// Entry point for consumers: owns the configuration, the HTTP client,
// the credential store and the session, and hands out controllers and
// views that all share them.

use std::sync::Arc;

use secrecy::SecretString;
use tokio::sync::broadcast;
use tracing::debug;
use wadas_api::{CredentialStore, Role, WadasClient};

use crate::config::ConsoleConfig;
use crate::error::CoreError;
use crate::list::ListController;
use crate::logs::LogTail;
use crate::record::{ActuatorDetailView, Actuators, Cameras, RecordView};
use crate::session::{Redirect, Session};
use crate::sources::{ActuationEvents, DetectionEvents};

/// The admin console. Cheaply cloneable.
#[derive(Clone)]
pub struct Console {
    config: Arc<ConsoleConfig>,
    client: Arc<WadasClient>,
    session: Session,
}

impl Console {
    /// Build a console for `config`. Does not contact the server; call
    /// [`login()`](Self::login) first.
    pub fn new(config: ConsoleConfig) -> Result<Self, CoreError> {
        let credentials = CredentialStore::new();
        let client = WadasClient::new(config.url.clone(), &config.transport(), credentials)?;
        debug!(url = %config.url, "console created");
        Ok(Self::with_client(config, client))
    }

    /// Build a console around an existing client (and its store).
    pub fn with_client(config: ConsoleConfig, client: WadasClient) -> Self {
        let client = Arc::new(client);
        let session = Session::new(client.credentials().clone(), client.clone());
        Self {
            config: Arc::new(config),
            client,
            session,
        }
    }

    pub fn config(&self) -> &ConsoleConfig {
        &self.config
    }

    pub fn client(&self) -> &Arc<WadasClient> {
        &self.client
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    // ── Session ──────────────────────────────────────────────────────

    pub async fn login(&self, username: &str, password: &SecretString) -> Result<Role, CoreError> {
        self.session.login(username, password).await
    }

    pub fn logout(&self) {
        self.session.logout();
    }

    pub fn role(&self) -> Option<Role> {
        self.session.role()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.credentials().is_authenticated()
    }

    pub fn subscribe_redirects(&self) -> broadcast::Receiver<Redirect> {
        self.session.subscribe_redirects()
    }

    // ── Views ────────────────────────────────────────────────────────

    pub fn actuation_events(&self) -> ListController<ActuationEvents> {
        ListController::new(
            ActuationEvents::new(self.client.clone()),
            self.session.clone(),
            self.config.page_size,
        )
    }

    pub fn detection_events(&self) -> ListController<DetectionEvents> {
        ListController::new(
            DetectionEvents::new(self.client.clone()),
            self.session.clone(),
            self.config.page_size,
        )
    }

    pub fn actuator(&self, id: impl Into<String>) -> ActuatorDetailView {
        ActuatorDetailView::new(self.client.clone(), self.session.clone(), id)
    }

    pub fn cameras(&self) -> RecordView<Cameras> {
        RecordView::new(Cameras::new(self.client.clone()), self.session.clone())
    }

    pub fn actuators(&self) -> RecordView<Actuators> {
        RecordView::new(Actuators::new(self.client.clone()), self.session.clone())
    }

    /// Start tailing the application log at the configured cadence.
    pub fn log_tail(&self) -> LogTail {
        LogTail::start(
            self.client.clone(),
            self.session.clone(),
            self.config.log_poll_interval,
        )
    }
}
