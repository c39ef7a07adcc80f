// ── Record views ──
//
// Single-record and catalog views: the actuator detail page and the
// camera/actuator overviews. Each view applies only its newest load,
// ignores responses after teardown, and follows the same lost-session
// policy as the list controller.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use wadas_api::{Actuator, ActuatorCommand, ActuatorDetail, Camera, WadasClient};

use crate::error::CoreError;
use crate::list::LoadOutcome;
use crate::session::Session;
use crate::stream::StateStream;

pub const INVALID_ACTUATOR_ID: &str = "Invalid actuator id";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordState<T> {
    pub loading: bool,
    pub error: Option<String>,
    pub value: Option<T>,
}

impl<T> Default for RecordState<T> {
    fn default() -> Self {
        Self {
            loading: false,
            error: None,
            value: None,
        }
    }
}

/// Something a [`RecordView`] can load.
pub trait RecordSource: Send + Sync + 'static {
    type Value: Clone + Send + Sync + 'static;

    fn fetch(&self) -> impl Future<Output = Result<Self::Value, wadas_api::Error>> + Send;
}

// ── Sources ──────────────────────────────────────────────────────────

/// Every configured camera.
pub struct Cameras(Arc<WadasClient>);

impl Cameras {
    pub fn new(client: Arc<WadasClient>) -> Self {
        Self(client)
    }
}

impl RecordSource for Cameras {
    type Value = Vec<Camera>;

    fn fetch(&self) -> impl Future<Output = Result<Vec<Camera>, wadas_api::Error>> + Send {
        self.0.list_cameras()
    }
}

/// Every configured actuator.
pub struct Actuators(Arc<WadasClient>);

impl Actuators {
    pub fn new(client: Arc<WadasClient>) -> Self {
        Self(client)
    }
}

impl RecordSource for Actuators {
    type Value = Vec<Actuator>;

    fn fetch(&self) -> impl Future<Output = Result<Vec<Actuator>, wadas_api::Error>> + Send {
        self.0.list_actuators()
    }
}

/// The admin detail record of one actuator.
pub struct ActuatorRecord {
    client: Arc<WadasClient>,
    id: String,
}

impl RecordSource for ActuatorRecord {
    type Value = ActuatorDetail;

    fn fetch(&self) -> impl Future<Output = Result<ActuatorDetail, wadas_api::Error>> + Send {
        self.client.actuator_detail(&self.id)
    }
}

// ── RecordView ───────────────────────────────────────────────────────

/// Loads one value from a [`RecordSource`] and publishes its state.
pub struct RecordView<S: RecordSource> {
    source: S,
    session: Session,
    seq: AtomicU64,
    state: watch::Sender<RecordState<S::Value>>,
    alive: CancellationToken,
}

impl<S: RecordSource> RecordView<S> {
    pub fn new(source: S, session: Session) -> Self {
        let (state, _) = watch::channel(RecordState::default());
        Self {
            source,
            session,
            seq: AtomicU64::new(0),
            state,
            alive: CancellationToken::new(),
        }
    }

    pub fn state(&self) -> RecordState<S::Value> {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> StateStream<RecordState<S::Value>> {
        StateStream::new(self.state.subscribe())
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Fetch the value; only the newest load is applied.
    pub async fn load(&self) -> LoadOutcome {
        if self.is_detached() {
            return LoadOutcome::Detached;
        }
        let seq = self.seq.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.send_modify(|s| {
            s.loading = true;
            s.error = None;
        });

        let result = self.session.call(|| self.source.fetch()).await;

        if self.is_detached() {
            return LoadOutcome::Detached;
        }
        if self.seq.load(Ordering::SeqCst) != seq {
            debug!(seq, "dropping superseded record response");
            if matches!(&result, Err(e) if e.is_unauthorized())
                && !self.session.credentials().is_authenticated()
            {
                self.session.redirect_to_login();
            }
            return LoadOutcome::Superseded;
        }

        match result {
            Ok(value) => {
                self.state.send_replace(RecordState {
                    loading: false,
                    error: None,
                    value: Some(value),
                });
            }
            Err(e) => self.fail(&e),
        }
        LoadOutcome::Applied
    }

    pub fn detach(&self) {
        self.alive.cancel();
    }

    pub fn is_detached(&self) -> bool {
        self.alive.is_cancelled()
    }

    fn fail(&self, err: &CoreError) {
        if err.is_unauthorized() {
            self.state.send_replace(RecordState::default());
            self.session.redirect_to_login();
        } else {
            self.reject(err.user_message());
        }
    }

    /// Show `message` inline without touching the network.
    fn reject(&self, message: String) {
        self.state.send_modify(|s| {
            s.loading = false;
            s.error = Some(message);
        });
    }
}

// ── Actuator detail ──────────────────────────────────────────────────

/// Detail page of one actuator: its record plus the commands an
/// operator can send to it.
pub struct ActuatorDetailView {
    view: RecordView<ActuatorRecord>,
}

impl ActuatorDetailView {
    pub fn new(client: Arc<WadasClient>, session: Session, id: impl Into<String>) -> Self {
        let id = id.into().trim().to_owned();
        Self {
            view: RecordView::new(ActuatorRecord { client, id }, session),
        }
    }

    pub fn id(&self) -> &str {
        &self.view.source.id
    }

    pub fn state(&self) -> RecordState<ActuatorDetail> {
        self.view.state()
    }

    pub fn subscribe(&self) -> StateStream<RecordState<ActuatorDetail>> {
        self.view.subscribe()
    }

    /// Load the detail record. An empty id is reported inline and no
    /// request is sent.
    pub async fn load(&self) -> LoadOutcome {
        if self.id().is_empty() {
            self.view.reject(INVALID_ACTUATOR_ID.to_owned());
            return LoadOutcome::Rejected;
        }
        self.view.load().await
    }

    /// Queue `command` for this actuator. After a successful
    /// `refresh_log` the record is reloaded to pick up the new log.
    pub async fn send_command(&self, command: ActuatorCommand) -> Result<(), CoreError> {
        if self.id().is_empty() {
            self.view.reject(INVALID_ACTUATOR_ID.to_owned());
            return Err(CoreError::ValidationFailed {
                message: INVALID_ACTUATOR_ID.to_owned(),
            });
        }

        let source = &self.view.source;
        let result = self
            .view
            .session
            .call(|| source.client.send_actuator_command(&source.id, command))
            .await;

        if self.view.is_detached() {
            return result;
        }
        match &result {
            Ok(()) => {
                info!(actuator = %source.id, %command, "actuator command queued");
                if command == ActuatorCommand::RefreshLog {
                    self.view.load().await;
                }
            }
            Err(e) => self.view.fail(e),
        }
        result
    }

    pub fn detach(&self) {
        self.view.detach();
    }
}
