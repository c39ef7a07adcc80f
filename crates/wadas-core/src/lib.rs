// wadas-core: Session handling and view state between wadas-api and consumers.

pub mod config;
pub mod console;
pub mod error;
pub mod export;
pub mod list;
pub mod logs;
pub mod record;
pub mod session;
pub mod sources;
pub mod stream;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{ConsoleConfig, TlsVerification};
pub use console::Console;
pub use error::CoreError;
pub use export::{Artifact, ArtifactSink, ExportState, FileSink};
pub use list::{ListController, LoadOutcome, ViewState};
pub use logs::{LogSource, LogState, LogTail};
pub use record::{ActuatorDetailView, Actuators, Cameras, RecordSource, RecordState, RecordView};
pub use session::{AuthBackend, Redirect, Session};
pub use sources::{ActuationEvents, ActuationOptions, DetectionEvents, DetectionOptions, ListSource};
pub use stream::StateStream;

// Wire types consumers need alongside the views.
pub use wadas_api::{
    ActuationEvent, ActuationFilters, Actuator, ActuatorCommand, ActuatorDetail, Camera,
    ClassifiedAnimal, DetectionEvent, DetectionFilters, Role,
};
