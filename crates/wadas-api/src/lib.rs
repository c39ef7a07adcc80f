// wadas-api: Async Rust client for the WADAS web server REST API

pub mod auth;
pub mod error;
pub mod transport;
pub mod v1;

pub use auth::{CredentialStore, Credentials, Role, TokenPair};
pub use error::Error;
pub use transport::{TlsMode, TransportConfig};
pub use v1::WadasClient;
pub use v1::models::{
    ActuationEvent, Actuator, ActuatorCommand, ActuatorDetail, Camera, ClassifiedAnimal,
    DetectionEvent, Page,
};
pub use v1::query::{ActuationFilters, DetectionFilters};
