// WADAS web server REST API, version 1.

pub mod auth;
pub mod client;
pub mod devices;
pub mod events;
pub mod models;
pub mod query;
pub mod system;

pub use client::WadasClient;
