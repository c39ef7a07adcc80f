// ── List sources ──
//
// Bindings between the generic list controller and the two paginated
// event endpoints. Each source knows which filter options to fetch, how
// to fetch one page, and how to export every matching row.

use std::future::Future;
use std::sync::Arc;

use bytes::Bytes;
use serde::Serialize;
use wadas_api::{
    ActuationEvent, ActuationFilters, Camera, DetectionEvent, DetectionFilters, Page, WadasClient,
};

/// A paginated, filterable, exportable collection.
///
/// Methods return raw API errors; the controller runs them through the
/// session so token expiry is handled in one place.
pub trait ListSource: Send + Sync + 'static {
    type Item: Clone + Send + Sync + 'static;
    type Filters: Clone + Default + PartialEq + Send + Sync + 'static;
    type Options: Clone + Default + Send + Sync + 'static;

    /// Everything the filter pickers offer, fetched together.
    fn fetch_options(
        &self,
    ) -> impl Future<Output = Result<Self::Options, wadas_api::Error>> + Send;

    fn fetch_page(
        &self,
        offset: u64,
        limit: u32,
        filters: &Self::Filters,
    ) -> impl Future<Output = Result<Page<Self::Item>, wadas_api::Error>> + Send;

    /// Every row matching `filters`, as CSV.
    fn export(
        &self,
        filters: &Self::Filters,
    ) -> impl Future<Output = Result<Bytes, wadas_api::Error>> + Send;

    fn export_file_name(&self) -> &'static str;
}

// ── Actuation events ─────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ActuationOptions {
    pub actuator_types: Vec<String>,
    pub commands: Vec<String>,
}

pub struct ActuationEvents {
    client: Arc<WadasClient>,
}

impl ActuationEvents {
    pub fn new(client: Arc<WadasClient>) -> Self {
        Self { client }
    }
}

impl ListSource for ActuationEvents {
    type Item = ActuationEvent;
    type Filters = ActuationFilters;
    type Options = ActuationOptions;

    fn fetch_options(
        &self,
    ) -> impl Future<Output = Result<ActuationOptions, wadas_api::Error>> + Send {
        async move {
            let (actuator_types, commands) =
                tokio::try_join!(self.client.actuator_types(), self.client.commands())?;
            Ok(ActuationOptions {
                actuator_types,
                commands,
            })
        }
    }

    fn fetch_page(
        &self,
        offset: u64,
        limit: u32,
        filters: &ActuationFilters,
    ) -> impl Future<Output = Result<Page<ActuationEvent>, wadas_api::Error>> + Send {
        self.client.list_actuation_events(offset, limit, filters)
    }

    fn export(
        &self,
        filters: &ActuationFilters,
    ) -> impl Future<Output = Result<Bytes, wadas_api::Error>> + Send {
        self.client.export_actuation_events(filters)
    }

    fn export_file_name(&self) -> &'static str {
        "actuation_events.csv"
    }
}

// ── Detection events ─────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DetectionOptions {
    pub cameras: Vec<Camera>,
    pub animals: Vec<String>,
}

pub struct DetectionEvents {
    client: Arc<WadasClient>,
}

impl DetectionEvents {
    pub fn new(client: Arc<WadasClient>) -> Self {
        Self { client }
    }
}

impl ListSource for DetectionEvents {
    type Item = DetectionEvent;
    type Filters = DetectionFilters;
    type Options = DetectionOptions;

    fn fetch_options(
        &self,
    ) -> impl Future<Output = Result<DetectionOptions, wadas_api::Error>> + Send {
        async move {
            let (cameras, animals) =
                tokio::try_join!(self.client.list_cameras(), self.client.animals())?;
            Ok(DetectionOptions { cameras, animals })
        }
    }

    fn fetch_page(
        &self,
        offset: u64,
        limit: u32,
        filters: &DetectionFilters,
    ) -> impl Future<Output = Result<Page<DetectionEvent>, wadas_api::Error>> + Send {
        self.client.list_detection_events(offset, limit, filters)
    }

    fn export(
        &self,
        filters: &DetectionFilters,
    ) -> impl Future<Output = Result<Bytes, wadas_api::Error>> + Send {
        self.client.export_detection_events(filters)
    }

    fn export_file_name(&self) -> &'static str {
        "detection_events.csv"
    }
}
