// Detection and actuation event endpoints: filter option lists,
// paginated listings, and CSV exports.

use bytes::Bytes;

use crate::error::Error;
use crate::v1::client::WadasClient;
use crate::v1::models::{ActuationEvent, DataResponse, DetectionEvent, Page};
use crate::v1::query::{ActuationFilters, DetectionFilters, page_params};

impl WadasClient {
    // ── Filter options ───────────────────────────────────────────────

    /// Actuator type labels selectable in the actuation filters.
    pub async fn actuator_types(&self) -> Result<Vec<String>, Error> {
        self.string_list("actuator_types").await
    }

    /// Actuation command labels selectable in the actuation filters.
    pub async fn commands(&self) -> Result<Vec<String>, Error> {
        self.string_list("commands").await
    }

    /// Animal labels selectable in the detection filters.
    pub async fn animals(&self) -> Result<Vec<String>, Error> {
        self.string_list("animals").await
    }

    async fn string_list(&self, path: &str) -> Result<Vec<String>, Error> {
        let resp: DataResponse<Vec<String>> = self.get(path, &[]).await?;
        Ok(resp.data)
    }

    // ── Listings ─────────────────────────────────────────────────────

    /// One page of detection events matching `filters`.
    ///
    /// `GET /api/v1/detections?offset=..&limit=..`
    pub async fn list_detection_events(
        &self,
        offset: u64,
        limit: u32,
        filters: &DetectionFilters,
    ) -> Result<Page<DetectionEvent>, Error> {
        let mut params = page_params(offset, limit);
        params.extend(filters.to_params());
        self.get("detections", &params).await
    }

    /// One page of actuation events matching `filters`.
    ///
    /// `GET /api/v1/actuations?offset=..&limit=..`
    pub async fn list_actuation_events(
        &self,
        offset: u64,
        limit: u32,
        filters: &ActuationFilters,
    ) -> Result<Page<ActuationEvent>, Error> {
        let mut params = page_params(offset, limit);
        params.extend(filters.to_params());
        self.get("actuations", &params).await
    }

    // ── Exports ──────────────────────────────────────────────────────

    /// Every detection event matching `filters`, as CSV.
    pub async fn export_detection_events(&self, filters: &DetectionFilters) -> Result<Bytes, Error> {
        self.get_bytes("detections/export", &filters.to_params()).await
    }

    /// Every actuation event matching `filters`, as CSV.
    pub async fn export_actuation_events(&self, filters: &ActuationFilters) -> Result<Bytes, Error> {
        self.get_bytes("actuations/export", &filters.to_params()).await
    }
}
