// Server-level endpoints.

use crate::error::Error;
use crate::v1::client::WadasClient;
use crate::v1::models::DataResponse;

impl WadasClient {
    /// Current tail of the WADAS application log, one entry per line.
    ///
    /// `GET /api/v1/logs`
    pub async fn logs(&self) -> Result<Vec<String>, Error> {
        let resp: DataResponse<Vec<String>> = self.get("logs", &[]).await?;
        Ok(resp.data)
    }
}
