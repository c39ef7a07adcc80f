// Camera and actuator endpoints.

use crate::error::Error;
use crate::v1::client::WadasClient;
use crate::v1::models::{
    Actuator, ActuatorCommand, ActuatorCommandRequest, ActuatorDetail, Camera, DataResponse,
};

impl WadasClient {
    /// List every configured camera with its associated actuators.
    ///
    /// `GET /api/v1/cameras`
    pub async fn list_cameras(&self) -> Result<Vec<Camera>, Error> {
        let resp: DataResponse<Vec<Camera>> = self.get("cameras", &[]).await?;
        Ok(resp.data)
    }

    /// List every configured actuator.
    ///
    /// `GET /api/v1/actuators`
    pub async fn list_actuators(&self) -> Result<Vec<Actuator>, Error> {
        let resp: DataResponse<Vec<Actuator>> = self.get("actuators", &[]).await?;
        Ok(resp.data)
    }

    /// Fetch the admin detail record (DB fields plus runtime telemetry).
    ///
    /// `GET /api/v1/actuators/{id}`
    pub async fn actuator_detail(&self, actuator_id: &str) -> Result<ActuatorDetail, Error> {
        let path = format!("actuators/{actuator_id}");
        let resp: DataResponse<ActuatorDetail> = self.get(&path, &[]).await?;
        Ok(resp.data)
    }

    /// Queue a command for an actuator. The server only acknowledges;
    /// the actuator picks the command up on its next poll.
    ///
    /// `POST /api/v1/actuators/{id}/commands`
    pub async fn send_actuator_command(
        &self,
        actuator_id: &str,
        command: ActuatorCommand,
    ) -> Result<(), Error> {
        let path = format!("actuators/{actuator_id}/commands");
        self.post_ack(&path, &ActuatorCommandRequest { command }).await
    }
}
