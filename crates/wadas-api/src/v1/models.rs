// Wire types for the WADAS web server REST API (v1).
//
// Field names follow the server's snake_case JSON. Timestamps arrive as
// ISO-8601 strings and are decoded into `chrono` types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Decode an explicit `null` list the same as a missing one.
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// `{ "data": ... }` envelope used by every non-paginated endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct DataResponse<T> {
    pub data: T,
}

/// Paginated list envelope.
///
/// `total` counts every row matching the filters; `count` is the size
/// of this page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub total: u64,
    pub count: u64,
    pub data: Vec<T>,
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self {
            total: 0,
            count: 0,
            data: Vec::new(),
        }
    }
}

// ── Auth ─────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default)]
    pub role: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct RefreshTokenRequest<'a> {
    pub refresh_token: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RefreshResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

// ── Devices ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Actuator {
    pub id: u64,
    pub name: String,
    #[serde(rename = "type")]
    pub actuator_type: String,
    #[serde(default)]
    pub last_update: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub id: u64,
    pub name: String,
    #[serde(rename = "type")]
    pub camera_type: String,
    pub enabled: bool,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub actuators: Vec<Actuator>,
}

/// Admin view of an actuator: database record merged with the runtime
/// telemetry the actuator last reported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActuatorDetail {
    pub id: u64,
    pub name: String,
    #[serde(rename = "type")]
    pub actuator_type: String,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub creation_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub deletion_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_update: Option<DateTime<Utc>>,
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub humidity: Option<f64>,
    #[serde(default)]
    pub battery_status: Option<f64>,
    #[serde(default)]
    pub log: Option<String>,
}

/// Commands an operator can push to a single actuator.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ActuatorCommand {
    Test,
    Reboot,
    RefreshLog,
}

#[derive(Debug, Serialize)]
pub(crate) struct ActuatorCommandRequest {
    pub command: ActuatorCommand,
}

// ── Events ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedAnimal {
    pub animal: String,
    pub probability: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionEvent {
    pub id: u64,
    pub camera_id: u64,
    #[serde(default)]
    pub detection_img_path: Option<String>,
    #[serde(default)]
    pub classification_img_path: Option<String>,
    pub detected_animals: u32,
    pub classification: bool,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub classified_animals: Vec<ClassifiedAnimal>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActuationEvent {
    pub actuator: Actuator,
    pub detection_event_id: u64,
    pub command: String,
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn actuation_event_decodes_server_shape() {
        let raw = json!({
            "actuator": { "id": 3, "name": "roadsign-1", "type": "Road Sign" },
            "detection_event_id": 17,
            "command": "display",
            "timestamp": "2025-03-01T10:15:00Z"
        });
        let event: ActuationEvent = serde_json::from_value(raw).unwrap();
        assert_eq!(event.actuator.actuator_type, "Road Sign");
        assert_eq!(event.actuator.last_update, None);
        assert_eq!(event.detection_event_id, 17);
    }

    #[test]
    fn detection_event_tolerates_null_animals() {
        let raw = json!({
            "id": 1,
            "camera_id": 2,
            "detection_img_path": null,
            "classification_img_path": null,
            "detected_animals": 0,
            "classification": false,
            "classified_animals": null,
            "timestamp": "2025-03-01T10:15:00Z"
        });
        let event: DetectionEvent = serde_json::from_value(raw).unwrap();
        assert!(event.classified_animals.is_empty());
    }

    #[test]
    fn actuator_command_wire_names() {
        assert_eq!(
            serde_json::to_value(ActuatorCommand::RefreshLog).unwrap(),
            json!("refresh_log")
        );
        assert_eq!(
            "reboot".parse::<ActuatorCommand>().unwrap(),
            ActuatorCommand::Reboot
        );
    }
}
