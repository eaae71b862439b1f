use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::db::models::{NewCombinedReading, NewSingleProbeReading};

/// Request body for `POST /sensor/sht31`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct Sht31Payload {
    /// Degrees Celsius
    pub temperature: f64,
    /// Relative humidity percentage
    pub humidity: f64,
}

/// Request body for `POST /sensor/ds18b20`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct Ds18b20Payload {
    /// Degrees Celsius
    pub temperature: f64,
}

impl From<Sht31Payload> for NewCombinedReading {
    fn from(p: Sht31Payload) -> Self {
        Self {
            temperature: p.temperature,
            humidity: p.humidity,
        }
    }
}

impl From<Ds18b20Payload> for NewSingleProbeReading {
    fn from(p: Ds18b20Payload) -> Self {
        Self {
            temperature: p.temperature,
        }
    }
}

/// `201 Created` body: confirmation plus the row as stored.
#[derive(Debug, Serialize, ToSchema)]
pub struct CreatedResponse<T> {
    pub message: String,
    pub record: T,
}

/// Body of every error response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Human-readable summary.
    pub error: String,
    /// Machine-checkable code: `invalid_payload`, `unauthorized` or `persistence_failed`.
    pub code: String,
    /// Free-text reason.
    pub detail: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
}
