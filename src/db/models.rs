use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// One SHT31 measurement, a row of `sht31_readings`.
///
/// `id` and `captured_at` are assigned by the store on insert.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize, ToSchema)]
pub struct CombinedReading {
    pub id: i64,
    /// Degrees Celsius
    pub temperature: f64,
    /// Relative humidity percentage
    pub humidity: f64,
    #[serde(rename = "datetime")]
    pub captured_at: DateTime<Utc>,
}

/// One DS18B20 measurement, a row of `ds18b20_readings`.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize, ToSchema)]
pub struct SingleProbeReading {
    pub id: i64,
    /// Degrees Celsius
    pub temperature: f64,
    #[serde(rename = "datetime")]
    pub captured_at: DateTime<Utc>,
}

/// Values of a `CombinedReading` before the store has seen it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewCombinedReading {
    pub temperature: f64,
    pub humidity: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewSingleProbeReading {
    pub temperature: f64,
}
