use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    http::StatusCode,
    Json,
};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::{error, info, warn};
use utoipa::OpenApi;

use super::{
    dto::{CreatedResponse, Ds18b20Payload, ErrorBody, HealthResponse, Sht31Payload},
    errors::ApiError,
};
use crate::{
    db::models::{CombinedReading, SingleProbeReading},
    sensors::{ReadingKind, SensorRepository},
};

type Created<R> = (StatusCode, Json<CreatedResponse<R>>);

// ---------------------------------------------------------------------------
// Shared ingestion path
// ---------------------------------------------------------------------------

/// Decode `body` as `P`, persist it through `repo`, and describe the outcome.
///
/// Decoding happens before the repository is called, so a rejected payload
/// never reaches the store. The handler future owns the insert; if the
/// client goes away the future is dropped and the insert with it.
async fn ingest<P, R>(
    repo: &dyn SensorRepository<R>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Created<R>, ApiError>
where
    P: DeserializeOwned + Into<R::New>,
    R: ReadingKind,
{
    let body = body.map_err(|rejection| {
        warn!(sensor = R::SENSOR, error = %rejection, "Could not read request body");
        ApiError::from(rejection)
    })?;
    let payload: P = decode_object(&body).map_err(|e| {
        warn!(sensor = R::SENSOR, error = %e, "Rejected invalid payload");
        ApiError::InvalidPayload(e.to_string())
    })?;

    let record = repo.create(payload.into()).await.map_err(|e| {
        error!(sensor = R::SENSOR, error = %e, "Failed to persist reading");
        ApiError::PersistenceFailed {
            sensor: R::SENSOR,
            detail: e.to_string(),
        }
    })?;

    info!(sensor = R::SENSOR, id = record.id(), "Reading saved");
    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            message: format!("{} reading saved", R::SENSOR),
            record,
        }),
    ))
}

/// Parse `body` as a JSON object, then as `P`.
///
/// Derived `Deserialize` also accepts the positional array form of a struct;
/// going through `Map` first limits payloads to objects.
fn decode_object<P: DeserializeOwned>(body: &[u8]) -> serde_json::Result<P> {
    let fields: Map<String, Value> = serde_json::from_slice(body)?;
    serde_json::from_value(Value::Object(fields))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// Record one SHT31 temperature + humidity reading.
#[utoipa::path(
    post,
    path = "/sensor/sht31",
    request_body = Sht31Payload,
    responses(
        (status = 201, description = "Reading saved", body = CreatedResponse<CombinedReading>),
        (status = 400, description = "Body is not a valid SHT31 payload", body = ErrorBody),
        (status = 413, description = "Body exceeds the size limit", body = ErrorBody),
        (status = 401, description = "Missing or wrong bearer token (only when API_TOKEN is set)", body = ErrorBody),
        (status = 500, description = "Reading could not be persisted", body = ErrorBody),
    ),
    tag = "sensors"
)]
pub async fn post_sht31(
    State(repo): State<Arc<dyn SensorRepository<CombinedReading>>>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Created<CombinedReading>, ApiError> {
    ingest::<Sht31Payload, _>(repo.as_ref(), body).await
}

/// Record one DS18B20 temperature reading.
#[utoipa::path(
    post,
    path = "/sensor/ds18b20",
    request_body = Ds18b20Payload,
    responses(
        (status = 201, description = "Reading saved", body = CreatedResponse<SingleProbeReading>),
        (status = 400, description = "Body is not a valid DS18B20 payload", body = ErrorBody),
        (status = 413, description = "Body exceeds the size limit", body = ErrorBody),
        (status = 401, description = "Missing or wrong bearer token (only when API_TOKEN is set)", body = ErrorBody),
        (status = 500, description = "Reading could not be persisted", body = ErrorBody),
    ),
    tag = "sensors"
)]
pub async fn post_ds18b20(
    State(repo): State<Arc<dyn SensorRepository<SingleProbeReading>>>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Created<SingleProbeReading>, ApiError> {
    ingest::<Ds18b20Payload, _>(repo.as_ref(), body).await
}

// ---------------------------------------------------------------------------
// Health check
// ---------------------------------------------------------------------------

/// Liveness probe. Never touches the database and is never behind the token gate.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is running", body = HealthResponse),
    ),
    tag = "system"
)]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_owned(),
    })
}

// ---------------------------------------------------------------------------
// OpenAPI spec
// ---------------------------------------------------------------------------

#[derive(OpenApi)]
#[openapi(
    paths(post_sht31, post_ds18b20, health),
    components(schemas(
        Sht31Payload,
        Ds18b20Payload,
        CombinedReading,
        SingleProbeReading,
        ErrorBody,
        HealthResponse
    )),
    tags(
        (name = "sensors", description = "Sensor ingestion endpoints"),
        (name = "system",  description = "System endpoints"),
    ),
    info(
        title = "Sensor Ingest API",
        version = "0.1.0",
        description = "Accepts SHT31 and DS18B20 telemetry and stores each reading"
    )
)]
pub struct ApiDoc;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
