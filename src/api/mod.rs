pub mod auth;
pub mod dto;
pub mod errors;
pub mod handlers;

use std::sync::Arc;

use axum::{
    extract::FromRef,
    middleware,
    routing::{get, post},
    Json, Router,
};
use sqlx::PgPool;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use utoipa::OpenApi;

use crate::{
    db::models::{CombinedReading, SingleProbeReading},
    sensors::{PgSensorRepository, SensorRepository},
};
use auth::ApiToken;
use handlers::ApiDoc;

/// One repository per sensor kind; handlers pick theirs via `FromRef`.
#[derive(Clone, FromRef)]
pub struct AppState {
    pub sht31: Arc<dyn SensorRepository<CombinedReading>>,
    pub ds18b20: Arc<dyn SensorRepository<SingleProbeReading>>,
}

impl AppState {
    pub fn new(
        sht31: Arc<dyn SensorRepository<CombinedReading>>,
        ds18b20: Arc<dyn SensorRepository<SingleProbeReading>>,
    ) -> Self {
        Self { sht31, ds18b20 }
    }

    /// Postgres-backed repositories sharing one pool.
    pub fn from_pool(pool: PgPool) -> Self {
        Self::new(
            Arc::new(PgSensorRepository::<CombinedReading>::new(pool.clone())),
            Arc::new(PgSensorRepository::<SingleProbeReading>::new(pool)),
        )
    }
}

/// Build the route table.
///
/// `/sensor/*` is wrapped in the bearer-token gate only when `api_token` is
/// a non-empty string; the decision is made here, once. `/health` and the
/// OpenAPI document are always open.
pub fn router(state: AppState, api_token: Option<&str>) -> Router {
    let mut sensors: Router<AppState> = Router::new()
        .route("/sht31", post(handlers::post_sht31))
        .route("/ds18b20", post(handlers::post_ds18b20));

    match api_token.filter(|t| !t.is_empty()) {
        Some(token) => {
            info!("API token configured; /sensor routes require a bearer token");
            sensors = sensors.route_layer(middleware::from_fn_with_state(
                ApiToken::new(token),
                auth::require_bearer_token,
            ));
        }
        None => warn!("No API token configured; /sensor routes are unprotected"),
    }

    Router::new()
        .route("/health", get(handlers::health))
        .route("/api-docs/openapi.json", get(openapi_json))
        .nest("/sensor", sensors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
