use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use tracing::warn;

use super::errors::ApiError;

/// The single token accepted by the ingestion routes.
#[derive(Clone)]
pub struct ApiToken(Arc<str>);

impl ApiToken {
    pub fn new(token: &str) -> Self {
        Self(Arc::from(token))
    }
}

impl std::fmt::Debug for ApiToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ApiToken(..)")
    }
}

/// Middleware rejecting requests without `Authorization: Bearer <token>`.
///
/// Only layered onto the router when a token is configured.
pub async fn require_bearer_token(
    State(token): State<ApiToken>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if let Err(e) = check_authorization(request.headers(), &token) {
        warn!(
            method = %request.method(),
            uri = %request.uri(),
            reason = %e,
            "Rejected unauthenticated request"
        );
        return Err(e);
    }
    Ok(next.run(request).await)
}

fn check_authorization(headers: &HeaderMap, expected: &ApiToken) -> Result<(), ApiError> {
    let presented = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or(ApiError::Unauthorized("missing or invalid Authorization header"))?;

    if presented != &*expected.0 {
        return Err(ApiError::Unauthorized("invalid token"));
    }
    Ok(())
}
