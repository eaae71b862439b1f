use axum::{
    extract::rejection::BytesRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use super::dto::ErrorBody;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Body could not be decoded into the sensor's payload. The store is not touched.
    #[error("invalid JSON payload")]
    InvalidPayload(String),

    /// Body could not be read at all (too large, aborted upload). Keeps the
    /// status axum chose for the rejection.
    #[error("invalid request body")]
    UnreadableBody { status: StatusCode, detail: String },

    /// Rejected by the bearer-token gate before any handler ran.
    #[error("{0}")]
    Unauthorized(&'static str),

    #[error("could not save {sensor} reading")]
    PersistenceFailed { sensor: &'static str, detail: String },
}

impl ApiError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidPayload(_) | Self::UnreadableBody { .. } => "invalid_payload",
            Self::Unauthorized(_) => "unauthorized",
            Self::PersistenceFailed { .. } => "persistence_failed",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidPayload(_) => StatusCode::BAD_REQUEST,
            Self::UnreadableBody { status, .. } => *status,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::PersistenceFailed { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn detail(&self) -> String {
        match self {
            Self::InvalidPayload(detail)
            | Self::UnreadableBody { detail, .. }
            | Self::PersistenceFailed { detail, .. } => detail.clone(),
            Self::Unauthorized(_) => "expected Authorization: Bearer <token>".to_owned(),
        }
    }
}

impl From<BytesRejection> for ApiError {
    fn from(rejection: BytesRejection) -> Self {
        Self::UnreadableBody {
            status: rejection.status(),
            detail: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.to_string(),
            code: self.code().to_owned(),
            detail: self.detail(),
        };
        (self.status(), Json(body)).into_response()
    }
}
