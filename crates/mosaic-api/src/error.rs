use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::error;

use mosaic_concepts::ConceptError;
use mosaic_types::api::ErrorResponse;

/// Handler error: a rejected operation, rendered as `{ "error": message }`.
#[derive(Debug)]
pub struct ApiError(pub ConceptError);

impl From<ConceptError> for ApiError {
    fn from(err: ConceptError) -> Self {
        Self(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            ConceptError::NotFound(_) => StatusCode::NOT_FOUND,
            ConceptError::Conflict(_) => StatusCode::CONFLICT,
            ConceptError::BadValues(_) | ConceptError::InvalidInvitation => StatusCode::BAD_REQUEST,
            ConceptError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ConceptError::Forbidden(_) => StatusCode::FORBIDDEN,
            ConceptError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self.0 {
            // Storage details stay in the log.
            ConceptError::Storage(e) => {
                error!("storage failure: {:#}", e);
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };
        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
