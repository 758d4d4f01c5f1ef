use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use tally_ingest::PipelineError;

/// The one message callers see for any failure they cannot fix by changing
/// their upload. Service detail (statuses, table names, credential state)
/// stays in the operator log.
pub const GENERIC_FAILURE: &str =
    "Failed to process CSV transactions. Please check the file format and try again.";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Missing authorization header")]
    MissingAuth,
    #[error("Missing required parameters: csvContent and orgId")]
    MissingParameters,
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::MissingAuth => (StatusCode::UNAUTHORIZED, self.to_string()),
            ApiError::MissingParameters => (StatusCode::BAD_REQUEST, self.to_string()),
            // Bounds violations are caller-fixable: return the specific,
            // still-safe message.
            ApiError::Pipeline(PipelineError::Bounds(e)) => {
                (StatusCode::BAD_REQUEST, e.to_string())
            }
            // Extraction, configuration and persistence faults are not
            // caller-fixable; log in full, answer with one generic message.
            ApiError::Pipeline(e) => {
                tracing::error!("csv ingestion failed: {e}");
                (StatusCode::INTERNAL_SERVER_ERROR, GENERIC_FAILURE.to_string())
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
