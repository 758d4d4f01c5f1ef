use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::{header, HeaderMap};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use tally_extract::ExtractionBackend;
use tally_ingest::{IngestPipeline, IngestRequest};
use tally_storage::DbPool;

use crate::error::ApiError;

/// Envelope over the CSV byte bound: the JSON encoding of a 5 MiB CSV can be
/// a few times larger than the raw text once quotes and newlines are escaped.
const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
    pub extractor: Arc<dyn ExtractionBackend>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportCsvRequest {
    pub csv_content: Option<String>,
    pub org_id: Option<String>,
    #[serde(default)]
    pub account_id: Option<String>,
    #[serde(default)]
    pub account_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ImportCsvResponse {
    pub success: bool,
    pub imported: u64,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/import/csv", post(import_csv))
        // Disable axum's 2 MiB default so the explicit limit below governs.
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        // Browser clients upload from arbitrary origins; preflights get an
        // empty 200 and every response carries the permissive headers.
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

async fn import_csv(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<ImportCsvRequest>, JsonRejection>,
) -> Result<Json<ImportCsvResponse>, ApiError> {
    // Auth is checked before the body is even considered.
    let authorized = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| !v.trim().is_empty());
    if !authorized {
        return Err(ApiError::MissingAuth);
    }

    let Json(body) = body.map_err(|_| ApiError::MissingParameters)?;
    let (Some(csv_content), Some(org_id)) = (body.csv_content, body.org_id) else {
        return Err(ApiError::MissingParameters);
    };
    if org_id.trim().is_empty() {
        return Err(ApiError::MissingParameters);
    }

    let request = IngestRequest {
        csv_text: csv_content,
        organization_id: org_id,
        account_id: body.account_id,
        account_display_name: body.account_name,
    };

    let pipeline = IngestPipeline::new(state.extractor.clone(), state.db.clone());
    let outcome = pipeline.run(&request).await?;

    Ok(Json(ImportCsvResponse { success: true, imported: outcome.imported }))
}
