use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::types::ExtractedTransaction;

#[derive(Debug, Clone, Error)]
pub enum ExtractError {
    /// Transport failure or non-2xx from the extraction service. The status
    /// is for the operator log only and must never reach API callers.
    #[error("Extraction service error (status: {status:?})")]
    Service { status: Option<u16> },
    #[error("Extraction service broke the schema contract: {0}")]
    Contract(String),
    #[error("Extraction service is not configured: {0}")]
    Config(String),
}

/// Abstraction over the structured-extraction service.
/// Implementations accept sanitized CSV text and return typed transactions.
#[async_trait]
pub trait ExtractionBackend: Send + Sync {
    async fn extract(&self, csv_text: &str) -> Result<Vec<ExtractedTransaction>, ExtractError>;
}

#[async_trait]
impl<T: ExtractionBackend + ?Sized> ExtractionBackend for Arc<T> {
    async fn extract(&self, csv_text: &str) -> Result<Vec<ExtractedTransaction>, ExtractError> {
        (**self).extract(csv_text).await
    }
}

// ── Mock backend (used for tests) ─────────────────────────────────────────────

/// Returns a pre-set outcome and counts invocations — lets pipeline tests
/// assert that bounds failures short-circuit before any extraction call.
pub struct MockExtractor {
    outcome: Result<Vec<ExtractedTransaction>, ExtractError>,
    calls: AtomicUsize,
}

impl MockExtractor {
    pub fn returning(transactions: Vec<ExtractedTransaction>) -> Self {
        Self { outcome: Ok(transactions), calls: AtomicUsize::new(0) }
    }

    pub fn failing(err: ExtractError) -> Self {
        Self { outcome: Err(err), calls: AtomicUsize::new(0) }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ExtractionBackend for MockExtractor {
    async fn extract(&self, _csv_text: &str) -> Result<Vec<ExtractedTransaction>, ExtractError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.outcome.clone()
    }
}
