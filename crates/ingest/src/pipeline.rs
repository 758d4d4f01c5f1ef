use thiserror::Error;

use tally_extract::{ExtractError, ExtractionBackend};
use tally_storage::DbPool;

use crate::bounds::{self, BoundsError};
use crate::normalize::{normalize_batch, resolve_source_name};
use crate::sanitize::sanitize_csv;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Bounds(#[from] BoundsError),
    #[error("Extraction failed: {0}")]
    Extract(#[from] ExtractError),
    #[error("Persistence failed: {0}")]
    Persistence(#[from] sqlx::Error),
}

/// Caller-supplied ingestion parameters. Never trusted as well-formed.
#[derive(Debug, Clone)]
pub struct IngestRequest {
    pub csv_text: String,
    pub organization_id: String,
    pub account_id: Option<String>,
    pub account_display_name: Option<String>,
}

#[derive(Debug)]
pub struct IngestOutcome {
    /// Rows the store reports as written — not the extracted count.
    pub imported: u64,
}

/// Orchestrates one ingestion: bounds → sanitize → extract → normalize →
/// persist. Stages run strictly in that order; each failure short-circuits
/// the rest, so nothing past the extraction call runs when extraction fails.
pub struct IngestPipeline<E: ExtractionBackend> {
    extractor: E,
    db: DbPool,
}

impl<E: ExtractionBackend> IngestPipeline<E> {
    pub fn new(extractor: E, db: DbPool) -> Self {
        Self { extractor, db }
    }

    pub async fn run(&self, request: &IngestRequest) -> Result<IngestOutcome, PipelineError> {
        bounds::check(&request.csv_text)?;

        let sanitized = sanitize_csv(&request.csv_text);
        let extracted = self.extractor.extract(&sanitized).await?;

        tracing::debug!(
            count = extracted.len(),
            org = %request.organization_id,
            "extraction complete"
        );

        let explicit = request
            .account_display_name
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());
        // The stored name is only worth a query when the caller gave an
        // account id but no display name.
        let stored = match (explicit, request.account_id.as_deref()) {
            (None, Some(account_id)) => {
                tally_storage::get_account_name(&self.db, &request.organization_id, account_id)
                    .await?
            }
            _ => None,
        };
        let source_name = resolve_source_name(explicit, stored.as_deref());

        let rows = normalize_batch(
            extracted,
            &request.organization_id,
            request.account_id.as_deref(),
            &source_name,
        );
        let imported = tally_storage::insert_transactions(&self.db, &rows).await?;

        tracing::info!(imported, org = %request.organization_id, "csv ingestion complete");

        Ok(IngestOutcome { imported })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use std::str::FromStr;
    use std::sync::Arc;
    use tally_core::Direction;
    use tally_extract::{ExtractedTransaction, MockExtractor};
    use tally_storage::{create_in_memory_db, get_transactions_for_org, insert_account, insert_organization};

    const CSV: &str = "date,description,amount\n2024-01-15,AMAZON,-49.99\n2024-01-16,CLIENT PAYMENT,1200.00\n";

    fn tx(description: &str, amount: &str) -> ExtractedTransaction {
        ExtractedTransaction {
            date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            description: description.to_string(),
            amount: Decimal::from_str(amount).unwrap(),
            category: None,
            vendor: None,
        }
    }

    fn request(csv: &str) -> IngestRequest {
        IngestRequest {
            csv_text: csv.to_string(),
            organization_id: "org-1".to_string(),
            account_id: None,
            account_display_name: None,
        }
    }

    async fn test_db() -> DbPool {
        let pool = create_in_memory_db().await.unwrap();
        insert_organization(&pool, "org-1", "Test Org").await.unwrap();
        pool
    }

    #[tokio::test]
    async fn happy_path_imports_extracted_rows() {
        let db = test_db().await;
        let mock = Arc::new(MockExtractor::returning(vec![
            tx("AMAZON", "-49.99"),
            tx("CLIENT PAYMENT", "1200.00"),
        ]));
        let pipeline = IngestPipeline::new(mock.clone(), db.clone());

        let outcome = pipeline.run(&request(CSV)).await.unwrap();
        assert_eq!(outcome.imported, 2);
        assert_eq!(mock.call_count(), 1);

        let stored = get_transactions_for_org(&db, "org-1").await.unwrap();
        assert_eq!(stored.len(), 2);
        assert!(stored.iter().all(|t| t.organization_id == "org-1"));
        let amazon = stored.iter().find(|t| t.description == "AMAZON").unwrap();
        assert_eq!(amazon.direction, Direction::Debit);
        assert_eq!(amazon.amount.to_cents(), 4999);
        assert_eq!(amazon.source_account_name, "CSV Import");
    }

    #[tokio::test]
    async fn bounds_failure_never_reaches_the_extractor() {
        let db = test_db().await;
        let mock = Arc::new(MockExtractor::returning(vec![tx("X", "1")]));
        let pipeline = IngestPipeline::new(mock.clone(), db.clone());

        let err = pipeline.run(&request("")).await.unwrap_err();
        assert!(matches!(err, PipelineError::Bounds(BoundsError::EmptyInput)));
        assert_eq!(mock.call_count(), 0);

        let big = format!("h\n{}", "2024-01-15,x,1\n".repeat(1001));
        let err = pipeline.run(&request(&big)).await.unwrap_err();
        assert!(matches!(err, PipelineError::Bounds(BoundsError::TooManyRows)));
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn extraction_failure_writes_no_rows() {
        let db = test_db().await;
        let mock = Arc::new(MockExtractor::failing(ExtractError::Service { status: Some(500) }));
        let pipeline = IngestPipeline::new(mock, db.clone());

        let err = pipeline.run(&request(CSV)).await.unwrap_err();
        assert!(matches!(err, PipelineError::Extract(_)));
        assert!(get_transactions_for_org(&db, "org-1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn empty_extraction_imports_zero() {
        let db = test_db().await;
        let pipeline = IngestPipeline::new(MockExtractor::returning(vec![]), db);
        let outcome = pipeline.run(&request(CSV)).await.unwrap();
        assert_eq!(outcome.imported, 0);
    }

    #[tokio::test]
    async fn stored_account_name_is_looked_up_when_no_display_name() {
        let db = test_db().await;
        insert_account(&db, "acct-1", "org-1", "Checking").await.unwrap();
        let pipeline = IngestPipeline::new(MockExtractor::returning(vec![tx("X", "1")]), db.clone());

        let mut req = request(CSV);
        req.account_id = Some("acct-1".to_string());
        pipeline.run(&req).await.unwrap();

        let stored = get_transactions_for_org(&db, "org-1").await.unwrap();
        assert_eq!(stored[0].source_account_name, "Checking");
        assert_eq!(stored[0].account_id.as_deref(), Some("acct-1"));
    }

    #[tokio::test]
    async fn explicit_display_name_skips_the_lookup() {
        let db = test_db().await;
        insert_account(&db, "acct-1", "org-1", "Checking").await.unwrap();
        let pipeline = IngestPipeline::new(MockExtractor::returning(vec![tx("X", "1")]), db.clone());

        let mut req = request(CSV);
        req.account_id = Some("acct-1".to_string());
        req.account_display_name = Some("Visa 1234".to_string());
        pipeline.run(&req).await.unwrap();

        let stored = get_transactions_for_org(&db, "org-1").await.unwrap();
        assert_eq!(stored[0].source_account_name, "Visa 1234");
    }

    #[tokio::test]
    async fn unknown_account_id_fails_persistence() {
        // The transactions table references accounts; an id that resolves to
        // nothing falls back to "CSV Import" for the name and then fails the
        // insert, rejecting the whole batch.
        let db = test_db().await;
        let pipeline = IngestPipeline::new(MockExtractor::returning(vec![tx("X", "1")]), db.clone());

        let mut req = request(CSV);
        req.account_id = Some("acct-ghost".to_string());
        let err = pipeline.run(&req).await.unwrap_err();
        assert!(matches!(err, PipelineError::Persistence(_)));
        assert!(get_transactions_for_org(&db, "org-1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn reuploading_the_same_csv_duplicates_rows() {
        let db = test_db().await;
        let pipeline = IngestPipeline::new(
            MockExtractor::returning(vec![tx("AMAZON", "-49.99")]),
            db.clone(),
        );

        pipeline.run(&request(CSV)).await.unwrap();
        pipeline.run(&request(CSV)).await.unwrap();

        assert_eq!(get_transactions_for_org(&db, "org-1").await.unwrap().len(), 2);
    }
}
