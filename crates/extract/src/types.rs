use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::backend::ExtractError;

/// One transaction as validated out of the extraction service's payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedTransaction {
    pub date: NaiveDate,
    pub description: String,
    /// Signed: negative means money flowing out of the account.
    pub amount: Decimal,
    pub category: Option<String>,
    pub vendor: Option<String>,
}

/// The wire shape the service is instructed to produce via the forced tool
/// call. The service is not trusted to comply — every field goes through
/// `validate` before anything downstream sees it.
#[derive(Debug, Deserialize)]
pub(crate) struct RawExtractionPayload {
    #[serde(default)]
    pub transactions: Vec<RawTransactionRow>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawTransactionRow {
    pub date: Option<String>,
    pub description: Option<String>,
    pub amount: Option<Decimal>,
    pub category: Option<String>,
    pub vendor: Option<String>,
}

impl RawExtractionPayload {
    /// Enforce the schema the service was instructed to follow: `date` (ISO)
    /// and `description` are required per item. A row without an `amount`
    /// cannot become a ledger entry and is skipped with a warning.
    pub(crate) fn validate(self) -> Result<Vec<ExtractedTransaction>, ExtractError> {
        let mut out = Vec::with_capacity(self.transactions.len());
        for (idx, row) in self.transactions.into_iter().enumerate() {
            let date_str = row
                .date
                .ok_or_else(|| ExtractError::Contract(format!("item {idx} is missing `date`")))?;
            let date = NaiveDate::parse_from_str(date_str.trim(), "%Y-%m-%d").map_err(|_| {
                ExtractError::Contract(format!("item {idx} has a non-ISO date: '{date_str}'"))
            })?;
            let description = row.description.ok_or_else(|| {
                ExtractError::Contract(format!("item {idx} is missing `description`"))
            })?;
            let Some(amount) = row.amount else {
                tracing::warn!(item = idx, "extracted row has no amount, skipping");
                continue;
            };
            out.push(ExtractedTransaction {
                date,
                description,
                amount,
                category: row.category,
                vendor: row.vendor,
            });
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn payload(json: &str) -> RawExtractionPayload {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn validate_accepts_complete_rows() {
        let p = payload(
            r#"{"transactions":[
                {"date":"2024-01-15","description":"AMAZON","amount":-49.99,"category":"Supplies","vendor":"Amazon"},
                {"date":"2024-01-16","description":"CLIENT PAYMENT","amount":1200}
            ]}"#,
        );
        let txs = p.validate().unwrap();
        assert_eq!(txs.len(), 2);
        assert_eq!(txs[0].amount, Decimal::from_str("-49.99").unwrap());
        assert_eq!(txs[0].vendor.as_deref(), Some("Amazon"));
        assert_eq!(txs[1].category, None);
    }

    #[test]
    fn validate_rejects_missing_date() {
        let p = payload(r#"{"transactions":[{"description":"X","amount":1}]}"#);
        assert!(matches!(p.validate(), Err(ExtractError::Contract(_))));
    }

    #[test]
    fn validate_rejects_non_iso_date() {
        let p = payload(r#"{"transactions":[{"date":"01/15/2024","description":"X","amount":1}]}"#);
        assert!(matches!(p.validate(), Err(ExtractError::Contract(_))));
    }

    #[test]
    fn validate_rejects_missing_description() {
        let p = payload(r#"{"transactions":[{"date":"2024-01-15","amount":1}]}"#);
        assert!(matches!(p.validate(), Err(ExtractError::Contract(_))));
    }

    #[test]
    fn validate_skips_rows_without_amount() {
        let p = payload(
            r#"{"transactions":[
                {"date":"2024-01-15","description":"NO AMOUNT"},
                {"date":"2024-01-16","description":"OK","amount":5}
            ]}"#,
        );
        let txs = p.validate().unwrap();
        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0].description, "OK");
    }

    #[test]
    fn validate_accepts_string_amounts() {
        // Some models return amounts as strings; Decimal's serde impl takes both.
        let p = payload(r#"{"transactions":[{"date":"2024-01-15","description":"X","amount":"-42.50"}]}"#);
        let txs = p.validate().unwrap();
        assert_eq!(txs[0].amount, Decimal::from_str("-42.50").unwrap());
    }

    #[test]
    fn validate_empty_payload_is_ok() {
        let p = payload(r#"{"transactions":[]}"#);
        assert!(p.validate().unwrap().is_empty());
    }
}
