use std::sync::OnceLock;

use regex::Regex;
use tally_core::{
    Direction, Money, NewLedgerTransaction, FALLBACK_SOURCE_NAME, IMPORT_CHANNEL_CSV,
    IMPORT_ORIGIN_AI_EXTRACTION,
};
use tally_extract::ExtractedTransaction;

fn re_whitespace() -> &'static Regex {
    static R: OnceLock<Regex> = OnceLock::new();
    R.get_or_init(|| Regex::new(r"\s+").expect("invalid regex"))
}

/// Map extracted records into canonical ledger rows for one organization.
///
/// The sign of each extracted amount is split into `direction` here — the one
/// place that information is legally discarded from the amount itself.
pub fn normalize_batch(
    extracted: Vec<ExtractedTransaction>,
    organization_id: &str,
    account_id: Option<&str>,
    source_account_name: &str,
) -> Vec<NewLedgerTransaction> {
    extracted
        .into_iter()
        .map(|tx| NewLedgerTransaction {
            organization_id: organization_id.to_string(),
            account_id: account_id.map(str::to_string),
            date: tx.date,
            description: tx.description,
            amount: Money::from_decimal(tx.amount).abs(),
            direction: Direction::of(tx.amount),
            category: clean_optional(tx.category),
            vendor: clean_vendor(tx.vendor),
            source_account_name: source_account_name.to_string(),
            import_channel: IMPORT_CHANNEL_CSV.to_string(),
            import_origin: IMPORT_ORIGIN_AI_EXTRACTION.to_string(),
        })
        .collect()
}

/// Resolution order: explicit caller-supplied display name, then the stored
/// account name, then the literal fallback. Never empty.
pub fn resolve_source_name(explicit: Option<&str>, stored: Option<&str>) -> String {
    explicit
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .or_else(|| stored.map(str::trim).filter(|s| !s.is_empty()))
        .unwrap_or(FALLBACK_SOURCE_NAME)
        .to_string()
}

/// Trim; empty or whitespace-only becomes None, never an empty string.
fn clean_optional(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Vendor names additionally get internal whitespace runs collapsed — bank
/// exports love double spaces ("AMAZON  MKTP  US").
fn clean_vendor(value: Option<String>) -> Option<String> {
    clean_optional(value).map(|s| re_whitespace().replace_all(&s, " ").into_owned())
}
