use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::money::Money;

/// Provenance tag for rows created by the CSV upload path.
pub const IMPORT_CHANNEL_CSV: &str = "csv";
/// Distinguishes rows produced by the extraction-service pipeline from other
/// CSV entry points (manual entry screens, future OFX support, ...).
pub const IMPORT_ORIGIN_AI_EXTRACTION: &str = "ai-extraction";
/// Last-resort source account label when the caller supplies neither a
/// display name nor a resolvable account id.
pub const FALLBACK_SOURCE_NAME: &str = "CSV Import";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Debit,
    Credit,
}

impl Direction {
    /// Derive the direction from a signed amount. Zero counts as a credit.
    pub fn of(amount: Decimal) -> Self {
        if amount.is_sign_negative() && !amount.is_zero() {
            Direction::Debit
        } else {
            Direction::Credit
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Debit => "debit",
            Direction::Credit => "credit",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Direction {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "debit" => Ok(Direction::Debit),
            "credit" => Ok(Direction::Credit),
            other => Err(format!("Unknown direction: '{other}'")),
        }
    }
}

/// A normalized ledger row ready for insertion. The amount is always
/// non-negative; the sign of the original bank amount lives in `direction`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewLedgerTransaction {
    pub organization_id: String,
    pub account_id: Option<String>,
    pub date: NaiveDate,
    pub description: String,
    pub amount: Money,
    pub direction: Direction,
    pub category: Option<String>,
    pub vendor: Option<String>,
    pub source_account_name: String,
    pub import_channel: String,
    pub import_origin: String,
}
