use thiserror::Error;

/// Hard ceiling on the UTF-8 byte length of an uploaded CSV.
pub const MAX_CSV_BYTES: usize = 5 * 1024 * 1024;
/// Hard ceiling on non-blank data rows (the header line is not counted).
pub const MAX_DATA_ROWS: usize = 1000;

/// Bounds violations are caller-fixable, so unlike the rest of the pipeline
/// their messages are returned to the caller verbatim. Keep them user-safe.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoundsError {
    #[error("CSV file exceeds the 5 MB size limit")]
    PayloadTooLarge,
    #[error("CSV file is empty")]
    EmptyInput,
    #[error("CSV file exceeds the limit of {MAX_DATA_ROWS} transaction rows")]
    TooManyRows,
}

/// Reject oversized or empty uploads before any parsing, sanitization, or
/// external call happens. This bounds the worst-case cost of a hostile upload.
pub fn check(raw_csv: &str) -> Result<(), BoundsError> {
    if raw_csv.len() > MAX_CSV_BYTES {
        return Err(BoundsError::PayloadTooLarge);
    }

    let non_blank_lines = raw_csv.lines().filter(|l| !l.trim().is_empty()).count();
    if non_blank_lines == 0 {
        return Err(BoundsError::EmptyInput);
    }
    // First non-blank line is the header.
    if non_blank_lines > MAX_DATA_ROWS + 1 {
        return Err(BoundsError::TooManyRows);
    }

    Ok(())
}
