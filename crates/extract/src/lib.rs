pub mod backend;
pub mod client;
pub mod types;

pub use backend::{ExtractError, ExtractionBackend, MockExtractor};
pub use client::{ExtractorConfig, HttpExtractor};
pub use types::ExtractedTransaction;
