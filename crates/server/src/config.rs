use std::env;
use std::path::PathBuf;

use tally_extract::ExtractorConfig;

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub database_path: PathBuf,
    pub extractor: ExtractorConfig,
}

impl Config {
    /// Everything is environment-driven. Only the extraction credential has
    /// no default; its absence surfaces per request rather than at startup,
    /// so the rest of the API keeps serving.
    pub fn from_env() -> Self {
        let defaults = ExtractorConfig::default();
        Config {
            bind_addr: env::var("TALLY_BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string()),
            database_path: env::var("TALLY_DATABASE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("tally.db")),
            extractor: ExtractorConfig {
                api_url: env::var("EXTRACTION_API_URL").unwrap_or(defaults.api_url),
                api_key: env::var("EXTRACTION_API_KEY").ok().filter(|k| !k.is_empty()),
                model: env::var("EXTRACTION_MODEL").unwrap_or(defaults.model),
            },
        }
    }
}
