pub mod bounds;
pub mod normalize;
pub mod pipeline;
pub mod sanitize;

pub use bounds::{BoundsError, MAX_CSV_BYTES, MAX_DATA_ROWS};
pub use normalize::{normalize_batch, resolve_source_name};
pub use pipeline::{IngestOutcome, IngestPipeline, IngestRequest, PipelineError};
pub use sanitize::sanitize_csv;
