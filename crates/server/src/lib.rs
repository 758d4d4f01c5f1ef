pub mod app;
pub mod config;
pub mod error;

pub use app::{build_router, AppState};
pub use config::Config;
