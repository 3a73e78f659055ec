// Library interface for RoutePace modules
// This allows integration tests to access the core functionality

pub mod allocator;
pub mod config;
pub mod error;
pub mod export;
pub mod geodesy;
pub mod import;
pub mod logging;
pub mod models;
pub mod physics;
pub mod segmenter;
pub mod validation;

// Re-export commonly used types for convenience
pub use models::*;
pub use allocator::optimize;
pub use segmenter::{build_route, summarize, RouteSummary, DEFAULT_SEGMENT_LENGTH_M};
pub use config::AppConfig;
pub use export::{export_result, ExportFormat};
pub use import::ImportManager;
pub use error::{ImportError, RoutePaceError, Result};
pub use logging::{init_logging, LogConfig, LogFormat, LogLevel};
