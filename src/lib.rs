//! Per-country internet-speed statistics.
//!
//! `loader` turns CSV text into a `Dataset`, `analysis::analyze` derives
//! every series the dashboard draws, and the remaining modules format,
//! export and play back that output.
pub mod analysis;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod geo;
pub mod loader;
pub mod output;
pub mod playback;
pub mod reports;
pub mod selection;
pub mod types;
pub mod util;

pub use analysis::analyze;
pub use config::{AnalysisConfig, ParseOptions};
pub use error::{ReportError, Result};
pub use loader::{load_csv, parse_csv_text, LoadReport};
pub use types::{Analysis, Dataset};
