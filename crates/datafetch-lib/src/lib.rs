pub mod cli;
pub mod compress;
pub mod config;
pub mod download;
pub mod error;
pub mod fetch;
pub mod manifest;
pub mod progress;
pub mod resolver;

pub use config::Config;
pub use error::DataFetchError;
pub use fetch::{BatchMode, BatchReport, Fetcher};
pub use manifest::{Manifest, ManifestEntry};
