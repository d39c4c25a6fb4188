use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DataFetchError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid configuration: {details}")]
    InvalidConfig { details: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("No manifest entry matches {name:?}")]
    NoMatchingEntry { name: String },

    #[error("Manifest path {path} is declared more than once")]
    DuplicateManifestPath { path: PathBuf },

    #[error("Invalid manifest entry {path}: {details}")]
    InvalidManifest { path: PathBuf, details: String },

    #[error("Failed to fetch {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Server returned HTTP {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Response from {url} has no usable content-length header")]
    MissingContentLength { url: String },

    #[error("Failed to decompress data for {path}: {source}")]
    Decompression {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {reason}")]
    FileWrite { path: PathBuf, reason: String },

    #[error("Directory creation failed at {path}: {reason}")]
    DirectoryCreation { path: PathBuf, reason: String },

    #[error("{failed} of {total} fetches failed")]
    BatchFailed { failed: usize, total: usize },

    #[error("Invalid command line arguments: {details}")]
    CliArgumentValidation { details: String },

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected error: {0}")]
    Unexpected(#[from] eyre::Report),
}
