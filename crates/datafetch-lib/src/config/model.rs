use crate::error::DataFetchError;
use crate::manifest::Manifest;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_CHUNK_SIZE: usize = 16 * 1024;

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Root directory that manifest paths are relative to
    pub data_dir: PathBuf,
    /// Maximum number of bytes handed to the writer at once
    pub chunk_size: usize,
    pub manifest: Manifest,
}

impl Config {
    pub fn new(data_dir: impl Into<PathBuf>, manifest: Manifest) -> Self {
        Self {
            data_dir: data_dir.into(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            manifest,
        }
    }

    pub fn validate(&self) -> Result<(), DataFetchError> {
        if self.chunk_size == 0 {
            return Err(DataFetchError::InvalidConfig {
                details: "chunk_size must be greater than 0".to_string(),
            });
        }
        if self.data_dir.as_os_str().is_empty() {
            return Err(DataFetchError::InvalidConfig {
                details: "data_dir must not be empty".to_string(),
            });
        }
        Ok(())
    }
}
