use super::Config;
use crate::error::DataFetchError;
use config::Config as ConfigBuilder;
use config::{File, FileFormat};
use std::path::PathBuf;

/// Built-in configuration, including the dataset manifest.
pub const DEFAULT_CONFIG: &str = include_str!("default_config.yaml");

/// Values given on the command line, applied on top of every file source.
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub data_dir: Option<PathBuf>,
    pub chunk_size: Option<usize>,
}

pub fn load_config(
    config_path: Option<&str>,
    overrides: &ConfigOverrides,
) -> Result<Config, DataFetchError> {
    let mut builder =
        ConfigBuilder::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Yaml));

    if let Some(config_path) = config_path {
        builder = builder.add_source(File::with_name(config_path));
    }
    if let Some(data_dir) = &overrides.data_dir {
        builder = builder.set_override("data_dir", data_dir.to_string_lossy().into_owned())?;
    }
    if let Some(chunk_size) = overrides.chunk_size {
        builder = builder.set_override("chunk_size", chunk_size as u64)?;
    }

    let config: Config = builder.build()?.try_deserialize()?;
    config.validate()?;
    Ok(config)
}
