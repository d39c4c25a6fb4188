use crate::cli::args::{Command, GlobalOptions};
use crate::cli::params::{CompressParams, FetchParams, ListParams};
use crate::config::{ConfigOverrides, load_config};
use crate::error::DataFetchError;
use crate::fetch::BatchMode;
use crate::progress::ProgressMode;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub enum ResolvedCommand {
    Fetch(FetchParams),
    List(ListParams),
    Compress(CompressParams),
}

pub fn resolve_command(
    command: Command,
    options: GlobalOptions,
) -> Result<ResolvedCommand, DataFetchError> {
    if options.chunk_size == Some(0) {
        return Err(DataFetchError::CliArgumentValidation {
            details: "chunk-size must be greater than 0.".to_string(),
        });
    }

    let overrides = ConfigOverrides {
        data_dir: options.data_dir.map(PathBuf::from),
        chunk_size: options.chunk_size,
    };
    let progress = if options.no_progress {
        ProgressMode::Hidden
    } else {
        ProgressMode::Bar
    };

    match command {
        Command::Fetch { names, keep_going } => {
            if names.iter().any(|name| name.trim().is_empty()) {
                return Err(DataFetchError::CliArgumentValidation {
                    details: "File names must not be empty.".to_string(),
                });
            }

            let app_config = load_config(options.config_path.as_deref(), &overrides)?;
            if app_config.manifest.is_empty() {
                return Err(DataFetchError::InvalidConfig {
                    details: "No manifest entries defined in config".to_string(),
                });
            }

            Ok(ResolvedCommand::Fetch(FetchParams {
                app_config,
                names,
                mode: if keep_going {
                    BatchMode::KeepGoing
                } else {
                    BatchMode::FailFast
                },
                progress,
            }))
        }
        Command::List => {
            let app_config = load_config(options.config_path.as_deref(), &overrides)?;
            Ok(ResolvedCommand::List(ListParams { app_config }))
        }
        Command::Compress { path } => {
            let path = PathBuf::from(path);
            if !path.is_file() {
                return Err(DataFetchError::CliArgumentValidation {
                    details: format!("{} is not a file.", path.display()),
                });
            }
            Ok(ResolvedCommand::Compress(CompressParams { path }))
        }
    }
}
