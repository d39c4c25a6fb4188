use crate::config::Config;
use crate::fetch::BatchMode;
use crate::progress::ProgressMode;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct FetchParams {
    pub app_config: Config,
    /// Name fragments to fetch; empty means the whole manifest
    pub names: Vec<String>,
    pub mode: BatchMode,
    pub progress: ProgressMode,
}

#[derive(Debug, Clone)]
pub struct ListParams {
    pub app_config: Config,
}

#[derive(Debug, Clone)]
pub struct CompressParams {
    pub path: PathBuf,
}
