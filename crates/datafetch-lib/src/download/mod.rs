#[allow(clippy::module_inception)]
mod download;
mod sink;
mod types;

pub use download::download_to_path;
pub use types::DownloadTarget;
