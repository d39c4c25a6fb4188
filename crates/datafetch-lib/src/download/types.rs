use std::path::PathBuf;

/// A manifest entry resolved for one fetch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DownloadTarget {
    /// Direct-download URL
    pub url: String,
    /// Path relative to the data directory, as declared in the manifest
    pub relative_path: PathBuf,
    /// `relative_path` joined onto the data directory
    pub local_path: PathBuf,
    /// Whether the remote stream is gzip compressed
    pub compressed: bool,
}

impl DownloadTarget {
    pub fn file_name(&self) -> String {
        self.relative_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}
