use crate::config::Config;
use crate::download::{DownloadTarget, download_to_path};
use crate::error::DataFetchError;
use crate::manifest::ManifestEntry;
use crate::progress::ProgressMode;
use crate::resolver::LinkResolvers;
use reqwest::Client;
use std::path::{Path, PathBuf};

const USER_AGENT: &str = concat!("datafetch/", env!("CARGO_PKG_VERSION"));

/// How a batch reacts to a failed fetch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BatchMode {
    /// Stop at the first failure and return it.
    #[default]
    FailFast,
    /// Attempt every item and collect the failures in the report.
    KeepGoing,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BatchFailure {
    pub name: String,
    pub error: String,
}

#[derive(Clone, Debug, Default)]
pub struct BatchReport {
    /// Relative paths of every file that is now present locally
    pub fetched: Vec<PathBuf>,
    pub failed: Vec<BatchFailure>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.fetched.len() + self.failed.len()
    }

    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    fn record(
        &mut self,
        name: &str,
        result: Result<PathBuf, DataFetchError>,
        mode: BatchMode,
    ) -> Result<(), DataFetchError> {
        match result {
            Ok(path) => self.fetched.push(path),
            Err(err) if mode == BatchMode::FailFast => return Err(err),
            Err(err) => {
                tracing::warn!("Fetching {} failed: {:#}", name, err);
                self.failed.push(BatchFailure {
                    name: name.to_string(),
                    error: err.to_string(),
                });
            }
        }
        Ok(())
    }
}

pub struct Fetcher {
    config: Config,
    client: Client,
    resolvers: LinkResolvers,
    progress: ProgressMode,
}

impl Fetcher {
    pub fn new(config: Config) -> Result<Self, DataFetchError> {
        let client = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self::with_client(config, client))
    }

    pub fn with_client(config: Config, client: Client) -> Self {
        Self {
            config,
            client,
            resolvers: LinkResolvers::default(),
            progress: ProgressMode::default(),
        }
    }

    pub fn with_resolvers(mut self, resolvers: LinkResolvers) -> Self {
        self.resolvers = resolvers;
        self
    }

    pub fn with_progress(mut self, progress: ProgressMode) -> Self {
        self.progress = progress;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Every manifest entry whose file name contains `name`, ignoring case.
    pub fn matching_entries(&self, name: &str) -> Vec<&ManifestEntry> {
        self.config.manifest.matching(name).collect()
    }

    /// First manifest entry whose file name contains `name`, ignoring case.
    pub fn find_entry(&self, name: &str) -> Result<&ManifestEntry, DataFetchError> {
        let candidates = self.matching_entries(name);
        let Some(&entry) = candidates.first() else {
            return Err(DataFetchError::NoMatchingEntry {
                name: name.to_string(),
            });
        };

        if candidates.len() > 1 {
            tracing::warn!(
                "{:?} matches {} manifest entries, using {}",
                name,
                candidates.len(),
                entry.path.display()
            );
        }
        Ok(entry)
    }

    pub fn target_for(&self, entry: &ManifestEntry) -> DownloadTarget {
        DownloadTarget {
            url: self.resolvers.resolve(&entry.url),
            relative_path: entry.path.clone(),
            local_path: self.config.data_dir.join(&entry.path),
            compressed: entry.compressed,
        }
    }

    /// Fetches the entry matching `name` unless it is already present and
    /// returns its path relative to the data directory.
    pub async fn fetch(&self, name: &str) -> Result<PathBuf, DataFetchError> {
        let entry = self.find_entry(name)?;
        self.fetch_entry(entry).await
    }

    pub async fn fetch_entry(&self, entry: &ManifestEntry) -> Result<PathBuf, DataFetchError> {
        let target = self.target_for(entry);
        tracing::trace!(path = %target.local_path.display(), url = %target.url, "Checking");

        if is_present(&target.local_path).await {
            tracing::info!(
                "{} already present, skipping download",
                target.relative_path.display()
            );
            return Ok(target.relative_path);
        }

        if let Some(parent) = target.local_path.parent()
            && !parent.exists()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| DataFetchError::DirectoryCreation {
                    path: parent.to_path_buf(),
                    reason: e.to_string(),
                })?;
        }

        tracing::info!(
            "Downloading {} to {}",
            target.relative_path.display(),
            target.local_path.display()
        );
        let written =
            download_to_path(&self.client, &target, self.config.chunk_size, self.progress).await?;
        tracing::info!(
            bytes = written,
            "Fetched {}",
            target.relative_path.display()
        );

        Ok(target.relative_path)
    }

    /// Fetches every manifest entry, one at a time, in manifest order.
    pub async fn fetch_all(&self, mode: BatchMode) -> Result<BatchReport, DataFetchError> {
        let mut report = BatchReport::default();
        for entry in self.config.manifest.iter() {
            let result = self.fetch_entry(entry).await;
            report.record(entry.file_name(), result, mode)?;
        }
        Ok(report)
    }

    /// Fetches each of `names` in turn.
    pub async fn fetch_names(
        &self,
        names: &[String],
        mode: BatchMode,
    ) -> Result<BatchReport, DataFetchError> {
        let mut report = BatchReport::default();
        for name in names {
            let result = self.fetch(name).await;
            report.record(name, result, mode)?;
        }
        Ok(report)
    }
}

/// Only a regular file counts as a cached download.
async fn is_present(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .is_ok_and(|metadata| metadata.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::{Manifest, ManifestEntry};

    fn fetcher_in(data_dir: &Path) -> Fetcher {
        let manifest = Manifest::new(vec![
            ManifestEntry::new(
                "glove.6B.50d.txt",
                "https://1drv.ms/u/s!As2ibEui13xml4JKELeEITUmX0WUHQ?e=kp6Yw9",
                true,
            ),
            ManifestEntry::new(
                "word2vec/word2vec_gswa.bin",
                "http://127.0.0.1:9/word2vec_gswa.bin",
                false,
            ),
        ])
        .unwrap();
        Fetcher::new(Config::new(data_dir, manifest))
            .unwrap()
            .with_progress(ProgressMode::Hidden)
    }

    #[test]
    fn test_target_for_share_link_uses_resolver() {
        let fetcher = fetcher_in(Path::new("/data"));
        let entry = fetcher.find_entry("GLOVE").unwrap();
        let target = fetcher.target_for(entry);

        assert!(target.url.starts_with("https://api.onedrive.com/v1.0/shares/u!"));
        assert_eq!(target.relative_path, Path::new("glove.6B.50d.txt"));
        assert_eq!(target.local_path, Path::new("/data/glove.6B.50d.txt"));
        assert!(target.compressed);
    }

    #[test]
    fn test_target_for_direct_url_is_unchanged() {
        let fetcher = fetcher_in(Path::new("/data"));
        let entry = fetcher.find_entry("gswa").unwrap();
        let target = fetcher.target_for(entry);

        assert_eq!(target.url, "http://127.0.0.1:9/word2vec_gswa.bin");
        assert_eq!(
            target.local_path,
            Path::new("/data/word2vec/word2vec_gswa.bin")
        );
        assert!(!target.compressed);
    }

    #[tokio::test]
    async fn test_existing_file_is_returned_without_network() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = fetcher_in(dir.path());
        std::fs::create_dir_all(dir.path().join("word2vec")).unwrap();
        std::fs::write(dir.path().join("word2vec/word2vec_gswa.bin"), b"cached").unwrap();

        // The URL points at the discard port, any request would fail
        let path = fetcher.fetch("word2vec_GSWA").await.unwrap();

        assert_eq!(path, Path::new("word2vec/word2vec_gswa.bin"));
        assert_eq!(
            std::fs::read(dir.path().join(&path)).unwrap(),
            b"cached"
        );
    }

    #[tokio::test]
    async fn test_directory_at_target_path_is_not_a_cached_file() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = fetcher_in(dir.path());
        std::fs::create_dir_all(dir.path().join("word2vec/word2vec_gswa.bin")).unwrap();

        // Not treated as present, so the download is attempted and the
        // discard port refuses it
        let err = fetcher.fetch("gswa").await.unwrap_err();

        assert!(
            matches!(err, DataFetchError::Network { .. }),
            "Unexpected error: {err:?}"
        );
    }

    #[test]
    fn test_matching_entries_lists_every_candidate() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = fetcher_in(dir.path());

        let paths: Vec<&Path> = fetcher
            .matching_entries(".")
            .into_iter()
            .map(|entry| entry.path.as_path())
            .collect();
        assert_eq!(
            paths,
            vec![
                Path::new("glove.6B.50d.txt"),
                Path::new("word2vec/word2vec_gswa.bin")
            ]
        );
        assert!(fetcher.matching_entries("fasttext").is_empty());
        assert_eq!(
            fetcher.find_entry(".").unwrap().path,
            Path::new("glove.6B.50d.txt")
        );
    }

    #[tokio::test]
    async fn test_unknown_name_fails_before_touching_disk() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().join("data");
        let fetcher = fetcher_in(&data_dir);

        let err = fetcher.fetch("doesnotexist").await.unwrap_err();

        assert!(matches!(err, DataFetchError::NoMatchingEntry { .. }));
        assert!(!data_dir.exists());
    }

    #[test]
    fn test_report_keep_going_collects_failures() {
        let mut report = BatchReport::default();
        report
            .record("a.txt", Ok(PathBuf::from("a.txt")), BatchMode::KeepGoing)
            .unwrap();
        report
            .record(
                "b.txt",
                Err(DataFetchError::NoMatchingEntry {
                    name: "b.txt".to_string(),
                }),
                BatchMode::KeepGoing,
            )
            .unwrap();

        assert_eq!(report.total(), 2);
        assert!(!report.is_success());
        assert_eq!(report.failed[0].name, "b.txt");
    }

    #[test]
    fn test_report_fail_fast_returns_error() {
        let mut report = BatchReport::default();
        let result = report.record(
            "b.txt",
            Err(DataFetchError::NoMatchingEntry {
                name: "b.txt".to_string(),
            }),
            BatchMode::FailFast,
        );

        assert!(result.is_err());
        assert!(report.failed.is_empty());
    }
}
