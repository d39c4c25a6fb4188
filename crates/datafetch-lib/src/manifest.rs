use crate::error::DataFetchError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Component, PathBuf};

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ManifestEntry {
    /// Local path, relative to the data directory
    pub path: PathBuf,
    /// Remote location, either a share link or a direct download URL
    pub url: String,
    /// Whether the remote stream is gzip compressed
    #[serde(default)]
    pub compressed: bool,
}

impl ManifestEntry {
    pub fn new(path: impl Into<PathBuf>, url: impl Into<String>, compressed: bool) -> Self {
        Self {
            path: path.into(),
            url: url.into(),
            compressed,
        }
    }

    /// Base name of the local file.
    pub fn file_name(&self) -> &str {
        self.path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or_default()
    }

    /// Case-insensitive substring match of `fragment` against the base name.
    pub fn matches(&self, fragment: &str) -> bool {
        self.file_name()
            .to_lowercase()
            .contains(&fragment.to_lowercase())
    }

    fn validate(&self) -> Result<(), DataFetchError> {
        let invalid = |details: &str| DataFetchError::InvalidManifest {
            path: self.path.clone(),
            details: details.to_string(),
        };

        if self.url.trim().is_empty() {
            return Err(invalid("url must not be empty"));
        }
        if self.path.is_absolute() || self.path.has_root() {
            return Err(invalid("path must be relative to the data directory"));
        }
        if self
            .path
            .components()
            .any(|c| matches!(c, Component::ParentDir))
        {
            return Err(invalid("path must not leave the data directory"));
        }
        if self.path.file_name().and_then(|n| n.to_str()).is_none() {
            return Err(invalid("path must end in a UTF-8 file name"));
        }
        Ok(())
    }
}

/// Ordered table of the files this tool knows how to fetch.
///
/// Declaration order matters: fragment lookups pick the first match and batch
/// fetches walk the entries in this order.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(try_from = "Vec<ManifestEntry>", into = "Vec<ManifestEntry>")]
pub struct Manifest {
    entries: Vec<ManifestEntry>,
}

impl Manifest {
    pub fn new(entries: Vec<ManifestEntry>) -> Result<Self, DataFetchError> {
        let mut seen = HashSet::new();
        for entry in &entries {
            entry.validate()?;
            if !seen.insert(entry.path.as_path()) {
                return Err(DataFetchError::DuplicateManifestPath {
                    path: entry.path.clone(),
                });
            }
        }
        Ok(Self { entries })
    }

    pub fn iter(&self) -> impl Iterator<Item = &ManifestEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every entry whose base name contains `fragment`, in manifest order.
    pub fn matching<'a>(
        &'a self,
        fragment: &str,
    ) -> impl Iterator<Item = &'a ManifestEntry> + use<'a> {
        let fragment = fragment.to_owned();
        self.entries
            .iter()
            .filter(move |entry| entry.matches(&fragment))
    }

    pub fn find(&self, fragment: &str) -> Result<&ManifestEntry, DataFetchError> {
        self.matching(fragment)
            .next()
            .ok_or_else(|| DataFetchError::NoMatchingEntry {
                name: fragment.to_string(),
            })
    }
}

impl TryFrom<Vec<ManifestEntry>> for Manifest {
    type Error = DataFetchError;

    fn try_from(entries: Vec<ManifestEntry>) -> Result<Self, Self::Error> {
        Self::new(entries)
    }
}

impl From<Manifest> for Vec<ManifestEntry> {
    fn from(manifest: Manifest) -> Self {
        manifest.entries
    }
}
