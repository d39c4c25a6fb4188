use crate::error::DataFetchError;
use flate2::Compression;
use flate2::write::GzEncoder;
use std::ffi::OsString;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Path of the gzipped copy of `path`: the same file name with `.gz` appended.
pub fn compressed_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_default();
    name.push(".gz");
    path.with_file_name(name)
}

/// Writes a gzipped copy of `path` next to it and returns the new path.
///
/// Used to prepare dataset files for upload as compressed manifest sources.
pub fn compress_file(path: &Path) -> Result<PathBuf, DataFetchError> {
    let output_path = compressed_path(path);
    let write_error = |reason: String| DataFetchError::FileWrite {
        path: output_path.clone(),
        reason,
    };

    let input = File::open(path)?;
    let parent = output_path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let temp_file = tempfile::Builder::new()
        .suffix(".part")
        .tempfile_in(parent)
        .map_err(|e| write_error(format!("failed to create temporary file: {e}")))?;

    let mut encoder = GzEncoder::new(BufWriter::new(temp_file), Compression::default());
    let copied = std::io::copy(&mut BufReader::new(input), &mut encoder)
        .map_err(|e| write_error(e.to_string()))?;

    let mut writer = encoder.finish().map_err(|e| write_error(e.to_string()))?;
    writer.flush().map_err(|e| write_error(e.to_string()))?;
    let temp_file = writer
        .into_inner()
        .map_err(|e| write_error(e.error().to_string()))?;
    temp_file
        .as_file()
        .sync_all()
        .map_err(|e| write_error(e.to_string()))?;
    temp_file
        .persist(&output_path)
        .map_err(|e| write_error(e.error.to_string()))?;

    tracing::info!(
        bytes = copied,
        "Compressed {} to {}",
        path.display(),
        output_path.display()
    );
    Ok(output_path)
}
