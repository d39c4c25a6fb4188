use super::sink::ChunkSink;
use super::types::DownloadTarget;
use crate::error::DataFetchError;
use crate::progress::ProgressMode;
use futures::StreamExt;
use indicatif::ProgressBar;
use reqwest::header::CONTENT_LENGTH;
use reqwest::{Client, Response};
use std::path::Path;
use tempfile::TempPath;

/// Streams `target` to its local path and returns the number of bytes written.
///
/// The body is written to a hidden `.part` file next to the target and renamed
/// into place only after the last byte has been flushed, so an interrupted
/// transfer never leaves a file at `target.local_path`.
pub async fn download_to_path(
    client: &Client,
    target: &DownloadTarget,
    chunk_size: usize,
    progress: ProgressMode,
) -> Result<u64, DataFetchError> {
    let response = client
        .get(&target.url)
        .send()
        .await
        .map_err(|source| DataFetchError::Network {
            url: target.url.clone(),
            source,
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(DataFetchError::HttpStatus {
            url: target.url.clone(),
            status: status.as_u16(),
        });
    }

    let total = content_length(&response).ok_or_else(|| DataFetchError::MissingContentLength {
        url: target.url.clone(),
    })?;
    tracing::debug!(url = %target.url, total, compressed = target.compressed, "Response received");

    let parent = target
        .local_path
        .parent()
        .unwrap_or_else(|| Path::new("."));
    let temp_file = tempfile::Builder::new()
        .prefix(&format!(".{}.", target.file_name()))
        .suffix(".part")
        .tempfile_in(parent)
        .map_err(|e| DataFetchError::FileWrite {
            path: target.local_path.clone(),
            reason: format!("failed to create temporary file: {e}"),
        })?;
    let (file, temp_path) = temp_file.into_parts();

    let bar = progress.bytes_bar(&target.file_name(), total);
    let sink = ChunkSink::new(&target.local_path, tokio::fs::File::from_std(file), target.compressed);

    // Dropping the temporary path on any error removes the partial file
    let result = match stream_body(response, sink, chunk_size, &bar, target).await {
        Ok(written) => persist(temp_path, target).map(|()| written),
        Err(err) => Err(err),
    };
    settle_progress(&bar, result)
}

/// Finishes the bar on success and abandons it on any failure.
fn settle_progress<T>(
    bar: &ProgressBar,
    result: Result<T, DataFetchError>,
) -> Result<T, DataFetchError> {
    match &result {
        Ok(_) => bar.finish(),
        Err(_) => bar.abandon(),
    }
    result
}

async fn stream_body(
    response: Response,
    mut sink: ChunkSink,
    chunk_size: usize,
    bar: &ProgressBar,
    target: &DownloadTarget,
) -> Result<u64, DataFetchError> {
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|source| DataFetchError::Network {
            url: target.url.clone(),
            source,
        })?;

        for piece in chunk.chunks(chunk_size) {
            sink.write(piece).await?;
            bar.inc(piece.len() as u64);
        }
    }

    sink.finish().await
}

fn persist(temp_path: TempPath, target: &DownloadTarget) -> Result<(), DataFetchError> {
    temp_path
        .persist(&target.local_path)
        .map_err(|e| DataFetchError::FileWrite {
            path: target.local_path.clone(),
            reason: format!("failed to move download into place: {}", e.error),
        })
}

fn content_length(response: &Response) -> Option<u64> {
    response
        .headers()
        .get(CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse().ok())
}
