use crate::error::DataFetchError;
use flate2::write::{GzDecoder, ZlibDecoder};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Incremental inflater that picks gzip or zlib framing from the first two
/// bytes of the stream.
enum StreamDecoder {
    Detecting(Vec<u8>),
    Gzip(GzDecoder<Vec<u8>>),
    Zlib(ZlibDecoder<Vec<u8>>),
}

impl StreamDecoder {
    fn new() -> Self {
        Self::Detecting(Vec::with_capacity(GZIP_MAGIC.len()))
    }

    /// Feeds `chunk` and returns whatever output is ready.
    fn decode(&mut self, chunk: &[u8]) -> io::Result<Vec<u8>> {
        match self {
            Self::Detecting(head) => {
                head.extend_from_slice(chunk);
                if head.len() < GZIP_MAGIC.len() {
                    return Ok(Vec::new());
                }
                let head = std::mem::take(head);
                *self = if head.starts_with(&GZIP_MAGIC) {
                    Self::Gzip(GzDecoder::new(Vec::new()))
                } else {
                    Self::Zlib(ZlibDecoder::new(Vec::new()))
                };
                self.decode(&head)
            }
            Self::Gzip(decoder) => {
                decoder.write_all(chunk)?;
                Ok(std::mem::take(decoder.get_mut()))
            }
            Self::Zlib(decoder) => {
                decoder.write_all(chunk)?;
                Ok(std::mem::take(decoder.get_mut()))
            }
        }
    }

    fn finish(self) -> io::Result<Vec<u8>> {
        match self {
            Self::Detecting(head) if head.is_empty() => Ok(Vec::new()),
            Self::Detecting(_) => Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "compressed stream ended inside its header",
            )),
            Self::Gzip(decoder) => decoder.finish(),
            Self::Zlib(decoder) => decoder.finish(),
        }
    }
}

/// Writes remote chunks to a file, inflating them first when the source is
/// compressed.
pub(super) struct ChunkSink {
    path: PathBuf,
    writer: BufWriter<File>,
    decoder: Option<StreamDecoder>,
    written: u64,
}

impl ChunkSink {
    pub(super) fn new(path: &Path, file: File, compressed: bool) -> Self {
        Self {
            path: path.to_path_buf(),
            writer: BufWriter::new(file),
            decoder: compressed.then(StreamDecoder::new),
            written: 0,
        }
    }

    pub(super) async fn write(&mut self, chunk: &[u8]) -> Result<(), DataFetchError> {
        let decoded = match self.decoder.as_mut() {
            Some(decoder) => Some(decoder.decode(chunk).map_err(|source| {
                DataFetchError::Decompression {
                    path: self.path.clone(),
                    source,
                }
            })?),
            None => None,
        };

        match decoded {
            Some(bytes) => self.write_out(&bytes).await,
            None => self.write_out(chunk).await,
        }
    }

    /// Flushes the decoder and the file. Returns the number of bytes written.
    pub(super) async fn finish(mut self) -> Result<u64, DataFetchError> {
        if let Some(decoder) = self.decoder.take() {
            let rest = decoder
                .finish()
                .map_err(|source| DataFetchError::Decompression {
                    path: self.path.clone(),
                    source,
                })?;
            self.write_out(&rest).await?;
        }

        self.writer
            .flush()
            .await
            .map_err(|e| self.write_error(e))?;
        self.writer
            .get_ref()
            .sync_all()
            .await
            .map_err(|e| self.write_error(e))?;
        Ok(self.written)
    }

    async fn write_out(&mut self, bytes: &[u8]) -> Result<(), DataFetchError> {
        if bytes.is_empty() {
            return Ok(());
        }
        self.writer
            .write_all(bytes)
            .await
            .map_err(|e| self.write_error(e))?;
        self.written += bytes.len() as u64;
        Ok(())
    }

    fn write_error(&self, error: io::Error) -> DataFetchError {
        DataFetchError::FileWrite {
            path: self.path.clone(),
            reason: error.to_string(),
        }
    }
}
