use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use axum::http::{Response, StatusCode, Uri};
use axum::{Router, serve};
use datafetch_lib::config::Config;
use datafetch_lib::manifest::{Manifest, ManifestEntry};
use datafetch_lib::progress::ProgressMode;
use datafetch_lib::Fetcher;
use eyre::Result;
use flate2::Compression;
use flate2::write::GzEncoder;
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::net::TcpListener;

/// How the test server sends a file body.
#[derive(Clone, Debug)]
pub enum ServedFile {
    /// Plain response with a content-length header
    WithLength(Vec<u8>),
    /// Chunked response without a content-length header
    WithoutLength(Vec<u8>),
}

#[derive(Clone)]
struct ServerState {
    files: Arc<HashMap<String, ServedFile>>,
    requests: Arc<AtomicUsize>,
}

/// Local HTTP server that serves fixed bodies by path and counts requests.
pub struct TestHttpServer {
    base_url: String,
    requests: Arc<AtomicUsize>,
}

impl TestHttpServer {
    pub async fn spawn(files: Vec<(&str, ServedFile)>) -> Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let requests = Arc::new(AtomicUsize::new(0));
        let state = ServerState {
            files: Arc::new(
                files
                    .into_iter()
                    .map(|(path, file)| (format!("/{}", path.trim_start_matches('/')), file))
                    .collect(),
            ),
            requests: requests.clone(),
        };

        let router = Router::new().fallback(serve_file).with_state(state);
        tokio::spawn(async move {
            let _ = serve(listener, router).await;
        });

        Ok(Self {
            base_url: format!("http://{addr}"),
            requests,
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

async fn serve_file(State(state): State<ServerState>, uri: Uri) -> Response<Body> {
    state.requests.fetch_add(1, Ordering::SeqCst);

    let response = match state.files.get(uri.path()) {
        Some(ServedFile::WithLength(body)) => Response::builder()
            .status(StatusCode::OK)
            .header(CONTENT_TYPE, "application/octet-stream")
            .header(CONTENT_LENGTH, body.len())
            .body(Body::from(body.clone())),
        Some(ServedFile::WithoutLength(body)) => {
            let chunks: Vec<Result<Bytes, std::io::Error>> = body
                .chunks(1024)
                .map(|chunk| Ok(Bytes::copy_from_slice(chunk)))
                .collect();
            Response::builder()
                .status(StatusCode::OK)
                .header(CONTENT_TYPE, "application/octet-stream")
                .body(Body::from_stream(futures::stream::iter(chunks)))
        }
        None => Response::builder()
            .status(StatusCode::NOT_FOUND)
            .body(Body::empty()),
    };

    response.unwrap_or_else(|_| Response::new(Body::empty()))
}

pub fn gzip(data: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(data)
        .expect("writing to a Vec cannot fail");
    encoder.finish().expect("writing to a Vec cannot fail")
}

/// Plaintext large enough to span many chunks.
pub fn sample_corpus() -> String {
    (0..2000)
        .map(|i| format!("token{i} 0.{i:04} -0.{:04} 0.5\n", 9999 - i))
        .collect()
}

pub fn create_test_config(data_dir: &Path, entries: Vec<ManifestEntry>) -> Result<Config> {
    Ok(Config::new(data_dir, Manifest::new(entries)?))
}

pub fn create_test_fetcher(data_dir: &Path, entries: Vec<ManifestEntry>) -> Result<Fetcher> {
    let config = create_test_config(data_dir, entries)?;
    Ok(Fetcher::new(config)?.with_progress(ProgressMode::Hidden))
}

pub fn write_test_config(dir: &Path, config: &Config) -> Result<PathBuf> {
    let config_path = dir.join("datafetch.json");
    std::fs::write(&config_path, serde_json::to_string_pretty(config)?)?;
    Ok(config_path)
}

/// Names of leftover temporary download files under `dir`.
pub fn partial_files(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.to_string_lossy().ends_with(".part"))
        .collect()
}

pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter("datafetch_lib=debug,datafetch_e2e_tests=debug")
        .with_test_writer()
        .try_init()
        .ok();
}
