use crate::cli::CompressParams;
use crate::compress::compress_file;
use crate::error::DataFetchError;

pub async fn run_compress(params: CompressParams) -> Result<(), DataFetchError> {
    let CompressParams { path } = params;

    tracing::info!("Compressing {}...", path.display());
    let output_path = tokio::task::spawn_blocking(move || compress_file(&path))
        .await
        .map_err(eyre::Report::new)??;

    println!("{}", output_path.display());
    Ok(())
}
