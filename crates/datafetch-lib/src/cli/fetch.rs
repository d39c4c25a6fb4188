use crate::cli::FetchParams;
use crate::error::DataFetchError;
use crate::fetch::Fetcher;
use tracing;

pub async fn run_fetch(params: FetchParams) -> Result<(), DataFetchError> {
    let FetchParams {
        app_config,
        names,
        mode,
        progress,
    } = params;

    tracing::info!(
        "Using data directory {} ({} manifest entries)",
        app_config.data_dir.display(),
        app_config.manifest.len()
    );
    let fetcher = Fetcher::new(app_config)?.with_progress(progress);

    let report = if names.is_empty() {
        fetcher.fetch_all(mode).await?
    } else {
        fetcher.fetch_names(&names, mode).await?
    };

    if !report.is_success() {
        for failure in &report.failed {
            tracing::error!("{}: {}", failure.name, failure.error);
        }
        return Err(DataFetchError::BatchFailed {
            failed: report.failed.len(),
            total: report.total(),
        });
    }

    tracing::info!("{} files available", report.fetched.len());
    Ok(())
}
