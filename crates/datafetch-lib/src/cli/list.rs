use crate::cli::ListParams;
use crate::error::DataFetchError;
use crate::fetch::Fetcher;

pub async fn run_list(params: ListParams) -> Result<(), DataFetchError> {
    let fetcher = Fetcher::new(params.app_config)?;

    for entry in fetcher.config().manifest.iter() {
        let target = fetcher.target_for(entry);
        let status = if target.local_path.is_file() {
            "present"
        } else {
            "missing"
        };
        let encoding = if target.compressed { "compressed" } else { "raw" };
        println!(
            "{:<8} {:<10} {}\n         {}",
            status,
            encoding,
            target.relative_path.display(),
            target.url
        );
    }

    Ok(())
}
