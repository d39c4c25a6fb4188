use datafetch_lib::cli::{
    ResolvedCommand, parse_args, resolve_command, run_compress, run_fetch, run_list,
};
use datafetch_lib::error::DataFetchError;

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<(), DataFetchError> {
    color_eyre::install()?;

    let args = parse_args();
    let command = resolve_command(args.command, args.options)?;

    match command {
        ResolvedCommand::Fetch(params) => run_fetch(params).await?,
        ResolvedCommand::List(params) => run_list(params).await?,
        ResolvedCommand::Compress(params) => run_compress(params).await?,
    }

    Ok(())
}
