mod args;
mod compress;
mod fetch;
mod list;
mod params;
mod resolved_command;

pub use args::{Args, Command, GlobalOptions, init_tracing, parse_args, try_parse_args_from};
pub use compress::run_compress;
pub use fetch::run_fetch;
pub use list::run_list;
pub use params::{CompressParams, FetchParams, ListParams};
pub use resolved_command::{ResolvedCommand, resolve_command};
