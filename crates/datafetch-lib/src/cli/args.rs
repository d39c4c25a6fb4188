use clap::{ArgAction, Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Fetch {
        names: Vec<String>,
        keep_going: bool,
    },
    List,
    Compress {
        path: String,
    },
}

/// Options shared by every command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlobalOptions {
    pub config_path: Option<String>,
    pub data_dir: Option<String>,
    pub chunk_size: Option<usize>,
    pub no_progress: bool,
}

pub struct Args {
    pub command: Command,
    pub options: GlobalOptions,
    pub log_level: Level,
}

#[derive(Debug, Parser)]
#[command(
    name = "datafetch",
    version,
    about = "Download the dataset files listed in the manifest into a local data directory"
)]
struct Cli {
    #[arg(
        short = 'v',
        long = "verbose",
        help = "Sets the level of verbosity",
        action = ArgAction::Count,
        global = true
    )]
    verbose: u8,

    #[arg(
        short = 'c',
        long = "config",
        value_name = "FILE",
        help = "Optional config file overriding the built-in data directory and manifest",
        global = true
    )]
    config: Option<String>,

    #[arg(
        short = 'd',
        long = "data-dir",
        value_name = "DIR",
        help = "Overrides the directory manifest paths are relative to",
        global = true
    )]
    data_dir: Option<String>,

    #[arg(
        long = "chunk-size",
        value_name = "BYTES",
        help = "Overrides the number of bytes processed per chunk",
        global = true
    )]
    chunk_size: Option<usize>,

    #[arg(
        long = "no-progress",
        help = "Do not draw progress bars",
        global = true
    )]
    no_progress: bool,

    #[command(subcommand)]
    command: Option<CliCommand>,
}

#[derive(Debug, Subcommand)]
enum CliCommand {
    /// Fetch the named files, or every manifest entry when no names are given
    Fetch {
        #[arg(
            value_name = "NAME",
            help = "Case-insensitive fragment of a manifest file name"
        )]
        names: Vec<String>,

        #[arg(
            short = 'k',
            long = "keep-going",
            help = "Continue with the remaining files after a failure"
        )]
        keep_going: bool,
    },

    /// Show every manifest entry, its local status and its download URL
    List,

    /// Write a gzipped copy of a local file next to it
    Compress {
        #[arg(value_name = "FILE")]
        path: String,
    },
}

pub fn parse_args() -> Args {
    let args = args_from(Cli::parse());
    init_tracing(args.log_level);
    args
}

pub fn try_parse_args_from<I, T>(iter: I) -> Result<Args, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::try_parse_from(iter).map(args_from)
}

pub fn init_tracing(log_level: Level) {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let env_filter = build_env_filter(log_level, rust_log.as_deref());

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Filter for `log_level`. HTTP client internals are quieted unless the user
/// configured filtering through `RUST_LOG`.
fn build_env_filter(log_level: Level, rust_log: Option<&str>) -> EnvFilter {
    let builder = EnvFilter::builder().with_default_directive(log_level.into());
    match rust_log {
        Some(directives) => builder.parse_lossy(directives),
        None => {
            let mut env_filter = builder.parse_lossy("");
            for directive in ["hyper_util=warn", "reqwest=info"] {
                if let Ok(directive) = directive.parse() {
                    env_filter = env_filter.add_directive(directive);
                }
            }
            env_filter
        }
    }
}

fn args_from(cli: Cli) -> Args {
    let log_level = match cli.verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };

    // Without a subcommand every manifest entry is fetched
    let command = match cli.command {
        None => Command::Fetch {
            names: Vec::new(),
            keep_going: false,
        },
        Some(CliCommand::Fetch { names, keep_going }) => Command::Fetch { names, keep_going },
        Some(CliCommand::List) => Command::List,
        Some(CliCommand::Compress { path }) => Command::Compress { path },
    };

    Args {
        command,
        options: GlobalOptions {
            config_path: cli.config,
            data_dir: cli.data_dir,
            chunk_size: cli.chunk_size,
            no_progress: cli.no_progress,
        },
        log_level,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_arguments_fetches_everything() {
        let args = try_parse_args_from(["datafetch"]).unwrap();

        assert_eq!(
            args.command,
            Command::Fetch {
                names: vec![],
                keep_going: false
            }
        );
        assert_eq!(args.options, GlobalOptions::default());
        assert_eq!(args.log_level, Level::INFO);
    }

    #[test]
    fn test_fetch_with_names_and_global_options() {
        let args = try_parse_args_from([
            "datafetch",
            "fetch",
            "glove",
            "GSWA",
            "--keep-going",
            "--data-dir",
            "/tmp/datasets",
            "--no-progress",
            "-vv",
        ])
        .unwrap();

        assert_eq!(
            args.command,
            Command::Fetch {
                names: vec!["glove".to_string(), "GSWA".to_string()],
                keep_going: true
            }
        );
        assert_eq!(args.options.data_dir.as_deref(), Some("/tmp/datasets"));
        assert!(args.options.no_progress);
        assert_eq!(args.log_level, Level::TRACE);
    }

    #[test]
    fn test_compress_requires_a_file() {
        assert!(try_parse_args_from(["datafetch", "compress"]).is_err());

        let args =
            try_parse_args_from(["datafetch", "-c", "datafetch.yaml", "compress", "a.txt"]).unwrap();
        assert_eq!(
            args.command,
            Command::Compress {
                path: "a.txt".to_string()
            }
        );
        assert_eq!(args.options.config_path.as_deref(), Some("datafetch.yaml"));
    }

    #[test]
    fn test_http_client_logs_are_quieted_by_default() {
        let filter = build_env_filter(Level::TRACE, None).to_string();

        assert!(filter.contains("hyper_util=warn"), "{filter}");
        assert!(filter.contains("reqwest=info"), "{filter}");
    }

    #[test]
    fn test_rust_log_directives_are_kept() {
        let filter = build_env_filter(Level::INFO, Some("reqwest=trace")).to_string();

        assert!(filter.contains("reqwest=trace"), "{filter}");
        assert!(!filter.contains("reqwest=info"), "{filter}");
        assert!(!filter.contains("hyper_util"), "{filter}");
    }

    #[test]
    fn test_chunk_size_must_be_numeric() {
        assert!(try_parse_args_from(["datafetch", "--chunk-size", "lots"]).is_err());

        let args = try_parse_args_from(["datafetch", "list", "--chunk-size", "4096"]).unwrap();
        assert_eq!(args.command, Command::List);
        assert_eq!(args.options.chunk_size, Some(4096));
    }
}
