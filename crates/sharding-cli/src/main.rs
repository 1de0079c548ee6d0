//! shardcfg - compile and dump sharding rule documents.
//!
//! Reads a JSON or TOML element tree, compiles it, and prints the resulting
//! configuration to stdout. Diagnostics go to stderr.

use std::path::PathBuf;

use anyhow::Context;
use tracing::{error, info, info_span};

use sharding_config::{CompileOptions, ConfigError, DocumentLoader};
use sharding_telemetry::{init_logging, parse_log_format, LogConfig};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Command-line arguments.
struct Args {
    /// Path to the rule document.
    config: Option<PathBuf>,
    /// Print JSON instead of the text dump.
    json: bool,
    /// Treat the document as an `encryptDataSource` wrapper.
    data_source: bool,
    options: CompileOptions,
    log: LogConfig,
}

impl Args {
    fn parse() -> Self {
        let mut args = std::env::args().skip(1);
        let mut config = None;
        let mut json = false;
        let mut data_source = false;
        let mut options = CompileOptions::new();
        let mut log = LogConfig::default();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" | "-c" => {
                    config = args.next().map(PathBuf::from);
                }
                "--json" => json = true,
                "--data-source" => data_source = true,
                "--validate-bindings" => {
                    options = options.validate_binding_tables(true);
                }
                "--load-balance-refs" => {
                    options = options.resolve_load_balance_refs(true);
                }
                "--log-level" => {
                    if let Some(level) = args.next() {
                        log = log.with_level(level);
                    }
                }
                "--log-format" => {
                    let format = args.next().unwrap_or_default();
                    match parse_log_format(&format) {
                        Ok(json_format) => log.json_format = json_format,
                        Err(e) => {
                            eprintln!("{e}");
                            std::process::exit(1);
                        }
                    }
                }
                "--help" | "-h" => {
                    print_help();
                    std::process::exit(0);
                }
                "--version" | "-v" => {
                    println!("shardcfg {VERSION}");
                    std::process::exit(0);
                }
                other => {
                    eprintln!("Unknown argument: {other}");
                    eprintln!("Use --help for usage information");
                    std::process::exit(1);
                }
            }
        }

        Self {
            config,
            json,
            data_source,
            options,
            log,
        }
    }
}

fn print_help() {
    println!(
        r"shardcfg - Sharding rule compiler

USAGE:
    shardcfg --config <PATH> [OPTIONS]

OPTIONS:
    -c, --config <PATH>      Rule document (TOML or JSON element tree)
        --json               Print the compiled configuration as JSON
        --data-source        Compile an encryptDataSource document
        --validate-bindings  Require binding tables to have a table rule
        --load-balance-refs  Record loadBalanceAlgorithmRef on master-slave rules
        --log-level <LEVEL>  Log filter directive (default: warn)
        --log-format <FMT>   Log output format: pretty or json (default: pretty)
    -h, --help               Print help information
    -v, --version            Print version information

EXAMPLES:
    shardcfg --config sharding_rules.json
    shardcfg --config encrypt.toml --data-source --json
"
    );
}

fn run(args: &Args) -> anyhow::Result<()> {
    let path = args
        .config
        .as_ref()
        .context("missing --config <PATH>")?;
    let loader = DocumentLoader::new().with_options(args.options);

    info!(document = %path.display(), "Compiling rule document");

    let output = if args.data_source {
        let config = loader.compile_data_source_file(path)?;
        if args.json {
            serde_json::to_string_pretty(&config)?
        } else {
            config.to_string()
        }
    } else {
        let config = loader.compile_file(path)?;
        if args.json {
            serde_json::to_string_pretty(&config)?
        } else {
            config.to_string()
        }
    };

    println!("{output}");
    Ok(())
}

fn main() {
    let args = Args::parse();

    if let Err(e) = init_logging(&args.log) {
        eprintln!("{e}");
        std::process::exit(1);
    }

    let _span = info_span!("shardcfg", service = %args.log.service_name).entered();

    if let Err(e) = run(&args) {
        match e.downcast_ref::<ConfigError>() {
            Some(config_error) => error!(
                error_kind = ?config_error.kind(),
                path = config_error.path().map(tracing::field::display),
                error = %config_error,
                "Compilation failed"
            ),
            None => error!(error = %e, "Compilation failed"),
        }
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
