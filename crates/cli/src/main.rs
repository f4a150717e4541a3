// Invoice filer CLI - move staged invoice PDFs into the folders a sheet names

mod exit_codes;
mod filing;
mod settings;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use filer_recon::{ReconError, StoreError};
use tracing_subscriber::EnvFilter;

use exit_codes::{EXIT_ERROR, EXIT_SUCCESS};

#[derive(Parser)]
#[command(name = "filer")]
#[command(about = "File staged invoice PDFs into the Drive folders listed in a sheet")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// Only log warnings and errors
    #[arg(long, short = 'q', global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args)]
struct StoreArgs {
    /// Config file (default: <config dir>/invoice-filer/filer.toml)
    #[arg(long, env = "FILER_CONFIG")]
    config: Option<PathBuf>,

    /// Google OAuth access token (default: FILER_ACCESS_TOKEN env)
    #[arg(long)]
    access_token: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Move every eligible invoice and write its link back to the sheet
    #[command(after_help = "\
Examples:
  filer run
  filer run --config ./filer.toml
  filer run --report last-run.json
  FILER_ACCESS_TOKEN=$(gcloud auth print-access-token) filer run")]
    Run {
        #[command(flatten)]
        store: StoreArgs,

        /// Also write the full run report as JSON
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Show what `run` would do to each row, without changing anything
    #[command(after_help = "\
Examples:
  filer plan
  filer plan --out plan.csv")]
    Plan {
        #[command(flatten)]
        store: StoreArgs,

        /// Output CSV file path (default: stdout)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// List the files currently in the staging folder
    Inventory {
        #[command(flatten)]
        store: StoreArgs,

        /// Output CSV file path (default: stdout)
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("GIT_COMMIT_HASH"), ")",
        "\nengine:  filer-recon ", env!("CARGO_PKG_VERSION"),
    )
}

fn init_logging(quiet: bool) {
    let default_level = if quiet { "warn" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.quiet);

    let result = match cli.command {
        None => {
            // No subcommand = show help
            eprintln!("Usage: filer <command> [options]");
            eprintln!("       filer --help for more information");
            Ok(())
        }
        Some(Commands::Run { store, report }) => {
            filing::cmd_run(store.config, store.access_token, report)
        }
        Some(Commands::Plan { store, out }) => filing::cmd_plan(store.config, store.access_token, out),
        Some(Commands::Inventory { store, out }) => {
            filing::cmd_inventory(store.config, store.access_token, out)
        }
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn io(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }

    pub fn store(err: StoreError) -> Self {
        let hint = match &err {
            StoreError::Auth(_) => Some("the access token may have expired; issue a new one".to_string()),
            _ => None,
        };
        Self { code: exit_codes::store_exit_code(&err), message: err.to_string(), hint }
    }

    pub fn recon(err: ReconError) -> Self {
        let hint = match &err {
            ReconError::SheetNotFound(_) => Some("check sheet_name in the config".to_string()),
            ReconError::ReadRows(StoreError::Auth(_)) | ReconError::Inventory(StoreError::Auth(_)) => {
                Some("the access token may have expired; issue a new one".to_string())
            }
            _ => None,
        };
        Self { code: exit_codes::recon_exit_code(&err), message: err.to_string(), hint }
    }
}
