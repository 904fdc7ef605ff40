use calsort_cli::Command;
use calsort_db::{Database, DbError};
use clap::Parser;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

/// Environment variable name for the database path
const CSORT_DB_PATH_ENV: &str = "CSORT_DB_PATH";

/// calsort - ordered CalDAV task lists
#[derive(Parser)]
#[command(name = "csort")]
#[command(version)]
#[command(about = "Keep CalDAV task lists in a stable manual order", long_about = None)]
struct Args {
    /// Path to the database directory (can also be set via CSORT_DB_PATH env var)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    command: Option<Command>,
}

/// Get the database path from command line, environment variable, or default.
///
/// Priority:
/// 1. Command line --db argument
/// 2. CSORT_DB_PATH environment variable (if non-empty)
/// 3. Default path (`<project root>/.csort/data`)
fn resolve_db_path(cli_db: Option<PathBuf>) -> PathBuf {
    if let Some(path) = cli_db {
        return path;
    }

    if let Ok(env_path) = std::env::var(CSORT_DB_PATH_ENV)
        && !env_path.is_empty()
    {
        return PathBuf::from(env_path);
    }

    Database::default_path()
}

/// Initialize logging from `RUST_LOG`, defaulting to warnings only
///
/// Examples:
/// - `RUST_LOG=trace` - show all trace logs
/// - `RUST_LOG=calsort_db=debug` - show database debug logs
fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    init_logging();

    if let Err(e) = run_app().await {
        eprintln!("error: {}", e.full_message());
        process::exit(1);
    }
}

/// Main application logic - separated for testability
async fn run_app() -> Result<(), DbError> {
    let args = Args::parse();
    run_with_args(&args).await
}

/// Run the application with the given arguments
async fn run_with_args(args: &Args) -> Result<(), DbError> {
    let db_path = resolve_db_path(args.db.clone());

    let db = Database::connect(&db_path).await?;
    db.init().await?;

    match &args.command {
        Some(cmd) => {
            let result = cmd.execute(&db).await?;
            println!("{}", result);
        }
        None => {
            println!("Welcome to calsort!");
            println!("Use 'csort --help' for usage information.");
        }
    }

    Ok(())
}
