mod config;
mod error;

use std::{
    ffi::OsStr,
    path::{Path, PathBuf},
    process::ExitCode,
};

use asset_token_postgres::{Config as DatabaseConfig, PostgresDB};
use asset_token_server::{
    config::Config as ServerConfig, server::start_asset_token_server, AssetTokenServerError,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use clap::Parser;
use config::Config;
use error::CliError;
use tracing::{info, Level};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{filter::Targets, prelude::*};

#[derive(Parser)] //Should not derive debug, contains secrets
pub struct Cli {
    /// Path to the config file listing the server and database configs
    pub config: PathBuf,
    /// Base64 encoded private key data
    #[clap(long)]
    pub private_key: Option<String>,

    /// Database username.
    #[clap(long, env=DatabaseConfig::DB_USERNAME)]
    pub database_username: Option<String>,
    /// Database password.
    #[clap(long, env=DatabaseConfig::DB_PASSWORD)]
    pub database_password: Option<String>,
}

#[tokio::main]
pub async fn main() -> ExitCode {
    match run_main().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Server error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run_main() -> Result<(), CliError> {
    let cli = Cli::parse();
    let private_key_bytes = cli
        .private_key
        .map(|key| STANDARD.decode(key))
        .transpose()?;

    let config = Config::from_file(&cli.config)?;
    let server_config = ServerConfig::from_file(&config.server, private_key_bytes)?;
    let database_config = DatabaseConfig::from_file(
        &config.database,
        cli.database_username,
        cli.database_password,
    )?;

    // We keep `_logging` around for the lifetime of the server. On drop, this value
    // will ensure that our logs are flushed.
    let _logging = init_logging(&server_config)?;

    info!("Server started!");
    info!("Logging config settings: {:?}", server_config.logging);
    info!("Identity config settings: {:?}", server_config.identity);

    let postgres = PostgresDB::connect(database_config).await?;
    info!(db_name = postgres.db_name(), "Connected to asset inventory");

    start_asset_token_server(server_config, postgres).await?;
    Ok(())
}

/// Object representing our logging. Should be kept around as our logging
/// writers return guards that should live for the lifetime of the program. Do
/// not do anything with the guards. Just make sure they are not dropped!
#[derive(Default)]
struct LoggingGuards {
    _all_layer_guard: Option<WorkerGuard>,
    _server_layer_guard: Option<WorkerGuard>,
}

/// Initialize our logging with different logging layers:
/// 1) Log all messages at `stdout_log_level` (or higher) from our asset_token*
/// crates to standard out.
/// 2) (OPTIONAL) Log all messages (TRACE or higher) from our asset_token*
/// crates to the path specified by `token_server_logs_file_name`.
/// 3) (OPTIONAL) Log all messages (TRACE or higher) from any crate to the path
/// specified by `all_logs_file_name`.
///
/// Returns an object which should be kept around for the lifetime of the
/// program.
fn init_logging(config: &ServerConfig) -> Result<LoggingGuards, AssetTokenServerError> {
    let stdout_layer = tracing_subscriber::fmt::layer()
        .pretty()
        .with_filter(our_targets_filter(config.logging.stdout_log_level));

    let logging_guards = match &config.logging.log_files {
        Some(file_config) => {
            let (all_logs_dir, all_logs_file) = get_paths(&file_config.all_logs_file_name)?;
            let (server_logs_dir, server_logs_file) =
                get_paths(&file_config.token_server_logs_file_name)?;

            // This layers logs all events into a file.
            let all_appender = tracing_appender::rolling::hourly(all_logs_dir, all_logs_file);
            let (non_blocking, _all_layer_guard) = tracing_appender::non_blocking(all_appender);
            let all_layer = tracing_subscriber::fmt::layer()
                .json()
                .with_writer(non_blocking);

            // Log all events generated by our crates into a file.
            let server_appender =
                tracing_appender::rolling::hourly(server_logs_dir, server_logs_file);
            let (non_blocking, _server_layer_guard) =
                tracing_appender::non_blocking(server_appender);
            let server_layer = tracing_subscriber::fmt::layer()
                .json()
                .with_writer(non_blocking)
                .with_filter(our_targets_filter(Level::TRACE));

            tracing_subscriber::registry()
                .with(stdout_layer)
                .with(server_layer)
                .with(all_layer)
                .init();

            LoggingGuards {
                _all_layer_guard: Some(_all_layer_guard),
                _server_layer_guard: Some(_server_layer_guard),
            }
        }
        None => {
            tracing_subscriber::registry().with(stdout_layer).init();

            LoggingGuards::default()
        }
    };

    Ok(logging_guards)
}

/// Return the path directory and the file name. Needed for passing to
/// tracing_appender.
fn get_paths(path: &Path) -> Result<(&Path, &OsStr), AssetTokenServerError> {
    let dir = path
        .parent()
        .ok_or_else(|| AssetTokenServerError::InvalidLogFilePath(path.into()))?;

    let file_name = path
        .file_name()
        .ok_or_else(|| AssetTokenServerError::InvalidLogFilePath(path.into()))?;
    Ok((dir, file_name))
}

/// Create filters for logging events originating from our asset_token*
/// crates.
fn our_targets_filter(level: Level) -> Targets {
    Targets::new()
        .with_target("token_server_cli", level)
        .with_target("asset_token_server", level)
        .with_target("asset_token_postgres", level)
        .with_target("asset_token", level)
}
