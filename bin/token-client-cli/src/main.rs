use std::{path::PathBuf, process::ExitCode};

use asset_token_client::{AssetTokenClient, AssetTokenClientError, Config};
use base64::{engine::general_purpose::STANDARD, Engine};
use clap::{Parser, Subcommand};
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)] //Should not derive debug, contains secrets
pub struct Cli {
    /// Path to the client config file
    pub config: PathBuf,
    /// Base64 encoded private key data
    #[clap(long, env = "ASSET_TOKEN_PRIVATE_KEY")]
    pub private_key: Option<String>,
    #[clap(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Request a fresh connection token and print it (default)
    Token,
    /// Check that the token server is reachable
    Health,
}

#[derive(Debug, Error)]
enum CliError {
    #[error("Private key is not valid base64: {0}")]
    PrivateKeyEncoding(#[from] base64::DecodeError),
    #[error(transparent)]
    Client(#[from] AssetTokenClientError),
}

#[tokio::main]
pub async fn main() -> ExitCode {
    // Logs go to stderr so stdout only ever holds the token.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    match run_main().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Client error: {e}");
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

    let config = Config::from_file(&cli.config, private_key_bytes)?;
    info!(server_uri = %config.server_uri, "Loaded client config");
    let client = AssetTokenClient::new(config);

    match cli.command.unwrap_or(Command::Token) {
        Command::Token => {
            let token = client.request_connection_token().await?;
            println!("{}", token.as_str());
        }
        Command::Health => {
            client.health().await?;
            println!("ok");
        }
    }

    Ok(())
}
