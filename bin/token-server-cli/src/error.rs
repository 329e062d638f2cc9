use asset_token_postgres::{ConfigError, PostgresError};
use asset_token_server::AssetTokenServerError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Private key is not valid base64: {0}")]
    PrivateKeyEncoding(#[from] base64::DecodeError),
    #[error("File IO error. Cause: {0}. On file: {1}")]
    FileIo(std::io::Error, PathBuf),

    // Wrapped errors
    #[error(transparent)]
    Server(#[from] AssetTokenServerError),
    #[error(transparent)]
    DatabaseConfig(#[from] ConfigError),
    #[error(transparent)]
    Postgres(#[from] PostgresError),
    #[error(transparent)]
    Toml(#[from] toml::de::Error),
}
