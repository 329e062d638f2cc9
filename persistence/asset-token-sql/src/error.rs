use asset_token_server::database::DatabaseError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PostgresError {
    #[error("Failed to connect to database after maximum number of attempts")]
    ExceededMaxConnectionAttempts,
    #[error("sqlx error")]
    Sqlx(#[from] sqlx::Error),
    #[error("No such entry in table.")]
    NoEntry,
    #[error("Unexpected number of rows affected: {0}")]
    InvalidRowCountFound(u64),
    #[error("Config file error.")]
    ConfigError(#[from] ConfigError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not read config file {1}. Error: {0}.")]
    ConfigFileReadFailure(std::io::Error, PathBuf),
    #[error("Fail to read TOML file contents.")]
    TomlReadFailure(#[from] toml::de::Error),
    #[error("Missing database username.")]
    MissingUsername,
    #[error("Missing database password.")]
    MissingPassword,
}

impl From<PostgresError> for DatabaseError {
    fn from(error: PostgresError) -> Self {
        match error {
            PostgresError::NoEntry => Self::NoEntry,
            PostgresError::InvalidRowCountFound(count) => Self::InvalidCountFound(count),
            _ => Self::InternalDatabaseError(error.to_string()),
        }
    }
}
