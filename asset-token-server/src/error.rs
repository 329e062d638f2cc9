use crate::database::DatabaseError;
use asset_token::AssetTokenError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AssetTokenServerError {
    // Protocol errors
    #[error("No verified client certificate identity was presented")]
    Unauthenticated,
    #[error("Client certificate serial number is malformed: {0:?}")]
    MalformedIdentity(String),
    #[error("No asset matches the client certificate serial number")]
    NoMatch,
    #[error("Token issuance matched {0} assets; certificate serial numbers must be unique")]
    IntegrityViolation(u64),
    #[error("Asset store unavailable: {0}")]
    StoreUnavailable(String),

    // Infrastructure errors
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
    #[error("Invalid log file path: {0}")]
    InvalidLogFilePath(PathBuf),
    #[error("Private key was not provided.")]
    PrivateKeyMissing,

    // Wrapped errors
    #[error(transparent)]
    AssetToken(AssetTokenError),
    /// IO error specific to file IO failing. Allows us to include the file that
    /// failed as part of the error.
    #[error("File IO error. Cause: {0}. On file: {1}")]
    FileIo(std::io::Error, PathBuf),
    #[error(transparent)]
    Hyper(#[from] hyper::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Rustls(#[from] rustls::Error),
    #[error(transparent)]
    Toml(#[from] toml::de::Error),
    #[error(transparent)]
    WebPki(#[from] tokio_rustls::webpki::Error),
}

impl AssetTokenServerError {
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }

    /// Failures that are answered with the uniform rejection. Callers cannot
    /// tell these apart from each other.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            AssetTokenServerError::Unauthenticated
                | AssetTokenServerError::MalformedIdentity(_)
                | AssetTokenServerError::NoMatch
                | AssetTokenServerError::IntegrityViolation(_)
        )
    }

    /// Failures that need operator attention, even when the client only sees
    /// the uniform rejection.
    pub fn is_infrastructure_failure(&self) -> bool {
        !matches!(
            self,
            AssetTokenServerError::Unauthenticated
                | AssetTokenServerError::MalformedIdentity(_)
                | AssetTokenServerError::NoMatch
        )
    }
}

impl From<AssetTokenError> for AssetTokenServerError {
    fn from(error: AssetTokenError) -> Self {
        match error {
            AssetTokenError::MalformedIdentity(serial) => Self::MalformedIdentity(serial),
            _ => Self::AssetToken(error),
        }
    }
}

impl From<DatabaseError> for AssetTokenServerError {
    fn from(error: DatabaseError) -> Self {
        match error {
            DatabaseError::NoEntry => Self::NoMatch,
            DatabaseError::InvalidCountFound(count) => Self::IntegrityViolation(count),
            DatabaseError::InternalDatabaseError(message) => Self::StoreUnavailable(message),
        }
    }
}
