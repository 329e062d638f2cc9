use asset_token::AssetTokenError;
use hyper::StatusCode;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AssetTokenClientError>;

#[derive(Debug, Error)]
pub enum AssetTokenClientError {
    #[error("Server refused to issue a connection token")]
    Rejected,
    #[error("Server returned failure: {0}")]
    ServerReturnedFailure(StatusCode),
    #[error("Health check failed: {0}")]
    HealthCheckFailed(StatusCode),
    #[error("Server returned a malformed connection token")]
    MalformedToken,
    #[error("Private key was not provided.")]
    PrivateKeyMissing,

    // Wrapped errors
    #[error(transparent)]
    AssetToken(#[from] AssetTokenError),
    #[error(transparent)]
    Http(#[from] http::Error),
    #[error(transparent)]
    Hyper(#[from] hyper::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    InvalidUri(#[from] http::uri::InvalidUri),
    #[error(transparent)]
    InvalidUriParts(#[from] http::uri::InvalidUriParts),
    #[error(transparent)]
    Rustls(#[from] rustls::Error),
    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),
    #[error(transparent)]
    Toml(#[from] toml::de::Error),
    #[error(transparent)]
    WebPki(#[from] tokio_rustls::webpki::Error),
}
