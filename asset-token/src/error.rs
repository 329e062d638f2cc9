use thiserror::Error;

#[derive(Debug, Error)]
pub enum AssetTokenError {
    // Identity errors
    #[error("Serial number is not a hexadecimal identifier: {0:?}")]
    MalformedIdentity(String),
    #[error("Invalid certificate: {0}")]
    InvalidCertificate(String),

    // TLS errors
    #[error("Invalid private key")]
    InvalidPrivateKey,

    // Wrapped errors
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
