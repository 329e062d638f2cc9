//! Interface between the token server and the asset inventory.
//!
//! The inventory owns the asset records. The server only ever performs one
//! conditional write per request on it.

pub mod memory;

use asset_token::types::{ConnectionToken, SerialNumber};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("No such entry in table.")]
    NoEntry,
    #[error("More entries than expected were found: {0}.")]
    InvalidCountFound(u64),
    #[error("An error occurred within the database: {0}. See database logs.")]
    InternalDatabaseError(String),
}

/// Defines the expected interface between the token server and its asset
/// store.
#[async_trait]
pub trait DataStore: Send + Sync + 'static {
    /// Sets `connection_token` and `connection_token_issued` on the asset
    /// whose certificate serial number equals `serial_number`.
    ///
    /// This must be a single atomic conditional write, never a read followed
    /// by a write. It succeeds only when exactly one asset matches:
    /// - no match returns [`DatabaseError::NoEntry`] and nothing is written,
    /// - several matches return [`DatabaseError::InvalidCountFound`] and the
    ///   write must not be kept.
    async fn issue_connection_token(
        &self,
        serial_number: &SerialNumber,
        token: &ConnectionToken,
    ) -> Result<(), DatabaseError>;
}
