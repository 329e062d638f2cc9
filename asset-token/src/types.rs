//! Domain types exchanged between the transport boundary, the issuance
//! operation and the asset store.

pub mod asset;
pub mod connection_token;
pub mod serial_number;

pub use asset::Asset;
pub use connection_token::ConnectionToken;
pub use serial_number::{SerialNumber, SerialValidation};
