//! Shared types and helpers used by the asset token server, its persistence
//! backends and the device-side client.
//!
//! A device that already holds a client certificate asks the inventory for a
//! short-lived connection token. The token is bound to the inventory record
//! whose certificate serial number matches the certificate presented on the
//! TLS connection.
#![warn(unused_results)]
#![warn(future_incompatible)]
#![warn(unused)]
#![forbid(rustdoc::broken_intra_doc_links)]

pub mod constants;
pub mod error;
pub mod infrastructure;
pub mod types;

pub use error::AssetTokenError;
