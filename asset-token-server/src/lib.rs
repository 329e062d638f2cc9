//! Server that issues short-lived connection tokens to devices identified by
//! their TLS client certificate.
#![warn(unused_results)]
#![warn(future_incompatible)]
#![warn(unused)]
#![forbid(rustdoc::broken_intra_doc_links)]

pub mod config;
pub mod constants;
pub mod database;
pub mod error;
pub mod operations;
pub mod server;

pub use config::Config;
pub use error::AssetTokenServerError;
