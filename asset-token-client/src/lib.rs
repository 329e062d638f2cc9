//! Device-side client for the asset token server.
#![warn(unused_results)]
#![warn(future_incompatible)]
#![warn(unused)]
#![forbid(rustdoc::broken_intra_doc_links)]

pub mod client;
pub mod config;
pub mod error;

pub use client::AssetTokenClient;
pub use config::Config;
pub use error::{AssetTokenClientError, Result};
