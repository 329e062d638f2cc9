use asset_token::infrastructure::pem_utils;
use hyper::Uri;
use rustls::{ClientConfig, RootCertStore};
use serde::{Deserialize, Serialize};
use std::{
    path::{Path, PathBuf},
    str::FromStr,
};

use crate::AssetTokenClientError;

/// Client configuration with all fields ready to use.
#[derive(Clone)]
pub struct Config {
    pub server_uri: Uri,
    pub tls_config: ClientConfig,
}

impl Config {
    pub fn from_file(
        config_path: impl AsRef<Path>,
        private_key_bytes: Option<Vec<u8>>,
    ) -> Result<Self, AssetTokenClientError> {
        let config_string = std::fs::read_to_string(&config_path)?;
        let config_file = ConfigFile::from_str(&config_string)?;
        Self::from_config_file(config_file, private_key_bytes)
    }

    pub fn from_config_file(
        config: ConfigFile,
        private_key_bytes: Option<Vec<u8>>,
    ) -> Result<Self, AssetTokenClientError> {
        Ok(Self {
            server_uri: Uri::from_str(&config.server_uri)?,
            tls_config: config.tls_config(private_key_bytes)?,
        })
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("server_uri", &self.server_uri)
            .field("tls_config", &"[Does not implement Debug]")
            .finish()
    }
}

/// Client configuration file format.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "snake_case")]
#[non_exhaustive]
pub struct ConfigFile {
    pub server_uri: String,
    /// CA that signed the server certificate.
    pub ca_chain: PathBuf,
    pub client_auth: ClientAuth,
}

/// The device certificate whose serial number identifies this asset.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "snake_case")]
#[non_exhaustive]
pub struct ClientAuth {
    pub certificate_chain: PathBuf,
    /// The private key can be provided as a file or passed to the
    /// [`Config`] constructors.
    pub private_key: Option<PathBuf>,
}

impl ConfigFile {
    pub fn tls_config(
        &self,
        private_key_bytes: Option<Vec<u8>>,
    ) -> Result<ClientConfig, AssetTokenClientError> {
        let mut root_store = RootCertStore::empty();

        let root_cert = pem_utils::read_certificates(&self.ca_chain)?;
        for cert in root_cert {
            root_store.add(&cert)?;
        }

        let certs = pem_utils::read_certificates(&self.client_auth.certificate_chain)?;

        let key = if let Some(bytes) = private_key_bytes {
            pem_utils::read_private_key_from_bytes(&bytes)?
        } else if let Some(key_path) = &self.client_auth.private_key {
            pem_utils::read_private_key_from_file(key_path)?
        } else {
            return Err(AssetTokenClientError::PrivateKeyMissing);
        };

        let tls_config = ClientConfig::builder()
            .with_safe_defaults()
            .with_root_certificates(root_store)
            .with_single_cert(certs, key)?;

        Ok(tls_config)
    }
}

impl FromStr for ConfigFile {
    type Err = AssetTokenClientError;

    fn from_str(config_string: &str) -> Result<Self, Self::Err> {
        Ok(toml::from_str(config_string)?)
    }
}
