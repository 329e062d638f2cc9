use asset_token::{
    constants::DEFAULT_SERIAL_HEADER, infrastructure::pem_utils, types::SerialValidation,
};
use hyper::header::HeaderName;
use rustls::{
    server::{AllowAnyAnonymousOrAuthenticatedClient, AllowAnyAuthenticatedClient, NoClientAuth},
    RootCertStore, ServerConfig,
};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr};
use std::{
    net::IpAddr,
    path::{Path, PathBuf},
    str::FromStr,
};
use tracing::Level;

use crate::AssetTokenServerError;

/// Server configuration with all fields ready to use
#[derive(Clone)]
pub struct Config {
    pub address: IpAddr,
    pub port: u16,
    pub identity: IdentityConfig,
    pub tls_config: Option<ServerConfig>,
    pub logging: LoggingConfig,
}

impl Config {
    pub fn from_file(
        config_path: impl AsRef<Path>,
        private_key_bytes: Option<Vec<u8>>,
    ) -> Result<Self, AssetTokenServerError> {
        let config_string = std::fs::read_to_string(&config_path)
            .map_err(|e| AssetTokenServerError::FileIo(e, config_path.as_ref().to_path_buf()))?;
        let config_file = ConfigFile::from_str(&config_string)?;
        Self::from_config_file(config_file, private_key_bytes)
    }

    pub fn from_config_file(
        config: ConfigFile,
        private_key_bytes: Option<Vec<u8>>,
    ) -> Result<Self, AssetTokenServerError> {
        let identity = IdentityConfig::try_from(config.identity)?;

        if let IdentitySource::Tls = identity.source {
            let client_ca_configured = config
                .tls_config
                .as_ref()
                .map_or(false, |tls| tls.client_ca_chain.is_some());
            if !client_ca_configured {
                return Err(AssetTokenServerError::invalid_config(
                    "identity source `tls` requires `tls_config.client_ca_chain`",
                ));
            }
        }

        let tls_config = config
            .tls_config
            .map(|tc| tc.into_rustls_config(private_key_bytes))
            .transpose()?;

        Ok(Self {
            address: config.address,
            port: config.port,
            identity,
            tls_config,
            logging: config.logging,
        })
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("address", &self.address)
            .field("port", &self.port)
            .field("identity", &self.identity)
            .field("tls_config", &"[Does not implement Debug]")
            .field("logging", &self.logging)
            .finish()
    }
}

/// Server configuration file format.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "snake_case")]
#[non_exhaustive]
pub struct ConfigFile {
    pub address: IpAddr,
    pub port: u16,
    pub identity: IdentityConfigFile,
    pub logging: LoggingConfig,
    pub tls_config: Option<TlsConfig>,
}

impl FromStr for ConfigFile {
    type Err = AssetTokenServerError;

    fn from_str(config_string: &str) -> Result<Self, Self::Err> {
        Ok(toml::from_str(config_string)?)
    }
}

/// Where the verified client certificate serial number comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IdentitySource {
    /// This server terminates TLS and reads the serial number from the peer
    /// certificate.
    Tls,
    /// A reverse proxy terminates TLS and forwards the serial number in
    /// `header`. The header is only read on connections from
    /// `trusted_proxies`.
    ForwardedHeader {
        header: HeaderName,
        trusted_proxies: Vec<IpAddr>,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IdentityConfig {
    pub source: IdentitySource,
    pub serial_validation: SerialValidation,
}

impl TryFrom<IdentityConfigFile> for IdentityConfig {
    type Error = AssetTokenServerError;

    fn try_from(config: IdentityConfigFile) -> Result<Self, Self::Error> {
        let source = match config.source {
            IdentitySourceKind::Tls => IdentitySource::Tls,
            IdentitySourceKind::ForwardedHeader => {
                if config.trusted_proxies.is_empty() {
                    return Err(AssetTokenServerError::invalid_config(
                        "identity source `forwarded_header` requires `trusted_proxies`",
                    ));
                }
                let header = config.header.as_deref().unwrap_or(DEFAULT_SERIAL_HEADER);
                let header = HeaderName::from_str(header).map_err(|e| {
                    AssetTokenServerError::invalid_config(format!("invalid header {header:?}: {e}"))
                })?;

                IdentitySource::ForwardedHeader {
                    header,
                    trusted_proxies: config.trusted_proxies,
                }
            }
        };

        Ok(Self {
            source,
            serial_validation: config.serial_validation,
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentitySourceKind {
    Tls,
    ForwardedHeader,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields, rename_all = "snake_case")]
pub struct IdentityConfigFile {
    pub source: IdentitySourceKind,
    /// Header carrying the serial number. Only used by `forwarded_header`.
    pub header: Option<String>,
    #[serde(default)]
    pub trusted_proxies: Vec<IpAddr>,
    #[serde(default)]
    pub serial_validation: SerialValidation,
}

#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "snake_case")]
pub struct LoggingConfig {
    #[serde_as(as = "DisplayFromStr")]
    pub stdout_log_level: Level,
    pub log_files: Option<LoggingFileConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "snake_case")]
pub struct LoggingFileConfig {
    pub token_server_logs_file_name: PathBuf,
    pub all_logs_file_name: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "snake_case")]
pub struct TlsConfig {
    /// The private key can be provided as a file or passed to the
    /// [`Config`] constructors.
    pub private_key: Option<PathBuf>,
    pub certificate_chain: PathBuf,
    /// CA certificates that sign device certificates. Without it the server
    /// does not ask for client certificates.
    pub client_ca_chain: Option<PathBuf>,
    /// Abort the handshake when no client certificate is presented, instead
    /// of answering with the uniform rejection.
    #[serde(default)]
    pub require_client_cert: bool,
}

impl TlsConfig {
    pub fn into_rustls_config(
        &self,
        private_key_bytes: Option<Vec<u8>>,
    ) -> Result<ServerConfig, AssetTokenServerError> {
        let chain = pem_utils::read_certificates(&self.certificate_chain)?;

        let key = if let Some(bytes) = private_key_bytes {
            pem_utils::read_private_key_from_bytes(&bytes)?
        } else if let Some(key_path) = &self.private_key {
            pem_utils::read_private_key_from_file(key_path)?
        } else {
            return Err(AssetTokenServerError::PrivateKeyMissing);
        };

        let client_auth = match &self.client_ca_chain {
            Some(ca_chain) => {
                let mut client_auth_roots = RootCertStore::empty();
                for root in pem_utils::read_certificates(ca_chain)? {
                    client_auth_roots.add(&root)?;
                }

                if self.require_client_cert {
                    AllowAnyAuthenticatedClient::new(client_auth_roots)
                } else {
                    AllowAnyAnonymousOrAuthenticatedClient::new(client_auth_roots)
                }
            }
            None => NoClientAuth::new(),
        };

        let mut tls = ServerConfig::builder()
            .with_safe_defaults()
            .with_client_cert_verifier(client_auth)
            .with_single_cert(chain, key)?;
        tls.alpn_protocols = vec![b"http/1.1".to_vec()];

        Ok(tls)
    }
}
