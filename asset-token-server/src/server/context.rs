use std::{net::SocketAddr, sync::Arc};

use uuid::Uuid;

use crate::{database::DataStore, Config};

/// Resources shared by every request. Nothing in here is mutated while
/// serving.
pub(crate) struct Context<DB: DataStore> {
    pub db: Arc<DB>,
    pub config: Arc<Config>,
}

/// Per-request view of the caller, built by the transport boundary only.
///
/// `client_serial` holds the serial number of a client certificate that was
/// verified during the TLS handshake, either by this server or by a trusted
/// reverse proxy. Nothing in the request body or in untrusted headers can
/// set it.
#[derive(Clone, Debug)]
pub struct RequestContext {
    request_id: Uuid,
    peer_addr: SocketAddr,
    client_serial: Option<String>,
}

impl RequestContext {
    pub(crate) fn new(peer_addr: SocketAddr, client_serial: Option<String>) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            peer_addr,
            client_serial,
        }
    }

    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.peer_addr
    }

    pub fn client_serial(&self) -> Option<&str> {
        self.client_serial.as_deref()
    }
}

#[cfg(test)]
pub(crate) mod test_helpers {
    use super::*;
    use crate::config::{IdentityConfig, IdentitySource, LoggingConfig};
    use asset_token::{constants::DEFAULT_SERIAL_HEADER, types::SerialValidation};
    use hyper::header::HeaderName;
    use std::net::{IpAddr, Ipv4Addr};
    use tracing::Level;

    pub(crate) const PROXY: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

    pub(crate) fn test_config(serial_validation: SerialValidation) -> Config {
        Config {
            address: PROXY,
            port: 0,
            identity: IdentityConfig {
                source: IdentitySource::ForwardedHeader {
                    header: HeaderName::from_static(DEFAULT_SERIAL_HEADER),
                    trusted_proxies: vec![PROXY],
                },
                serial_validation,
            },
            tls_config: None,
            logging: LoggingConfig {
                stdout_log_level: Level::INFO,
                log_files: None,
            },
        }
    }

    pub(crate) fn test_context<DB: DataStore>(db: Arc<DB>, serial_validation: SerialValidation) -> Context<DB> {
        Context {
            db,
            config: Arc::new(test_config(serial_validation)),
        }
    }

    pub(crate) fn request_from(client_serial: Option<&str>) -> RequestContext {
        RequestContext::new(
            SocketAddr::new(PROXY, 40000),
            client_serial.map(str::to_string),
        )
    }
}
