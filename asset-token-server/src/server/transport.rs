//! The transport identity gate's view of a connection.
//!
//! TLS client certificate verification happens before any of this code runs,
//! either in our own rustls handshake or in a reverse proxy. What is trusted
//! here is only the outcome of that verification.

use std::net::{IpAddr, SocketAddr};

use asset_token::infrastructure::certificate;
use hyper::HeaderMap;
use rustls::ServerConnection;
use tracing::{debug, warn};

use crate::config::IdentitySource;

use super::RequestContext;

/// Identity information established when a connection was accepted.
#[derive(Clone, Debug)]
pub(crate) struct ConnectionIdentity {
    peer_addr: SocketAddr,
    certificate_serial: Option<String>,
}

impl ConnectionIdentity {
    /// A connection without TLS, or with TLS but no client certificate.
    pub(crate) fn plain(peer_addr: SocketAddr) -> Self {
        Self {
            peer_addr,
            certificate_serial: None,
        }
    }

    /// Reads the serial number of the verified leaf certificate, if the peer
    /// presented one.
    pub(crate) fn from_tls(peer_addr: SocketAddr, connection: &ServerConnection) -> Self {
        let certificate_serial = connection
            .peer_certificates()
            .and_then(|chain| chain.first())
            .and_then(|leaf| match certificate::serial_number_hex(&leaf.0) {
                Ok(serial) => Some(serial),
                Err(e) => {
                    warn!(%peer_addr, "Could not read client certificate serial number: {e}");
                    None
                }
            });

        Self {
            peer_addr,
            certificate_serial,
        }
    }
}

/// Builds the [`RequestContext`] for one request according to the configured
/// identity source.
pub(crate) fn request_context(
    source: &IdentitySource,
    connection: &ConnectionIdentity,
    headers: &HeaderMap,
) -> RequestContext {
    let client_serial = match source {
        IdentitySource::Tls => connection.certificate_serial.clone(),
        IdentitySource::ForwardedHeader {
            header,
            trusted_proxies,
        } => {
            let peer_ip = canonical(connection.peer_addr.ip());
            if trusted_proxies.iter().any(|proxy| canonical(*proxy) == peer_ip) {
                // Taken as sent; inventory matching is exact.
                headers
                    .get(header)
                    .and_then(|value| value.to_str().ok())
                    .filter(|serial| !serial.is_empty())
                    .map(str::to_string)
            } else {
                if headers.contains_key(header) {
                    warn!(%peer_ip, "Ignoring forwarded serial number from untrusted peer");
                }
                None
            }
        }
    };

    let context = RequestContext::new(connection.peer_addr, client_serial);
    debug!(request_id = %context.request_id(), peer_addr = %connection.peer_addr, "Created request context.");
    context
}

/// IPv4 peers can show up as IPv4-mapped IPv6 addresses on dual-stack
/// listeners.
fn canonical(ip: IpAddr) -> IpAddr {
    match ip {
        IpAddr::V6(v6) => v6.to_ipv4_mapped().map_or(ip, IpAddr::V4),
        IpAddr::V4(_) => ip,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use asset_token::constants::DEFAULT_SERIAL_HEADER;
    use hyper::header::{HeaderName, HeaderValue};
    use std::{
        net::{Ipv4Addr, Ipv6Addr},
        str::FromStr,
    };

    fn forwarded_source(trusted: &str) -> IdentitySource {
        IdentitySource::ForwardedHeader {
            header: HeaderName::from_static(DEFAULT_SERIAL_HEADER),
            trusted_proxies: vec![IpAddr::from_str(trusted).unwrap()],
        }
    }

    fn headers_with_serial(serial: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        let _ = headers.insert(DEFAULT_SERIAL_HEADER, HeaderValue::from_static(serial));
        headers
    }

    fn connection_from(peer: &str) -> ConnectionIdentity {
        ConnectionIdentity::plain(SocketAddr::new(IpAddr::from_str(peer).unwrap(), 50000))
    }

    #[test]
    fn trusted_proxy_header_is_used() {
        let context = request_context(
            &forwarded_source("10.0.0.1"),
            &connection_from("10.0.0.1"),
            &headers_with_serial("A1B2C3"),
        );
        assert_eq!(context.client_serial(), Some("A1B2C3"));
    }

    #[test]
    fn header_from_untrusted_peer_is_ignored() {
        let context = request_context(
            &forwarded_source("10.0.0.1"),
            &connection_from("10.0.0.2"),
            &headers_with_serial("A1B2C3"),
        );
        assert_eq!(context.client_serial(), None);
    }

    #[test]
    fn empty_header_is_no_identity() {
        let context = request_context(
            &forwarded_source("10.0.0.1"),
            &connection_from("10.0.0.1"),
            &headers_with_serial(""),
        );
        assert_eq!(context.client_serial(), None);
    }

    #[test]
    fn forwarded_serial_is_not_altered() {
        let context = request_context(
            &forwarded_source("10.0.0.1"),
            &connection_from("10.0.0.1"),
            &headers_with_serial(" A1B2C3 "),
        );
        assert_eq!(context.client_serial(), Some(" A1B2C3 "));
    }

    #[test]
    fn ipv4_mapped_peer_matches_ipv4_proxy() {
        let mapped = Ipv4Addr::new(10, 0, 0, 1).to_ipv6_mapped();
        let connection = ConnectionIdentity::plain(SocketAddr::new(IpAddr::V6(mapped), 50000));
        let context = request_context(
            &forwarded_source("10.0.0.1"),
            &connection,
            &headers_with_serial("A1B2C3"),
        );
        assert_eq!(context.client_serial(), Some("A1B2C3"));
        assert_eq!(canonical(IpAddr::V6(Ipv6Addr::LOCALHOST)), IpAddr::V6(Ipv6Addr::LOCALHOST));
    }

    #[test]
    fn tls_source_ignores_headers() {
        let context = request_context(
            &IdentitySource::Tls,
            &connection_from("10.0.0.1"),
            &headers_with_serial("A1B2C3"),
        );
        assert_eq!(context.client_serial(), None);

        let connection = ConnectionIdentity {
            certificate_serial: Some("8F01".to_string()),
            ..connection_from("10.0.0.3")
        };
        let context = request_context(&IdentitySource::Tls, &connection, &HeaderMap::new());
        assert_eq!(context.client_serial(), Some("8F01"));
    }
}
