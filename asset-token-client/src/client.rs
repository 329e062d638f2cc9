//! Client object to request connection tokens from the asset token server.

use crate::{config::Config, AssetTokenClientError, Result};
use asset_token::{
    constants::{HEALTH_PATH, REQUEST_CONNECTION_TOKEN_PATH},
    types::ConnectionToken,
};
use http::uri::PathAndQuery;
use hyper::{client::HttpConnector, Body, Client, Method, Request, Response, StatusCode, Uri};
use hyper_rustls::HttpsConnector;
use tracing::{debug, info, instrument, warn};

/// An `AssetTokenClient` presents this device's certificate to the token
/// server. The server identifies the device only by that certificate, so no
/// request carries any other identifying data.
#[derive(Debug)]
pub struct AssetTokenClient {
    config: Config,
    hyper_client: Client<HttpsConnector<HttpConnector>>,
}

impl AssetTokenClient {
    pub fn new(config: Config) -> Self {
        let connector = hyper_rustls::HttpsConnectorBuilder::new()
            .with_tls_config(config.tls_config.clone())
            .https_or_http()
            .enable_http1()
            .build();

        Self {
            config,
            hyper_client: Client::builder().build(connector),
        }
    }

    /// Asks the server for a fresh connection token. Any token issued
    /// earlier for this device stops being the current one.
    #[instrument(skip(self), err(Debug))]
    pub async fn request_connection_token(&self) -> Result<ConnectionToken> {
        info!("Requesting connection token");
        let response = self
            .send(Method::GET, REQUEST_CONNECTION_TOKEN_PATH)
            .await?;
        token_from_response(response).await
    }

    /// Checks that the server is up. This does not authenticate the device.
    #[instrument(skip(self), err(Debug))]
    pub async fn health(&self) -> Result<()> {
        let response = self.send(Method::GET, HEALTH_PATH).await?;
        match response.status() {
            StatusCode::OK => Ok(()),
            status => Err(AssetTokenClientError::HealthCheckFailed(status)),
        }
    }

    async fn send(&self, method: Method, path: &'static str) -> Result<Response<Body>> {
        let uri = self.endpoint(path)?;
        debug!(%uri, %method, "Sending request");

        let request = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())?;
        Ok(self.hyper_client.request(request).await?)
    }

    /// Replaces the path of the configured server URI.
    fn endpoint(&self, path: &'static str) -> Result<Uri> {
        let mut parts = self.config.server_uri.clone().into_parts();
        parts.path_and_query = Some(PathAndQuery::from_static(path));
        Ok(Uri::from_parts(parts)?)
    }
}

/// A successful response is a JSON string holding the token. The server
/// answers every refusal with `403 Forbidden` and never says why.
async fn token_from_response(response: Response<Body>) -> Result<ConnectionToken> {
    match response.status() {
        StatusCode::OK => {
            let body = hyper::body::to_bytes(response.into_body()).await?;
            let token: ConnectionToken = serde_json::from_slice(&body)?;
            if !token.is_well_formed() {
                return Err(AssetTokenClientError::MalformedToken);
            }
            Ok(token)
        }
        StatusCode::FORBIDDEN => {
            warn!("Server refused to issue a connection token");
            Err(AssetTokenClientError::Rejected)
        }
        status => Err(AssetTokenClientError::ServerReturnedFailure(status)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustls::{ClientConfig, RootCertStore};
    use std::str::FromStr;

    fn response(status: StatusCode, body: &'static str) -> Response<Body> {
        let mut response = Response::new(Body::from(body));
        *response.status_mut() = status;
        response
    }

    fn test_client(server_uri: &str) -> AssetTokenClient {
        let tls_config = ClientConfig::builder()
            .with_safe_defaults()
            .with_root_certificates(RootCertStore::empty())
            .with_no_client_auth();
        AssetTokenClient::new(Config {
            server_uri: Uri::from_str(server_uri).unwrap(),
            tls_config,
        })
    }

    #[tokio::test]
    async fn ok_response_is_decoded_into_token() {
        let token = token_from_response(response(
            StatusCode::OK,
            "\"Ab3dEf6hIj9lMn2pQr5tUv8xYz1bCd4f\"",
        ))
        .await
        .unwrap();

        assert_eq!(token.as_str(), "Ab3dEf6hIj9lMn2pQr5tUv8xYz1bCd4f");
    }

    #[tokio::test]
    async fn short_token_is_malformed() {
        let result = token_from_response(response(StatusCode::OK, "\"abc\"")).await;
        assert!(matches!(result, Err(AssetTokenClientError::MalformedToken)));
    }

    #[tokio::test]
    async fn forbidden_is_rejected() {
        let result = token_from_response(response(
            StatusCode::FORBIDDEN,
            "Nothing to see, move it along!",
        ))
        .await;
        assert!(matches!(result, Err(AssetTokenClientError::Rejected)));
    }

    #[tokio::test]
    async fn other_statuses_are_failures() {
        let result = token_from_response(response(StatusCode::INTERNAL_SERVER_ERROR, "")).await;
        assert!(matches!(
            result,
            Err(AssetTokenClientError::ServerReturnedFailure(
                StatusCode::INTERNAL_SERVER_ERROR
            ))
        ));
    }

    #[tokio::test]
    async fn endpoint_replaces_path() {
        let client = test_client("https://inventory.local:8443/ignored?x=1");
        let uri = client.endpoint(REQUEST_CONNECTION_TOKEN_PATH).unwrap();
        assert_eq!(
            uri.to_string(),
            "https://inventory.local:8443/request-connection-token"
        );
    }
}
