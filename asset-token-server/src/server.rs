pub(crate) mod context;
mod operation;
pub(crate) mod response;
mod service;
pub(crate) mod transport;

pub use context::RequestContext;
pub(crate) use context::Context;
pub(crate) use operation::Operation;
pub use service::{serve, start_asset_token_server};

use asset_token::constants::{HEALTH_PATH, REQUEST_CONNECTION_TOKEN_PATH};
use hyper::{Body, Method, Request, Response};
use std::sync::Arc;
use tracing::debug;

use crate::{config::Config, database::DataStore, operations};

use self::transport::ConnectionIdentity;

pub struct AssetTokenServer<DB: DataStore> {
    config: Arc<Config>,
    db: Arc<DB>,
}

impl<DB: DataStore> AssetTokenServer<DB> {
    pub fn new(db: Arc<DB>, config: Config) -> Self {
        Self {
            config: Arc::new(config),
            db,
        }
    }

    pub(crate) fn context(&self) -> Context<DB> {
        Context {
            config: self.config.clone(),
            db: self.db.clone(),
        }
    }

    /// Dispatches one HTTP request received on a connection whose identity the
    /// transport layer already established.
    pub(crate) async fn route(
        &self,
        request: Request<Body>,
        connection: &ConnectionIdentity,
    ) -> Response<Body> {
        debug!(method = %request.method(), path = request.uri().path(), "Routing request.");

        match (request.method(), request.uri().path()) {
            (&Method::GET | &Method::POST, REQUEST_CONNECTION_TOKEN_PATH) => {
                let request_context = transport::request_context(
                    &self.config.identity.source,
                    connection,
                    request.headers(),
                );
                operations::RequestConnectionToken
                    .handle_request(self.context(), request_context)
                    .await
            }
            (_, REQUEST_CONNECTION_TOKEN_PATH) => response::method_not_allowed(),
            (&Method::GET, HEALTH_PATH) => response::health(),
            _ => response::not_found(),
        }
    }
}

impl<DB: DataStore> Clone for AssetTokenServer<DB> {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            db: self.db.clone(),
        }
    }
}
