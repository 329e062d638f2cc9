use async_trait::async_trait;
use hyper::{Body, Response};
use serde::Serialize;
use tracing::{field, info_span, Instrument};

use crate::{
    database::DataStore,
    server::{response, Context, RequestContext},
    AssetTokenServerError,
};

#[async_trait]
/// A type implementing [`Operation`] turns one authenticated HTTP request into
/// a JSON response.
pub(crate) trait Operation<DB: DataStore>: Sized + Send + 'static {
    type Output: Serialize + Send;

    /// Core logic for a given operation.
    async fn operation(
        self,
        request: &RequestContext,
        context: &Context<DB>,
    ) -> Result<Self::Output, AssetTokenServerError>;

    /// Runs the operation for one request. Successful output is returned as
    /// JSON; any error is logged and replaced by the response the client may
    /// see. Nothing is retried.
    async fn handle_request(self, context: Context<DB>, request: RequestContext) -> Response<Body> {
        let span = info_span!(
            "handle_request",
            request_id = %request.request_id(),
            peer_addr = %request.peer_addr(),
            serial_number = field::Empty,
        );

        async move {
            match self.operation(&request, &context).await {
                Ok(output) => response::json(&output),
                Err(error) => response::from_error(&error),
            }
        }
        .instrument(span)
        .await
    }
}
