//! HTTP responses of the token server.
//!
//! Every authorization failure produces the exact same rejection so a caller
//! cannot learn which serial numbers are provisioned. The distinct cause is
//! only written to our logs.

use hyper::{
    header::{HeaderValue, CONTENT_TYPE},
    Body, Response, StatusCode,
};
use serde::Serialize;
use tracing::{error, warn};

use crate::{
    constants::{APPLICATION_JSON, HEALTH_BODY, INTERNAL_ERROR_BODY, REJECTION_BODY, TEXT_PLAIN},
    AssetTokenServerError,
};

fn with_body(status: StatusCode, content_type: &'static str, body: impl Into<Body>) -> Response<Body> {
    let mut response = Response::new(body.into());
    *response.status_mut() = status;
    let _ = response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    response
}

/// `200 OK` with `value` encoded as JSON.
pub(crate) fn json(value: &impl Serialize) -> Response<Body> {
    match serde_json::to_vec(value) {
        Ok(body) => with_body(StatusCode::OK, APPLICATION_JSON, body),
        Err(e) => {
            error!("Failed to encode response: {e}");
            internal_error()
        }
    }
}

/// The uniform rejection.
pub(crate) fn rejection() -> Response<Body> {
    with_body(StatusCode::FORBIDDEN, TEXT_PLAIN, REJECTION_BODY)
}

pub(crate) fn internal_error() -> Response<Body> {
    with_body(StatusCode::INTERNAL_SERVER_ERROR, TEXT_PLAIN, INTERNAL_ERROR_BODY)
}

pub(crate) fn health() -> Response<Body> {
    with_body(StatusCode::OK, TEXT_PLAIN, HEALTH_BODY)
}

pub(crate) fn not_found() -> Response<Body> {
    let mut response = Response::new(Body::empty());
    *response.status_mut() = StatusCode::NOT_FOUND;
    response
}

pub(crate) fn method_not_allowed() -> Response<Body> {
    let mut response = Response::new(Body::empty());
    *response.status_mut() = StatusCode::METHOD_NOT_ALLOWED;
    response
}

/// Logs `error` with its actual cause and converts it into the response the
/// client is allowed to see.
pub(crate) fn from_error(error: &AssetTokenServerError) -> Response<Body> {
    if error.is_infrastructure_failure() {
        error!(?error, "Connection token issuance failed");
    } else {
        warn!(%error, "Connection token request rejected");
    }

    if error.is_rejection() {
        rejection()
    } else {
        internal_error()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyper::body::to_bytes;

    async fn parts(response: Response<Body>) -> (StatusCode, Option<HeaderValue>, Vec<u8>) {
        let status = response.status();
        let content_type = response.headers().get(CONTENT_TYPE).cloned();
        let body = to_bytes(response.into_body()).await.unwrap().to_vec();
        (status, content_type, body)
    }

    #[tokio::test]
    async fn authorization_failures_are_indistinguishable() {
        let errors = [
            AssetTokenServerError::Unauthenticated,
            AssetTokenServerError::MalformedIdentity("zzzz".into()),
            AssetTokenServerError::NoMatch,
            AssetTokenServerError::IntegrityViolation(2),
        ];

        let mut responses = Vec::new();
        for error in &errors {
            responses.push(parts(from_error(error)).await);
        }

        for response in &responses {
            assert_eq!(response, &responses[0]);
        }
        assert_eq!(responses[0].0, StatusCode::FORBIDDEN);
        assert_eq!(responses[0].2, REJECTION_BODY.as_bytes());
    }

    #[tokio::test]
    async fn store_failures_are_server_errors() {
        let error = AssetTokenServerError::StoreUnavailable("connection refused".into());
        let (status, _, body) = parts(from_error(&error)).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, INTERNAL_ERROR_BODY.as_bytes());
    }

    #[tokio::test]
    async fn json_body_is_a_bare_string() {
        let (status, content_type, body) = parts(json(&"abc123")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(content_type.unwrap(), APPLICATION_JSON);
        assert_eq!(body, b"\"abc123\"");
    }
}
