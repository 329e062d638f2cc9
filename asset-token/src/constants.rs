//! Constants shared between the server and the client.

/// Path of the token issuance endpoint.
pub const REQUEST_CONNECTION_TOKEN_PATH: &str = "/request-connection-token";

/// Path of the liveness endpoint.
pub const HEALTH_PATH: &str = "/health";

/// Header a TLS-terminating reverse proxy uses to forward the verified client
/// certificate serial number, unless configured otherwise.
pub const DEFAULT_SERIAL_HEADER: &str = "x-ssl-client-m-serial";
