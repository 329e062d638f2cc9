//! Constants used throughout the asset-token-server.

/* RESPONSE BODIES */
/// Body of every authorization-class rejection. It must not vary with the
/// cause of the rejection.
pub const REJECTION_BODY: &str = "Nothing to see, move it along!";
pub const INTERNAL_ERROR_BODY: &str = "Internal server error";
pub const HEALTH_BODY: &str = "ok";

/* CONTENT TYPES */
pub(crate) const APPLICATION_JSON: &str = "application/json";
pub(crate) const TEXT_PLAIN: &str = "text/plain; charset=utf-8";
