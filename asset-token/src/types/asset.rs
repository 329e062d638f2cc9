//! Inventory record of a device.

use time::OffsetDateTime;

use super::ConnectionToken;

/// One device in the asset inventory.
///
/// Assets are provisioned and retired by the inventory. Token issuance only
/// ever rewrites `connection_token` together with `connection_token_issued`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Asset {
    pub certificate_serial_number: String,
    pub connection_token: Option<ConnectionToken>,
    pub connection_token_issued: Option<OffsetDateTime>,
}

impl Asset {
    /// A provisioned asset that has never been issued a token.
    pub fn provisioned(certificate_serial_number: impl Into<String>) -> Self {
        Self {
            certificate_serial_number: certificate_serial_number.into(),
            connection_token: None,
            connection_token_issued: None,
        }
    }

    /// Overwrites the token and its issuance time in one step.
    pub fn issue(&mut self, token: ConnectionToken, issued: OffsetDateTime) {
        self.connection_token = Some(token);
        self.connection_token_issued = Some(issued);
    }
}
