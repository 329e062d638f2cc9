//! Client certificate serial numbers.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

use crate::AssetTokenError;

/// How strictly a serial number handed over by the transport layer is
/// checked before it is used to look up an asset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SerialValidation {
    /// Accept any string that contains at least one hexadecimal digit.
    #[default]
    Containment,
    /// Accept only non-empty strings made entirely of hexadecimal digits.
    Strict,
}

impl SerialValidation {
    pub fn accepts(self, raw: &str) -> bool {
        match self {
            SerialValidation::Containment => raw.chars().any(|c| c.is_ascii_hexdigit()),
            SerialValidation::Strict => !raw.is_empty() && raw.chars().all(|c| c.is_ascii_hexdigit()),
        }
    }
}

/// Serial number of a client certificate that passed format validation.
///
/// This is the key used to find the asset record of a device. It is only
/// ever built from an identity verified by the TLS layer.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SerialNumber(String);

impl SerialNumber {
    /// Validates `raw` according to `validation`.
    pub fn parse(raw: &str, validation: SerialValidation) -> Result<Self, AssetTokenError> {
        if validation.accepts(raw) {
            Ok(Self(raw.to_string()))
        } else {
            Err(AssetTokenError::MalformedIdentity(raw.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for SerialNumber {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl Display for SerialNumber {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
