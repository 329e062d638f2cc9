//! Connection tokens handed out to devices.

use rand::{distributions::Alphanumeric, CryptoRng, Rng, RngCore};
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Formatter};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Opaque single-use credential bound to one asset.
///
/// Tokens are [`ConnectionToken::LENGTH`] characters drawn uniformly from
/// `[A-Za-z0-9]`. They serialize as a bare JSON string.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(transparent)]
pub struct ConnectionToken(String);

impl ConnectionToken {
    pub const LENGTH: usize = 32;

    /// Generates a fresh token. Callers must pass a cryptographically secure
    /// RNG.
    pub fn generate(rng: &mut (impl CryptoRng + RngCore)) -> Self {
        let token = std::iter::repeat_with(|| rng.sample(Alphanumeric))
            .take(Self::LENGTH)
            .map(char::from)
            .collect();
        Self(token)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the token has the length and alphabet of a generated token.
    pub fn is_well_formed(&self) -> bool {
        self.0.len() == Self::LENGTH && self.0.chars().all(|c| c.is_ascii_alphanumeric())
    }
}

/// Manual implementation to keep tokens out of logs.
impl Debug for ConnectionToken {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ConnectionToken").field(&"REDACTED").finish()
    }
}
