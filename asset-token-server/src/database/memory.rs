//! In-memory asset store used for local development and testing.

use std::sync::{Mutex, MutexGuard, PoisonError};

use asset_token::types::{Asset, ConnectionToken, SerialNumber};
use async_trait::async_trait;
use time::OffsetDateTime;
use tracing::{debug, error, instrument};

use super::{DataStore, DatabaseError};

/// Asset inventory held in memory. The mutex is the only synchronization
/// point; every issuance is checked and applied under one lock.
#[derive(Debug, Default)]
pub struct InMemoryAssets {
    assets: Mutex<Vec<Asset>>,
}

impl InMemoryAssets {
    pub fn new(assets: impl IntoIterator<Item = Asset>) -> Self {
        Self {
            assets: Mutex::new(assets.into_iter().collect()),
        }
    }

    /// Inventory with one freshly provisioned asset per serial number.
    pub fn with_serial_numbers<S: Into<String>>(serial_numbers: impl IntoIterator<Item = S>) -> Self {
        Self::new(serial_numbers.into_iter().map(Asset::provisioned))
    }

    /// All assets whose serial number equals `serial_number`.
    pub fn find(&self, serial_number: &str) -> Vec<Asset> {
        self.lock()
            .iter()
            .filter(|asset| asset.certificate_serial_number == serial_number)
            .cloned()
            .collect()
    }

    pub fn assets(&self) -> Vec<Asset> {
        self.lock().clone()
    }

    // A panic while holding the lock cannot leave a half-written asset since
    // `Asset::issue` updates both fields at once.
    fn lock(&self) -> MutexGuard<'_, Vec<Asset>> {
        self.assets.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl DataStore for InMemoryAssets {
    #[instrument(skip_all, err(Debug), fields(serial_number = %serial_number))]
    async fn issue_connection_token(
        &self,
        serial_number: &SerialNumber,
        token: &ConnectionToken,
    ) -> Result<(), DatabaseError> {
        debug!("Issuing connection token in memory.");
        let mut assets = self.lock();

        let matches = assets
            .iter()
            .filter(|asset| asset.certificate_serial_number == serial_number.as_str())
            .count() as u64;

        match matches {
            0 => Err(DatabaseError::NoEntry),
            1 => {
                let issued = OffsetDateTime::now_utc();
                assets
                    .iter_mut()
                    .filter(|asset| asset.certificate_serial_number == serial_number.as_str())
                    .for_each(|asset| asset.issue(token.clone(), issued));
                Ok(())
            }
            count => {
                error!("Unexpected number of matching assets: {}", count);
                Err(DatabaseError::InvalidCountFound(count))
            }
        }
    }
}
