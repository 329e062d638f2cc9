use crate::{
    database::DataStore,
    error::AssetTokenServerError,
    server::{Context, Operation, RequestContext},
};

use asset_token::{
    infrastructure::logging,
    types::{ConnectionToken, SerialNumber},
};
use async_trait::async_trait;
use rand::rngs::OsRng;
use tracing::{debug, info};

/// Issues a fresh connection token to the asset whose certificate serial
/// number matches the caller's verified client certificate.
#[derive(Debug)]
pub struct RequestConnectionToken;

#[async_trait]
impl<DB: DataStore> Operation<DB> for RequestConnectionToken {
    type Output = ConnectionToken;

    async fn operation(
        self,
        request: &RequestContext,
        context: &Context<DB>,
    ) -> Result<ConnectionToken, AssetTokenServerError> {
        info!("Starting connection token issuance.");

        let raw_serial = request
            .client_serial()
            .ok_or(AssetTokenServerError::Unauthenticated)?;
        logging::record_field("serial_number", &raw_serial);

        let serial_number =
            SerialNumber::parse(raw_serial, context.config.identity.serial_validation)?;

        // OsRng keeps no state between requests.
        let token = ConnectionToken::generate(&mut OsRng);
        debug!("Generated connection token.");

        context
            .db
            .issue_connection_token(&serial_number, &token)
            .await?;

        info!("Successfully issued connection token.");
        Ok(token)
    }
}
