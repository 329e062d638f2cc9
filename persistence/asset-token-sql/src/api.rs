use crate::{Config, PostgresError};
use asset_token::types::{ConnectionToken, SerialNumber};
use asset_token_server::database::{DataStore, DatabaseError};
use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{
    fmt::{Debug, Formatter},
    sync::Arc,
};
use tracing::{debug, error, info, instrument};

#[derive(Clone)]
pub struct PostgresDB {
    config: Arc<Config>,
    /// PgPool is already implemented in terms of an Arc. No need to wrap it.
    connection_pool: PgPool,
}

#[async_trait]
impl DataStore for PostgresDB {
    async fn issue_connection_token(
        &self,
        serial_number: &SerialNumber,
        token: &ConnectionToken,
    ) -> Result<(), DatabaseError> {
        Ok(self
            .issue_connection_token_impl(serial_number, token)
            .await?)
    }
}

impl Debug for PostgresDB {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresDB")
            .field("address", &self.config.address)
            .field("db_name", &self.config.db_name)
            .finish()
    }
}

impl PostgresDB {
    #[instrument(err(Debug))]
    pub async fn connect(config: Config) -> Result<Self, PostgresError> {
        info!("Connecting to database");

        let mut attempts = 0;

        // We have to use `loop` instead of `while` here so that we can return a value
        // after a successful connection.
        let pool = loop {
            if attempts > config.connection_retries {
                return Err(PostgresError::ExceededMaxConnectionAttempts);
            }

            // Create a connection pool based on our config.
            let pool = PgPoolOptions::new()
                .max_connections(config.max_connections)
                .acquire_timeout(config.connection_timeout)
                .connect(&config.uri())
                .await;

            match pool {
                Ok(pool) => break pool,
                Err(e) => {
                    attempts += 1;
                    error!("{e}");
                    error!(
                        "Failed to connect to db. Attempts: {attempts}. Retrying in {:?}",
                        config.connection_retry_delay
                    );
                    tokio::time::sleep(config.connection_retry_delay).await;
                }
            }
        };

        Ok(PostgresDB {
            config: Arc::new(config),
            connection_pool: pool,
        })
    }

    pub fn db_name(&self) -> &str {
        &self.config.db_name
    }

    /// Runs the conditional update in its own transaction and only commits it
    /// when it touched exactly one asset. Dropping an uncommitted transaction
    /// rolls it back and returns the connection to the pool.
    #[instrument(skip_all, err(Debug), fields(serial_number = %serial_number))]
    pub(crate) async fn issue_connection_token_impl(
        &self,
        serial_number: &SerialNumber,
        token: &ConnectionToken,
    ) -> Result<(), PostgresError> {
        debug!("Issuing connection token.");

        let mut transaction = self.connection_pool.begin().await?;

        let rows_affected = sqlx::query(
            "UPDATE assets SET connection_token = $1, connection_token_issued = NOW() \
             WHERE certificate_serial_number = $2",
        )
        .bind(token.as_str())
        .bind(serial_number.as_str())
        .execute(&mut transaction)
        .await?
        .rows_affected();

        match rows_affected {
            0 => {
                transaction.rollback().await?;
                Err(PostgresError::NoEntry)
            }
            1 => {
                transaction.commit().await?;
                Ok(())
            }
            count => {
                // Serial numbers are unique in the schema. Something has gone
                // wrong...
                error!("Unexpected number of rows affected: {}", count);
                transaction.rollback().await?;
                Err(PostgresError::InvalidRowCountFound(count))
            }
        }
    }
}
