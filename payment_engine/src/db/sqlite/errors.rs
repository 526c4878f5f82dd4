use thiserror::Error;

use crate::traits::PaymentStoreError;

#[derive(Debug, Error)]
pub enum SqliteDatabaseError {
    #[error("Database connection error: {0}")]
    DriverError(#[from] sqlx::Error),
    #[error("Database migration error: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),
    #[error("Payment #{0} disappeared during the transaction")]
    PaymentVanished(i64),
}

impl From<SqliteDatabaseError> for PaymentStoreError {
    fn from(e: SqliteDatabaseError) -> Self {
        match e {
            SqliteDatabaseError::PaymentVanished(_) => PaymentStoreError::InsertError(e.to_string()),
            e => PaymentStoreError::DatabaseError(e.to_string()),
        }
    }
}
