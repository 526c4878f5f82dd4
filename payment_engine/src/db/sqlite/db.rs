use std::fmt::Debug;

use log::*;
use sqlx::SqlitePool;

use super::{new_pool, payments, SqliteDatabaseError};
use crate::{
    db_types::{NewPayment, PaymentRecord, PaymentStatus, StatusUpdate},
    traits::{PaymentStore, PaymentStoreError},
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({})", self.url)
    }
}

impl SqliteDatabase {
    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, SqliteDatabaseError> {
        trace!("🗃️ Creating new database connection pool with url {url}");
        let pool = new_pool(url, max_connections).await?;
        let url = url.to_string();
        Ok(Self { url, pool })
    }

    /// Brings the schema up to date. Safe to call on every start-up.
    pub async fn migrate(&self) -> Result<(), SqliteDatabaseError> {
        sqlx::migrate!("./src/db/sqlite/migrations").run(&self.pool).await?;
        debug!("🗃️ Database migrations complete");
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

impl PaymentStore for SqliteDatabase {
    async fn create_payment(&self, payment: NewPayment) -> Result<PaymentRecord, PaymentStoreError> {
        let mut tx = self.pool.begin().await.map_err(SqliteDatabaseError::from)?;
        let order_id = payments::insert_payment(payment, &mut tx).await?;
        let record =
            payments::fetch_payment(order_id, &mut tx).await?.ok_or(SqliteDatabaseError::PaymentVanished(order_id))?;
        tx.commit().await.map_err(SqliteDatabaseError::from)?;
        debug!("🗃️ Payment #{order_id} for {} {} has been saved in the DB", record.amount, record.currency);
        Ok(record)
    }

    async fn fetch_payment(&self, order_id: i64) -> Result<Option<PaymentRecord>, PaymentStoreError> {
        let mut conn = self.pool.acquire().await.map_err(SqliteDatabaseError::from)?;
        let payment = payments::fetch_payment(order_id, &mut conn).await?;
        Ok(payment)
    }

    async fn update_payment_status(
        &self,
        order_id: i64,
        status: PaymentStatus,
    ) -> Result<StatusUpdate, PaymentStoreError> {
        let mut tx = self.pool.begin().await.map_err(SqliteDatabaseError::from)?;
        let written = payments::update_status_if_pending(order_id, status, &mut tx).await?;
        let record = payments::fetch_payment(order_id, &mut tx).await?;
        tx.commit().await.map_err(SqliteDatabaseError::from)?;
        let result = match record {
            None => StatusUpdate::NotFound,
            Some(record) if written => {
                info!("🗃️ Payment #{order_id} is now {status}");
                StatusUpdate::Updated(record)
            },
            Some(record) if record.status == status => {
                trace!("🗃️ Payment #{order_id} is already {status}. Nothing to do.");
                StatusUpdate::Unchanged(record)
            },
            Some(record) => {
                debug!("🗃️ Payment #{order_id} is {} and cannot become {status}", record.status);
                StatusUpdate::Rejected(record)
            },
        };
        Ok(result)
    }
}
