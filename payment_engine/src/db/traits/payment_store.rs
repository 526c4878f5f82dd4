use thiserror::Error;

use crate::db_types::{NewPayment, PaymentRecord, PaymentStatus, StatusUpdate};

#[derive(Debug, Clone, Error)]
pub enum PaymentStoreError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Could not create payment: {0}")]
    InsertError(String),
}

#[allow(async_fn_in_trait)]
pub trait PaymentStore {
    /// Stores a new `Pending` payment. The backend assigns the order id, which is strictly increasing and never
    /// reused. The item description is set to "Payment for Order {order_id}" in the same transaction.
    async fn create_payment(&self, payment: NewPayment) -> Result<PaymentRecord, PaymentStoreError>;

    /// Fetches the payment with the given order id, if it exists.
    async fn fetch_payment(&self, order_id: i64) -> Result<Option<PaymentRecord>, PaymentStoreError>;

    /// Moves a `Pending` payment to `status`.
    ///
    /// The status check and the write happen atomically, so racing writers can never overwrite a terminal status.
    /// * If the payment is pending and `status` differs, it is written: [`StatusUpdate::Updated`].
    /// * If the payment already has `status`, nothing is written: [`StatusUpdate::Unchanged`].
    /// * If the payment is terminal with another status, nothing is written: [`StatusUpdate::Rejected`].
    async fn update_payment_status(
        &self,
        order_id: i64,
        status: PaymentStatus,
    ) -> Result<StatusUpdate, PaymentStoreError>;
}
