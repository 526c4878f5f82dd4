use std::fmt::Debug;

use log::*;
use payhere_tools::{signature::generate_hash, PayHereConfig, RemoteStatusProvider};

use crate::{
    db_types::PaymentRecord,
    pe_api::{
        errors::PaymentFlowError,
        payment_objects::{PaymentInitiation, PaymentRequest, WebhookPayload},
        reconciliation::{ReconciliationOutcome, ReconciliationService},
        webhook::WebhookVerifier,
    },
    traits::PaymentStore,
};

/// `PaymentFlowApi` is the entry point for the payment lifecycle: starting a checkout, accepting PayHere's
/// notifications, and reading a payment's verified status.
pub struct PaymentFlowApi<B, R> {
    db: B,
    remote: R,
    config: PayHereConfig,
}

impl<B, R> Debug for PaymentFlowApi<B, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PaymentFlowApi ({})", self.config.merchant_id)
    }
}

impl<B, R> PaymentFlowApi<B, R> {
    pub fn new(db: B, remote: R, config: PayHereConfig) -> Self {
        Self { db, remote, config }
    }
}

impl<B, R> PaymentFlowApi<B, R>
where
    B: PaymentStore,
    R: RemoteStatusProvider,
{
    /// Creates a pending payment and signs it for checkout.
    ///
    /// The merchant id and secret must be configured. This is checked before anything is stored.
    pub async fn initiate_payment(&self, request: PaymentRequest) -> Result<PaymentInitiation, PaymentFlowError> {
        self.config.validate_merchant()?;
        let new_payment = request.into_new_payment(&self.config.merchant_id);
        let record = self.db.create_payment(new_payment).await?;
        let hash = generate_hash(
            &record.merchant_id,
            &record.order_id.to_string(),
            record.amount,
            record.currency.code(),
            &self.config.merchant_secret,
        )?;
        info!("🔄️ Payment #{} for {} {} initiated", record.order_id, record.amount, record.currency);
        Ok(PaymentInitiation::new(record, &self.config, hash))
    }

    /// Authenticates a PayHere notification and applies it. See [`WebhookVerifier::handle`].
    pub async fn verify_webhook(&self, payload: &WebhookPayload) -> Result<PaymentRecord, PaymentFlowError> {
        WebhookVerifier::new(&self.db, &self.config.merchant_secret).handle(payload).await
    }

    /// The verified payment for `order_id`. `None` if it does not exist, or if it is pending and PayHere could not be
    /// asked about it.
    pub async fn get_payment_by_order_id(&self, order_id: i64) -> Result<Option<PaymentRecord>, PaymentFlowError> {
        ReconciliationService::new(&self.db, &self.remote).get_current_status(order_id).await
    }

    /// Like [`Self::get_payment_by_order_id`], but says why no record was returned.
    pub async fn reconcile(&self, order_id: i64) -> Result<ReconciliationOutcome, PaymentFlowError> {
        ReconciliationService::new(&self.db, &self.remote).reconcile(order_id).await
    }
}
