//! Validation and application of PayHere payment notifications.
use log::*;
use payhere_tools::signature::verify_hash;
use payment_common::{Amount, Secret};

use crate::{
    db_types::{PaymentRecord, PaymentStatus, StatusUpdate},
    pe_api::{errors::PaymentFlowError, payment_objects::WebhookPayload},
    traits::PaymentStore,
};

pub struct WebhookVerifier<'a, B> {
    db: &'a B,
    merchant_secret: &'a Secret<String>,
}

impl<'a, B> WebhookVerifier<'a, B>
where B: PaymentStore
{
    pub fn new(db: &'a B, merchant_secret: &'a Secret<String>) -> Self {
        Self { db, merchant_secret }
    }

    /// Authenticates a notification and applies its status to the stored payment.
    ///
    /// Nothing is read from or written to storage unless the signature is valid. The status code in a notification uses
    /// the local numbering, so it is stored as is.
    ///
    /// A payment that is already final with a different status is not changed. The stored record is returned in that
    /// case, so that the notification can still be acknowledged.
    pub async fn handle(&self, payload: &WebhookPayload) -> Result<PaymentRecord, PaymentFlowError> {
        let amount = payload.payhere_amount.trim().parse::<Amount>().map_err(|e| {
            warn!("🪝️ Notification for order '{}' has an invalid amount. {e}", payload.order_id);
            PaymentFlowError::MalformedPayload(format!("Invalid payhere_amount '{}'. {e}", payload.payhere_amount))
        })?;
        let valid = verify_hash(
            &payload.merchant_id,
            &payload.order_id,
            amount,
            &payload.payhere_currency,
            &payload.status_code,
            &payload.md5sig,
            self.merchant_secret,
        )?;
        if !valid {
            warn!("🪝️ Rejected a notification for order '{}' with an invalid signature", payload.order_id);
            return Err(PaymentFlowError::SignatureInvalid);
        }
        let order_id = payload.order_id.trim().parse::<i64>().map_err(|e| {
            warn!("🪝️ Signed notification has an invalid order id '{}'. {e}", payload.order_id);
            PaymentFlowError::MalformedPayload(format!("Invalid order_id '{}'", payload.order_id))
        })?;
        let status = PaymentStatus::from_webhook_code(&payload.status_code).map_err(|e| {
            warn!("🪝️ Signed notification for order {order_id} has an invalid status. {e}");
            PaymentFlowError::MalformedPayload(e.to_string())
        })?;
        debug!("🪝️ Verified notification for order {order_id}: {status}");
        match self.db.update_payment_status(order_id, status).await? {
            StatusUpdate::Updated(record) => {
                info!("🪝️ Payment #{order_id} is now {status}");
                Ok(record)
            },
            StatusUpdate::Unchanged(record) => {
                debug!("🪝️ Payment #{order_id} was already {status}");
                Ok(record)
            },
            StatusUpdate::Rejected(record) => {
                warn!(
                    "🪝️ Conflicting notification for payment #{order_id}. It is {} and will not become {status}.",
                    record.status
                );
                Ok(record)
            },
            StatusUpdate::NotFound => {
                warn!("🪝️ Received a notification for unknown order {order_id}");
                Err(PaymentFlowError::PaymentNotFound(order_id))
            },
        }
    }
}
