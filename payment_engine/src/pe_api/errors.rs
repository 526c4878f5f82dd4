use payhere_tools::PayHereApiError;
use thiserror::Error;

use crate::traits::PaymentStoreError;

#[derive(Debug, Clone, Error)]
pub enum PaymentFlowError {
    #[error("Payment gateway is not configured. {0}")]
    Configuration(String),
    #[error("Payment notification signature is invalid")]
    SignatureInvalid,
    #[error("Malformed payment notification. {0}")]
    MalformedPayload(String),
    #[error("No payment exists for order {0}")]
    PaymentNotFound(i64),
    #[error("Payment gateway error. {0}")]
    Upstream(PayHereApiError),
    #[error("Storage error. {0}")]
    Storage(#[from] PaymentStoreError),
}

impl From<PayHereApiError> for PaymentFlowError {
    fn from(e: PayHereApiError) -> Self {
        match e {
            PayHereApiError::Configuration(s) => Self::Configuration(s),
            e => Self::Upstream(e),
        }
    }
}
