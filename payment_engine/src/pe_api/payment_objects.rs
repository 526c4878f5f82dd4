use payhere_tools::PayHereConfig;
use payment_common::Amount;
use serde::{Deserialize, Serialize};

use crate::db_types::{Currency, NewPayment, PaymentRecord, PaymentStatus};

/// A customer's request to start a payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRequest {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub country: String,
    pub amount: Amount,
    #[serde(default)]
    pub currency: Currency,
}

impl PaymentRequest {
    pub fn new(amount: Amount) -> Self {
        Self {
            first_name: String::default(),
            last_name: String::default(),
            email: String::default(),
            phone: String::default(),
            address: String::default(),
            city: String::default(),
            country: String::default(),
            amount,
            currency: Currency::default(),
        }
    }

    pub fn into_new_payment(self, merchant_id: &str) -> NewPayment {
        NewPayment {
            merchant_id: merchant_id.to_string(),
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            phone: self.phone,
            address: self.address,
            city: self.city,
            country: self.country,
            amount: self.amount,
            currency: self.currency,
        }
    }
}

/// Everything the browser needs to post a checkout form to PayHere.
///
/// `amount` is pre-formatted with two decimals, exactly as it was hashed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentInitiation {
    pub merchant_id: String,
    pub order_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub country: String,
    pub items: String,
    pub currency: Currency,
    pub amount: String,
    pub status: PaymentStatus,
    pub return_url: String,
    pub cancel_url: String,
    pub notify_url: String,
    pub hash: String,
}

impl PaymentInitiation {
    pub fn new(record: PaymentRecord, config: &PayHereConfig, hash: String) -> Self {
        Self {
            merchant_id: record.merchant_id,
            order_id: record.order_id,
            first_name: record.first_name,
            last_name: record.last_name,
            email: record.email,
            phone: record.phone,
            address: record.address,
            city: record.city,
            country: record.country,
            items: record.items,
            currency: record.currency,
            amount: record.amount.to_string(),
            status: record.status,
            return_url: config.return_url.clone(),
            cancel_url: config.cancel_url.clone(),
            notify_url: config.notify_url.clone(),
            hash,
        }
    }
}

/// A payment notification, as PayHere posts it to the notify URL.
///
/// None of these fields can be trusted until the `md5sig` has been checked. Missing fields are read as empty strings
/// so that validation, rather than deserialization, decides what to do with them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookPayload {
    #[serde(default)]
    pub merchant_id: String,
    #[serde(default)]
    pub order_id: String,
    #[serde(default)]
    pub payhere_amount: String,
    #[serde(default)]
    pub payhere_currency: String,
    #[serde(default)]
    pub status_code: String,
    #[serde(default)]
    pub md5sig: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_2: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_id: Option<String>,
}
