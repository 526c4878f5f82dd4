//! PayHere request signatures.
//!
//! PayHere authenticates both directions of the checkout flow with the same construction:
//!
//! ```text
//! inner = UPPER(HEX(MD5(merchant_secret)))
//! hash  = UPPER(HEX(MD5(merchant_id + order_id + amount + currency [+ status_code] + inner)))
//! ```
//!
//! Amounts are always rendered with exactly two decimal places (`%.2f`). Any other rendering produces a different
//! digest to the one the gateway computes.
//!
//! Received hashes are compared in constant time.
use log::*;
use md5::{Digest, Md5};
use payment_common::{Amount, Secret};
use subtle::ConstantTimeEq;

use crate::PayHereApiError;

/// The hash sent alongside a checkout request.
pub fn generate_hash(
    merchant_id: &str,
    order_id: &str,
    amount: Amount,
    currency: &str,
    secret: &Secret<String>,
) -> Result<String, PayHereApiError> {
    let inner = secret_digest(secret)?;
    Ok(md5_upper_hex(format!("{merchant_id}{order_id}{amount}{currency}{inner}").as_bytes()))
}

/// The hash PayHere attaches to a payment notification (`md5sig`).
pub fn generate_notification_hash(
    merchant_id: &str,
    order_id: &str,
    amount: Amount,
    currency: &str,
    status_code: &str,
    secret: &Secret<String>,
) -> Result<String, PayHereApiError> {
    let inner = secret_digest(secret)?;
    Ok(md5_upper_hex(format!("{merchant_id}{order_id}{amount}{currency}{status_code}{inner}").as_bytes()))
}

/// Checks `received_hash` against the notification hash we compute for the given fields.
///
/// Returns `Ok(false)` on a mismatch. An empty secret is a configuration error rather than a mismatch.
pub fn verify_hash(
    merchant_id: &str,
    order_id: &str,
    amount: Amount,
    currency: &str,
    status_code: &str,
    received_hash: &str,
    secret: &Secret<String>,
) -> Result<bool, PayHereApiError> {
    let expected = generate_notification_hash(merchant_id, order_id, amount, currency, status_code, secret)?;
    let matched: bool = expected.as_bytes().ct_eq(received_hash.trim().as_bytes()).into();
    if !matched {
        debug!("🔐️ Signature mismatch for order {order_id}");
    }
    Ok(matched)
}

fn secret_digest(secret: &Secret<String>) -> Result<String, PayHereApiError> {
    if secret.is_empty() {
        error!("🔐️ The PayHere merchant secret is not configured. Cannot sign or verify payments.");
        return Err(PayHereApiError::Configuration("Merchant secret is not set".to_string()));
    }
    Ok(md5_upper_hex(secret.reveal().as_bytes()))
}

fn md5_upper_hex(data: &[u8]) -> String {
    format!("{:X}", Md5::digest(data))
}
