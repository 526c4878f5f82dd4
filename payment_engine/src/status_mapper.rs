//! Translation of PayHere retrieval API status labels into local payment statuses.
//!
//! The retrieval API reports English labels (`RECEIVED`, `REFUNDED`, ...), unlike payment notifications which carry
//! the numeric codes [`PaymentStatus`] already uses. The two paths are kept apart on purpose; see
//! [`PaymentStatus::from_webhook_code`] for the notification path.
use log::*;

use crate::db_types::PaymentStatus;

/// Maps a retrieval API status label onto a local status.
///
/// Unknown labels map to [`PaymentStatus::Pending`]: an unrecognised signal must never be turned into a success or a
/// failure. They are logged at `warn` so that new labels get noticed.
pub fn map_remote_status(remote_status: &str) -> PaymentStatus {
    match remote_status.trim().to_ascii_uppercase().as_str() {
        "RECEIVED" => PaymentStatus::Success,
        "REFUND REQUESTED" | "REFUND PROCESSING" | "REFUNDED" => PaymentStatus::Cancelled,
        "CHARGEBACKED" => PaymentStatus::Chargedback,
        other => {
            warn!("🔄️ Unrecognised PayHere payment status '{other}'. Treating the payment as pending.");
            PaymentStatus::Pending
        },
    }
}
