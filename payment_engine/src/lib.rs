//! Payment Engine
//!
//! The payment engine keeps a local record of every payment taken through PayHere, and makes sure that the status it
//! reports can be trusted.
//!
//! The library is divided into two main sections:
//! 1. Storage ([`mod@db`]). SQLite is the supported backend. You should never need to access the database directly.
//!    Instead, use the public API provided by the engine. The data types used in the database are defined in the
//!    [`db_types`] module and are public.
//! 2. The public API ([`PaymentFlowApi`]). It signs new payments for checkout, authenticates PayHere's payment
//!    notifications, and reconciles pending payments against the PayHere retrieval API before reporting them.
//!
//! A payment's status only ever moves once: from `Pending` to one of the terminal statuses. Backends guarantee this
//! with a conditional write, so neither concurrent notifications nor concurrent reconciliations can overwrite a final
//! status.
mod db;

pub mod db_types;
pub mod pe_api;
pub mod status_mapper;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

#[cfg(feature = "sqlite")]
pub use db::sqlite::{SqliteDatabase, SqliteDatabaseError};
pub use db::traits;
pub use pe_api::{
    errors::PaymentFlowError,
    payment_flow_api::PaymentFlowApi,
    payment_objects,
    reconciliation::{ReconciliationOutcome, ReconciliationService},
    webhook::WebhookVerifier,
};
