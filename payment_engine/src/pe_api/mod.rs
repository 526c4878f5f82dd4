//! # Payment engine public API
//!
//! * [`payment_flow_api`] is the entry point for starting payments, accepting PayHere notifications, and reading
//!   verified payment statuses.
//! * [`reconciliation`] double-checks pending payments against the PayHere retrieval API.
//! * [`webhook`] authenticates and applies payment notifications.
//!
//! The APIs are generic over a storage backend implementing [`crate::traits::PaymentStore`] and a source of remote
//! status implementing [`payhere_tools::RemoteStatusProvider`].
//!
//! ```rust,ignore
//! use payhere_tools::{PayHereConfig, RetrievalClient};
//! use payment_engine::{PaymentFlowApi, SqliteDatabase};
//! let config = PayHereConfig::new_from_env_or_default();
//! let db = SqliteDatabase::new_with_url("sqlite://data/payments.db", 25).await?;
//! let api = PaymentFlowApi::new(db, RetrievalClient::new(&config)?, config);
//! let payment = api.get_payment_by_order_id(42).await?;
//! ```
pub mod errors;
pub mod payment_flow_api;
pub mod payment_objects;
pub mod reconciliation;
pub mod webhook;

#[cfg(test)]
mod mocks;
