//! # Storage contracts.
//!
//! The payment engine never talks to a database directly. Backends implement [`PaymentStore`], and the engine's APIs
//! are generic over it.
//!
//! The most important guarantee a backend gives is that [`PaymentStore::update_payment_status`] is a *conditional*
//! write: it only ever moves a payment out of `Pending`, and decides that atomically with the write itself.
mod payment_store;

pub use payment_store::{PaymentStore, PaymentStoreError};
