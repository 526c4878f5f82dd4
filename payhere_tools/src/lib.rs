//! PayHere gateway tooling.
//!
//! * [`signature`]: the MD5 double-hash used to sign checkout requests and to authenticate payment notifications.
//! * [`TokenCache`] and [`OAuthClient`]: client-credentials access tokens for the merchant API.
//! * [`RetrievalClient`]: queries the canonical status of a payment.
mod config;
mod data_objects;
mod error;
mod oauth;
mod retrieval;
pub mod signature;
mod token_cache;

pub use config::PayHereConfig;
pub use data_objects::{RemoteStatus, RetrievalResponse, RetrievedPayment, TokenResponse};
pub use error::PayHereApiError;
pub use oauth::{authorization_code, OAuthClient};
pub use retrieval::{RemoteStatusProvider, RetrievalClient};
#[cfg(test)]
pub use token_cache::ManualClock;
pub use token_cache::{CachedToken, Clock, SystemClock, TokenCache, EXPIRY_SAFETY_MARGIN_SECS};
