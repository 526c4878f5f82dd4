use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Response body of the OAuth token endpoint. Every field is optional so that a malformed body can be reported as
/// such, rather than as a JSON error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: Option<String>,
    pub token_type: Option<String>,
    pub expires_in: Option<i64>,
    pub scope: Option<String>,
}

/// Response body of the payment retrieval endpoint.
///
/// `status` is `1` on success, `-1` when no payment exists for the order, and `-2` when the bearer token is rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalResponse {
    pub status: i32,
    #[serde(default)]
    pub msg: Option<String>,
    #[serde(default)]
    pub data: Option<Vec<RetrievedPayment>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedPayment {
    #[serde(default)]
    pub payment_id: Option<Value>,
    #[serde(default)]
    pub order_id: Option<Value>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// The gateway's English status label, e.g. `RECEIVED` or `REFUNDED`.
    pub status: String,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub amount: Option<f64>,
}

/// The outcome of a successful retrieval query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteStatus {
    /// The gateway knows about the payment and reports this status label.
    Found(String),
    /// The gateway has no payment for the order (yet). Not an error: the customer may not have paid.
    NotFound,
}
