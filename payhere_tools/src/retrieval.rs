use std::sync::Arc;

use log::*;
use reqwest::{header, Client, StatusCode};

use crate::{OAuthClient, PayHereApiError, PayHereConfig, RemoteStatus, RetrievalResponse, TokenCache};

/// A source of truth for the status of a payment.
#[allow(async_fn_in_trait)]
pub trait RemoteStatusProvider {
    /// Queries the canonical status of the payment for `order_id`.
    ///
    /// `Ok(RemoteStatus::NotFound)` is a normal outcome. Errors mean the status is unknown.
    async fn get_remote_status(&self, order_id: i64) -> Result<RemoteStatus, PayHereApiError>;
}

/// Client for the PayHere payment retrieval API.
#[derive(Clone)]
pub struct RetrievalClient {
    retrieval_url: String,
    client: Arc<Client>,
    oauth: Arc<OAuthClient>,
}

impl std::fmt::Debug for RetrievalClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RetrievalClient({})", self.retrieval_url)
    }
}

impl RetrievalClient {
    /// Builds a client with its own HTTP connection pool and token cache.
    pub fn new(config: &PayHereConfig) -> Result<Self, PayHereApiError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| PayHereApiError::Initialization(e.to_string()))?;
        let client = Arc::new(client);
        let cache = Arc::new(TokenCache::default());
        let oauth = Arc::new(OAuthClient::new(config, Arc::clone(&client), cache));
        Ok(Self::with_oauth(config, client, oauth))
    }

    pub fn with_oauth(config: &PayHereConfig, client: Arc<Client>, oauth: Arc<OAuthClient>) -> Self {
        Self { retrieval_url: config.retrieval_url.clone(), client, oauth }
    }

    /// Fetches the raw retrieval response for `order_id`. Only HTTP and transport failures are errors here; the
    /// response's own `status` field is left for the caller to interpret.
    pub async fn retrieve_payment(&self, order_id: i64) -> Result<RetrievalResponse, PayHereApiError> {
        let token = self.oauth.get_access_token().await?;
        debug!("🔍️ Retrieving payment details for order {order_id}");
        let response = self
            .client
            .get(&self.retrieval_url)
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .query(&[("order_id", order_id.to_string())])
            .send()
            .await
            .map_err(|e| {
                warn!("🔍️ Network error while retrieving order {order_id}. {e}");
                PayHereApiError::UpstreamUnavailable(e.to_string())
            })?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            error!("🔍️ Retrieval API error for order {order_id}. Error {status}. {message}");
            return match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                    self.oauth.invalidate();
                    Err(PayHereApiError::UpstreamAuth { status: status.as_u16(), message })
                },
                _ => Err(PayHereApiError::ServerError(format!("Error {status}. {message}"))),
            };
        }
        response.json::<RetrievalResponse>().await.map_err(|e| {
            error!("🔍️ Could not read the retrieval response for order {order_id}. {e}");
            PayHereApiError::ServerError(e.to_string())
        })
    }
}

impl RemoteStatusProvider for RetrievalClient {
    async fn get_remote_status(&self, order_id: i64) -> Result<RemoteStatus, PayHereApiError> {
        let response = self.retrieve_payment(order_id).await?;
        match response.status {
            1 => match response.data.and_then(|d| d.into_iter().next()) {
                Some(payment) => {
                    info!("🔍️ PayHere reports order {order_id} as {}", payment.status);
                    Ok(RemoteStatus::Found(payment.status))
                },
                None => {
                    warn!("🔍️ PayHere returned no payment data for order {order_id}");
                    Ok(RemoteStatus::NotFound)
                },
            },
            -1 => {
                debug!("🔍️ PayHere has no payments for order {order_id}");
                Ok(RemoteStatus::NotFound)
            },
            -2 => {
                error!("🔍️ PayHere rejected our access token while retrieving order {order_id}");
                self.oauth.invalidate();
                Err(PayHereApiError::UpstreamAuth {
                    status: StatusCode::UNAUTHORIZED.as_u16(),
                    message: response.msg.unwrap_or_default(),
                })
            },
            s => {
                error!("🔍️ Unexpected retrieval status {s} for order {order_id}. {}", response.msg.unwrap_or_default());
                Err(PayHereApiError::ServerError(format!("Unexpected retrieval status {s}")))
            },
        }
    }
}
