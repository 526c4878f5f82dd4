use std::sync::Arc;

use log::*;
use reqwest::{header, Client};
use tokio::sync::Mutex;

use crate::{PayHereApiError, PayHereConfig, TokenCache, TokenResponse};

/// PayHere's documented default token lifetime, used if the token endpoint does not say.
const DEFAULT_TOKEN_TTL_SECS: i64 = 599;

/// The `Basic` credential for the token endpoint: `base64(app_id:app_secret)`.
pub fn authorization_code(app_id: &str, app_secret: &str) -> String {
    base64::encode(format!("{app_id}:{app_secret}"))
}

/// Fetches merchant API access tokens using the client-credentials grant, caching them until they are about to
/// expire.
///
/// Refreshes are serialised: when the cache is empty, the first caller fetches a new token and everyone else waiting
/// on the refresh lock picks it up from the cache.
pub struct OAuthClient {
    token_url: String,
    app_id: String,
    app_secret: payment_common::Secret<String>,
    client: Arc<Client>,
    cache: Arc<TokenCache>,
    refresh_lock: Mutex<()>,
}

impl std::fmt::Debug for OAuthClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OAuthClient({})", self.token_url)
    }
}

impl OAuthClient {
    pub fn new(config: &PayHereConfig, client: Arc<Client>, cache: Arc<TokenCache>) -> Self {
        Self {
            token_url: config.token_url.clone(),
            app_id: config.app_id.clone(),
            app_secret: config.app_secret.clone(),
            client,
            cache,
            refresh_lock: Mutex::new(()),
        }
    }

    pub async fn get_access_token(&self) -> Result<String, PayHereApiError> {
        if let Some(token) = self.cache.get() {
            trace!("🎟️ Using cached access token");
            return Ok(token);
        }
        let _guard = self.refresh_lock.lock().await;
        // Someone else may have refreshed the token while we were waiting
        if let Some(token) = self.cache.get() {
            trace!("🎟️ Access token was refreshed by another request");
            return Ok(token);
        }
        let response = self.request_token().await?;
        let token = response.access_token.filter(|t| !t.is_empty()).ok_or_else(|| {
            error!("🎟️ The token endpoint did not return an access token");
            PayHereApiError::ServerError("No access token in token response".to_string())
        })?;
        let ttl = response.expires_in.unwrap_or(DEFAULT_TOKEN_TTL_SECS);
        if self.cache.set(token.clone(), ttl).is_none() {
            error!("🎟️ The token endpoint returned an unusable lifetime of {ttl}s");
            return Err(PayHereApiError::ServerError(format!("Token lifetime out of range: {ttl}s")));
        }
        info!("🎟️ Retrieved and cached a new PayHere access token");
        Ok(token)
    }

    /// Drops the cached token, so the next call to [`Self::get_access_token`] fetches a fresh one.
    pub fn invalidate(&self) {
        self.cache.clear();
    }

    async fn request_token(&self) -> Result<TokenResponse, PayHereApiError> {
        if self.app_id.trim().is_empty() || self.app_secret.is_empty() {
            error!("🎟️ PayHere app credentials are not configured");
            return Err(PayHereApiError::Configuration("PayHere app id or app secret is not set".to_string()));
        }
        let auth_code = authorization_code(&self.app_id, self.app_secret.reveal());
        debug!("🎟️ Requesting a new access token from {}", self.token_url);
        let response = self
            .client
            .post(&self.token_url)
            .header(header::AUTHORIZATION, format!("Basic {auth_code}"))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(|e| {
                warn!("🎟️ Network error while fetching an access token. {e}");
                PayHereApiError::UpstreamUnavailable(e.to_string())
            })?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            error!("🎟️ Failed to get an access token. Error {status}. {message}");
            return Err(PayHereApiError::UpstreamAuth { status: status.as_u16(), message });
        }
        response.json::<TokenResponse>().await.map_err(|e| {
            error!("🎟️ Could not read the token response. {e}");
            PayHereApiError::ServerError(e.to_string())
        })
    }
}
