use std::{env, time::Duration};

use log::*;
use payment_common::{helpers::parse_boolean_flag, Secret};

use crate::PayHereApiError;

const SANDBOX_TOKEN_URL: &str = "https://sandbox.payhere.lk/merchant/v1/oauth/token";
const SANDBOX_RETRIEVAL_URL: &str = "https://sandbox.payhere.lk/merchant/v1/payment/search";
const LIVE_TOKEN_URL: &str = "https://www.payhere.lk/merchant/v1/oauth/token";
const LIVE_RETRIEVAL_URL: &str = "https://www.payhere.lk/merchant/v1/payment/search";
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct PayHereConfig {
    /// The merchant id issued by PayHere. It is embedded in every checkout request and notification.
    pub merchant_id: String,
    /// Signs checkout requests and authenticates notifications. Never leaves this process.
    pub merchant_secret: Secret<String>,
    /// Business app credentials for the merchant API (OAuth client-credentials grant).
    pub app_id: String,
    pub app_secret: Secret<String>,
    pub token_url: String,
    pub retrieval_url: String,
    /// Upper bound on every outbound request, including connection setup.
    pub request_timeout: Duration,
    pub return_url: String,
    pub cancel_url: String,
    pub notify_url: String,
}

impl Default for PayHereConfig {
    fn default() -> Self {
        Self {
            merchant_id: String::default(),
            merchant_secret: Secret::default(),
            app_id: String::default(),
            app_secret: Secret::default(),
            token_url: SANDBOX_TOKEN_URL.to_string(),
            retrieval_url: SANDBOX_RETRIEVAL_URL.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            return_url: String::default(),
            cancel_url: String::default(),
            notify_url: String::default(),
        }
    }
}

impl PayHereConfig {
    pub fn new_from_env_or_default() -> Self {
        let sandbox = parse_boolean_flag(env::var("PGV_PAYHERE_SANDBOX").ok(), true);
        let (default_token_url, default_retrieval_url) = if sandbox {
            info!("🪛️ Using the PayHere sandbox. Set PGV_PAYHERE_SANDBOX=false to use the live gateway.");
            (SANDBOX_TOKEN_URL, SANDBOX_RETRIEVAL_URL)
        } else {
            (LIVE_TOKEN_URL, LIVE_RETRIEVAL_URL)
        };
        let merchant_id = env::var("PGV_PAYHERE_MERCHANT_ID").unwrap_or_else(|_| {
            error!("🪛️ PGV_PAYHERE_MERCHANT_ID is not set. Payments cannot be initiated without it.");
            String::default()
        });
        let merchant_secret = Secret::new(env::var("PGV_PAYHERE_MERCHANT_SECRET").unwrap_or_else(|_| {
            error!("🪛️ PGV_PAYHERE_MERCHANT_SECRET is not set. Payments cannot be signed or verified without it.");
            String::default()
        }));
        let app_id = env::var("PGV_PAYHERE_APP_ID").unwrap_or_else(|_| {
            warn!("🪛️ PGV_PAYHERE_APP_ID is not set. Pending payments cannot be reconciled without it.");
            String::default()
        });
        let app_secret = Secret::new(env::var("PGV_PAYHERE_APP_SECRET").unwrap_or_else(|_| {
            warn!("🪛️ PGV_PAYHERE_APP_SECRET is not set. Pending payments cannot be reconciled without it.");
            String::default()
        }));
        let token_url = env::var("PGV_PAYHERE_TOKEN_URL").unwrap_or_else(|_| default_token_url.to_string());
        let retrieval_url =
            env::var("PGV_PAYHERE_RETRIEVAL_URL").unwrap_or_else(|_| default_retrieval_url.to_string());
        let request_timeout = env::var("PGV_PAYHERE_REQUEST_TIMEOUT")
            .ok()
            .and_then(|s| {
                s.parse::<u64>()
                    .map(Duration::from_secs)
                    .map_err(|e| warn!("🪛️ Invalid configuration value for PGV_PAYHERE_REQUEST_TIMEOUT. {e}"))
                    .ok()
            })
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT);
        let return_url = env::var("PGV_PAYHERE_RETURN_URL").unwrap_or_default();
        let cancel_url = env::var("PGV_PAYHERE_CANCEL_URL").unwrap_or_default();
        let notify_url = env::var("PGV_PAYHERE_NOTIFY_URL").unwrap_or_else(|_| {
            warn!("🪛️ PGV_PAYHERE_NOTIFY_URL is not set. PayHere will not be able to notify us of payment updates.");
            String::default()
        });
        Self {
            merchant_id,
            merchant_secret,
            app_id,
            app_secret,
            token_url,
            retrieval_url,
            request_timeout,
            return_url,
            cancel_url,
            notify_url,
        }
    }

    /// Checks the settings needed to sign checkout requests and verify notifications.
    pub fn validate_merchant(&self) -> Result<(), PayHereApiError> {
        let mut missing = Vec::new();
        if self.merchant_id.trim().is_empty() {
            missing.push("merchant id");
        }
        if self.merchant_secret.is_empty() {
            missing.push("merchant secret");
        }
        missing_to_result(&missing)
    }

    /// Checks the settings needed to talk to the merchant API.
    pub fn validate_app_credentials(&self) -> Result<(), PayHereApiError> {
        let mut missing = Vec::new();
        if self.app_id.trim().is_empty() {
            missing.push("app id");
        }
        if self.app_secret.is_empty() {
            missing.push("app secret");
        }
        missing_to_result(&missing)
    }

    pub fn validate(&self) -> Result<(), PayHereApiError> {
        self.validate_merchant()?;
        self.validate_app_credentials()
    }
}

fn missing_to_result(missing: &[&str]) -> Result<(), PayHereApiError> {
    if missing.is_empty() {
        Ok(())
    } else {
        Err(PayHereApiError::Configuration(format!("Missing {}", missing.join(", "))))
    }
}
