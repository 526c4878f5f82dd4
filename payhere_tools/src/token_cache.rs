use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Duration, Utc};
use log::*;

/// Cached tokens are treated as expired this many seconds before their real expiry, so that a token never expires
/// while a request is in flight, or because our clock runs behind the gateway's.
pub const EXPIRY_SAFETY_MARGIN_SECS: i64 = 60;

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
#[cfg(test)]
#[derive(Debug)]
pub struct ManualClock {
    now: std::sync::Mutex<DateTime<Utc>>,
}

#[cfg(test)]
impl ManualClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { now: std::sync::Mutex::new(now) }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now = *now + by;
    }
}

#[cfg(test)]
impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedToken {
    pub value: String,
    pub expires_at: DateTime<Utc>,
}

impl CachedToken {
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        let margin = Duration::seconds(EXPIRY_SAFETY_MARGIN_SECS);
        self.expires_at.checked_sub_signed(margin).is_some_and(|limit| now < limit)
    }
}

/// A single-slot cache for the merchant API bearer token.
///
/// The token and its expiry are stored together behind one lock, so readers never see a token paired with another
/// token's expiry.
pub struct TokenCache {
    slot: RwLock<Option<CachedToken>>,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for TokenCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TokenCache")
    }
}

impl Default for TokenCache {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

impl TokenCache {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { slot: RwLock::new(None), clock }
    }

    /// Returns the cached token, or `None` if there is none, or it is within the safety margin of expiring.
    pub fn get(&self) -> Option<String> {
        let now = self.clock.now();
        let slot = self.slot.read().unwrap_or_else(PoisonError::into_inner);
        match slot.as_ref() {
            Some(token) if token.is_valid_at(now) => Some(token.value.clone()),
            Some(_) => {
                trace!("🎟️ Cached access token has expired");
                None
            },
            None => None,
        }
    }

    /// Stores `token`, which the issuer says is good for `ttl_seconds` from now, and returns its expiry.
    ///
    /// Returns `None` and leaves the cache untouched if the expiry cannot be represented.
    pub fn set(&self, token: String, ttl_seconds: i64) -> Option<DateTime<Utc>> {
        let expires_at = Duration::try_seconds(ttl_seconds).and_then(|ttl| self.clock.now().checked_add_signed(ttl));
        let Some(expires_at) = expires_at else {
            warn!("🎟️ Refusing to cache an access token with a lifetime of {ttl_seconds}s");
            return None;
        };
        let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        *slot = Some(CachedToken { value: token, expires_at });
        debug!("🎟️ Cached a new access token. It expires at {expires_at}");
        Some(expires_at)
    }

    pub fn clear(&self) {
        let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        if slot.take().is_some() {
            debug!("🎟️ Cleared the cached access token");
        }
    }

    pub fn peek(&self) -> Option<CachedToken> {
        self.slot.read().unwrap_or_else(PoisonError::into_inner).clone()
    }
}
