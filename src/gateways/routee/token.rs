//! OAuth2 access token cache.

use secrecy::SecretString;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

/// Subtracted from the provider's `expires_in` so a token is never used in
/// its last minute.
pub const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// Bearer token with its local expiry deadline.
#[derive(Clone)]
pub(crate) struct AccessToken {
    value: SecretString,
    expires_at: Instant,
}

impl AccessToken {
    pub fn new(value: impl Into<String>, expires_in: Duration) -> Self {
        Self {
            value: SecretString::from(value.into()),
            expires_at: Instant::now() + expires_in.saturating_sub(EXPIRY_MARGIN),
        }
    }

    pub fn value(&self) -> SecretString {
        self.value.clone()
    }

    pub fn is_fresh(&self) -> bool {
        Instant::now() < self.expires_at
    }
}

/// Token slot shared by every clone of one client.
///
/// Readers only ever see a complete token. Two callers finding the slot stale
/// at the same time will both fetch, and the later write wins.
#[derive(Default)]
pub(crate) struct TokenCache {
    slot: RwLock<Option<AccessToken>>,
}

impl TokenCache {
    /// Cached token if it has not expired.
    pub async fn fresh(&self) -> Option<SecretString> {
        let guard = self.slot.read().await;
        guard
            .as_ref()
            .filter(|token| token.is_fresh())
            .map(|token| token.value.clone())
    }

    pub async fn store(&self, token: AccessToken) {
        *self.slot.write().await = Some(token);
    }

    pub async fn invalidate(&self) {
        *self.slot.write().await = None;
    }
}
