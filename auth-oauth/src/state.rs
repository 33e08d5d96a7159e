//! Single-use anti-forgery tokens for the federated login round trip

use auth_identity::{Clock, SystemClock};
use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use rand::{rngs::OsRng, RngCore};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Lifetime of a state token
pub const STATE_TOKEN_TTL_MINUTES: i64 = 5;

const STATE_TOKEN_BYTES: usize = 32;

pub struct StateTokenRegistry {
    entries: Mutex<HashMap<String, DateTime<Utc>>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl StateTokenRegistry {
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
            clock,
        }
    }

    /// Mint a fresh token valid for the registry's TTL.
    ///
    /// Entries that have already expired are swept on every call.
    pub fn issue(&self) -> String {
        let mut bytes = [0u8; STATE_TOKEN_BYTES];
        OsRng.fill_bytes(&mut bytes);
        let token = hex::encode(bytes);

        let now = self.clock.now();
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|_, expires_at| *expires_at >= now);
        let swept = before - entries.len();
        entries.insert(token.clone(), now + self.ttl);

        if swept > 0 {
            debug!(swept, outstanding = entries.len(), "Swept expired state tokens");
        }
        token
    }

    /// Redeem a token. Succeeds at most once per issued token.
    ///
    /// Unknown and expired tokens return false and leave the registry untouched.
    pub fn consume(&self, token: &str) -> bool {
        let now = self.clock.now();
        let mut entries = self.entries.lock();

        match entries.get(token) {
            Some(expires_at) if now <= *expires_at => {
                entries.remove(token);
                true
            }
            _ => false,
        }
    }

    /// Outstanding tokens, including expired ones not yet swept
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for StateTokenRegistry {
    fn default() -> Self {
        Self::new(Duration::minutes(STATE_TOKEN_TTL_MINUTES), Arc::new(SystemClock))
    }
}
