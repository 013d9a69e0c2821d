//! Revoked-token set
//!
//! Logout revokes a token by recording its `jti` until the token's own
//! expiry. Token verification stays stateless otherwise; the auth middleware
//! consults this set after signature/expiry checks. A periodic sweep (spawned
//! from `main`) drops entries whose token has expired anyway.

use std::sync::Arc;

use dashmap::DashMap;

use crate::util::now_millis;

/// In-process set of revoked token ids with their expiry (epoch millis).
#[derive(Clone, Default)]
pub struct RevocationList {
    /// jti -> token expiry (epoch millis)
    inner: Arc<DashMap<String, i64>>,
}

impl RevocationList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a token id as revoked until `expires_at_millis`.
    pub fn revoke(&self, jti: &str, expires_at_millis: i64) {
        self.inner.insert(jti.to_owned(), expires_at_millis);
    }

    /// Whether the token id is currently revoked. An entry whose expiry has
    /// passed no longer counts: the token is rejected by the expiry check.
    pub fn is_revoked(&self, jti: &str) -> bool {
        self.inner
            .get(jti)
            .is_some_and(|exp| *exp > now_millis())
    }

    /// Drop entries whose token has expired.
    pub fn sweep(&self) {
        let now = now_millis();
        self.inner.retain(|_, exp| *exp > now);
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.inner.len()
    }
}
