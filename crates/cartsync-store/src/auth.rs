//! Authentication state as seen by the cart.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use cartsync_cache::Cache;

use crate::StoreResult;

/// Local storage key holding the signed-in user's bearer token.
pub const AUTH_TOKEN_KEY: &str = "authToken";

/// Answers whether the current session is signed in.
///
/// Queried on every cart operation; implementations must not assume the
/// answer is stable between calls.
#[async_trait]
pub trait AuthStateOracle: Send + Sync {
    async fn is_authenticated(&self) -> StoreResult<bool>;
}

/// An in-process flag, flipped by whoever owns the session.
#[derive(Debug, Default)]
pub struct StaticAuthState {
    authenticated: AtomicBool,
}

impl StaticAuthState {
    pub fn new(authenticated: bool) -> Self {
        Self {
            authenticated: AtomicBool::new(authenticated),
        }
    }

    /// An unauthenticated session.
    pub fn guest() -> Self {
        Self::new(false)
    }

    pub fn set(&self, authenticated: bool) {
        self.authenticated.store(authenticated, Ordering::SeqCst);
    }
}

#[async_trait]
impl AuthStateOracle for StaticAuthState {
    async fn is_authenticated(&self) -> StoreResult<bool> {
        Ok(self.authenticated.load(Ordering::SeqCst))
    }
}

/// Session state derived from a bearer token kept in local storage.
///
/// The session counts as signed in while a non-blank token is stored under
/// [`AUTH_TOKEN_KEY`].
#[derive(Debug, Clone)]
pub struct StoredTokenAuth {
    cache: Cache,
}

impl StoredTokenAuth {
    pub fn new(cache: Cache) -> Self {
        Self { cache }
    }

    /// The stored token, if any.
    pub async fn token(&self) -> StoreResult<Option<String>> {
        let token: Option<String> = self.cache.get(AUTH_TOKEN_KEY).await?;
        Ok(token.filter(|t| !t.trim().is_empty()))
    }

    /// Persist a token, starting an authenticated session.
    pub async fn sign_in(&self, token: &str) -> StoreResult<()> {
        self.cache.set(AUTH_TOKEN_KEY, token).await?;
        tracing::debug!("stored auth token");
        Ok(())
    }

    /// Forget the token, returning to guest mode.
    pub async fn sign_out(&self) -> StoreResult<()> {
        self.cache.delete(AUTH_TOKEN_KEY).await?;
        tracing::debug!("removed auth token");
        Ok(())
    }
}

#[async_trait]
impl AuthStateOracle for StoredTokenAuth {
    async fn is_authenticated(&self) -> StoreResult<bool> {
        Ok(self.token().await?.is_some())
    }
}
