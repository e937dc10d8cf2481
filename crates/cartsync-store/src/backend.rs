//! Interchangeable cart backends for guest and signed-in sessions.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use cartsync_cache::Cache;
use cartsync_commerce::prelude::*;

use crate::api::RemoteCartApi;
use crate::StoreResult;

/// Local storage key holding the guest cart.
pub const CART_KEY: &str = "cart";

/// Which backend served an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartMode {
    Guest,
    Authenticated,
}

impl fmt::Display for CartMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Guest => write!(f, "guest"),
            Self::Authenticated => write!(f, "authenticated"),
        }
    }
}

/// The capability set every cart backend provides.
///
/// `remove` and `update_quantity` report whether the cart changed.
#[async_trait]
pub trait CartBackend: Send + Sync {
    fn mode(&self) -> CartMode;

    async fn add(&self, item: CartLineItem) -> StoreResult<()>;

    async fn list(&self) -> StoreResult<Vec<CartProductSnapshot>>;

    async fn remove(&self, key: CartKey) -> StoreResult<bool>;

    async fn update_quantity(&self, item: CartLineItem) -> StoreResult<bool>;

    /// Number of distinct lines.
    async fn count(&self) -> StoreResult<i32>;
}

/// Cart kept on the device under [`CART_KEY`].
///
/// Snapshots are still resolved by the server, which owns all product data.
#[derive(Clone)]
pub struct GuestBackend {
    cache: Cache,
    api: Arc<dyn RemoteCartApi>,
}

impl GuestBackend {
    pub fn new(cache: Cache, api: Arc<dyn RemoteCartApi>) -> Self {
        Self { cache, api }
    }

    /// The stored cart, `None` if nothing was ever written.
    pub async fn load(&self) -> StoreResult<Option<LocalCart>> {
        Ok(self.cache.get(CART_KEY).await?)
    }

    async fn save(&self, cart: &LocalCart) -> StoreResult<()> {
        Ok(self.cache.set(CART_KEY, cart).await?)
    }
}

#[async_trait]
impl CartBackend for GuestBackend {
    fn mode(&self) -> CartMode {
        CartMode::Guest
    }

    async fn add(&self, item: CartLineItem) -> StoreResult<()> {
        let mut cart = self.load().await?.unwrap_or_default();
        cart.add(item)?;
        self.save(&cart).await
    }

    async fn list(&self) -> StoreResult<Vec<CartProductSnapshot>> {
        match self.load().await? {
            Some(cart) if !cart.is_empty() => self.api.resolve(cart.items()).await,
            _ => Ok(Vec::new()),
        }
    }

    async fn remove(&self, key: CartKey) -> StoreResult<bool> {
        let Some(mut cart) = self.load().await? else {
            return Ok(false);
        };
        if !cart.remove(key) {
            return Ok(false);
        }
        self.save(&cart).await?;
        Ok(true)
    }

    async fn update_quantity(&self, item: CartLineItem) -> StoreResult<bool> {
        let Some(mut cart) = self.load().await? else {
            return Ok(false);
        };
        if !cart.set_quantity(item.key(), item.quantity) {
            return Ok(false);
        }
        self.save(&cart).await?;
        Ok(true)
    }

    async fn count(&self) -> StoreResult<i32> {
        let lines = self.load().await?.map_or(0, |cart| cart.len());
        Ok(i32::try_from(lines).map_err(|_| CartError::Overflow)?)
    }
}

/// Cart owned by the server for the signed-in account.
#[derive(Clone)]
pub struct AccountBackend {
    api: Arc<dyn RemoteCartApi>,
}

impl AccountBackend {
    pub fn new(api: Arc<dyn RemoteCartApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl CartBackend for AccountBackend {
    fn mode(&self) -> CartMode {
        CartMode::Authenticated
    }

    async fn add(&self, item: CartLineItem) -> StoreResult<()> {
        self.api.add(&item).await
    }

    async fn list(&self) -> StoreResult<Vec<CartProductSnapshot>> {
        self.api.list().await
    }

    // The server does not say whether the line existed.
    async fn remove(&self, key: CartKey) -> StoreResult<bool> {
        self.api.remove(key).await?;
        Ok(true)
    }

    async fn update_quantity(&self, item: CartLineItem) -> StoreResult<bool> {
        self.api.update_quantity(&item).await?;
        Ok(true)
    }

    async fn count(&self) -> StoreResult<i32> {
        self.api.count().await
    }
}
