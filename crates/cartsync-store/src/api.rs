//! The storefront's cart REST endpoints.

use async_trait::async_trait;
use cartsync_commerce::prelude::*;
use cartsync_data::{FetchClient, Response};
use serde::de::DeserializeOwned;

use crate::{StoreError, StoreResult};

/// Route table of the cart API.
pub mod routes {
    use cartsync_commerce::CartKey;

    /// `GET` lists the signed-in cart, `POST` bulk-stores line items.
    pub const CART: &str = "/api/cart";
    pub const ADD: &str = "/api/cart/add";
    /// Resolves bare line items into snapshots.
    pub const PRODUCTS: &str = "/api/cart/products";
    pub const UPDATE_QUANTITY: &str = "/api/cart/update-quantity";
    pub const COUNT: &str = "/api/cart/count";

    /// `DELETE` target for one line.
    pub fn item(key: CartKey) -> String {
        format!("{}/{}/{}", CART, key.product_id, key.product_type_id)
    }
}

/// Server-side cart operations.
#[async_trait]
pub trait RemoteCartApi: Send + Sync {
    /// Add a line to the signed-in cart; the server merges by key.
    async fn add(&self, item: &CartLineItem) -> StoreResult<()>;

    /// The signed-in cart, enriched.
    async fn list(&self) -> StoreResult<Vec<CartProductSnapshot>>;

    /// Enrich arbitrary line items (used for guest carts).
    async fn resolve(&self, items: &[CartLineItem]) -> StoreResult<Vec<CartProductSnapshot>>;

    async fn remove(&self, key: CartKey) -> StoreResult<()>;

    /// Replace the quantity of one line.
    async fn update_quantity(&self, item: &CartLineItem) -> StoreResult<()>;

    /// Upload a whole cart. Merge semantics are the server's.
    async fn store(&self, items: &[CartLineItem]) -> StoreResult<()>;

    async fn count(&self) -> StoreResult<i32>;
}

/// [`RemoteCartApi`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpCartApi {
    client: FetchClient,
}

impl HttpCartApi {
    /// `client` should carry the base URL and, when signed in, the bearer token.
    pub fn new(client: FetchClient) -> Self {
        Self { client }
    }

    fn unwrap_envelope<T: DeserializeOwned>(
        response: Response,
        what: &'static str,
    ) -> StoreResult<T> {
        let envelope: ServiceResponse<T> = response.error_for_status()?.json()?;
        match envelope.data {
            Some(data) => Ok(data),
            None if !envelope.success => {
                tracing::warn!(what, message = %envelope.message, "cart API rejected request");
                Err(StoreError::Rejected(envelope.message))
            }
            None => Err(StoreError::MissingData(what)),
        }
    }
}

#[async_trait]
impl RemoteCartApi for HttpCartApi {
    async fn add(&self, item: &CartLineItem) -> StoreResult<()> {
        self.client
            .post(routes::ADD)
            .json(item)?
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    async fn list(&self) -> StoreResult<Vec<CartProductSnapshot>> {
        let response = self
            .client
            .get(routes::CART)
            .accept("application/json")
            .send()
            .await?;
        Self::unwrap_envelope(response, "cart products")
    }

    async fn resolve(&self, items: &[CartLineItem]) -> StoreResult<Vec<CartProductSnapshot>> {
        let response = self
            .client
            .post(routes::PRODUCTS)
            .accept("application/json")
            .json(items)?
            .send()
            .await?;
        Self::unwrap_envelope(response, "cart products")
    }

    async fn remove(&self, key: CartKey) -> StoreResult<()> {
        self.client
            .delete(routes::item(key))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    async fn update_quantity(&self, item: &CartLineItem) -> StoreResult<()> {
        self.client
            .put(routes::UPDATE_QUANTITY)
            .json(item)?
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    async fn store(&self, items: &[CartLineItem]) -> StoreResult<()> {
        self.client
            .post(routes::CART)
            .json(items)?
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    async fn count(&self) -> StoreResult<i32> {
        let response = self
            .client
            .get(routes::COUNT)
            .accept("application/json")
            .send()
            .await?;
        Self::unwrap_envelope(response, "cart item count")
    }
}
