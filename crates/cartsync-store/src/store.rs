//! The cart store: one entry point for the current cart, whoever owns it.

use std::sync::Arc;

use cartsync_cache::Cache;
use cartsync_commerce::prelude::*;
use tracing::{debug, info};

use crate::api::RemoteCartApi;
use crate::auth::AuthStateOracle;
use crate::backend::{AccountBackend, CartBackend, GuestBackend, CART_KEY};
use crate::notify::{ChangeNotifier, SubscriptionId};
use crate::StoreResult;

/// Local storage key caching the number of cart lines.
pub const COUNT_KEY: &str = "cartItemsCount";

/// Reads and mutates the current cart.
///
/// Every operation asks the [`AuthStateOracle`] which backend to use: the
/// device cart for guests, the server cart once signed in. Mutations end by
/// notifying subscribers registered with [`CartStore::on_change`].
///
/// Guest-mode edits are read-modify-write on device storage without a lock;
/// two interleaved edits can lose one of the updates.
pub struct CartStore {
    cache: Cache,
    api: Arc<dyn RemoteCartApi>,
    auth: Arc<dyn AuthStateOracle>,
    guest: GuestBackend,
    account: AccountBackend,
    notifier: ChangeNotifier,
}

impl CartStore {
    pub fn new(
        cache: Cache,
        api: Arc<dyn RemoteCartApi>,
        auth: Arc<dyn AuthStateOracle>,
    ) -> Self {
        Self {
            guest: GuestBackend::new(cache.clone(), api.clone()),
            account: AccountBackend::new(api.clone()),
            cache,
            api,
            auth,
            notifier: ChangeNotifier::new(),
        }
    }

    /// Register a callback fired after every cart change.
    pub fn on_change(&self, callback: impl Fn() + Send + Sync + 'static) -> SubscriptionId {
        self.notifier.subscribe(callback)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.notifier.unsubscribe(id)
    }

    async fn backend(&self) -> StoreResult<&dyn CartBackend> {
        if self.auth.is_authenticated().await? {
            Ok(&self.account)
        } else {
            Ok(&self.guest)
        }
    }

    /// Add `item`, merging quantities with an existing line of the same key.
    pub async fn add_to_cart(&self, item: CartLineItem) -> StoreResult<()> {
        item.validate()?;

        let backend = self.backend().await?;
        debug!(mode = %backend.mode(), key = %item.key(), quantity = item.quantity, "adding to cart");
        backend.add(item).await?;

        self.refresh_count(backend).await?;
        self.notifier.notify();
        Ok(())
    }

    /// The cart with server-supplied product and price data.
    pub async fn get_cart_products(&self) -> StoreResult<Vec<CartProductSnapshot>> {
        let backend = self.backend().await?;
        let products = backend.list().await?;
        debug!(mode = %backend.mode(), lines = products.len(), "loaded cart products");
        Ok(products)
    }

    /// Remove one line. Removing a line that is not in the cart does nothing.
    pub async fn remove_product_from_cart(
        &self,
        product_id: impl Into<ProductId>,
        product_type_id: impl Into<ProductTypeId>,
    ) -> StoreResult<()> {
        let key = CartKey::new(product_id, product_type_id);
        let backend = self.backend().await?;

        if !backend.remove(key).await? {
            debug!(mode = %backend.mode(), %key, "nothing to remove");
            return Ok(());
        }
        debug!(mode = %backend.mode(), %key, "removed from cart");

        self.refresh_count(backend).await?;
        self.notifier.notify();
        Ok(())
    }

    /// Write back the quantity edited on a snapshot. No bounds are enforced.
    pub async fn update_quantity(&self, snapshot: &CartProductSnapshot) -> StoreResult<()> {
        let backend = self.backend().await?;

        if backend.update_quantity(snapshot.to_line_item()).await? {
            debug!(mode = %backend.mode(), key = %snapshot.key(), quantity = snapshot.quantity, "updated quantity");
            self.notifier.notify();
        }
        Ok(())
    }

    /// Upload the device cart to the server, typically right after sign-in.
    ///
    /// Does nothing, and makes no request, when the device cart is absent or
    /// empty. With `clear_local_after`, the device cart is deleted once the
    /// upload succeeded. How the upload combines with an existing server cart
    /// is up to the server.
    pub async fn store_cart_items(&self, clear_local_after: bool) -> StoreResult<()> {
        let cart = match self.guest.load().await? {
            Some(cart) if !cart.is_empty() => cart,
            _ => {
                debug!("no local cart to store");
                return Ok(());
            }
        };

        self.api.store(cart.items()).await?;
        if clear_local_after {
            self.cache.delete(CART_KEY).await?;
        }
        info!(lines = cart.len(), cleared = clear_local_after, "stored local cart on server");

        self.notifier.notify();
        Ok(())
    }

    /// Refresh the cached line count and notify subscribers.
    pub async fn get_cart_items_count(&self) -> StoreResult<i32> {
        let backend = self.backend().await?;
        let count = self.refresh_count(backend).await?;
        self.notifier.notify();
        Ok(count)
    }

    /// The device cart's raw lines, empty if there is none.
    pub async fn cart_items(&self) -> StoreResult<Vec<CartLineItem>> {
        Ok(self
            .guest
            .load()
            .await?
            .map(LocalCart::into_items)
            .unwrap_or_default())
    }

    /// The count written by the last refresh, 0 if there was none.
    pub async fn cached_items_count(&self) -> StoreResult<i32> {
        Ok(self.cache.get::<i32>(COUNT_KEY).await?.unwrap_or(0))
    }

    async fn refresh_count(&self, backend: &dyn CartBackend) -> StoreResult<i32> {
        let count = backend.count().await?;
        self.cache.set(COUNT_KEY, &count).await?;
        debug!(mode = %backend.mode(), count, "cached cart item count");
        Ok(count)
    }
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("notifier", &self.notifier)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::StaticAuthState;
    use crate::StoreError;
    use async_trait::async_trait;
    use cartsync_cache::MemoryStore;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// In-memory stand-in for the storefront server.
    #[derive(Default)]
    struct FakeApi {
        calls: Mutex<Vec<&'static str>>,
        server_cart: Mutex<LocalCart>,
        uploads: Mutex<Vec<Vec<CartLineItem>>>,
        reject_uploads: AtomicBool,
    }

    impl FakeApi {
        fn record(&self, call: &'static str) {
            self.calls.lock().unwrap().push(call);
        }

        fn calls(&self) -> Vec<&'static str> {
            self.calls.lock().unwrap().clone()
        }

        fn snapshot(item: &CartLineItem) -> CartProductSnapshot {
            serde_json::from_value(serde_json::json!({
                "productId": item.product_id,
                "productTypeId": item.product_type_id,
                "quantity": item.quantity,
                "title": format!("Product {}", item.product_id),
                "price": 10,
            }))
            .unwrap()
        }
    }

    #[async_trait]
    impl RemoteCartApi for FakeApi {
        async fn add(&self, item: &CartLineItem) -> StoreResult<()> {
            self.record("add");
            self.server_cart.lock().unwrap().add(*item)?;
            Ok(())
        }

        async fn list(&self) -> StoreResult<Vec<CartProductSnapshot>> {
            self.record("list");
            let cart = self.server_cart.lock().unwrap();
            Ok(cart.items().iter().map(Self::snapshot).collect())
        }

        async fn resolve(&self, items: &[CartLineItem]) -> StoreResult<Vec<CartProductSnapshot>> {
            self.record("resolve");
            Ok(items.iter().map(Self::snapshot).collect())
        }

        async fn remove(&self, key: CartKey) -> StoreResult<()> {
            self.record("remove");
            self.server_cart.lock().unwrap().remove(key);
            Ok(())
        }

        async fn update_quantity(&self, item: &CartLineItem) -> StoreResult<()> {
            self.record("update_quantity");
            self.server_cart
                .lock()
                .unwrap()
                .set_quantity(item.key(), item.quantity);
            Ok(())
        }

        async fn store(&self, items: &[CartLineItem]) -> StoreResult<()> {
            self.record("store");
            if self.reject_uploads.load(Ordering::SeqCst) {
                return Err(StoreError::Rejected("cart upload refused".to_string()));
            }
            self.uploads.lock().unwrap().push(items.to_vec());
            let mut cart = self.server_cart.lock().unwrap();
            for item in items {
                cart.add(*item)?;
            }
            Ok(())
        }

        async fn count(&self) -> StoreResult<i32> {
            self.record("count");
            Ok(self.server_cart.lock().unwrap().len() as i32)
        }
    }

    struct Harness {
        store: CartStore,
        cache: Cache,
        api: Arc<FakeApi>,
        auth: Arc<StaticAuthState>,
        notified: Arc<AtomicUsize>,
    }

    impl Harness {
        fn new() -> Self {
            let cache = Cache::new(MemoryStore::new());
            let api = Arc::new(FakeApi::default());
            let auth = Arc::new(StaticAuthState::guest());
            let store = CartStore::new(cache.clone(), api.clone(), auth.clone());

            let notified = Arc::new(AtomicUsize::new(0));
            let hits = notified.clone();
            store.on_change(move || {
                hits.fetch_add(1, Ordering::SeqCst);
            });

            Self {
                store,
                cache,
                api,
                auth,
                notified,
            }
        }

        async fn with_local_cart(items: &[(i32, i32, i32)]) -> Self {
            let harness = Self::new();
            let cart: LocalCart = items
                .iter()
                .map(|&(p, t, q)| CartLineItem::new(p, t, q))
                .collect::<Vec<_>>()
                .into();
            harness.cache.set(CART_KEY, &cart).await.unwrap();
            harness
        }

        async fn local_cart(&self) -> Option<Vec<CartLineItem>> {
            self.cache
                .get::<LocalCart>(CART_KEY)
                .await
                .unwrap()
                .map(LocalCart::into_items)
        }

        fn notifications(&self) -> usize {
            self.notified.load(Ordering::SeqCst)
        }
    }

    #[tokio::test]
    async fn test_guest_add_new_key_appends_line() {
        let h = Harness::new();

        h.store.add_to_cart(CartLineItem::new(1, 1, 2)).await.unwrap();

        assert_eq!(h.local_cart().await, Some(vec![CartLineItem::new(1, 1, 2)]));
        assert_eq!(h.store.cached_items_count().await.unwrap(), 1);
        assert_eq!(h.notifications(), 1);
        assert!(h.api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_guest_add_existing_key_increments() {
        let h = Harness::with_local_cart(&[(1, 1, 2)]).await;

        h.store.add_to_cart(CartLineItem::new(1, 1, 3)).await.unwrap();

        assert_eq!(h.local_cart().await, Some(vec![CartLineItem::new(1, 1, 5)]));
        assert_eq!(h.store.cached_items_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_add_rejects_non_positive_quantity() {
        let h = Harness::new();

        let result = h.store.add_to_cart(CartLineItem::new(1, 1, 0)).await;

        assert!(matches!(
            result,
            Err(StoreError::Cart(CartError::InvalidQuantity(0)))
        ));
        assert_eq!(h.local_cart().await, None);
        assert_eq!(h.notifications(), 0);
    }

    #[tokio::test]
    async fn test_guest_remove_missing_key_is_noop() {
        let h = Harness::with_local_cart(&[]).await;

        h.store.remove_product_from_cart(5, 1).await.unwrap();

        assert_eq!(h.local_cart().await, Some(vec![]));
        assert_eq!(h.notifications(), 0);
    }

    #[tokio::test]
    async fn test_guest_remove_without_cart_is_noop() {
        let h = Harness::new();

        h.store.remove_product_from_cart(5, 1).await.unwrap();

        assert_eq!(h.local_cart().await, None);
        assert_eq!(h.notifications(), 0);
    }

    #[tokio::test]
    async fn test_guest_remove_present_key_leaves_others() {
        let h = Harness::with_local_cart(&[(1, 1, 1), (2, 1, 2), (2, 2, 3)]).await;

        h.store.remove_product_from_cart(2, 1).await.unwrap();

        assert_eq!(
            h.local_cart().await,
            Some(vec![CartLineItem::new(1, 1, 1), CartLineItem::new(2, 2, 3)])
        );
        assert_eq!(h.store.cached_items_count().await.unwrap(), 2);
        assert_eq!(h.notifications(), 1);
    }

    #[tokio::test]
    async fn test_guest_update_quantity_overwrites_only_quantity() {
        let h = Harness::with_local_cart(&[(1, 1, 1), (3, 2, 1)]).await;
        let mut snapshot = FakeApi::snapshot(&CartLineItem::new(3, 2, 1));
        snapshot.quantity = 7;

        h.store.update_quantity(&snapshot).await.unwrap();

        assert_eq!(
            h.local_cart().await,
            Some(vec![CartLineItem::new(1, 1, 1), CartLineItem::new(3, 2, 7)])
        );
        assert_eq!(h.notifications(), 1);
    }

    #[tokio::test]
    async fn test_guest_update_quantity_without_cart_is_noop() {
        let h = Harness::new();
        let snapshot = FakeApi::snapshot(&CartLineItem::new(3, 2, 4));

        h.store.update_quantity(&snapshot).await.unwrap();

        assert_eq!(h.local_cart().await, None);
        assert_eq!(h.notifications(), 0);
    }

    #[tokio::test]
    async fn test_guest_count_matches_line_count() {
        let h = Harness::with_local_cart(&[(1, 1, 4), (2, 1, 1), (3, 1, 9)]).await;

        assert_eq!(h.store.get_cart_items_count().await.unwrap(), 3);
        assert_eq!(h.store.cached_items_count().await.unwrap(), 3);
        assert_eq!(h.notifications(), 1);
    }

    #[tokio::test]
    async fn test_guest_count_without_cart_is_zero_and_notifies() {
        let h = Harness::new();

        assert_eq!(h.store.get_cart_items_count().await.unwrap(), 0);
        assert_eq!(h.notifications(), 1);
    }

    #[tokio::test]
    async fn test_guest_products_empty_cart_skips_server() {
        let h = Harness::with_local_cart(&[]).await;

        assert!(h.store.get_cart_products().await.unwrap().is_empty());
        assert!(h.api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_guest_products_are_resolved_by_server() {
        let h = Harness::with_local_cart(&[(4, 1, 2)]).await;

        let products = h.store.get_cart_products().await.unwrap();

        assert_eq!(h.api.calls(), vec!["resolve"]);
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].title, "Product 4");
        assert_eq!(products[0].quantity, 2);
    }

    #[tokio::test]
    async fn test_store_cart_items_without_cart_makes_no_call() {
        let h = Harness::new();

        h.store.store_cart_items(true).await.unwrap();

        assert!(h.api.calls().is_empty());
        assert_eq!(h.notifications(), 0);
    }

    #[tokio::test]
    async fn test_store_cart_items_empty_cart_makes_no_call() {
        let h = Harness::with_local_cart(&[]).await;

        h.store.store_cart_items(true).await.unwrap();

        assert!(h.api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_store_cart_items_clears_local_copy() {
        let h = Harness::with_local_cart(&[(1, 1, 2), (2, 1, 1)]).await;

        h.store.store_cart_items(true).await.unwrap();

        assert_eq!(
            *h.api.uploads.lock().unwrap(),
            vec![vec![CartLineItem::new(1, 1, 2), CartLineItem::new(2, 1, 1)]]
        );
        assert_eq!(h.local_cart().await, None);
        assert_eq!(h.notifications(), 1);
    }

    #[tokio::test]
    async fn test_store_cart_items_keeps_local_copy() {
        let h = Harness::with_local_cart(&[(1, 1, 2)]).await;

        h.store.store_cart_items(false).await.unwrap();

        assert_eq!(h.api.calls(), vec!["store"]);
        assert_eq!(h.local_cart().await, Some(vec![CartLineItem::new(1, 1, 2)]));
    }

    #[tokio::test]
    async fn test_authenticated_add_goes_to_server() {
        let h = Harness::new();
        h.auth.set(true);

        h.store.add_to_cart(CartLineItem::new(8, 1, 1)).await.unwrap();

        assert_eq!(h.api.calls(), vec!["add", "count"]);
        assert_eq!(h.local_cart().await, None);
        assert_eq!(h.store.cached_items_count().await.unwrap(), 1);
        assert_eq!(h.notifications(), 1);
    }

    #[tokio::test]
    async fn test_authenticated_remove_and_update_delegate() {
        let h = Harness::new();
        h.auth.set(true);
        h.store.add_to_cart(CartLineItem::new(8, 1, 1)).await.unwrap();

        let mut snapshot = h.store.get_cart_products().await.unwrap().remove(0);
        snapshot.quantity = 4;
        h.store.update_quantity(&snapshot).await.unwrap();
        h.store.remove_product_from_cart(8, 1).await.unwrap();

        assert_eq!(
            h.api.calls(),
            vec!["add", "count", "list", "update_quantity", "remove", "count"]
        );
        assert_eq!(h.store.cached_items_count().await.unwrap(), 0);
        assert_eq!(h.notifications(), 3);
    }

    #[tokio::test]
    async fn test_mode_is_checked_on_every_call() {
        let h = Harness::new();

        h.store.add_to_cart(CartLineItem::new(1, 1, 1)).await.unwrap();
        h.auth.set(true);
        h.store.add_to_cart(CartLineItem::new(2, 1, 1)).await.unwrap();
        h.auth.set(false);
        h.store.add_to_cart(CartLineItem::new(1, 1, 1)).await.unwrap();

        assert_eq!(h.local_cart().await, Some(vec![CartLineItem::new(1, 1, 2)]));
        assert_eq!(h.api.calls(), vec!["add", "count"]);
    }

    #[tokio::test]
    async fn test_login_merges_guest_cart_into_account() {
        let h = Harness::with_local_cart(&[(1, 1, 2), (5, 2, 1)]).await;
        h.api.server_cart.lock().unwrap().add(CartLineItem::new(9, 1, 1)).unwrap();

        h.auth.set(true);
        h.store.store_cart_items(true).await.unwrap();
        let count = h.store.get_cart_items_count().await.unwrap();

        assert_eq!(count, 3);
        assert_eq!(h.local_cart().await, None);
        assert!(h.store.cart_items().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unsubscribed_callback_is_not_called() {
        let h = Harness::new();
        let extra = Arc::new(AtomicUsize::new(0));
        let hits = extra.clone();
        let id = h.store.on_change(move || {
            hits.fetch_add(1, Ordering::SeqCst);
        });

        assert!(h.store.unsubscribe(id));
        h.store.get_cart_items_count().await.unwrap();

        assert_eq!(extra.load(Ordering::SeqCst), 0);
        assert_eq!(h.notifications(), 1);
    }

    #[tokio::test]
    async fn test_guest_count_merges_duplicate_stored_lines() {
        let h = Harness::new();
        h.cache
            .set(
                CART_KEY,
                &serde_json::json!([
                    { "productId": 1, "productTypeId": 1, "quantity": 1 },
                    { "productId": 1, "productTypeId": 1, "quantity": 2 },
                ]),
            )
            .await
            .unwrap();

        assert_eq!(h.store.get_cart_items_count().await.unwrap(), 1);
        assert_eq!(
            h.store.cart_items().await.unwrap(),
            vec![CartLineItem::new(1, 1, 3)]
        );
    }

    #[tokio::test]
    async fn test_failed_upload_keeps_local_cart() {
        let h = Harness::with_local_cart(&[(1, 1, 2), (4, 2, 1)]).await;
        h.api.reject_uploads.store(true, Ordering::SeqCst);
        h.auth.set(true);

        let err = h.store.store_cart_items(true).await.unwrap_err();

        assert!(matches!(err, StoreError::Rejected(_)));
        assert_eq!(
            h.local_cart().await,
            Some(vec![CartLineItem::new(1, 1, 2), CartLineItem::new(4, 2, 1)])
        );
        assert_eq!(h.notifications(), 0);
    }
}
