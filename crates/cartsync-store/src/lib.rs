//! Dual-mode shopping cart store for cartsync.
//!
//! A guest's cart lives in device storage; once the session is signed in the
//! cart lives on the server. [`CartStore`] hides the difference: it asks an
//! [`AuthStateOracle`] on every call and routes to a [`GuestBackend`] or an
//! [`AccountBackend`]. [`CartStore::store_cart_items`] uploads a guest cart
//! at sign-in.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use cartsync_cache::{Cache, FileStore};
//! use cartsync_data::FetchClient;
//! use cartsync_store::prelude::*;
//!
//! let cache = Cache::new(FileStore::open("local-storage.json").await?);
//! let api = HttpCartApi::new(FetchClient::new().with_base_url("https://shop.example"));
//! let auth = StoredTokenAuth::new(cache.clone());
//!
//! let store = CartStore::new(cache, Arc::new(api), Arc::new(auth));
//! store.on_change(|| println!("cart changed"));
//! store.add_to_cart(CartLineItem::new(1, 1, 2)).await?;
//! ```

pub mod api;
pub mod auth;
pub mod backend;
mod error;
mod notify;
mod store;

pub use api::{HttpCartApi, RemoteCartApi};
pub use auth::{AuthStateOracle, StaticAuthState, StoredTokenAuth, AUTH_TOKEN_KEY};
pub use backend::{AccountBackend, CartBackend, CartMode, GuestBackend, CART_KEY};
pub use error::{StoreError, StoreResult};
pub use notify::{ChangeNotifier, SubscriptionId};
pub use store::{CartStore, COUNT_KEY};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{
        AuthStateOracle, CartStore, HttpCartApi, RemoteCartApi, StaticAuthState, StoreError,
        StoreResult, StoredTokenAuth,
    };
    pub use cartsync_commerce::prelude::*;
}
