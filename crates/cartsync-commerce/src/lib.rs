//! Cart domain types for cartsync.
//!
//! - **Ids**: integer newtypes for products and product types, and the
//!   [`CartKey`] that identifies a cart line
//! - **Cart**: the guest [`LocalCart`] with insert-or-increment semantics,
//!   and the server-enriched [`CartProductSnapshot`]
//! - **Envelope**: the [`ServiceResponse`] wrapper around API payloads
//!
//! # Example
//!
//! ```rust
//! use cartsync_commerce::prelude::*;
//!
//! let mut cart = LocalCart::new();
//! cart.add(CartLineItem::new(1, 1, 2)).unwrap();
//! cart.add(CartLineItem::new(1, 1, 3)).unwrap();
//!
//! assert_eq!(cart.len(), 1);
//! assert_eq!(cart.get(CartKey::new(1, 1)).unwrap().quantity, 5);
//! ```

pub mod cart;
pub mod envelope;
pub mod error;
pub mod ids;

pub use envelope::ServiceResponse;
pub use error::CartError;
pub use ids::{CartKey, ProductId, ProductTypeId};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::cart::{CartLineItem, CartProductSnapshot, LocalCart};
    pub use crate::envelope::ServiceResponse;
    pub use crate::error::CartError;
    pub use crate::ids::{CartKey, ProductId, ProductTypeId};
}
