//! Newtype IDs for type-safe identifiers.
//!
//! The storefront server keys products and product types by integer. Wrapping
//! them keeps a product id from being passed where a product type id is
//! expected, which matters because the two always travel together.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Macro to generate integer newtype ID structs.
macro_rules! define_id {
    ($name:ident) => {
        /// A server-assigned integer identifier.
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(i32);

        impl $name {
            /// Create a new ID from its raw value.
            pub const fn new(id: i32) -> Self {
                Self(id)
            }

            /// Get the raw integer value.
            pub const fn get(self) -> i32 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i32> for $name {
            fn from(id: i32) -> Self {
                Self(id)
            }
        }
    };
}

define_id!(ProductId);
define_id!(ProductTypeId);

/// Identity of a cart line: one line per (product, product type) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartKey {
    pub product_id: ProductId,
    pub product_type_id: ProductTypeId,
}

impl CartKey {
    /// Create a key from its two halves.
    pub fn new(product_id: impl Into<ProductId>, product_type_id: impl Into<ProductTypeId>) -> Self {
        Self {
            product_id: product_id.into(),
            product_type_id: product_type_id.into(),
        }
    }
}

impl fmt::Display for CartKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.product_id, self.product_type_id)
    }
}
