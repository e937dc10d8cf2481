//! Line items and the guest cart list.

use crate::error::CartError;
use crate::ids::{CartKey, ProductId, ProductTypeId};
use serde::{Deserialize, Serialize};

/// One (product, product type, quantity) record.
///
/// This is the unit the client persists locally and sends to the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineItem {
    /// Product being purchased.
    pub product_id: ProductId,
    /// Product type (edition, format, size...).
    pub product_type_id: ProductTypeId,
    /// Quantity, expected to be at least one.
    pub quantity: i32,
}

impl CartLineItem {
    /// Create a new line item.
    pub fn new(
        product_id: impl Into<ProductId>,
        product_type_id: impl Into<ProductTypeId>,
        quantity: i32,
    ) -> Self {
        Self {
            product_id: product_id.into(),
            product_type_id: product_type_id.into(),
            quantity,
        }
    }

    /// The identity key of this line.
    pub fn key(&self) -> CartKey {
        CartKey {
            product_id: self.product_id,
            product_type_id: self.product_type_id,
        }
    }

    /// Reject items that cannot be added to a cart.
    pub fn validate(&self) -> Result<(), CartError> {
        if self.quantity <= 0 {
            return Err(CartError::InvalidQuantity(self.quantity));
        }
        Ok(())
    }
}

/// The guest cart as stored on the device.
///
/// An ordered list with at most one line per [`CartKey`]. Serializes as a
/// bare JSON array so it can be written under the `"cart"` storage key.
/// Duplicate keys in stored data are merged on load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<CartLineItem>", into = "Vec<CartLineItem>")]
pub struct LocalCart {
    items: Vec<CartLineItem>,
}

impl LocalCart {
    /// Create an empty cart.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a line, or add its quantity to the existing line with the same key.
    ///
    /// Returns an error if:
    /// - Quantity is not positive
    /// - The merged quantity would overflow
    pub fn add(&mut self, item: CartLineItem) -> Result<(), CartError> {
        item.validate()?;

        let key = item.key();
        if let Some(existing) = self.items.iter_mut().find(|i| i.key() == key) {
            existing.quantity = existing
                .quantity
                .checked_add(item.quantity)
                .ok_or(CartError::Overflow)?;
            return Ok(());
        }

        self.items.push(item);
        Ok(())
    }

    /// Remove the line with this key. Returns whether a line was removed.
    pub fn remove(&mut self, key: CartKey) -> bool {
        let len_before = self.items.len();
        self.items.retain(|i| i.key() != key);
        self.items.len() < len_before
    }

    /// Overwrite the quantity of the line with this key.
    ///
    /// No bounds are enforced here. Returns whether a line was updated.
    pub fn set_quantity(&mut self, key: CartKey, quantity: i32) -> bool {
        match self.items.iter_mut().find(|i| i.key() == key) {
            Some(item) => {
                item.quantity = quantity;
                true
            }
            None => false,
        }
    }

    /// Get a line by key.
    pub fn get(&self, key: CartKey) -> Option<&CartLineItem> {
        self.items.iter().find(|i| i.key() == key)
    }

    /// Number of distinct lines.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Lines in insertion order.
    pub fn items(&self) -> &[CartLineItem] {
        &self.items
    }

    pub fn into_items(self) -> Vec<CartLineItem> {
        self.items
    }
}

impl From<Vec<CartLineItem>> for LocalCart {
    fn from(items: Vec<CartLineItem>) -> Self {
        let mut cart = Self::new();
        for item in items {
            let key = item.key();
            match cart.items.iter_mut().find(|i| i.key() == key) {
                Some(existing) => existing.quantity = existing.quantity.saturating_add(item.quantity),
                None => cart.items.push(item),
            }
        }
        cart
    }
}

impl From<LocalCart> for Vec<CartLineItem> {
    fn from(cart: LocalCart) -> Self {
        cart.items
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cart_of(items: &[(i32, i32, i32)]) -> LocalCart {
        items
            .iter()
            .map(|&(p, t, q)| CartLineItem::new(p, t, q))
            .collect::<Vec<_>>()
            .into()
    }

    #[test]
    fn test_add_new_key_appends_one_line() {
        let mut cart = cart_of(&[(1, 1, 2)]);
        cart.add(CartLineItem::new(2, 1, 4)).unwrap();

        assert_eq!(cart.len(), 2);
        assert_eq!(cart.items()[1], CartLineItem::new(2, 1, 4));
    }

    #[test]
    fn test_add_same_key_increases_quantity() {
        let mut cart = cart_of(&[(1, 1, 2)]);
        cart.add(CartLineItem::new(1, 1, 3)).unwrap();

        assert_eq!(cart, cart_of(&[(1, 1, 5)]));
    }

    #[test]
    fn test_same_product_different_type_is_separate_line() {
        let mut cart = cart_of(&[(1, 1, 1)]);
        cart.add(CartLineItem::new(1, 2, 1)).unwrap();

        assert_eq!(cart.len(), 2);
    }

    #[test]
    fn test_invalid_quantity() {
        let mut cart = LocalCart::new();
        assert_eq!(
            cart.add(CartLineItem::new(1, 1, 0)),
            Err(CartError::InvalidQuantity(0))
        );
        assert!(cart.is_empty());
    }

    #[test]
    fn test_add_overflow() {
        let mut cart = cart_of(&[(1, 1, i32::MAX)]);
        assert_eq!(cart.add(CartLineItem::new(1, 1, 1)), Err(CartError::Overflow));
        assert_eq!(cart.get(CartKey::new(1, 1)).unwrap().quantity, i32::MAX);
    }

    #[test]
    fn test_remove_present_key_leaves_others() {
        let mut cart = cart_of(&[(1, 1, 1), (2, 1, 2), (3, 1, 3)]);
        assert!(cart.remove(CartKey::new(2, 1)));
        assert_eq!(cart, cart_of(&[(1, 1, 1), (3, 1, 3)]));
    }

    #[test]
    fn test_remove_missing_key_is_noop() {
        let mut cart = LocalCart::new();
        assert!(!cart.remove(CartKey::new(5, 1)));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_set_quantity_overwrites_only_quantity() {
        let mut cart = cart_of(&[(1, 1, 1), (2, 3, 2)]);
        assert!(cart.set_quantity(CartKey::new(2, 3), 9));
        assert_eq!(cart, cart_of(&[(1, 1, 1), (2, 3, 9)]));
    }

    #[test]
    fn test_set_quantity_has_no_lower_bound() {
        let mut cart = cart_of(&[(1, 1, 1)]);
        assert!(cart.set_quantity(CartKey::new(1, 1), 0));
        assert_eq!(cart.get(CartKey::new(1, 1)).unwrap().quantity, 0);
    }

    #[test]
    fn test_wire_format() {
        let cart = cart_of(&[(1, 2, 3)]);
        let json = serde_json::to_value(&cart).unwrap();
        assert_eq!(
            json,
            serde_json::json!([{ "productId": 1, "productTypeId": 2, "quantity": 3 }])
        );
    }

    #[test]
    fn test_from_vec_collapses_duplicate_keys() {
        let cart = cart_of(&[(1, 1, 1), (1, 1, 2)]);
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.items()[0].quantity, 3);
    }

    #[test]
    fn test_deserialize_merges_duplicate_keys() {
        let cart: LocalCart = serde_json::from_str(
            r#"[{"productId":1,"productTypeId":1,"quantity":1},
                {"productId":2,"productTypeId":1,"quantity":4},
                {"productId":1,"productTypeId":1,"quantity":2}]"#,
        )
        .unwrap();

        assert_eq!(cart, cart_of(&[(1, 1, 3), (2, 1, 4)]));
    }
}
