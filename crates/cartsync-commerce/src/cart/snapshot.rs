//! Server-enriched view of a cart line.

use crate::cart::CartLineItem;
use crate::ids::{CartKey, ProductId, ProductTypeId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A cart line as the server renders it, with display and pricing data.
///
/// Everything except `quantity` is owned by the server. The client edits
/// `quantity` and hands the snapshot back to update the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartProductSnapshot {
    pub product_id: ProductId,
    pub product_type_id: ProductTypeId,
    pub quantity: i32,
    /// Product title.
    #[serde(default)]
    pub title: String,
    /// Product type name (e.g., "Paperback").
    #[serde(default)]
    pub product_type: String,
    #[serde(default)]
    pub image_url: String,
    /// Unit price as quoted by the server.
    #[serde(default)]
    pub price: Decimal,
}

impl CartProductSnapshot {
    pub fn key(&self) -> CartKey {
        CartKey {
            product_id: self.product_id,
            product_type_id: self.product_type_id,
        }
    }

    /// The line item the server expects back when updating this snapshot.
    pub fn to_line_item(&self) -> CartLineItem {
        CartLineItem {
            product_id: self.product_id,
            product_type_id: self.product_type_id,
            quantity: self.quantity,
        }
    }
}
