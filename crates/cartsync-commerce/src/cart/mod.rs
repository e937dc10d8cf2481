//! Shopping cart module.
//!
//! Contains the line items kept on the device, the local cart list and the
//! server-enriched snapshot view.

mod cart;
mod snapshot;

pub use cart::{CartLineItem, LocalCart};
pub use snapshot::CartProductSnapshot;
