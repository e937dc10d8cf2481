//! Cart domain error types.

use thiserror::Error;

/// Errors raised while editing a cart locally.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CartError {
    /// Quantity must be at least one when adding to the cart.
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(i32),

    /// Incrementing a line would overflow its quantity.
    #[error("Arithmetic overflow in cart quantity")]
    Overflow,
}
