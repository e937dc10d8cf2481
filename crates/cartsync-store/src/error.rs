//! Store error types.

use cartsync_cache::CacheError;
use cartsync_commerce::CartError;
use cartsync_data::FetchError;
use thiserror::Error;

/// Errors surfaced by cart store operations.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The requested cart edit is invalid.
    #[error(transparent)]
    Cart(#[from] CartError),

    /// Reading or writing device storage failed.
    #[error("Local storage error: {0}")]
    Cache(#[from] CacheError),

    /// The cart API could not be reached or answered with an error status.
    #[error("Cart API error: {0}")]
    Fetch(#[from] FetchError),

    /// The server answered with `success: false` and no data.
    #[error("Server rejected request: {0}")]
    Rejected(String),

    /// The server answered successfully but left out the payload.
    #[error("Server response is missing {0}")]
    MissingData(&'static str),
}

impl StoreError {
    /// Whether the failure came from the network side rather than the device.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            StoreError::Fetch(_) | StoreError::Rejected(_) | StoreError::MissingData(_)
        )
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
