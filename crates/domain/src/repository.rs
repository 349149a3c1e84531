//! Collaborator ports consumed by the cart coordinator.

use async_trait::async_trait;
use common::{CartItemId, ProductId, UserId};
use thiserror::Error;

use crate::cart::{Cart, CartItem, Product};

/// Boxed error from a storage backend.
pub type BackendError = Box<dyn std::error::Error + Send + Sync>;

/// Errors reported by repository and lookup implementations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// A merge would push the stored quantity above the cap. Nothing was written.
    #[error("Quantity for product {product_id} cannot exceed 99")]
    QuantityExceeded { product_id: ProductId },

    /// A quantity outside the allowed range was passed to an update.
    #[error("Invalid quantity: {quantity} (must be between 1 and 99)")]
    InvalidQuantity { quantity: i64 },

    /// The targeted cart item does not exist.
    #[error("Cart item not found: {0}")]
    ItemNotFound(CartItemId),

    /// The backend itself failed (connectivity, constraint violation, bad row).
    #[error("Backend error: {0}")]
    Backend(#[source] BackendError),
}

impl RepositoryError {
    /// Wraps any backend error.
    pub fn backend(err: impl Into<BackendError>) -> Self {
        RepositoryError::Backend(err.into())
    }
}

/// Result type for port operations.
pub type Result<T> = std::result::Result<T, RepositoryError>;

/// Read-only access to the product catalog.
#[async_trait]
pub trait ProductLookup: Send + Sync {
    /// Returns the current catalog data for a product, or None if absent.
    async fn find_by_id(&self, product_id: ProductId) -> Result<Option<Product>>;
}

/// Persistence of cart line items keyed by (user, product).
///
/// Every read joins stored rows with live product data, so prices and names
/// reflect the catalog at read time.
#[async_trait]
pub trait CartRepository: Send + Sync {
    /// Builds the user's cart, most recently added lines first.
    async fn get_by_user_id(&self, user_id: UserId) -> Result<Cart>;

    /// Inserts the item, or merges it into the existing line for the same
    /// product by summing quantities.
    ///
    /// The merge-or-insert is atomic per (user, product). A sum above the cap
    /// fails with `QuantityExceeded` and writes nothing.
    async fn add_item(&self, item: CartItem) -> Result<CartItem>;

    /// Sets the quantity of a stored item and returns the refreshed item.
    async fn update_item_quantity(
        &self,
        item_id: CartItemId,
        new_quantity: i64,
    ) -> Result<CartItem>;

    /// Deletes an item. Returns false if nothing was deleted.
    async fn remove_item(&self, item_id: CartItemId) -> Result<bool>;

    /// Deletes the user's line for a product. Returns false if none existed.
    async fn remove_item_by_user_and_product(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<bool>;

    /// Deletes every line of the user's cart. Succeeds on an empty cart.
    async fn clear_cart(&self, user_id: UserId) -> Result<bool>;

    /// Returns the user's line for a product, if any.
    async fn find_item(&self, user_id: UserId, product_id: ProductId)
    -> Result<Option<CartItem>>;

    /// Returns an item by its persisted id, if any.
    async fn find_item_by_id(&self, item_id: CartItemId) -> Result<Option<CartItem>>;

    /// Returns the summed quantity over the user's lines (0 if empty).
    async fn get_total_items(&self, user_id: UserId) -> Result<u32>;
}
