//! Cart aggregate and related types.

mod aggregate;
mod results;
mod service;
mod value_objects;
mod view;

pub use aggregate::Cart;
pub use results::{Acknowledgement, CartSummary, ItemResult, TotalItemsSummary};
pub use service::CartService;
pub use value_objects::{CartItem, Money, Product};
pub use view::{CartItemView, CartView, ProductView};

use common::{ProductId, UserId};
use thiserror::Error;

/// Smallest quantity a cart line may hold.
pub const MIN_QUANTITY: u32 = 1;

/// Largest quantity a cart line may hold.
pub const MAX_QUANTITY: u32 = 99;

/// Returns true if `quantity` is inside `MIN_QUANTITY..=MAX_QUANTITY`.
pub fn quantity_in_range(quantity: i64) -> bool {
    (i64::from(MIN_QUANTITY)..=i64::from(MAX_QUANTITY)).contains(&quantity)
}

/// Errors raised by the cart aggregate itself.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    /// User id is missing or not positive.
    #[error("Invalid user id: {0}")]
    InvalidUserId(UserId),

    /// Product id is missing or not positive.
    #[error("Invalid product id: {0}")]
    InvalidProductId(ProductId),

    /// Quantity outside the allowed range.
    #[error("Invalid quantity: {quantity} (must be between 1 and 99)")]
    InvalidQuantity { quantity: i64 },

    /// Merging would push a line above the cap.
    #[error("Quantity for product {product_id} cannot exceed 99 (requested {requested})")]
    QuantityExceeded {
        product_id: ProductId,
        requested: u32,
    },

    /// No line for the product.
    #[error("Product {product_id} is not in the cart")]
    ItemNotFound { product_id: ProductId },
}
