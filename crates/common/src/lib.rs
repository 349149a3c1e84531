//! Shared identifier types for the cart service.

mod ids;

pub use ids::{CartItemId, ProductId, UserId};
