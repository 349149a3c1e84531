//! Domain layer for the cart service.
//!
//! This crate provides:
//! - Cart aggregate with merge and quantity-cap rules
//! - Money and product value objects
//! - Collaborator ports for cart persistence and product lookup
//! - CartService coordinating validation, lookup, and persistence
//! - In-memory adapters for tests and embedding

pub mod cart;
pub mod error;
pub mod memory;
pub mod repository;

pub use cart::{
    Acknowledgement, Cart, CartError, CartItem, CartItemView, CartService, CartSummary, CartView,
    ItemResult, MAX_QUANTITY, MIN_QUANTITY, Money, Product, ProductView, TotalItemsSummary,
    quantity_in_range,
};
pub use common::{CartItemId, ProductId, UserId};
pub use error::{DomainError, ErrorKind};
pub use memory::{InMemoryCartRepository, InMemoryProductCatalog};
pub use repository::{BackendError, CartRepository, ProductLookup, RepositoryError};
