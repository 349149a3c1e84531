//! Domain error types.

use common::{CartItemId, ProductId, UserId};
use thiserror::Error;

use crate::cart::CartError;
use crate::repository::RepositoryError;

/// Errors returned by the cart coordinator.
///
/// Each variant corresponds to exactly one [`ErrorKind`]; callers switch on
/// the kind rather than on message text.
#[derive(Debug, Error)]
pub enum DomainError {
    /// A caller-supplied id or quantity is out of range.
    #[error("Invalid {field}: {reason}")]
    InvalidArgument { field: &'static str, reason: String },

    /// The product is absent from the catalog.
    #[error("Product not found: {0}")]
    ProductNotFound(ProductId),

    /// No cart line matches the target.
    #[error("Cart item not found: {0}")]
    ItemNotFound(String),

    /// The item belongs to a different user.
    #[error("Cart item {item_id} does not belong to user {user_id}")]
    Forbidden {
        item_id: CartItemId,
        user_id: UserId,
    },

    /// A merge or update would push a line above the cap.
    #[error("Quantity for product {0} cannot exceed 99")]
    QuantityExceeded(ProductId),

    /// The cart repository failed.
    #[error("Persistence failure: {0}")]
    Persistence(#[source] RepositoryError),

    /// The product lookup failed.
    #[error("Dependency failure: {0}")]
    Dependency(#[source] RepositoryError),
}

/// Tag identifying the kind of a [`DomainError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidArgument,
    ProductNotFound,
    ItemNotFound,
    Forbidden,
    QuantityExceeded,
    PersistenceFailure,
    DependencyFailure,
}

impl ErrorKind {
    /// Returns the machine-readable error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidArgument => "INVALID_ARGUMENT",
            ErrorKind::ProductNotFound => "PRODUCT_NOT_FOUND",
            ErrorKind::ItemNotFound => "ITEM_NOT_FOUND",
            ErrorKind::Forbidden => "FORBIDDEN",
            ErrorKind::QuantityExceeded => "QUANTITY_EXCEEDED",
            ErrorKind::PersistenceFailure => "PERSISTENCE_FAILURE",
            ErrorKind::DependencyFailure => "DEPENDENCY_FAILURE",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl DomainError {
    /// Returns the kind tag of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            DomainError::InvalidArgument { .. } => ErrorKind::InvalidArgument,
            DomainError::ProductNotFound(_) => ErrorKind::ProductNotFound,
            DomainError::ItemNotFound(_) => ErrorKind::ItemNotFound,
            DomainError::Forbidden { .. } => ErrorKind::Forbidden,
            DomainError::QuantityExceeded(_) => ErrorKind::QuantityExceeded,
            DomainError::Persistence(_) => ErrorKind::PersistenceFailure,
            DomainError::Dependency(_) => ErrorKind::DependencyFailure,
        }
    }

    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        DomainError::InvalidArgument {
            field,
            reason: reason.into(),
        }
    }

    /// Maps a cart repository error, keeping the taxonomy tags.
    pub(crate) fn from_repository(err: RepositoryError) -> Self {
        match err {
            RepositoryError::QuantityExceeded { product_id } => {
                DomainError::QuantityExceeded(product_id)
            }
            RepositoryError::InvalidQuantity { quantity } => DomainError::invalid(
                "quantity",
                format!("{quantity} is outside 1..=99"),
            ),
            RepositoryError::ItemNotFound(item_id) => DomainError::ItemNotFound(item_id.to_string()),
            err @ RepositoryError::Backend(_) => DomainError::Persistence(err),
        }
    }
}

impl From<CartError> for DomainError {
    fn from(err: CartError) -> Self {
        match err {
            CartError::InvalidUserId(id) => {
                DomainError::invalid("user id", format!("{id} is not a positive id"))
            }
            CartError::InvalidProductId(id) => {
                DomainError::invalid("product id", format!("{id} is not a positive id"))
            }
            CartError::InvalidQuantity { quantity } => {
                DomainError::invalid("quantity", format!("{quantity} is outside 1..=99"))
            }
            CartError::QuantityExceeded { product_id, .. } => {
                DomainError::QuantityExceeded(product_id)
            }
            CartError::ItemNotFound { product_id } => {
                DomainError::ItemNotFound(format!("product {product_id}"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cart_errors_map_to_kinds() {
        let err: DomainError = CartError::InvalidUserId(UserId::new(0)).into();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);

        let err: DomainError = CartError::QuantityExceeded {
            product_id: ProductId::new(5),
            requested: 100,
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::QuantityExceeded);

        let err: DomainError = CartError::ItemNotFound {
            product_id: ProductId::new(5),
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::ItemNotFound);
    }

    #[test]
    fn test_repository_errors_map_to_kinds() {
        let err = DomainError::from_repository(RepositoryError::QuantityExceeded {
            product_id: ProductId::new(1),
        });
        assert_eq!(err.kind(), ErrorKind::QuantityExceeded);

        let err = DomainError::from_repository(RepositoryError::ItemNotFound(CartItemId::new(3)));
        assert_eq!(err.kind(), ErrorKind::ItemNotFound);

        let err = DomainError::from_repository(RepositoryError::backend(std::io::Error::other(
            "disk on fire",
        )));
        assert_eq!(err.kind(), ErrorKind::PersistenceFailure);
        assert!(err.to_string().contains("disk on fire"));
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(ErrorKind::Forbidden.as_str(), "FORBIDDEN");
        assert_eq!(
            ErrorKind::DependencyFailure.to_string(),
            "DEPENDENCY_FAILURE"
        );
    }
}
