//! Cart coordinator: validates input, resolves products, and drives the
//! repository.

use common::{CartItemId, ProductId, UserId};

use crate::error::DomainError;
use crate::repository::{CartRepository, ProductLookup};

use super::{
    Acknowledgement, CartItem, CartSummary, ItemResult, MAX_QUANTITY, MIN_QUANTITY,
    TotalItemsSummary, quantity_in_range,
};

/// Service for managing user carts.
///
/// Holds no cart state between calls: every operation reads through to the
/// repository, and every mutation writes through immediately.
pub struct CartService<R: CartRepository, P: ProductLookup> {
    repository: R,
    products: P,
}

impl<R: CartRepository, P: ProductLookup> CartService<R, P> {
    /// Creates a new cart service over the given collaborators.
    pub fn new(repository: R, products: P) -> Self {
        Self {
            repository,
            products,
        }
    }

    /// Returns a reference to the underlying cart repository.
    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Returns a reference to the underlying product lookup.
    pub fn products(&self) -> &P {
        &self.products
    }

    /// Loads the user's cart with live product data.
    #[tracing::instrument(skip(self))]
    pub async fn get_cart(&self, user_id: UserId) -> Result<CartSummary, DomainError> {
        let result: Result<CartSummary, DomainError> = async {
            ensure_user(user_id)?;
            let cart = self
                .repository
                .get_by_user_id(user_id)
                .await
                .map_err(DomainError::from_repository)?;
            Ok(CartSummary::new(&cart))
        }
        .await;

        observe("get_cart", result)
    }

    /// Adds a product to the user's cart, merging with an existing line.
    #[tracing::instrument(skip(self))]
    pub async fn add_item(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: i64,
    ) -> Result<ItemResult, DomainError> {
        let result: Result<ItemResult, DomainError> = async {
            ensure_user(user_id)?;
            ensure_product(product_id)?;
            ensure_quantity(quantity)?;

            let product = self
                .products
                .find_by_id(product_id)
                .await
                .map_err(DomainError::Dependency)?
                .ok_or(DomainError::ProductNotFound(product_id))?;

            let item = CartItem::new(user_id, product, quantity)?;
            let stored = self
                .repository
                .add_item(item)
                .await
                .map_err(DomainError::from_repository)?;

            tracing::info!(item_id = ?stored.id(), quantity = stored.quantity(), "cart item stored");
            Ok(ItemResult::new(&stored, "Product added to cart"))
        }
        .await;

        observe("add_item", result)
    }

    /// Sets the quantity of one of the user's items.
    #[tracing::instrument(skip(self))]
    pub async fn update_item_quantity(
        &self,
        user_id: UserId,
        item_id: CartItemId,
        new_quantity: i64,
    ) -> Result<ItemResult, DomainError> {
        let result: Result<ItemResult, DomainError> = async {
            ensure_user(user_id)?;
            ensure_item(item_id)?;
            if new_quantity < i64::from(MIN_QUANTITY) {
                return Err(DomainError::invalid(
                    "quantity",
                    format!("{new_quantity} is below {MIN_QUANTITY}"),
                ));
            }

            let item = self.load_owned_item(user_id, item_id).await?;
            if new_quantity > i64::from(MAX_QUANTITY) {
                return Err(DomainError::QuantityExceeded(item.product_id()));
            }

            let updated = self
                .repository
                .update_item_quantity(item_id, new_quantity)
                .await
                .map_err(DomainError::from_repository)?;
            Ok(ItemResult::new(&updated, "Quantity updated"))
        }
        .await;

        observe("update_item_quantity", result)
    }

    /// Removes one of the user's items by its id.
    #[tracing::instrument(skip(self))]
    pub async fn remove_item(
        &self,
        user_id: UserId,
        item_id: CartItemId,
    ) -> Result<Acknowledgement, DomainError> {
        let result: Result<Acknowledgement, DomainError> = async {
            ensure_user(user_id)?;
            ensure_item(item_id)?;

            self.load_owned_item(user_id, item_id).await?;

            let removed = self
                .repository
                .remove_item(item_id)
                .await
                .map_err(DomainError::from_repository)?;
            if !removed {
                return Err(DomainError::ItemNotFound(item_id.to_string()));
            }
            Ok(Acknowledgement::new("Product removed from cart"))
        }
        .await;

        observe("remove_item", result)
    }

    /// Removes the user's line for a product.
    #[tracing::instrument(skip(self))]
    pub async fn remove_item_by_product(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<Acknowledgement, DomainError> {
        let result: Result<Acknowledgement, DomainError> = async {
            ensure_user(user_id)?;
            ensure_product(product_id)?;

            let removed = self
                .repository
                .remove_item_by_user_and_product(user_id, product_id)
                .await
                .map_err(DomainError::from_repository)?;
            if !removed {
                return Err(DomainError::ItemNotFound(format!("product {product_id}")));
            }
            Ok(Acknowledgement::new("Product removed from cart"))
        }
        .await;

        observe("remove_item_by_product", result)
    }

    /// Empties the user's cart. Succeeds on an already empty cart.
    #[tracing::instrument(skip(self))]
    pub async fn clear_cart(&self, user_id: UserId) -> Result<Acknowledgement, DomainError> {
        let result: Result<Acknowledgement, DomainError> = async {
            ensure_user(user_id)?;
            self.repository
                .clear_cart(user_id)
                .await
                .map_err(DomainError::from_repository)?;
            Ok(Acknowledgement::new("Cart cleared"))
        }
        .await;

        observe("clear_cart", result)
    }

    /// Returns the number of units in the user's cart.
    #[tracing::instrument(skip(self))]
    pub async fn get_total_items(&self, user_id: UserId) -> Result<TotalItemsSummary, DomainError> {
        let result: Result<TotalItemsSummary, DomainError> = async {
            ensure_user(user_id)?;
            let total = self
                .repository
                .get_total_items(user_id)
                .await
                .map_err(DomainError::from_repository)?;
            Ok(TotalItemsSummary::new(total))
        }
        .await;

        observe("get_total_items", result)
    }

    /// Loads an item and checks that it belongs to `user_id`.
    async fn load_owned_item(
        &self,
        user_id: UserId,
        item_id: CartItemId,
    ) -> Result<CartItem, DomainError> {
        let item = self
            .repository
            .find_item_by_id(item_id)
            .await
            .map_err(DomainError::from_repository)?
            .ok_or_else(|| DomainError::ItemNotFound(item_id.to_string()))?;

        if item.user_id() != user_id {
            tracing::warn!(%item_id, %user_id, owner = %item.user_id(), "cart item ownership mismatch");
            return Err(DomainError::Forbidden { item_id, user_id });
        }

        Ok(item)
    }
}

fn ensure_user(user_id: UserId) -> Result<(), DomainError> {
    if user_id.is_valid() {
        Ok(())
    } else {
        Err(DomainError::invalid(
            "user id",
            format!("{user_id} is not a positive id"),
        ))
    }
}

fn ensure_product(product_id: ProductId) -> Result<(), DomainError> {
    if product_id.is_valid() {
        Ok(())
    } else {
        Err(DomainError::invalid(
            "product id",
            format!("{product_id} is not a positive id"),
        ))
    }
}

fn ensure_item(item_id: CartItemId) -> Result<(), DomainError> {
    if item_id.is_valid() {
        Ok(())
    } else {
        Err(DomainError::invalid(
            "item id",
            format!("{item_id} is not a positive id"),
        ))
    }
}

fn ensure_quantity(quantity: i64) -> Result<(), DomainError> {
    if quantity_in_range(quantity) {
        Ok(())
    } else {
        Err(DomainError::invalid(
            "quantity",
            format!("{quantity} is outside 1..=99"),
        ))
    }
}

/// Records the outcome of an operation and passes the result through.
fn observe<T>(
    operation: &'static str,
    result: Result<T, DomainError>,
) -> Result<T, DomainError> {
    let outcome = match &result {
        Ok(_) => "success",
        Err(err) => {
            tracing::debug!(operation, kind = %err.kind(), error = %err, "cart operation failed");
            err.kind().as_str()
        }
    };
    metrics::counter!("cart_operations_total", "operation" => operation, "outcome" => outcome)
        .increment(1);
    result
}
