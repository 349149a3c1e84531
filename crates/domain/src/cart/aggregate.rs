//! Cart aggregate implementation.

use common::{ProductId, UserId};

use super::{CartError, CartItem, MAX_QUANTITY, Money, view::CartView};

/// A user's shopping cart.
///
/// The cart is not stored as a row of its own: repositories rebuild it from
/// persisted line items joined with live product data on every read, so an
/// instance is a snapshot of one moment. Call the repository again to reload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cart {
    user_id: UserId,

    /// Line items, at most one per product.
    items: Vec<CartItem>,
}

// Construction
impl Cart {
    /// Creates an empty cart for a user.
    pub fn create(user_id: UserId) -> Result<Self, CartError> {
        if !user_id.is_valid() {
            return Err(CartError::InvalidUserId(user_id));
        }

        Ok(Self {
            user_id,
            items: Vec::new(),
        })
    }

    /// Rebuilds a cart from stored line items, keeping their order.
    ///
    /// Lines for the same product are merged through [`Cart::add_item`], so a
    /// storage layer that somehow returned duplicates still yields one line
    /// per product.
    pub fn from_items(
        user_id: UserId,
        items: impl IntoIterator<Item = CartItem>,
    ) -> Result<Self, CartError> {
        let mut cart = Self::create(user_id)?;
        for item in items {
            cart.add_item(item)?;
        }
        Ok(cart)
    }
}

// Query methods
impl Cart {
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns all line items in cart order.
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Returns the line for a product, if any.
    pub fn get_item(&self, product_id: ProductId) -> Option<&CartItem> {
        self.items
            .iter()
            .find(|item| item.product_id() == product_id)
    }

    /// Returns the sum of all line subtotals.
    pub fn total(&self) -> Money {
        self.items.iter().map(CartItem::subtotal).sum()
    }

    /// Returns the sum of all line quantities.
    pub fn total_items(&self) -> u32 {
        self.items.iter().map(CartItem::quantity).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn has_product(&self, product_id: ProductId) -> bool {
        self.get_item(product_id).is_some()
    }

    /// Returns the quantity held for a product, or 0 when absent.
    pub fn product_quantity(&self, product_id: ProductId) -> u32 {
        self.get_item(product_id).map_or(0, CartItem::quantity)
    }

    /// Returns the serializable view used as the API body.
    pub fn to_view(&self) -> CartView {
        CartView::from(self)
    }
}

// Command methods
impl Cart {
    /// Adds a line item.
    ///
    /// If the product is already in the cart the quantities are summed into
    /// the existing line; a sum above the cap fails and leaves the cart as it
    /// was.
    pub fn add_item(&mut self, item: CartItem) -> Result<&mut Self, CartError> {
        let Some(existing) = self
            .items
            .iter_mut()
            .find(|existing| existing.product_id() == item.product_id())
        else {
            self.items.push(item);
            return Ok(self);
        };

        let requested = existing.quantity() + item.quantity();
        if requested > MAX_QUANTITY {
            return Err(CartError::QuantityExceeded {
                product_id: item.product_id(),
                requested,
            });
        }

        existing.update_quantity(i64::from(requested))?;
        Ok(self)
    }

    /// Removes the line for a product.
    pub fn remove_item(&mut self, product_id: ProductId) -> Result<&mut Self, CartError> {
        let index = self
            .items
            .iter()
            .position(|item| item.product_id() == product_id)
            .ok_or(CartError::ItemNotFound { product_id })?;

        self.items.remove(index);
        Ok(self)
    }

    /// Sets the quantity of an existing line.
    pub fn update_item_quantity(
        &mut self,
        product_id: ProductId,
        new_quantity: i64,
    ) -> Result<&mut Self, CartError> {
        if !super::quantity_in_range(new_quantity) {
            return Err(CartError::InvalidQuantity {
                quantity: new_quantity,
            });
        }

        let item = self
            .items
            .iter_mut()
            .find(|item| item.product_id() == product_id)
            .ok_or(CartError::ItemNotFound { product_id })?;

        item.update_quantity(new_quantity)?;
        Ok(self)
    }

    /// Removes every line.
    pub fn clear(&mut self) -> &mut Self {
        self.items.clear();
        self
    }
}
