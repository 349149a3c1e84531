//! Value objects for the cart domain.

use chrono::{DateTime, Utc};
use common::{CartItemId, ProductId, UserId};

use super::{CartError, quantity_in_range};

/// Money amount represented in cents to avoid floating point issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Money {
    /// Amount in cents (e.g., 1000 = $10.00)
    cents: i64,
}

impl Money {
    /// Creates a new Money amount from cents.
    pub const fn from_cents(cents: i64) -> Self {
        Self { cents }
    }

    /// Returns zero money.
    pub const fn zero() -> Self {
        Self { cents: 0 }
    }

    /// Returns the amount in cents.
    pub fn cents(&self) -> i64 {
        self.cents
    }

    /// Returns the dollar portion (whole number).
    pub fn dollars(&self) -> i64 {
        self.cents / 100
    }

    /// Returns the cents portion (remainder after dollars).
    pub fn cents_part(&self) -> i64 {
        self.cents.abs() % 100
    }

    /// Returns true if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.cents == 0
    }

    /// Returns true if the amount is negative.
    pub fn is_negative(&self) -> bool {
        self.cents < 0
    }

    /// Multiplies by a quantity.
    pub fn multiply(&self, quantity: u32) -> Money {
        Money {
            cents: self.cents * i64::from(quantity),
        }
    }

    /// Returns the amount as a decimal number of dollars (e.g. `12.34`).
    ///
    /// Only used for wire output; arithmetic stays in cents.
    pub fn to_decimal(&self) -> f64 {
        self.cents as f64 / 100.0
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.cents < 0 {
            write!(f, "-${}.{:02}", self.dollars().abs(), self.cents_part())
        } else {
            write!(f, "${}.{:02}", self.dollars(), self.cents_part())
        }
    }
}

impl std::ops::Add for Money {
    type Output = Money;

    fn add(self, rhs: Self) -> Self::Output {
        Money {
            cents: self.cents + rhs.cents,
        }
    }
}

impl std::ops::AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.cents += rhs.cents;
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

/// Catalog data for a product as read at access time.
///
/// The cart never mutates it; a fresh copy is joined in on every read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    /// Unit price, never negative.
    pub price: Money,
    pub category: String,
    pub version: Option<String>,
    pub compatibility: Option<String>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Creates a product with the required catalog fields; optional fields
    /// start empty and both timestamps are set to now.
    pub fn new(
        id: ProductId,
        name: impl Into<String>,
        category: impl Into<String>,
        price: Money,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            name: name.into(),
            description: String::new(),
            price,
            category: category.into(),
            version: None,
            compatibility: None,
            image_url: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Returns true if the product costs nothing.
    pub fn is_free(&self) -> bool {
        self.price.is_zero()
    }
}

/// One product entry in a user's cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartItem {
    /// Assigned by persistence; `None` until stored.
    id: Option<CartItemId>,
    user_id: UserId,
    product: Product,
    /// Always within `MIN_QUANTITY..=MAX_QUANTITY`.
    quantity: u32,
    created_at: DateTime<Utc>,
}

impl CartItem {
    /// Creates a new, not yet persisted, line item.
    pub fn new(user_id: UserId, product: Product, quantity: i64) -> Result<Self, CartError> {
        if !user_id.is_valid() {
            return Err(CartError::InvalidUserId(user_id));
        }

        if !product.id.is_valid() {
            return Err(CartError::InvalidProductId(product.id));
        }

        if !quantity_in_range(quantity) {
            return Err(CartError::InvalidQuantity { quantity });
        }

        Ok(Self {
            id: None,
            user_id,
            product,
            quantity: quantity as u32,
            created_at: Utc::now(),
        })
    }

    /// Rebuilds a line item from a stored row.
    ///
    /// Storage enforces the quantity range with a check constraint, so rows
    /// are trusted here.
    pub fn restore(
        id: CartItemId,
        user_id: UserId,
        product: Product,
        quantity: u32,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Some(id),
            user_id,
            product,
            quantity,
            created_at,
        }
    }

    /// Attaches the id assigned by persistence.
    pub fn with_id(mut self, id: CartItemId) -> Self {
        self.id = Some(id);
        self
    }

    /// Replaces the embedded product snapshot.
    pub fn with_product(mut self, product: Product) -> Self {
        self.product = product;
        self
    }

    /// Sets a new quantity. Out-of-range values leave the item unchanged.
    pub fn update_quantity(&mut self, new_quantity: i64) -> Result<&mut Self, CartError> {
        if !quantity_in_range(new_quantity) {
            return Err(CartError::InvalidQuantity {
                quantity: new_quantity,
            });
        }

        self.quantity = new_quantity as u32;
        Ok(self)
    }

    pub fn id(&self) -> Option<CartItemId> {
        self.id
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn product_id(&self) -> ProductId {
        self.product.id
    }

    pub fn product(&self) -> &Product {
        &self.product
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns `product.price * quantity`.
    pub fn subtotal(&self) -> Money {
        self.product.price.multiply(self.quantity)
    }
}
