//! Results returned by the cart coordinator.

use serde::{Deserialize, Serialize};

use super::{Cart, CartItem, CartItemView, CartView};

/// Result of reading a cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartSummary {
    pub cart: CartView,
    pub message: String,
}

impl CartSummary {
    pub(crate) fn new(cart: &Cart) -> Self {
        let message = if cart.is_empty() {
            "Cart is empty".to_string()
        } else {
            format!("Cart with {} products", cart.total_items())
        };

        Self {
            cart: cart.to_view(),
            message,
        }
    }
}

/// Result of adding or updating a line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemResult {
    pub item: CartItemView,
    pub message: String,
}

impl ItemResult {
    pub(crate) fn new(item: &CartItem, message: impl Into<String>) -> Self {
        Self {
            item: CartItemView::from(item),
            message: message.into(),
        }
    }
}

/// Result of an operation that only reports success.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Acknowledgement {
    pub message: String,
}

impl Acknowledgement {
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Result of counting the units in a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalItemsSummary {
    pub total_items: u32,
    pub message: String,
}

impl TotalItemsSummary {
    pub(crate) fn new(total_items: u32) -> Self {
        Self {
            total_items,
            message: format!("Total products in cart: {total_items}"),
        }
    }
}
