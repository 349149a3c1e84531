//! Serializable shapes of the cart, used verbatim as API response bodies.

use chrono::{DateTime, Utc};
use common::{CartItemId, ProductId, UserId};
use serde::{Deserialize, Serialize};

use super::{Cart, CartItem, Product};

/// Wire shape of a product snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductView {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub formatted_price: String,
    pub category: String,
    pub version: Option<String>,
    pub compatibility: Option<String>,
    pub image_url: Option<String>,
    pub is_free: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Product> for ProductView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price.to_decimal(),
            formatted_price: product.price.to_string(),
            category: product.category.clone(),
            version: product.version.clone(),
            compatibility: product.compatibility.clone(),
            image_url: product.image_url.clone(),
            is_free: product.is_free(),
            created_at: product.created_at,
            updated_at: product.updated_at,
        }
    }
}

/// Wire shape of a cart line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItemView {
    pub id: Option<CartItemId>,
    pub user_id: UserId,
    pub product_id: ProductId,
    pub product: ProductView,
    pub quantity: u32,
    pub subtotal: f64,
    pub formatted_subtotal: String,
    pub created_at: DateTime<Utc>,
}

impl From<&CartItem> for CartItemView {
    fn from(item: &CartItem) -> Self {
        let subtotal = item.subtotal();
        Self {
            id: item.id(),
            user_id: item.user_id(),
            product_id: item.product_id(),
            product: ProductView::from(item.product()),
            quantity: item.quantity(),
            subtotal: subtotal.to_decimal(),
            formatted_subtotal: subtotal.to_string(),
            created_at: item.created_at(),
        }
    }
}

/// Wire shape of a whole cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub user_id: UserId,
    pub items: Vec<CartItemView>,
    pub total_items: u32,
    pub total: f64,
    pub formatted_total: String,
    pub is_empty: bool,
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        let total = cart.total();
        Self {
            user_id: cart.user_id(),
            items: cart.items().iter().map(CartItemView::from).collect(),
            total_items: cart.total_items(),
            total: total.to_decimal(),
            formatted_total: total.to_string(),
            is_empty: cart.is_empty(),
        }
    }
}
