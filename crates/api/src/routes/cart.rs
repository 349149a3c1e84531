//! Cart endpoints. Every handler requires an authenticated caller.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRef, Path, State};
use axum::http::StatusCode;
use common::{CartItemId, ProductId};
use domain::{
    Acknowledgement, CartRepository, CartService, CartSummary, ItemResult, ProductLookup,
    TotalItemsSummary,
};
use serde::Deserialize;

use crate::auth::{AuthUser, Authenticator};
use crate::error::ApiError;
use crate::response::ApiResponse;

/// Quantity used when an add request does not name one.
const DEFAULT_QUANTITY: i64 = 1;

/// Shared application state accessible from all handlers.
pub struct AppState<R: CartRepository, P: ProductLookup> {
    pub cart_service: CartService<R, P>,
    pub authenticator: Authenticator,
}

impl<R: CartRepository, P: ProductLookup> FromRef<Arc<AppState<R, P>>> for Authenticator {
    fn from_ref(state: &Arc<AppState<R, P>>) -> Self {
        state.authenticator.clone()
    }
}

// -- Request types --

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddItemRequest {
    pub product_id: Option<i64>,
    pub quantity: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateQuantityRequest {
    pub quantity: Option<i64>,
}

type JsonResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

// -- Handlers --

/// GET /api/cart — the caller's cart with live product data.
#[tracing::instrument(skip(state))]
pub async fn get_cart<R: CartRepository + 'static, P: ProductLookup + 'static>(
    State(state): State<Arc<AppState<R, P>>>,
    AuthUser(user_id): AuthUser,
) -> JsonResult<CartSummary> {
    let summary = state.cart_service.get_cart(user_id).await?;
    Ok(ApiResponse::ok(summary))
}

/// DELETE /api/cart — empties the caller's cart.
#[tracing::instrument(skip(state))]
pub async fn clear_cart<R: CartRepository + 'static, P: ProductLookup + 'static>(
    State(state): State<Arc<AppState<R, P>>>,
    AuthUser(user_id): AuthUser,
) -> JsonResult<Acknowledgement> {
    let ack = state.cart_service.clear_cart(user_id).await?;
    Ok(ApiResponse::ok(ack))
}

/// GET /api/cart/count — total units in the caller's cart.
#[tracing::instrument(skip(state))]
pub async fn count<R: CartRepository + 'static, P: ProductLookup + 'static>(
    State(state): State<Arc<AppState<R, P>>>,
    AuthUser(user_id): AuthUser,
) -> JsonResult<TotalItemsSummary> {
    let summary = state.cart_service.get_total_items(user_id).await?;
    Ok(ApiResponse::ok(summary))
}

/// POST /api/cart/items — adds a product, merging with an existing line.
#[tracing::instrument(skip(state, payload))]
pub async fn add_item<R: CartRepository + 'static, P: ProductLookup + 'static>(
    State(state): State<Arc<AppState<R, P>>>,
    AuthUser(user_id): AuthUser,
    payload: Result<Json<AddItemRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<ItemResult>>), ApiError> {
    let Json(req) = payload?;
    let product_id = req
        .product_id
        .ok_or_else(|| ApiError::bad_request("MISSING_PRODUCT_ID", "Product id is required"))?;

    let result = state
        .cart_service
        .add_item(
            user_id,
            ProductId::new(product_id),
            req.quantity.unwrap_or(DEFAULT_QUANTITY),
        )
        .await?;

    Ok((StatusCode::CREATED, ApiResponse::ok(result)))
}

/// PUT /api/cart/items/{id} — sets the quantity of one of the caller's items.
#[tracing::instrument(skip(state, payload))]
pub async fn update_item<R: CartRepository + 'static, P: ProductLookup + 'static>(
    State(state): State<Arc<AppState<R, P>>>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
    payload: Result<Json<UpdateQuantityRequest>, JsonRejection>,
) -> JsonResult<ItemResult> {
    let item_id = CartItemId::new(parse_id(&id)?);
    let Json(req) = payload?;
    let quantity = req
        .quantity
        .ok_or_else(|| ApiError::bad_request("MISSING_QUANTITY", "Quantity is required"))?;

    let result = state
        .cart_service
        .update_item_quantity(user_id, item_id, quantity)
        .await?;
    Ok(ApiResponse::ok(result))
}

/// DELETE /api/cart/items/{id} — removes one of the caller's items.
#[tracing::instrument(skip(state))]
pub async fn remove_item<R: CartRepository + 'static, P: ProductLookup + 'static>(
    State(state): State<Arc<AppState<R, P>>>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> JsonResult<Acknowledgement> {
    let item_id = CartItemId::new(parse_id(&id)?);
    let ack = state.cart_service.remove_item(user_id, item_id).await?;
    Ok(ApiResponse::ok(ack))
}

/// DELETE /api/cart/products/{product_id} — removes the caller's line for a product.
#[tracing::instrument(skip(state))]
pub async fn remove_product<R: CartRepository + 'static, P: ProductLookup + 'static>(
    State(state): State<Arc<AppState<R, P>>>,
    AuthUser(user_id): AuthUser,
    Path(product_id): Path<String>,
) -> JsonResult<Acknowledgement> {
    let product_id = ProductId::new(parse_id(&product_id)?);
    let ack = state
        .cart_service
        .remove_item_by_product(user_id, product_id)
        .await?;
    Ok(ApiResponse::ok(ack))
}

fn parse_id(id: &str) -> Result<i64, ApiError> {
    id.parse()
        .map_err(|e| ApiError::bad_request("INVALID_ID", format!("Invalid ID format: {e}")))
}
