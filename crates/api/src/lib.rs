//! HTTP API server with observability for the cart service.
//!
//! Provides the authenticated cart endpoints, with structured logging
//! (tracing) and Prometheus metrics.

pub mod auth;
pub mod config;
pub mod error;
pub mod response;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{delete, get, post, put};
use domain::{CartRepository, CartService, ProductLookup};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use auth::Authenticator;
use routes::cart::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<R, P>(state: Arc<AppState<R, P>>, metrics_handle: PrometheusHandle) -> Router
where
    R: CartRepository + 'static,
    P: ProductLookup + 'static,
{
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route(
            "/api/cart",
            get(routes::cart::get_cart::<R, P>).delete(routes::cart::clear_cart::<R, P>),
        )
        .route("/api/cart/count", get(routes::cart::count::<R, P>))
        .route("/api/cart/items", post(routes::cart::add_item::<R, P>))
        .route(
            "/api/cart/items/{id}",
            put(routes::cart::update_item::<R, P>).delete(routes::cart::remove_item::<R, P>),
        )
        .route(
            "/api/cart/products/{product_id}",
            delete(routes::cart::remove_product::<R, P>),
        )
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates the application state from a repository, a product lookup, and
/// the token table.
pub fn create_state<R, P>(
    repository: R,
    products: P,
    authenticator: Authenticator,
) -> Arc<AppState<R, P>>
where
    R: CartRepository,
    P: ProductLookup,
{
    Arc::new(AppState {
        cart_service: CartService::new(repository, products),
        authenticator,
    })
}
