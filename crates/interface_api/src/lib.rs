//! HTTP API Layer
//!
//! This crate provides the REST API for the debt ledger using Axum.
//!
//! # Architecture
//!
//! - **Handlers**: Request handlers for customers, products, orders, and
//!   summaries
//! - **DTOs**: Request/Response data transfer objects; monetary amounts
//!   cross this boundary as strings
//! - **Error Handling**: Consistent error responses mapped from domain
//!   errors
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::create_router;
//!
//! let app = create_router(ledger, pool, config);
//! axum::serve(listener, app).await?;
//! ```

pub mod config;
pub mod dto;
pub mod error;
pub mod handlers;

use std::sync::Arc;

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use sqlx::PgPool;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use domain_debt::DebtLedger;
use infra_store::PgLedgerStore;

use crate::config::ApiConfig;
use crate::handlers::{customer, health, order, product, summary};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<DebtLedger<PgLedgerStore>>,
    pub pool: PgPool,
    pub config: ApiConfig,
}

/// Creates the main API router
///
/// # Arguments
///
/// * `ledger` - The ledger engine, already reconciled against the store
/// * `pool` - Database connection pool (readiness checks)
/// * `config` - API configuration
pub fn create_router(
    ledger: Arc<DebtLedger<PgLedgerStore>>,
    pool: PgPool,
    config: ApiConfig,
) -> Router {
    let state = AppState {
        ledger,
        pool,
        config,
    };

    let health_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check));

    let customer_routes = Router::new()
        .route("/", post(customer::create_customer))
        .route("/", get(customer::list_customers))
        .route("/:id", get(customer::get_customer))
        .route("/:id", put(customer::update_customer))
        .route("/:id", delete(customer::delete_customer))
        .route("/:id/summary", get(customer::account_summary))
        .route("/:id/orders", get(customer::customer_orders));

    let product_routes = Router::new()
        .route("/", post(product::create_product))
        .route("/", get(product::list_products))
        .route("/:id", get(product::get_product))
        .route("/:id", put(product::update_product))
        .route("/:id", delete(product::delete_product));

    let order_routes = Router::new()
        .route("/", post(order::create_order))
        .route("/", get(order::list_orders))
        .route("/:id", get(order::get_order))
        .route("/:id", delete(order::delete_order))
        .route("/:id/items", put(order::edit_line_items))
        .route("/:id/payments", post(order::record_payment))
        .route("/:id/default", post(order::mark_defaulted))
        .route("/:id/default", delete(order::reverse_default));

    let api_routes = Router::new()
        .nest("/customers", customer_routes)
        .nest("/products", product_routes)
        .nest("/orders", order_routes)
        .route("/summary", get(summary::system_summary))
        .route("/quote", post(order::quote));

    Router::new()
        .merge(health_routes)
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
