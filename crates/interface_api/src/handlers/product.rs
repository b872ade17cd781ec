//! Product catalog handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use ledger_kernel::ProductId;

use crate::dto::product::{CreateProductRequest, ProductResponse, UpdateProductRequest};
use crate::dto::{parse_id, parse_money};
use crate::error::ApiError;
use crate::AppState;

/// Adds a product to the catalog
pub async fn create_product(
    State(state): State<AppState>,
    Json(request): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<ProductResponse>), ApiError> {
    request.validate()?;
    let unit_price = parse_money("unit_price", &request.unit_price)?;
    let purchase_price = request
        .purchase_price
        .as_deref()
        .map(|p| parse_money("purchase_price", p))
        .transpose()?;
    let product = state
        .ledger
        .create_product(request.name, unit_price, purchase_price)
        .await?;
    Ok((StatusCode::CREATED, Json(product.into())))
}

/// Lists active catalog products
pub async fn list_products(
    State(state): State<AppState>,
) -> Result<Json<Vec<ProductResponse>>, ApiError> {
    let products = state.ledger.list_products().await?;
    Ok(Json(products.into_iter().map(Into::into).collect()))
}

/// Gets a product by ID
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ProductResponse>, ApiError> {
    let id: ProductId = parse_id("product_id", &id)?;
    let product = state.ledger.get_product(id).await?;
    Ok(Json(product.into()))
}

/// Re-prices a product; existing order snapshots are untouched
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateProductRequest>,
) -> Result<Json<ProductResponse>, ApiError> {
    let id: ProductId = parse_id("product_id", &id)?;
    let unit_price = parse_money("unit_price", &request.unit_price)?;
    let purchase_price = request
        .purchase_price
        .as_deref()
        .map(|p| parse_money("purchase_price", p))
        .transpose()?;
    let product = state
        .ledger
        .update_product(id, unit_price, purchase_price)
        .await?;
    Ok(Json(product.into()))
}

/// Soft-deletes a product
pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id: ProductId = parse_id("product_id", &id)?;
    state.ledger.soft_delete_product(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
