//! Customer handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use validator::Validate;

use ledger_kernel::CustomerId;

use crate::dto::customer::{CreateCustomerRequest, CustomerResponse, UpdateCustomerRequest};
use crate::dto::order::OrderResponse;
use crate::dto::parse_id;
use crate::dto::summary::SummaryResponse;
use crate::error::ApiError;
use crate::AppState;

/// Creates a new customer
pub async fn create_customer(
    State(state): State<AppState>,
    Json(request): Json<CreateCustomerRequest>,
) -> Result<(StatusCode, Json<CustomerResponse>), ApiError> {
    request.validate()?;
    let customer = state.ledger.create_customer(request.into()).await?;
    Ok((StatusCode::CREATED, Json(customer.into())))
}

/// Lists active customers
pub async fn list_customers(
    State(state): State<AppState>,
) -> Result<Json<Vec<CustomerResponse>>, ApiError> {
    let customers = state.ledger.list_customers().await?;
    Ok(Json(customers.into_iter().map(Into::into).collect()))
}

/// Gets a customer by ID
pub async fn get_customer(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CustomerResponse>, ApiError> {
    let id: CustomerId = parse_id("customer_id", &id)?;
    let customer = state.ledger.get_customer(id).await?;
    Ok(Json(customer.into()))
}

/// Updates a customer's identity fields
pub async fn update_customer(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateCustomerRequest>,
) -> Result<Json<CustomerResponse>, ApiError> {
    request.validate()?;
    let id: CustomerId = parse_id("customer_id", &id)?;
    let customer = state.ledger.update_customer(id, request.into()).await?;
    Ok(Json(customer.into()))
}

/// Soft-deletes a customer
pub async fn delete_customer(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id: CustomerId = parse_id("customer_id", &id)?;
    state.ledger.soft_delete_customer(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Per-account rollup of billed, pending, collected, and defaulted totals
pub async fn account_summary(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SummaryResponse>, ApiError> {
    let id: CustomerId = parse_id("customer_id", &id)?;
    let totals = state.ledger.account_summary(id).await?;
    Ok(Json(totals.into()))
}

#[derive(Debug, Default, Deserialize)]
pub struct OrderListQuery {
    #[serde(default)]
    pub include_deleted: bool,
}

/// Orders belonging to a customer, optionally including soft-deleted ones
pub async fn customer_orders(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<OrderListQuery>,
) -> Result<Json<Vec<OrderResponse>>, ApiError> {
    let id: CustomerId = parse_id("customer_id", &id)?;
    let orders = state
        .ledger
        .customer_orders(id, query.include_deleted)
        .await?;
    Ok(Json(orders.into_iter().map(Into::into).collect()))
}
