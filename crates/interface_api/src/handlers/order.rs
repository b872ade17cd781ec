//! Order handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use validator::Validate;

use domain_debt::OrderStatus;
use ledger_kernel::{CustomerId, OrderId};

use crate::dto::order::{
    CreateOrderRequest, EditItemsRequest, OrderResponse, PaymentRequest, QuoteRequest,
    QuoteResponse,
};
use crate::dto::{parse_id, parse_money};
use crate::error::ApiError;
use crate::AppState;

/// Creates an order, snapshotting catalog prices at this moment
pub async fn create_order(
    State(state): State<AppState>,
    Json(request): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<OrderResponse>), ApiError> {
    request.validate()?;
    let customer_id: CustomerId = parse_id("customer_id", &request.customer_id)?;
    let items = request
        .items
        .into_iter()
        .map(|item| item.into_domain())
        .collect::<Result<Vec<_>, _>>()?;
    let order = state.ledger.create_order(customer_id, items).await?;
    Ok((StatusCode::CREATED, Json(order.into())))
}

#[derive(Debug, Default, Deserialize)]
pub struct OrderFilterQuery {
    pub status: Option<String>,
}

/// Lists active orders, optionally filtered by status label
pub async fn list_orders(
    State(state): State<AppState>,
    Query(query): Query<OrderFilterQuery>,
) -> Result<Json<Vec<OrderResponse>>, ApiError> {
    let status = query
        .status
        .as_deref()
        .map(|s| {
            s.parse::<OrderStatus>()
                .map_err(ApiError::BadRequest)
        })
        .transpose()?;
    let orders = state.ledger.list_orders(status).await?;
    Ok(Json(orders.into_iter().map(Into::into).collect()))
}

/// Gets an order by ID, including soft-deleted ones
pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<OrderResponse>, ApiError> {
    let id: OrderId = parse_id("order_id", &id)?;
    let order = state.ledger.get_order(id).await?;
    Ok(Json(order.into()))
}

/// Applies a batch of line-item edits; the batch succeeds or fails whole
pub async fn edit_line_items(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<EditItemsRequest>,
) -> Result<Json<OrderResponse>, ApiError> {
    request.validate()?;
    let id: OrderId = parse_id("order_id", &id)?;
    let ops = request
        .ops
        .into_iter()
        .map(|op| op.into_domain())
        .collect::<Result<Vec<_>, _>>()?;
    let order = state.ledger.edit_line_items(id, ops).await?;
    Ok(Json(order.into()))
}

/// Records a payment against an order
pub async fn record_payment(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<PaymentRequest>,
) -> Result<Json<OrderResponse>, ApiError> {
    request.validate()?;
    let id: OrderId = parse_id("order_id", &id)?;
    let amount = parse_money("amount", &request.amount)?;
    let order = state.ledger.record_payment(id, amount, request.note).await?;
    Ok(Json(order.into()))
}

/// Writes an order off as bad debt
pub async fn mark_defaulted(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<OrderResponse>, ApiError> {
    let id: OrderId = parse_id("order_id", &id)?;
    let order = state.ledger.mark_defaulted(id).await?;
    Ok(Json(order.into()))
}

/// Reverses a write-off
pub async fn reverse_default(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<OrderResponse>, ApiError> {
    let id: OrderId = parse_id("order_id", &id)?;
    let order = state.ledger.reverse_default(id).await?;
    Ok(Json(order.into()))
}

/// Soft-deletes an order
pub async fn delete_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id: OrderId = parse_id("order_id", &id)?;
    state.ledger.soft_delete_order(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Prices a prospective set of line items without persisting anything
pub async fn quote(
    State(state): State<AppState>,
    Json(request): Json<QuoteRequest>,
) -> Result<Json<QuoteResponse>, ApiError> {
    request.validate()?;
    let items = request
        .items
        .into_iter()
        .map(|item| item.into_domain())
        .collect::<Result<Vec<_>, _>>()?;
    let quote = state.ledger.quote(items).await?;
    Ok(Json(quote.into()))
}
