//! Order DTOs

use chrono::{DateTime, Utc};
use domain_debt::{LineItem, LineItemOp, NewLineItem, Order, PaymentRecord, Quote};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::ApiError;

use super::{parse_id, parse_money};

/// One requested line, either referencing a catalog product or free-form.
#[derive(Debug, Serialize, Deserialize)]
pub struct LineItemRequest {
    pub product_id: Option<String>,
    pub description: Option<String>,
    pub quantity: u32,
    pub unit_price: Option<String>,
}

impl LineItemRequest {
    pub fn into_domain(self) -> Result<NewLineItem, ApiError> {
        Ok(NewLineItem {
            product_id: self
                .product_id
                .as_deref()
                .map(|id| parse_id("product_id", id))
                .transpose()?,
            description: self.description,
            quantity: self.quantity,
            unit_price: self
                .unit_price
                .as_deref()
                .map(|p| parse_money("unit_price", p))
                .transpose()?,
        })
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateOrderRequest {
    #[validate(length(min = 1))]
    pub customer_id: String,
    #[validate(length(min = 1))]
    pub items: Vec<LineItemRequest>,
}

/// One edit operation in a batch, mirroring [`LineItemOp`].
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum LineItemOpRequest {
    Add {
        product_id: Option<String>,
        description: String,
        quantity: u32,
        unit_price: String,
    },
    Update {
        item_id: String,
        quantity: Option<u32>,
        unit_price: Option<String>,
    },
    Remove {
        item_id: String,
    },
}

impl LineItemOpRequest {
    pub fn into_domain(self) -> Result<LineItemOp, ApiError> {
        Ok(match self {
            LineItemOpRequest::Add {
                product_id,
                description,
                quantity,
                unit_price,
            } => LineItemOp::Add {
                product_id: product_id
                    .as_deref()
                    .map(|id| parse_id("product_id", id))
                    .transpose()?,
                description,
                quantity,
                unit_price: parse_money("unit_price", &unit_price)?,
            },
            LineItemOpRequest::Update {
                item_id,
                quantity,
                unit_price,
            } => LineItemOp::Update {
                item_id: parse_id("item_id", &item_id)?,
                quantity,
                unit_price: unit_price
                    .as_deref()
                    .map(|p| parse_money("unit_price", p))
                    .transpose()?,
            },
            LineItemOpRequest::Remove { item_id } => LineItemOp::Remove {
                item_id: parse_id("item_id", &item_id)?,
            },
        })
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct EditItemsRequest {
    #[validate(length(min = 1))]
    pub ops: Vec<LineItemOpRequest>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct PaymentRequest {
    #[validate(length(min = 1))]
    pub amount: String,
    #[validate(length(max = 500))]
    pub note: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct QuoteRequest {
    #[validate(length(min = 1))]
    pub items: Vec<LineItemRequest>,
}

#[derive(Debug, Serialize)]
pub struct LineItemResponse {
    pub id: String,
    pub product_id: Option<String>,
    pub description: String,
    pub quantity: u32,
    pub unit_price: String,
    pub line_total: String,
    pub deleted: bool,
}

impl From<&LineItem> for LineItemResponse {
    fn from(item: &LineItem) -> Self {
        Self {
            id: item.id.to_string(),
            product_id: item.product_id.map(|id| id.to_string()),
            description: item.description.clone(),
            quantity: item.quantity,
            unit_price: item.unit_price.to_string(),
            line_total: item.line_total().to_string(),
            deleted: item.state.is_deleted(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PaymentResponse {
    pub id: String,
    pub amount: String,
    pub recorded_at: DateTime<Utc>,
    pub note: Option<String>,
}

impl From<&PaymentRecord> for PaymentResponse {
    fn from(payment: &PaymentRecord) -> Self {
        Self {
            id: payment.id.to_string(),
            amount: payment.amount.to_string(),
            recorded_at: payment.recorded_at,
            note: payment.note.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub id: String,
    pub customer_id: String,
    pub placed_at: DateTime<Utc>,
    pub status: String,
    pub total: String,
    pub amount_paid: String,
    pub outstanding: String,
    pub written_off: bool,
    pub deleted: bool,
    pub line_items: Vec<LineItemResponse>,
    pub payments: Vec<PaymentResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        Self {
            id: order.id.to_string(),
            customer_id: order.customer_id.to_string(),
            placed_at: order.placed_at,
            status: order.status.to_string(),
            total: order.total().to_string(),
            amount_paid: order.amount_paid.to_string(),
            outstanding: order.outstanding().to_string(),
            written_off: order.written_off,
            deleted: order.state.is_deleted(),
            line_items: order.line_items.iter().map(Into::into).collect(),
            payments: order.payments.iter().map(Into::into).collect(),
            created_at: order.created_at,
            updated_at: order.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct QuoteLineResponse {
    pub description: String,
    pub quantity: u32,
    pub unit_price: String,
    pub line_total: String,
}

#[derive(Debug, Serialize)]
pub struct QuoteResponse {
    pub lines: Vec<QuoteLineResponse>,
    pub total: String,
}

impl From<Quote> for QuoteResponse {
    fn from(quote: Quote) -> Self {
        Self {
            lines: quote
                .lines
                .into_iter()
                .map(|line| QuoteLineResponse {
                    description: line.description,
                    quantity: line.quantity,
                    unit_price: line.unit_price.to_string(),
                    line_total: line.line_total.to_string(),
                })
                .collect(),
            total: quote.total.to_string(),
        }
    }
}
