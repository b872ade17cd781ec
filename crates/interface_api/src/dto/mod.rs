//! Request/response data transfer objects
//!
//! Monetary amounts arrive as strings and are parsed through
//! [`Money::parse`], the single path from user text into the core. Response
//! amounts serialize back out as fixed-scale decimal strings.

pub mod customer;
pub mod order;
pub mod product;
pub mod summary;

use std::str::FromStr;

use ledger_kernel::Money;

use crate::error::ApiError;

/// Parses a monetary amount from its request representation.
pub(crate) fn parse_money(field: &str, input: &str) -> Result<Money, ApiError> {
    Money::parse(input).map_err(|e| ApiError::Validation(format!("{field}: {e}")))
}

/// Parses a prefixed or bare-UUID identifier from a path or body field.
pub(crate) fn parse_id<T>(field: &str, input: &str) -> Result<T, ApiError>
where
    T: FromStr,
{
    input
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("{field}: malformed identifier {input:?}")))
}
