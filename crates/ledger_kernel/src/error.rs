//! Kernel error type

use crate::money::MoneyError;
use thiserror::Error;

/// Errors raised by the kernel types themselves.
#[derive(Debug, Error)]
pub enum KernelError {
    #[error("Money error: {0}")]
    Money(#[from] MoneyError),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl KernelError {
    pub fn validation(message: impl Into<String>) -> Self {
        KernelError::Validation(message.into())
    }
}
