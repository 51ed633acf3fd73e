//! Validation errors for values built on the client side.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TypesError {
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("invalid wallet address: {0}")]
    InvalidAddress(String),
}
