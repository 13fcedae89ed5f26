//! The module contains the errors the engine can throw.
//!
//! The errors are:
//!
//! - [`KeyNotFound`] thrown when an item is not found.
//! - [`ReceiptMismatch`] thrown when a receipt total disagrees with its lines.
//!
//!  [`KeyNotFound`]: EngineError::KeyNotFound
//!  [`ReceiptMismatch`]: EngineError::ReceiptMismatch
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid date: {0}")]
    InvalidDate(String),
    #[error("Invalid name: {0}")]
    InvalidName(String),
    #[error("Invalid image: {0}")]
    InvalidImage(String),
    #[error("Receipt mismatch: {0}")]
    ReceiptMismatch(String),
    #[error("Already committed: {0}")]
    AlreadyCommitted(String),
    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::InvalidDate(a), Self::InvalidDate(b)) => a == b,
            (Self::InvalidName(a), Self::InvalidName(b)) => a == b,
            (Self::InvalidImage(a), Self::InvalidImage(b)) => a == b,
            (Self::ReceiptMismatch(a), Self::ReceiptMismatch(b)) => a == b,
            (Self::AlreadyCommitted(a), Self::AlreadyCommitted(b)) => a == b,
            (Self::Storage(a), Self::Storage(b)) => a.kind() == b.kind(),
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
