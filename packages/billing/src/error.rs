// ABOUTME: Error types for the billing package

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BillingError {
    #[error("Subscription not found for user: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] proposalpilot_storage::StorageError),
}

pub type Result<T> = std::result::Result<T, BillingError>;
