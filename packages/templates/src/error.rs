// ABOUTME: Error types for the templates package

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("Template not found: {0}")]
    NotFound(String),

    #[error("System templates cannot be modified")]
    SystemImmutable,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] proposalpilot_storage::StorageError),
}

pub type Result<T> = std::result::Result<T, TemplateError>;
