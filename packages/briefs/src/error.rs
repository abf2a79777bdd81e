// ABOUTME: Error types for the briefs package
// ABOUTME: Covers lookups, status preconditions, and analysis failures

use thiserror::Error;

use crate::types::BriefStatus;

#[derive(Error, Debug)]
pub enum BriefError {
    #[error("Brief not found: {0}")]
    NotFound(String),

    #[error("Brief is {actual}, expected {expected}")]
    InvalidStatus {
        expected: BriefStatus,
        actual: BriefStatus,
    },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] proposalpilot_storage::StorageError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("AI service error: {0}")]
    AIService(String),
}

pub type Result<T> = std::result::Result<T, BriefError>;
