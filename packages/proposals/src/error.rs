// ABOUTME: Error types for the proposals package
// ABOUTME: Covers lookups, lifecycle preconditions, and generation/scoring failures

use thiserror::Error;

use crate::types::ProposalStatus;

#[derive(Error, Debug)]
pub enum ProposalError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("Brief is {status}; proposals can only be generated from an analyzed brief")]
    BriefNotAnalyzed { status: String },

    #[error("Invalid status transition: {from} -> {to}")]
    InvalidTransition {
        from: ProposalStatus,
        to: ProposalStatus,
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

pub type Result<T> = std::result::Result<T, ProposalError>;
