// ABOUTME: AI service integration for ProposalPilot
// ABOUTME: Anthropic Messages API client, usage logging, and prompt-keyed response cache

pub mod cache;
pub mod service;
pub mod usage;

pub use cache::{generate_cached, ResponseCache};
pub use service::{
    estimate_tokens, estimated_cost, AIResponse, AIService, AIServiceError, AIServiceResult, Usage,
};
pub use usage::{OperationStats, UsageLog, UsageLogStorage, UsageQuery, UsageStats};
