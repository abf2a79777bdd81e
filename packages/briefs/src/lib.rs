// ABOUTME: Brief management for ProposalPilot
// ABOUTME: Brief entity, status machine, storage, and the AI brief analyzer

pub mod analyzer;
pub mod error;
pub mod prompts;
pub mod storage;
pub mod types;

pub use analyzer::BriefAnalyzer;
pub use error::{BriefError, Result};
pub use storage::BriefStorage;
pub use types::{
    Brief, BriefAnalysis, BriefStatus, CreateBriefInput, RiskFlag, UpdateBriefInput,
};
