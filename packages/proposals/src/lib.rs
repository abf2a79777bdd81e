// ABOUTME: Proposal domain for ProposalPilot
// ABOUTME: Entity, lifecycle, AI generation and scoring, user/client records, shared DbState

pub mod clients;
pub mod db;
pub mod error;
pub mod generator;
pub mod prompts;
pub mod scorer;
pub mod storage;
pub mod types;
pub mod users;

pub use clients::{Client, ClientStorage, CreateClientInput, UpdateClientInput};
pub use db::DbState;
pub use error::{ProposalError, Result};
pub use generator::{GenerationInput, ProposalGenerator, ProposalLength};
pub use scorer::{QualityScorer, ScoringInput};
pub use storage::{CreateProposalRecord, ProposalStorage};
pub use types::{
    CategoryScore, GeneratedProposal, Improvement, PricingTier, Proposal, ProposalContent,
    ProposalScore, ProposalStatus, RewriteSuggestion, UpdateProposalInput,
};
pub use users::{CreateUserInput, User, UserStorage};
