// ABOUTME: Proposal template management for ProposalPilot
// ABOUTME: Template entity, storage, and system template seeding

pub mod error;
pub mod seed;
pub mod storage;
pub mod types;

pub use error::{Result, TemplateError};
pub use seed::seed_system_templates;
pub use storage::TemplateStorage;
pub use types::{CreateTemplateInput, Template, TemplateContent, TemplatePricing, UpdateTemplateInput};
