// ABOUTME: Core utilities for ProposalPilot
// ABOUTME: Foundational package providing ID generation and shared constants

pub mod constants;
pub mod utils;

// Re-export constants
pub use constants::{database_file, proposalpilot_dir, DATABASE_FILE_NAME};

// Re-export utilities
pub use utils::generate_id;
