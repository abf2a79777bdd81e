// ABOUTME: Data layer foundations for ProposalPilot
// ABOUTME: Shared storage error type, pool construction, and timestamp helpers

pub mod error;
pub mod pool;
pub mod time;

pub use error::StorageError;
pub use pool::connect_pool;
pub use time::{now_rfc3339, parse_timestamp};
