// ABOUTME: Billing package for ProposalPilot
// ABOUTME: Subscription storage and the proposal-generation quota guard

pub mod error;
pub mod guard;
pub mod storage;
pub mod types;

pub use error::{BillingError, Result};
pub use guard::QuotaGuard;
pub use storage::SubscriptionStorage;
pub use types::{
    QuotaDecision, QuotaRejection, Subscription, UsageSnapshot, FREE_TIER_LIMIT,
    FREE_TIER_WINDOW_DAYS, UNLIMITED_QUOTA,
};
