// ABOUTME: Subscription and quota decision types
// ABOUTME: monthly_quota of -1 means unlimited

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const UNLIMITED_QUOTA: i64 = -1;

/// Users without a subscription may create this many proposals in the
/// trailing window before being asked to upgrade.
pub const FREE_TIER_LIMIT: i64 = 3;
pub const FREE_TIER_WINDOW_DAYS: i64 = 30;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub id: String,
    pub user_id: String,
    pub plan: String,
    pub monthly_quota: i64,
    pub proposals_used: i64,
    pub resets_at: DateTime<Utc>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Subscription {
    pub fn is_unlimited(&self) -> bool {
        self.monthly_quota == UNLIMITED_QUOTA
    }
}

/// Outcome of the quota check for one generate-proposal request
#[derive(Debug, Clone, PartialEq)]
pub enum QuotaDecision {
    Allowed,
    Rejected(QuotaRejection),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotaRejection {
    pub limit: i64,
    pub used: i64,
    /// None for the free tier, where the window is rolling
    pub resets_at: Option<DateTime<Utc>>,
}

/// Current usage as reported by the billing endpoints
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageSnapshot {
    pub plan: String,
    pub limit: i64,
    pub used: i64,
    pub unlimited: bool,
    pub resets_at: Option<DateTime<Utc>>,
}
