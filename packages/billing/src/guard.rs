// ABOUTME: Quota guard for proposal generation
// ABOUTME: Decision table over subscription state; fail-open on internal errors

use chrono::{Months, Utc};
use sqlx::SqlitePool;
use tracing::{debug, error};

use crate::error::Result;
use crate::storage::SubscriptionStorage;
use crate::types::{
    QuotaDecision, QuotaRejection, Subscription, UsageSnapshot, FREE_TIER_LIMIT,
};

pub struct QuotaGuard {
    storage: SubscriptionStorage,
}

impl QuotaGuard {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            storage: SubscriptionStorage::new(pool),
        }
    }

    /// Decide whether `user_id` may generate a proposal right now.
    ///
    /// Internal errors never reject the request: enforcement is best-effort
    /// and availability wins. Every fail-open pass is logged for audit.
    pub async fn check(&self, user_id: &str) -> QuotaDecision {
        match self.evaluate(user_id).await {
            Ok(decision) => decision,
            Err(e) => {
                error!(
                    user_id = %user_id,
                    error = %e,
                    audit = true,
                    "Quota check failed internally; allowing request through"
                );
                QuotaDecision::Allowed
            }
        }
    }

    async fn evaluate(&self, user_id: &str) -> Result<QuotaDecision> {
        let subscription = match self.storage.get_by_user(user_id).await? {
            Some(subscription) => subscription,
            None => return self.evaluate_free_tier(user_id).await,
        };

        if !subscription.active {
            debug!(user_id = %user_id, "Subscription inactive");
            return Ok(QuotaDecision::Rejected(QuotaRejection {
                limit: subscription.monthly_quota,
                used: subscription.proposals_used,
                resets_at: Some(subscription.resets_at),
            }));
        }

        let subscription = self.roll_over_if_elapsed(subscription).await?;

        if subscription.is_unlimited() || subscription.proposals_used < subscription.monthly_quota {
            return Ok(QuotaDecision::Allowed);
        }

        debug!(
            user_id = %user_id,
            used = subscription.proposals_used,
            limit = subscription.monthly_quota,
            "Monthly proposal quota reached"
        );

        Ok(QuotaDecision::Rejected(QuotaRejection {
            limit: subscription.monthly_quota,
            used: subscription.proposals_used,
            resets_at: Some(subscription.resets_at),
        }))
    }

    async fn evaluate_free_tier(&self, user_id: &str) -> Result<QuotaDecision> {
        let recent = self.storage.count_recent_proposals(user_id).await?;

        if recent < FREE_TIER_LIMIT {
            return Ok(QuotaDecision::Allowed);
        }

        debug!(user_id = %user_id, used = recent, "Free tier limit reached");

        Ok(QuotaDecision::Rejected(QuotaRejection {
            limit: FREE_TIER_LIMIT,
            used: recent,
            resets_at: None,
        }))
    }

    /// If the reset date has passed, zero the counter and advance the reset
    /// date by exactly one month before the quota is evaluated.
    async fn roll_over_if_elapsed(&self, subscription: Subscription) -> Result<Subscription> {
        if subscription.resets_at > Utc::now() {
            return Ok(subscription);
        }

        let new_resets_at = subscription
            .resets_at
            .checked_add_months(Months::new(1))
            .unwrap_or(subscription.resets_at);

        debug!(
            user_id = %subscription.user_id,
            resets_at = %new_resets_at,
            "Monthly usage window elapsed; resetting counter"
        );

        self.storage
            .reset_usage(&subscription.user_id, new_resets_at)
            .await?;

        Ok(Subscription {
            proposals_used: 0,
            resets_at: new_resets_at,
            ..subscription
        })
    }

    /// Count one successful generation against the subscription, if any.
    /// Free-tier usage needs no commit: it is derived from proposal rows.
    /// Errors are logged, not surfaced; the proposal already exists.
    pub async fn commit_usage(&self, user_id: &str) {
        match self.storage.get_by_user(user_id).await {
            Ok(Some(_)) => {
                if let Err(e) = self.storage.increment_usage(user_id).await {
                    error!(
                        user_id = %user_id,
                        error = %e,
                        audit = true,
                        "Failed to commit quota usage after successful generation"
                    );
                }
            }
            Ok(None) => {}
            Err(e) => {
                error!(
                    user_id = %user_id,
                    error = %e,
                    audit = true,
                    "Failed to load subscription while committing quota usage"
                );
            }
        }
    }

    /// Usage snapshot for the billing endpoints
    pub async fn usage_snapshot(&self, user_id: &str) -> Result<UsageSnapshot> {
        match self.storage.get_by_user(user_id).await? {
            Some(subscription) => {
                let subscription = self.roll_over_if_elapsed(subscription).await?;
                Ok(UsageSnapshot {
                    plan: subscription.plan.clone(),
                    limit: subscription.monthly_quota,
                    used: subscription.proposals_used,
                    unlimited: subscription.is_unlimited(),
                    resets_at: Some(subscription.resets_at),
                })
            }
            None => {
                let used = self.storage.count_recent_proposals(user_id).await?;
                Ok(UsageSnapshot {
                    plan: "free".to_string(),
                    limit: FREE_TIER_LIMIT,
                    used,
                    unlimited: false,
                    resets_at: None,
                })
            }
        }
    }
}
