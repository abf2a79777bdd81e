// ABOUTME: Subscription storage layer using SQLite
// ABOUTME: Lookups, monthly resets, and the atomic usage increment

use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};
use tracing::debug;

use proposalpilot_storage::{now_rfc3339, parse_timestamp};

use crate::error::{BillingError, Result};
use crate::types::{Subscription, FREE_TIER_WINDOW_DAYS, UNLIMITED_QUOTA};

pub struct SubscriptionStorage {
    pool: SqlitePool,
}

impl SubscriptionStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        user_id: &str,
        plan: &str,
        monthly_quota: i64,
        resets_at: DateTime<Utc>,
    ) -> Result<Subscription> {
        let id = proposalpilot_core::generate_id();

        sqlx::query(
            r#"
            INSERT INTO subscriptions (id, user_id, plan, monthly_quota, proposals_used, resets_at, active)
            VALUES (?, ?, ?, ?, 0, ?, 1)
            "#,
        )
        .bind(&id)
        .bind(user_id)
        .bind(plan)
        .bind(monthly_quota)
        .bind(resets_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        self.get_by_user(user_id)
            .await?
            .ok_or_else(|| BillingError::NotFound(user_id.to_string()))
    }

    pub async fn get_by_user(&self, user_id: &str) -> Result<Option<Subscription>> {
        let row = sqlx::query("SELECT * FROM subscriptions WHERE user_id = ?")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|row| row_to_subscription(&row)).transpose()
    }

    /// Zero the usage counter and move the reset date forward
    pub async fn reset_usage(&self, user_id: &str, new_resets_at: DateTime<Utc>) -> Result<()> {
        debug!("Resetting usage for user {}", user_id);

        sqlx::query(
            r#"
            UPDATE subscriptions
            SET proposals_used = 0, resets_at = ?, updated_at = ?
            WHERE user_id = ?
            "#,
        )
        .bind(new_resets_at.to_rfc3339())
        .bind(now_rfc3339())
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Atomic increment with ceiling: bumps the usage counter only while it
    /// is still below the quota (or the quota is unlimited), so the stored
    /// counter can never exceed the quota even under concurrent requests.
    /// Returns whether a row was updated.
    pub async fn increment_usage(&self, user_id: &str) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE subscriptions
            SET proposals_used = proposals_used + 1, updated_at = ?
            WHERE user_id = ?
              AND active = 1
              AND (monthly_quota = ? OR proposals_used < monthly_quota)
            "#,
        )
        .bind(now_rfc3339())
        .bind(user_id)
        .bind(UNLIMITED_QUOTA)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Proposals created by the user inside the trailing free-tier window
    pub async fn count_recent_proposals(&self, user_id: &str) -> Result<i64> {
        // datetime() normalizes both the RFC 3339 and SQLite default forms
        let row = sqlx::query(
            r#"
            SELECT COUNT(*) AS count
            FROM proposals
            WHERE user_id = ?
              AND datetime(created_at) >= datetime('now', 'utc', ?)
            "#,
        )
        .bind(user_id)
        .bind(format!("-{} days", FREE_TIER_WINDOW_DAYS))
        .fetch_one(&self.pool)
        .await?;

        Ok(row.try_get("count")?)
    }
}

fn row_to_subscription(row: &sqlx::sqlite::SqliteRow) -> Result<Subscription> {
    let resets_at: String = row.try_get("resets_at")?;
    let created_at: String = row.try_get("created_at")?;
    let updated_at: String = row.try_get("updated_at")?;
    let active: i64 = row.try_get("active")?;

    Ok(Subscription {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        plan: row.try_get("plan")?,
        monthly_quota: row.try_get("monthly_quota")?,
        proposals_used: row.try_get("proposals_used")?,
        resets_at: parse_timestamp(&resets_at)?,
        active: active != 0,
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::Duration;

    pub(crate) async fn setup_test_db() -> SqlitePool {
        let pool = SqlitePool::connect(":memory:").await.unwrap();

        sqlx::query(
            r#"
            CREATE TABLE subscriptions (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL UNIQUE,
                plan TEXT NOT NULL,
                monthly_quota INTEGER NOT NULL,
                proposals_used INTEGER NOT NULL DEFAULT 0,
                resets_at TEXT NOT NULL,
                active INTEGER NOT NULL DEFAULT 1,
                created_at TEXT NOT NULL DEFAULT (datetime('now', 'utc')),
                updated_at TEXT NOT NULL DEFAULT (datetime('now', 'utc'))
            )
            "#,
        )
        .execute(&pool)
        .await
        .unwrap();

        sqlx::query(
            r#"
            CREATE TABLE proposals (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                created_at TEXT NOT NULL DEFAULT (datetime('now', 'utc'))
            )
            "#,
        )
        .execute(&pool)
        .await
        .unwrap();

        pool
    }

    pub(crate) async fn insert_proposal(pool: &SqlitePool, user_id: &str, created_at: DateTime<Utc>) {
        sqlx::query("INSERT INTO proposals (id, user_id, created_at) VALUES (?, ?, ?)")
            .bind(proposalpilot_core::generate_id())
            .bind(user_id)
            .bind(created_at.to_rfc3339())
            .execute(pool)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let storage = SubscriptionStorage::new(setup_test_db().await);
        let resets_at = Utc::now() + Duration::days(20);

        let sub = storage.create("user-1", "pro", 50, resets_at).await.unwrap();
        assert_eq!(sub.plan, "pro");
        assert_eq!(sub.proposals_used, 0);
        assert!(sub.active);

        assert!(storage.get_by_user("user-2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_increment_stops_at_quota() {
        let storage = SubscriptionStorage::new(setup_test_db().await);
        storage
            .create("user-1", "starter", 2, Utc::now() + Duration::days(20))
            .await
            .unwrap();

        assert!(storage.increment_usage("user-1").await.unwrap());
        assert!(storage.increment_usage("user-1").await.unwrap());
        // Counter is at the ceiling; further increments are no-ops
        assert!(!storage.increment_usage("user-1").await.unwrap());

        let sub = storage.get_by_user("user-1").await.unwrap().unwrap();
        assert_eq!(sub.proposals_used, 2);
    }

    #[tokio::test]
    async fn test_unlimited_increment_never_stops() {
        let storage = SubscriptionStorage::new(setup_test_db().await);
        storage
            .create("user-1", "agency", UNLIMITED_QUOTA, Utc::now() + Duration::days(20))
            .await
            .unwrap();

        for _ in 0..10 {
            assert!(storage.increment_usage("user-1").await.unwrap());
        }

        let sub = storage.get_by_user("user-1").await.unwrap().unwrap();
        assert_eq!(sub.proposals_used, 10);
    }

    #[tokio::test]
    async fn test_count_recent_proposals_ignores_old_rows() {
        let pool = setup_test_db().await;
        let storage = SubscriptionStorage::new(pool.clone());

        insert_proposal(&pool, "user-1", Utc::now() - Duration::days(2)).await;
        insert_proposal(&pool, "user-1", Utc::now() - Duration::days(29)).await;
        insert_proposal(&pool, "user-1", Utc::now() - Duration::days(45)).await;
        insert_proposal(&pool, "other", Utc::now()).await;

        assert_eq!(storage.count_recent_proposals("user-1").await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_reset_usage() {
        let storage = SubscriptionStorage::new(setup_test_db().await);
        storage
            .create("user-1", "starter", 5, Utc::now() - Duration::days(1))
            .await
            .unwrap();
        storage.increment_usage("user-1").await.unwrap();

        let new_resets_at = Utc::now() + Duration::days(30);
        storage.reset_usage("user-1", new_resets_at).await.unwrap();

        let sub = storage.get_by_user("user-1").await.unwrap().unwrap();
        assert_eq!(sub.proposals_used, 0);
        assert_eq!(sub.resets_at.timestamp(), new_resets_at.timestamp());
    }
}
