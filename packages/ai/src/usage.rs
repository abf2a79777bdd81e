// ABOUTME: AI usage log storage layer using SQLite
// ABOUTME: Records per-call token counts and costs, with filtered queries and aggregates

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Row, SqlitePool};
use tracing::debug;

use proposalpilot_storage::{parse_timestamp, StorageError};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageLog {
    pub id: String,
    pub user_id: String,
    pub operation: String,
    pub model: String,
    pub provider: String,
    pub input_tokens: Option<i64>,
    pub output_tokens: Option<i64>,
    pub total_tokens: Option<i64>,
    pub estimated_cost: Option<f64>,
    pub duration_ms: Option<i64>,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UsageQuery {
    pub user_id: Option<String>,
    pub operation: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageStats {
    pub total_requests: i64,
    pub successful_requests: i64,
    pub failed_requests: i64,
    pub total_input_tokens: i64,
    pub total_output_tokens: i64,
    pub total_tokens: i64,
    pub total_cost: f64,
    pub by_operation: Vec<OperationStats>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationStats {
    pub operation: String,
    pub count: i64,
    pub total_tokens: i64,
    pub total_cost: f64,
}

pub struct UsageLogStorage {
    pool: SqlitePool,
}

impl UsageLogStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Record a usage log entry
    pub async fn record(&self, log: &UsageLog) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            INSERT INTO ai_usage_logs (
                id, user_id, operation, model, provider,
                input_tokens, output_tokens, total_tokens, estimated_cost,
                duration_ms, error, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&log.id)
        .bind(&log.user_id)
        .bind(&log.operation)
        .bind(&log.model)
        .bind(&log.provider)
        .bind(log.input_tokens)
        .bind(log.output_tokens)
        .bind(log.total_tokens)
        .bind(log.estimated_cost)
        .bind(log.duration_ms)
        .bind(&log.error)
        .bind(log.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(StorageError::Sqlx)?;

        Ok(())
    }

    /// List usage logs with optional filtering
    pub async fn list(&self, query: UsageQuery) -> Result<Vec<UsageLog>, StorageError> {
        let mut sql = String::from("SELECT * FROM ai_usage_logs WHERE 1=1");

        if query.user_id.is_some() {
            sql.push_str(" AND user_id = ?");
        }
        if query.operation.is_some() {
            sql.push_str(" AND operation = ?");
        }
        if query.start_date.is_some() {
            sql.push_str(" AND created_at >= ?");
        }
        if query.end_date.is_some() {
            sql.push_str(" AND created_at <= ?");
        }

        sql.push_str(" ORDER BY created_at DESC LIMIT ? OFFSET ?");

        debug!("Fetching AI usage logs with query: {}", sql);

        let mut db_query = sqlx::query(&sql);

        if let Some(user_id) = &query.user_id {
            db_query = db_query.bind(user_id);
        }
        if let Some(operation) = &query.operation {
            db_query = db_query.bind(operation);
        }
        if let Some(start_date) = &query.start_date {
            db_query = db_query.bind(start_date.to_rfc3339());
        }
        if let Some(end_date) = &query.end_date {
            db_query = db_query.bind(end_date.to_rfc3339());
        }

        let limit = query.limit.unwrap_or(100);
        let offset = query.offset.unwrap_or(0);
        db_query = db_query.bind(limit).bind(offset);

        let rows = db_query
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        rows.iter().map(row_to_log).collect()
    }

    /// Aggregate usage statistics, optionally scoped to one user
    pub async fn stats(&self, user_id: Option<&str>) -> Result<UsageStats, StorageError> {
        let mut sql = String::from(
            r#"
            SELECT
                COUNT(*) AS total_requests,
                COALESCE(SUM(CASE WHEN error IS NULL THEN 1 ELSE 0 END), 0) AS successful_requests,
                COALESCE(SUM(CASE WHEN error IS NOT NULL THEN 1 ELSE 0 END), 0) AS failed_requests,
                COALESCE(SUM(input_tokens), 0) AS total_input_tokens,
                COALESCE(SUM(output_tokens), 0) AS total_output_tokens,
                COALESCE(SUM(total_tokens), 0) AS total_tokens,
                COALESCE(SUM(estimated_cost), 0.0) AS total_cost
            FROM ai_usage_logs
            "#,
        );
        if user_id.is_some() {
            sql.push_str(" WHERE user_id = ?");
        }

        let mut totals_query = sqlx::query(&sql);
        if let Some(user_id) = user_id {
            totals_query = totals_query.bind(user_id);
        }
        let totals = totals_query
            .fetch_one(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        let mut by_op_sql = String::from(
            r#"
            SELECT
                operation,
                COUNT(*) AS count,
                COALESCE(SUM(total_tokens), 0) AS total_tokens,
                COALESCE(SUM(estimated_cost), 0.0) AS total_cost
            FROM ai_usage_logs
            "#,
        );
        if user_id.is_some() {
            by_op_sql.push_str(" WHERE user_id = ?");
        }
        by_op_sql.push_str(" GROUP BY operation ORDER BY count DESC");

        let mut by_op_query = sqlx::query(&by_op_sql);
        if let Some(user_id) = user_id {
            by_op_query = by_op_query.bind(user_id);
        }
        let by_op_rows = by_op_query
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        let by_operation = by_op_rows
            .iter()
            .map(|row| {
                Ok(OperationStats {
                    operation: row.try_get("operation")?,
                    count: row.try_get("count")?,
                    total_tokens: row.try_get("total_tokens")?,
                    total_cost: row.try_get("total_cost")?,
                })
            })
            .collect::<Result<Vec<_>, sqlx::Error>>()
            .map_err(StorageError::Sqlx)?;

        Ok(UsageStats {
            total_requests: totals.try_get("total_requests").map_err(StorageError::Sqlx)?,
            successful_requests: totals
                .try_get("successful_requests")
                .map_err(StorageError::Sqlx)?,
            failed_requests: totals
                .try_get("failed_requests")
                .map_err(StorageError::Sqlx)?,
            total_input_tokens: totals
                .try_get("total_input_tokens")
                .map_err(StorageError::Sqlx)?,
            total_output_tokens: totals
                .try_get("total_output_tokens")
                .map_err(StorageError::Sqlx)?,
            total_tokens: totals.try_get("total_tokens").map_err(StorageError::Sqlx)?,
            total_cost: totals.try_get("total_cost").map_err(StorageError::Sqlx)?,
            by_operation,
        })
    }
}

impl UsageLog {
    /// Convenience constructor for a successful call
    pub fn success(
        user_id: &str,
        operation: &str,
        model: &str,
        input_tokens: i64,
        output_tokens: i64,
        duration_ms: i64,
    ) -> Self {
        Self {
            id: proposalpilot_core::generate_id(),
            user_id: user_id.to_string(),
            operation: operation.to_string(),
            model: model.to_string(),
            provider: "anthropic".to_string(),
            input_tokens: Some(input_tokens),
            output_tokens: Some(output_tokens),
            total_tokens: Some(input_tokens + output_tokens),
            estimated_cost: Some(crate::service::estimated_cost(
                model,
                input_tokens,
                output_tokens,
            )),
            duration_ms: Some(duration_ms),
            error: None,
            created_at: Utc::now(),
        }
    }

    /// Convenience constructor for a failed call
    pub fn failure(
        user_id: &str,
        operation: &str,
        model: &str,
        error: &str,
        duration_ms: i64,
    ) -> Self {
        Self {
            id: proposalpilot_core::generate_id(),
            user_id: user_id.to_string(),
            operation: operation.to_string(),
            model: model.to_string(),
            provider: "anthropic".to_string(),
            input_tokens: None,
            output_tokens: None,
            total_tokens: None,
            estimated_cost: None,
            duration_ms: Some(duration_ms),
            error: Some(error.to_string()),
            created_at: Utc::now(),
        }
    }
}

fn row_to_log(row: &sqlx::sqlite::SqliteRow) -> Result<UsageLog, StorageError> {
    let created_at: String = row.try_get("created_at").map_err(StorageError::Sqlx)?;
    Ok(UsageLog {
        id: row.try_get("id").map_err(StorageError::Sqlx)?,
        user_id: row.try_get("user_id").map_err(StorageError::Sqlx)?,
        operation: row.try_get("operation").map_err(StorageError::Sqlx)?,
        model: row.try_get("model").map_err(StorageError::Sqlx)?,
        provider: row.try_get("provider").map_err(StorageError::Sqlx)?,
        input_tokens: row.try_get("input_tokens").map_err(StorageError::Sqlx)?,
        output_tokens: row.try_get("output_tokens").map_err(StorageError::Sqlx)?,
        total_tokens: row.try_get("total_tokens").map_err(StorageError::Sqlx)?,
        estimated_cost: row.try_get("estimated_cost").map_err(StorageError::Sqlx)?,
        duration_ms: row.try_get("duration_ms").map_err(StorageError::Sqlx)?,
        error: row.try_get("error").map_err(StorageError::Sqlx)?,
        created_at: parse_timestamp(&created_at)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn setup_test_db() -> SqlitePool {
        let pool = SqlitePool::connect(":memory:").await.unwrap();

        sqlx::query(
            r#"
            CREATE TABLE ai_usage_logs (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                operation TEXT NOT NULL,
                model TEXT NOT NULL,
                provider TEXT NOT NULL DEFAULT 'anthropic',
                input_tokens INTEGER,
                output_tokens INTEGER,
                total_tokens INTEGER,
                estimated_cost REAL,
                duration_ms INTEGER,
                error TEXT,
                created_at TEXT NOT NULL DEFAULT (datetime('now', 'utc'))
            )
            "#,
        )
        .execute(&pool)
        .await
        .unwrap();

        pool
    }

    #[tokio::test]
    async fn test_record_and_list() {
        let storage = UsageLogStorage::new(setup_test_db().await);

        let log = UsageLog::success("user-1", "brief_analysis", "claude-sonnet-4-20250514", 100, 50, 900);
        storage.record(&log).await.unwrap();

        let logs = storage
            .list(UsageQuery {
                user_id: Some("user-1".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].operation, "brief_analysis");
        assert_eq!(logs[0].total_tokens, Some(150));
        assert!(logs[0].error.is_none());
    }

    #[tokio::test]
    async fn test_stats_aggregation() {
        let storage = UsageLogStorage::new(setup_test_db().await);

        let ok = UsageLog::success("user-1", "brief_analysis", "claude-sonnet-4-20250514", 100, 50, 900);
        let failed = UsageLog::failure(
            "user-1",
            "proposal_generation",
            "claude-sonnet-4-20250514",
            "API returned 529",
            1200,
        );
        storage.record(&ok).await.unwrap();
        storage.record(&failed).await.unwrap();

        let stats = storage.stats(Some("user-1")).await.unwrap();
        assert_eq!(stats.total_requests, 2);
        assert_eq!(stats.successful_requests, 1);
        assert_eq!(stats.failed_requests, 1);
        assert_eq!(stats.total_tokens, 150);
        assert_eq!(stats.by_operation.len(), 2);
    }

    #[tokio::test]
    async fn test_list_filters_by_operation() {
        let storage = UsageLogStorage::new(setup_test_db().await);

        for op in ["brief_analysis", "quality_scoring"] {
            let log = UsageLog::success("user-1", op, "claude-sonnet-4-20250514", 10, 10, 100);
            storage.record(&log).await.unwrap();
        }

        let logs = storage
            .list(UsageQuery {
                operation: Some("quality_scoring".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].operation, "quality_scoring");
    }
}
