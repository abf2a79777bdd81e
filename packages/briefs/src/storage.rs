// ABOUTME: Brief storage layer using SQLite
// ABOUTME: CRUD plus status transitions and analysis persistence

use sqlx::{Row, SqlitePool};
use tracing::debug;

use proposalpilot_storage::{now_rfc3339, parse_timestamp};

use crate::error::{BriefError, Result};
use crate::types::{Brief, BriefAnalysis, BriefStatus, CreateBriefInput, UpdateBriefInput};

pub struct BriefStorage {
    pool: SqlitePool,
}

impl BriefStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, user_id: &str, input: CreateBriefInput) -> Result<Brief> {
        let id = proposalpilot_core::generate_id();

        sqlx::query(
            r#"
            INSERT INTO briefs (id, user_id, client_id, title, raw_text, status)
            VALUES (?, ?, ?, ?, ?, 'draft')
            "#,
        )
        .bind(&id)
        .bind(user_id)
        .bind(&input.client_id)
        .bind(&input.title)
        .bind(&input.raw_text)
        .execute(&self.pool)
        .await?;

        self.get(user_id, &id)
            .await?
            .ok_or_else(|| BriefError::NotFound(id))
    }

    pub async fn get(&self, user_id: &str, brief_id: &str) -> Result<Option<Brief>> {
        let row = sqlx::query("SELECT * FROM briefs WHERE id = ? AND user_id = ?")
            .bind(brief_id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|row| row_to_brief(&row)).transpose()
    }

    pub async fn list(&self, user_id: &str) -> Result<Vec<Brief>> {
        let rows = sqlx::query("SELECT * FROM briefs WHERE user_id = ? ORDER BY created_at DESC")
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(row_to_brief).collect()
    }

    /// Apply a partial update. Only draft briefs are editable; the caller
    /// checks status first.
    pub async fn update(
        &self,
        user_id: &str,
        brief_id: &str,
        input: UpdateBriefInput,
    ) -> Result<Brief> {
        if let Some(client_id) = &input.client_id {
            sqlx::query("UPDATE briefs SET client_id = ? WHERE id = ? AND user_id = ?")
                .bind(client_id)
                .bind(brief_id)
                .bind(user_id)
                .execute(&self.pool)
                .await?;
        }

        if let Some(title) = &input.title {
            sqlx::query("UPDATE briefs SET title = ? WHERE id = ? AND user_id = ?")
                .bind(title)
                .bind(brief_id)
                .bind(user_id)
                .execute(&self.pool)
                .await?;
        }

        if let Some(raw_text) = &input.raw_text {
            sqlx::query("UPDATE briefs SET raw_text = ? WHERE id = ? AND user_id = ?")
                .bind(raw_text)
                .bind(brief_id)
                .bind(user_id)
                .execute(&self.pool)
                .await?;
        }

        sqlx::query("UPDATE briefs SET updated_at = ? WHERE id = ? AND user_id = ?")
            .bind(now_rfc3339())
            .bind(brief_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        self.get(user_id, brief_id)
            .await?
            .ok_or_else(|| BriefError::NotFound(brief_id.to_string()))
    }

    pub async fn delete(&self, user_id: &str, brief_id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM briefs WHERE id = ? AND user_id = ?")
            .bind(brief_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn set_status(&self, brief_id: &str, status: BriefStatus) -> Result<()> {
        debug!("Setting brief {} status to {}", brief_id, status);

        sqlx::query("UPDATE briefs SET status = ?, updated_at = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(now_rfc3339())
            .bind(brief_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Persist a completed analysis and flip the brief to analyzed
    pub async fn save_analysis(
        &self,
        brief_id: &str,
        analysis: &BriefAnalysis,
        model: &str,
        estimated_tokens: i64,
    ) -> Result<()> {
        let analysis_json = serde_json::to_string(analysis)?;
        let now = now_rfc3339();

        sqlx::query(
            r#"
            UPDATE briefs
            SET analysis = ?, analysis_model = ?, estimated_tokens = ?,
                analyzed_at = ?, status = 'analyzed', updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&analysis_json)
        .bind(model)
        .bind(estimated_tokens)
        .bind(&now)
        .bind(&now)
        .bind(brief_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

fn row_to_brief(row: &sqlx::sqlite::SqliteRow) -> Result<Brief> {
    let status_str: String = row.try_get("status")?;
    let status = BriefStatus::parse(&status_str).ok_or_else(|| {
        BriefError::Storage(proposalpilot_storage::StorageError::InvalidData(format!(
            "unknown brief status: {}",
            status_str
        )))
    })?;

    let analysis = row
        .try_get::<Option<String>, _>("analysis")?
        .map(|json| serde_json::from_str::<BriefAnalysis>(&json))
        .transpose()?;

    let created_at: String = row.try_get("created_at")?;
    let updated_at: String = row.try_get("updated_at")?;
    let analyzed_at: Option<String> = row.try_get("analyzed_at")?;

    Ok(Brief {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        client_id: row.try_get("client_id")?,
        title: row.try_get("title")?,
        raw_text: row.try_get("raw_text")?,
        status,
        analysis,
        analysis_model: row.try_get("analysis_model")?,
        estimated_tokens: row.try_get("estimated_tokens")?,
        analyzed_at: analyzed_at.as_deref().map(parse_timestamp).transpose()?,
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::types::RiskFlag;

    pub(crate) async fn setup_test_db() -> SqlitePool {
        let pool = SqlitePool::connect(":memory:").await.unwrap();

        sqlx::query(
            r#"
            CREATE TABLE briefs (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                client_id TEXT,
                title TEXT NOT NULL,
                raw_text TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'draft',
                analysis TEXT,
                analysis_model TEXT,
                estimated_tokens INTEGER,
                analyzed_at TEXT,
                created_at TEXT NOT NULL DEFAULT (datetime('now', 'utc')),
                updated_at TEXT NOT NULL DEFAULT (datetime('now', 'utc'))
            )
            "#,
        )
        .execute(&pool)
        .await
        .unwrap();

        pool
    }

    pub(crate) fn sample_analysis() -> BriefAnalysis {
        BriefAnalysis {
            project_type: "web_application".to_string(),
            industry: Some("e-commerce".to_string()),
            summary: "Rebuild of a storefront".to_string(),
            estimated_budget_min: Some(8000.0),
            estimated_budget_max: Some(15000.0),
            estimated_timeline: Some("8-10 weeks".to_string()),
            requirements: vec!["Product catalog".to_string(), "Checkout".to_string()],
            deliverables: vec!["Deployed site".to_string()],
            risk_flags: vec![RiskFlag {
                severity: "medium".to_string(),
                description: "Undefined payment provider".to_string(),
            }],
            client_insights: vec!["Budget-sensitive".to_string()],
            recommended_tone: "professional".to_string(),
            recommended_pricing_strategy: "tiered".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let storage = BriefStorage::new(setup_test_db().await);

        let brief = storage
            .create(
                "user-1",
                CreateBriefInput {
                    client_id: None,
                    title: "Storefront rebuild".to_string(),
                    raw_text: "We need a new online store".to_string(),
                },
            )
            .await
            .unwrap();

        assert_eq!(brief.status, BriefStatus::Draft);
        assert!(brief.analysis.is_none());

        let fetched = storage.get("user-1", &brief.id).await.unwrap().unwrap();
        assert_eq!(fetched.title, "Storefront rebuild");

        // Scoped by owner
        assert!(storage.get("user-2", &brief.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_analysis_marks_analyzed() {
        let storage = BriefStorage::new(setup_test_db().await);

        let brief = storage
            .create(
                "user-1",
                CreateBriefInput {
                    client_id: None,
                    title: "Brief".to_string(),
                    raw_text: "text".to_string(),
                },
            )
            .await
            .unwrap();

        let analysis = sample_analysis();
        storage
            .save_analysis(&brief.id, &analysis, "claude-sonnet-4-20250514", 320)
            .await
            .unwrap();

        let fetched = storage.get("user-1", &brief.id).await.unwrap().unwrap();
        assert_eq!(fetched.status, BriefStatus::Analyzed);
        assert_eq!(fetched.analysis, Some(analysis));
        assert_eq!(fetched.estimated_tokens, Some(320));
        assert!(fetched.analyzed_at.is_some());
    }

    #[tokio::test]
    async fn test_partial_update() {
        let storage = BriefStorage::new(setup_test_db().await);

        let brief = storage
            .create(
                "user-1",
                CreateBriefInput {
                    client_id: None,
                    title: "Old title".to_string(),
                    raw_text: "old text".to_string(),
                },
            )
            .await
            .unwrap();

        let updated = storage
            .update(
                "user-1",
                &brief.id,
                UpdateBriefInput {
                    title: Some("New title".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.title, "New title");
        assert_eq!(updated.raw_text, "old text");
    }

    #[tokio::test]
    async fn test_delete() {
        let storage = BriefStorage::new(setup_test_db().await);

        let brief = storage
            .create(
                "user-1",
                CreateBriefInput {
                    client_id: None,
                    title: "Brief".to_string(),
                    raw_text: "text".to_string(),
                },
            )
            .await
            .unwrap();

        assert!(storage.delete("user-1", &brief.id).await.unwrap());
        assert!(!storage.delete("user-1", &brief.id).await.unwrap());
    }
}
