// ABOUTME: Template storage layer using SQLite
// ABOUTME: CRUD for user templates, read access to system templates, usage counting

use sqlx::{Row, SqlitePool};
use tracing::debug;

use proposalpilot_storage::{now_rfc3339, parse_timestamp};

use crate::error::{Result, TemplateError};
use crate::types::{
    CreateTemplateInput, Template, TemplateContent, TemplatePricing, UpdateTemplateInput,
};

pub struct TemplateStorage {
    pool: SqlitePool,
}

impl TemplateStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, user_id: &str, input: CreateTemplateInput) -> Result<Template> {
        let id = proposalpilot_core::generate_id();
        let content_json = serde_json::to_string(&input.content)?;
        let pricing_json = input
            .default_pricing
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        sqlx::query(
            r#"
            INSERT INTO templates (id, user_id, name, description, content, default_pricing, is_system)
            VALUES (?, ?, ?, ?, ?, ?, 0)
            "#,
        )
        .bind(&id)
        .bind(user_id)
        .bind(&input.name)
        .bind(&input.description)
        .bind(&content_json)
        .bind(&pricing_json)
        .execute(&self.pool)
        .await?;

        self.get(user_id, &id)
            .await?
            .ok_or(TemplateError::NotFound(id))
    }

    /// Get a template visible to `user_id`: their own or any system template
    pub async fn get(&self, user_id: &str, template_id: &str) -> Result<Option<Template>> {
        let row = sqlx::query(
            "SELECT * FROM templates WHERE id = ? AND (user_id = ? OR is_system = 1)",
        )
        .bind(template_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| row_to_template(&row)).transpose()
    }

    /// List system templates plus the user's own, system first
    pub async fn list(&self, user_id: &str) -> Result<Vec<Template>> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM templates
            WHERE user_id = ? OR is_system = 1
            ORDER BY is_system DESC, created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_template).collect()
    }

    /// Apply a partial update to a user-owned template. System templates are
    /// immutable.
    pub async fn update(
        &self,
        user_id: &str,
        template_id: &str,
        input: UpdateTemplateInput,
    ) -> Result<Template> {
        let existing = self
            .get(user_id, template_id)
            .await?
            .ok_or_else(|| TemplateError::NotFound(template_id.to_string()))?;

        if existing.is_system {
            return Err(TemplateError::SystemImmutable);
        }

        if let Some(name) = &input.name {
            sqlx::query("UPDATE templates SET name = ? WHERE id = ?")
                .bind(name)
                .bind(template_id)
                .execute(&self.pool)
                .await?;
        }

        if let Some(description) = &input.description {
            sqlx::query("UPDATE templates SET description = ? WHERE id = ?")
                .bind(description)
                .bind(template_id)
                .execute(&self.pool)
                .await?;
        }

        if let Some(content) = &input.content {
            let content_json = serde_json::to_string(content)?;
            sqlx::query("UPDATE templates SET content = ? WHERE id = ?")
                .bind(&content_json)
                .bind(template_id)
                .execute(&self.pool)
                .await?;
        }

        if let Some(pricing) = &input.default_pricing {
            let pricing_json = serde_json::to_string(pricing)?;
            sqlx::query("UPDATE templates SET default_pricing = ? WHERE id = ?")
                .bind(&pricing_json)
                .bind(template_id)
                .execute(&self.pool)
                .await?;
        }

        sqlx::query("UPDATE templates SET updated_at = ? WHERE id = ?")
            .bind(now_rfc3339())
            .bind(template_id)
            .execute(&self.pool)
            .await?;

        self.get(user_id, template_id)
            .await?
            .ok_or_else(|| TemplateError::NotFound(template_id.to_string()))
    }

    /// Delete a user-owned template. System templates cannot be deleted.
    pub async fn delete(&self, user_id: &str, template_id: &str) -> Result<bool> {
        if let Some(existing) = self.get(user_id, template_id).await? {
            if existing.is_system {
                return Err(TemplateError::SystemImmutable);
            }
        } else {
            return Ok(false);
        }

        let result = sqlx::query("DELETE FROM templates WHERE id = ? AND user_id = ?")
            .bind(template_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Bump the usage counter after a template was used for generation
    pub async fn increment_usage(&self, template_id: &str) -> Result<()> {
        debug!("Incrementing usage count for template {}", template_id);

        sqlx::query("UPDATE templates SET usage_count = usage_count + 1 WHERE id = ?")
            .bind(template_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

fn row_to_template(row: &sqlx::sqlite::SqliteRow) -> Result<Template> {
    let content_json: String = row.try_get("content")?;
    let content: TemplateContent = serde_json::from_str(&content_json)?;

    let default_pricing = row
        .try_get::<Option<String>, _>("default_pricing")?
        .map(|json| serde_json::from_str::<Vec<TemplatePricing>>(&json))
        .transpose()?;

    let is_system: i64 = row.try_get("is_system")?;
    let created_at: String = row.try_get("created_at")?;
    let updated_at: String = row.try_get("updated_at")?;

    Ok(Template {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        content,
        default_pricing,
        is_system: is_system != 0,
        usage_count: row.try_get("usage_count")?,
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) async fn setup_test_db() -> SqlitePool {
        let pool = SqlitePool::connect(":memory:").await.unwrap();

        sqlx::query(
            r#"
            CREATE TABLE templates (
                id TEXT PRIMARY KEY,
                user_id TEXT,
                name TEXT NOT NULL,
                description TEXT,
                content TEXT NOT NULL,
                default_pricing TEXT,
                is_system INTEGER NOT NULL DEFAULT 0,
                usage_count INTEGER NOT NULL DEFAULT 0,
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

    fn sample_input(name: &str) -> CreateTemplateInput {
        CreateTemplateInput {
            name: name.to_string(),
            description: Some("A starting point".to_string()),
            content: TemplateContent {
                opening_hook: Some("Dear {client},".to_string()),
                ..Default::default()
            },
            default_pricing: Some(vec![TemplatePricing {
                name: "Standard".to_string(),
                price: 5000.0,
                description: None,
            }]),
        }
    }

    #[tokio::test]
    async fn test_create_get_list() {
        let storage = TemplateStorage::new(setup_test_db().await);

        let template = storage.create("user-1", sample_input("Web")).await.unwrap();
        assert!(!template.is_system);
        assert_eq!(template.usage_count, 0);

        let listed = storage.list("user-1").await.unwrap();
        assert_eq!(listed.len(), 1);

        // Another user does not see it
        assert!(storage.list("user-2").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_partial() {
        let storage = TemplateStorage::new(setup_test_db().await);
        let template = storage.create("user-1", sample_input("Web")).await.unwrap();

        let updated = storage
            .update(
                "user-1",
                &template.id,
                UpdateTemplateInput {
                    name: Some("Web v2".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.name, "Web v2");
        assert_eq!(updated.content, template.content);
    }

    #[tokio::test]
    async fn test_system_template_is_immutable() {
        let pool = setup_test_db().await;

        sqlx::query(
            r#"
            INSERT INTO templates (id, user_id, name, content, is_system)
            VALUES ('tpl-sys', NULL, 'System', '{}', 1)
            "#,
        )
        .execute(&pool)
        .await
        .unwrap();

        let storage = TemplateStorage::new(pool);

        // Visible to everyone
        assert!(storage.get("user-1", "tpl-sys").await.unwrap().is_some());

        let update = storage
            .update("user-1", "tpl-sys", UpdateTemplateInput::default())
            .await;
        assert!(matches!(update, Err(TemplateError::SystemImmutable)));

        let delete = storage.delete("user-1", "tpl-sys").await;
        assert!(matches!(delete, Err(TemplateError::SystemImmutable)));
    }

    #[tokio::test]
    async fn test_increment_usage() {
        let storage = TemplateStorage::new(setup_test_db().await);
        let template = storage.create("user-1", sample_input("Web")).await.unwrap();

        storage.increment_usage(&template.id).await.unwrap();
        storage.increment_usage(&template.id).await.unwrap();

        let fetched = storage.get("user-1", &template.id).await.unwrap().unwrap();
        assert_eq!(fetched.usage_count, 2);
    }
}
