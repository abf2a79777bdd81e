// ABOUTME: Client records and storage
// ABOUTME: Proposal recipients, owned per user

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Row, SqlitePool};

use proposalpilot_storage::{now_rfc3339, parse_timestamp};

use crate::error::{ProposalError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub company: Option<String>,
    pub industry: Option<String>,
    pub email: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateClientInput {
    pub name: String,
    pub company: Option<String>,
    pub industry: Option<String>,
    pub email: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateClientInput {
    pub name: Option<String>,
    pub company: Option<String>,
    pub industry: Option<String>,
    pub email: Option<String>,
    pub notes: Option<String>,
}

pub struct ClientStorage {
    pool: SqlitePool,
}

impl ClientStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, user_id: &str, input: CreateClientInput) -> Result<Client> {
        let id = proposalpilot_core::generate_id();

        sqlx::query(
            r#"
            INSERT INTO clients (id, user_id, name, company, industry, email, notes)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(user_id)
        .bind(&input.name)
        .bind(&input.company)
        .bind(&input.industry)
        .bind(&input.email)
        .bind(&input.notes)
        .execute(&self.pool)
        .await?;

        self.get(user_id, &id)
            .await?
            .ok_or_else(|| ProposalError::NotFound(format!("Client {}", id)))
    }

    pub async fn get(&self, user_id: &str, client_id: &str) -> Result<Option<Client>> {
        let row = sqlx::query("SELECT * FROM clients WHERE id = ? AND user_id = ?")
            .bind(client_id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|row| row_to_client(&row)).transpose()
    }

    pub async fn list(&self, user_id: &str) -> Result<Vec<Client>> {
        let rows = sqlx::query("SELECT * FROM clients WHERE user_id = ? ORDER BY name ASC")
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(row_to_client).collect()
    }

    pub async fn update(
        &self,
        user_id: &str,
        client_id: &str,
        input: UpdateClientInput,
    ) -> Result<Client> {
        let columns = [
            ("name", &input.name),
            ("company", &input.company),
            ("industry", &input.industry),
            ("email", &input.email),
            ("notes", &input.notes),
        ];

        for (column, value) in columns {
            if let Some(value) = value {
                let sql = format!("UPDATE clients SET {} = ? WHERE id = ? AND user_id = ?", column);
                sqlx::query(&sql)
                    .bind(value)
                    .bind(client_id)
                    .bind(user_id)
                    .execute(&self.pool)
                    .await?;
            }
        }

        sqlx::query("UPDATE clients SET updated_at = ? WHERE id = ? AND user_id = ?")
            .bind(now_rfc3339())
            .bind(client_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        self.get(user_id, client_id)
            .await?
            .ok_or_else(|| ProposalError::NotFound(format!("Client {}", client_id)))
    }

    pub async fn delete(&self, user_id: &str, client_id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM clients WHERE id = ? AND user_id = ?")
            .bind(client_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

fn row_to_client(row: &sqlx::sqlite::SqliteRow) -> Result<Client> {
    let created_at: String = row.try_get("created_at")?;
    let updated_at: String = row.try_get("updated_at")?;

    Ok(Client {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        name: row.try_get("name")?,
        company: row.try_get("company")?,
        industry: row.try_get("industry")?,
        email: row.try_get("email")?,
        notes: row.try_get("notes")?,
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn setup_test_db() -> SqlitePool {
        let pool = SqlitePool::connect(":memory:").await.unwrap();

        sqlx::query(
            r#"
            CREATE TABLE clients (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                name TEXT NOT NULL,
                company TEXT,
                industry TEXT,
                email TEXT,
                notes TEXT,
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

    #[tokio::test]
    async fn test_crud_scoped_by_owner() {
        let storage = ClientStorage::new(setup_test_db().await);

        let client = storage
            .create(
                "user-1",
                CreateClientInput {
                    name: "Acme".to_string(),
                    company: Some("Acme Inc".to_string()),
                    industry: Some("retail".to_string()),
                    email: None,
                    notes: None,
                },
            )
            .await
            .unwrap();

        assert!(storage.get("user-2", &client.id).await.unwrap().is_none());

        let updated = storage
            .update(
                "user-1",
                &client.id,
                UpdateClientInput {
                    notes: Some("Met at conference".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.notes.as_deref(), Some("Met at conference"));
        assert_eq!(updated.name, "Acme");

        assert!(storage.delete("user-1", &client.id).await.unwrap());
        assert!(storage.list("user-1").await.unwrap().is_empty());
    }
}
