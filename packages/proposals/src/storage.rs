// ABOUTME: Proposal storage layer using SQLite
// ABOUTME: Content and pricing tiers persist as JSON blobs; typed partial updates

use sqlx::{Row, SqlitePool};
use tracing::debug;

use proposalpilot_storage::{now_rfc3339, parse_timestamp};

use crate::error::{ProposalError, Result};
use crate::types::{
    GeneratedProposal, PricingTier, Proposal, ProposalContent, ProposalStatus, UpdateProposalInput,
};

/// Everything needed to persist one generated proposal
#[derive(Debug, Clone)]
pub struct CreateProposalRecord {
    pub brief_id: String,
    pub client_id: String,
    pub template_id: Option<String>,
    pub generated: GeneratedProposal,
    pub model: String,
}

pub struct ProposalStorage {
    pool: SqlitePool,
}

impl ProposalStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, user_id: &str, record: CreateProposalRecord) -> Result<Proposal> {
        let id = proposalpilot_core::generate_id();
        let content_json = serde_json::to_string(&record.generated.content)?;
        let pricing_json = serde_json::to_string(&record.generated.pricing_tiers)?;

        sqlx::query(
            r#"
            INSERT INTO proposals (
                id, user_id, brief_id, client_id, template_id,
                title, status, content, pricing_tiers, tone, word_count, model
            ) VALUES (?, ?, ?, ?, ?, ?, 'draft', ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(user_id)
        .bind(&record.brief_id)
        .bind(&record.client_id)
        .bind(&record.template_id)
        .bind(&record.generated.title)
        .bind(&content_json)
        .bind(&pricing_json)
        .bind(&record.generated.tone)
        .bind(record.generated.word_count)
        .bind(&record.model)
        .execute(&self.pool)
        .await?;

        self.get(user_id, &id)
            .await?
            .ok_or_else(|| ProposalError::NotFound(format!("Proposal {}", id)))
    }

    pub async fn get(&self, user_id: &str, proposal_id: &str) -> Result<Option<Proposal>> {
        let row = sqlx::query("SELECT * FROM proposals WHERE id = ? AND user_id = ?")
            .bind(proposal_id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|row| row_to_proposal(&row)).transpose()
    }

    pub async fn list(&self, user_id: &str, status: Option<ProposalStatus>) -> Result<Vec<Proposal>> {
        let rows = match status {
            Some(status) => {
                sqlx::query(
                    "SELECT * FROM proposals WHERE user_id = ? AND status = ? ORDER BY created_at DESC",
                )
                .bind(user_id)
                .bind(status.as_str())
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query("SELECT * FROM proposals WHERE user_id = ? ORDER BY created_at DESC")
                    .bind(user_id)
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        rows.iter().map(row_to_proposal).collect()
    }

    /// Apply a typed partial update. Section fields replace the matching
    /// section inside the stored content blob; absent fields keep the stored
    /// value.
    pub async fn update(
        &self,
        user_id: &str,
        proposal_id: &str,
        input: UpdateProposalInput,
    ) -> Result<Proposal> {
        let existing = self
            .get(user_id, proposal_id)
            .await?
            .ok_or_else(|| ProposalError::NotFound(format!("Proposal {}", proposal_id)))?;

        let mut content = existing.content;
        if let Some(v) = input.opening_hook {
            content.opening_hook = v;
        }
        if let Some(v) = input.problem_statement {
            content.problem_statement = v;
        }
        if let Some(v) = input.proposed_solution {
            content.proposed_solution = v;
        }
        if let Some(v) = input.methodology {
            content.methodology = v;
        }
        if let Some(v) = input.timeline {
            content.timeline = v;
        }
        if let Some(v) = input.why_us {
            content.why_us = v;
        }
        if let Some(v) = input.next_steps {
            content.next_steps = v;
        }

        let pricing_tiers = input.pricing_tiers.unwrap_or(existing.pricing_tiers);
        let title = input.title.unwrap_or(existing.title);

        let content_json = serde_json::to_string(&content)?;
        let pricing_json = serde_json::to_string(&pricing_tiers)?;

        sqlx::query(
            r#"
            UPDATE proposals
            SET title = ?, content = ?, pricing_tiers = ?, word_count = ?, updated_at = ?
            WHERE id = ? AND user_id = ?
            "#,
        )
        .bind(&title)
        .bind(&content_json)
        .bind(&pricing_json)
        .bind(content.word_count())
        .bind(now_rfc3339())
        .bind(proposal_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        self.get(user_id, proposal_id)
            .await?
            .ok_or_else(|| ProposalError::NotFound(format!("Proposal {}", proposal_id)))
    }

    /// Move the proposal through its lifecycle, stamping the relevant
    /// timestamp for the new status.
    pub async fn update_status(
        &self,
        user_id: &str,
        proposal_id: &str,
        next: ProposalStatus,
    ) -> Result<Proposal> {
        let existing = self
            .get(user_id, proposal_id)
            .await?
            .ok_or_else(|| ProposalError::NotFound(format!("Proposal {}", proposal_id)))?;

        if !existing.status.can_transition_to(next) {
            return Err(ProposalError::InvalidTransition {
                from: existing.status,
                to: next,
            });
        }

        debug!(
            "Proposal {} status {} -> {}",
            proposal_id, existing.status, next
        );

        let now = now_rfc3339();
        let timestamp_column = match next {
            ProposalStatus::Sent => Some("sent_at"),
            ProposalStatus::Viewed => Some("viewed_at"),
            ProposalStatus::Accepted | ProposalStatus::Rejected => Some("responded_at"),
            _ => None,
        };

        match timestamp_column {
            Some(column) => {
                let sql = format!(
                    "UPDATE proposals SET status = ?, {} = ?, updated_at = ? WHERE id = ? AND user_id = ?",
                    column
                );
                sqlx::query(&sql)
                    .bind(next.as_str())
                    .bind(&now)
                    .bind(&now)
                    .bind(proposal_id)
                    .bind(user_id)
                    .execute(&self.pool)
                    .await?;
            }
            None => {
                sqlx::query(
                    "UPDATE proposals SET status = ?, updated_at = ? WHERE id = ? AND user_id = ?",
                )
                .bind(next.as_str())
                .bind(&now)
                .bind(proposal_id)
                .bind(user_id)
                .execute(&self.pool)
                .await?;
            }
        }

        self.get(user_id, proposal_id)
            .await?
            .ok_or_else(|| ProposalError::NotFound(format!("Proposal {}", proposal_id)))
    }

    pub async fn delete(&self, user_id: &str, proposal_id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM proposals WHERE id = ? AND user_id = ?")
            .bind(proposal_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

fn row_to_proposal(row: &sqlx::sqlite::SqliteRow) -> Result<Proposal> {
    let status_str: String = row.try_get("status")?;
    let status = ProposalStatus::parse(&status_str).ok_or_else(|| {
        ProposalError::Storage(proposalpilot_storage::StorageError::InvalidData(format!(
            "unknown proposal status: {}",
            status_str
        )))
    })?;

    let content_json: String = row.try_get("content")?;
    let content: ProposalContent = serde_json::from_str(&content_json)?;

    let pricing_json: String = row.try_get("pricing_tiers")?;
    let pricing_tiers: Vec<PricingTier> = serde_json::from_str(&pricing_json)?;

    let created_at: String = row.try_get("created_at")?;
    let updated_at: String = row.try_get("updated_at")?;
    let sent_at: Option<String> = row.try_get("sent_at")?;
    let viewed_at: Option<String> = row.try_get("viewed_at")?;
    let responded_at: Option<String> = row.try_get("responded_at")?;

    Ok(Proposal {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        brief_id: row.try_get("brief_id")?,
        client_id: row.try_get("client_id")?,
        template_id: row.try_get("template_id")?,
        title: row.try_get("title")?,
        status,
        content,
        pricing_tiers,
        tone: row.try_get("tone")?,
        word_count: row.try_get("word_count")?,
        model: row.try_get("model")?,
        sent_at: sent_at.as_deref().map(parse_timestamp).transpose()?,
        viewed_at: viewed_at.as_deref().map(parse_timestamp).transpose()?,
        responded_at: responded_at.as_deref().map(parse_timestamp).transpose()?,
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
    })
}
