// ABOUTME: Read-through cache for model responses
// ABOUTME: Keyed by a hash of model + system prompt + user prompt, stored in SQLite

use serde::de::DeserializeOwned;
use sha2::{Digest, Sha256};
use sqlx::SqlitePool;
use tracing::{debug, warn};

use proposalpilot_storage::StorageError;

use crate::service::{AIResponse, AIService, AIServiceResult, Usage};

pub struct ResponseCache {
    pool: SqlitePool,
}

impl ResponseCache {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Cache key for a prompt: sha256 over model, system prompt, and prompt
    pub fn prompt_hash(model: &str, system_prompt: &str, prompt: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(model.as_bytes());
        hasher.update(b"\n");
        hasher.update(system_prompt.as_bytes());
        hasher.update(b"\n");
        hasher.update(prompt.as_bytes());
        hex_encode(&hasher.finalize())
    }

    pub async fn get(&self, prompt_hash: &str) -> Result<Option<String>, StorageError> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT response_json FROM ai_response_cache WHERE prompt_hash = ?")
                .bind(prompt_hash)
                .fetch_optional(&self.pool)
                .await
                .map_err(StorageError::Sqlx)?;

        Ok(row.map(|(json,)| json))
    }

    pub async fn put(
        &self,
        prompt_hash: &str,
        operation: &str,
        model: &str,
        response_json: &str,
    ) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO ai_response_cache (prompt_hash, operation, model, response_json)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(prompt_hash)
        .bind(operation)
        .bind(model)
        .bind(response_json)
        .execute(&self.pool)
        .await
        .map_err(StorageError::Sqlx)?;

        Ok(())
    }
}

/// Read-through structured generation: return the cached response for an
/// identical prompt without calling the API, otherwise call through and cache
/// the raw JSON. Cache failures are logged and never fail the call.
///
/// Returns `usage: None` on a cache hit (no tokens were spent).
pub async fn generate_cached<T: DeserializeOwned>(
    service: &AIService,
    cache: &ResponseCache,
    operation: &str,
    prompt: &str,
    system_prompt: &str,
) -> AIServiceResult<(T, Option<Usage>)> {
    let hash = ResponseCache::prompt_hash(service.model(), system_prompt, prompt);

    match cache.get(&hash).await {
        Ok(Some(cached)) => {
            if let Ok(data) = serde_json::from_str::<T>(&cached) {
                debug!(operation, "AI response cache hit");
                return Ok((data, None));
            }
            warn!(operation, "Discarding unparseable cached AI response");
        }
        Ok(None) => {}
        Err(e) => warn!(operation, error = %e, "AI response cache lookup failed"),
    }

    let AIResponse { data: raw, usage } = service.generate_json(prompt, Some(system_prompt)).await?;

    let data: T = serde_json::from_str(&raw).map_err(|e| {
        crate::service::AIServiceError::ParseError(format!("Failed to parse JSON: {}", e))
    })?;

    if let Err(e) = cache.put(&hash, operation, service.model(), &raw).await {
        warn!(operation, error = %e, "Failed to store AI response in cache");
    }

    Ok((data, Some(usage)))
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
