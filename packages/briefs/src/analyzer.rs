// ABOUTME: Brief analyzer orchestration
// ABOUTME: draft -> analyzing -> model call -> analyzed, or failed on any error

use std::sync::Arc;
use std::time::Instant;

use sqlx::SqlitePool;
use tracing::{error, info};

use proposalpilot_ai::{
    estimate_tokens, generate_cached, AIService, ResponseCache, UsageLog, UsageLogStorage,
};

use crate::error::{BriefError, Result};
use crate::prompts::{analysis_prompt, ANALYSIS_SYSTEM_PROMPT};
use crate::storage::BriefStorage;
use crate::types::{Brief, BriefAnalysis, BriefStatus};

pub const OPERATION: &str = "brief_analysis";

pub struct BriefAnalyzer {
    storage: BriefStorage,
    cache: ResponseCache,
    usage_logs: UsageLogStorage,
    ai: Arc<AIService>,
}

impl BriefAnalyzer {
    pub fn new(pool: SqlitePool, ai: Arc<AIService>) -> Self {
        Self {
            storage: BriefStorage::new(pool.clone()),
            cache: ResponseCache::new(pool.clone()),
            usage_logs: UsageLogStorage::new(pool),
            ai,
        }
    }

    /// Analyze a brief. The brief must be in draft; on success it ends up
    /// analyzed with the analysis attached, on any model failure it ends up
    /// failed and the error propagates.
    pub async fn analyze(
        &self,
        user_id: &str,
        brief_id: &str,
        client_name: Option<&str>,
        client_industry: Option<&str>,
    ) -> Result<Brief> {
        let brief = self
            .storage
            .get(user_id, brief_id)
            .await?
            .ok_or_else(|| BriefError::NotFound(brief_id.to_string()))?;

        if brief.status != BriefStatus::Draft {
            return Err(BriefError::InvalidStatus {
                expected: BriefStatus::Draft,
                actual: brief.status,
            });
        }

        self.storage.set_status(brief_id, BriefStatus::Analyzing).await?;

        let prompt = analysis_prompt(&brief.raw_text, client_name, client_industry);
        let started = Instant::now();

        let outcome = generate_cached::<BriefAnalysis>(
            &self.ai,
            &self.cache,
            OPERATION,
            &prompt,
            ANALYSIS_SYSTEM_PROMPT,
        )
        .await;

        let duration_ms = started.elapsed().as_millis() as i64;

        match outcome {
            Ok((analysis, usage)) => {
                self.storage
                    .save_analysis(
                        brief_id,
                        &analysis,
                        self.ai.model(),
                        estimate_tokens(&brief.raw_text),
                    )
                    .await?;

                if let Some(usage) = usage {
                    let log = UsageLog::success(
                        user_id,
                        OPERATION,
                        self.ai.model(),
                        usage.input_tokens as i64,
                        usage.output_tokens as i64,
                        duration_ms,
                    );
                    if let Err(e) = self.usage_logs.record(&log).await {
                        error!("Failed to record usage log: {}", e);
                    }
                }

                info!("Brief {} analyzed in {}ms", brief_id, duration_ms);

                self.storage
                    .get(user_id, brief_id)
                    .await?
                    .ok_or_else(|| BriefError::NotFound(brief_id.to_string()))
            }
            Err(e) => {
                error!("Brief {} analysis failed: {}", brief_id, e);

                self.storage.set_status(brief_id, BriefStatus::Failed).await?;

                let log = UsageLog::failure(
                    user_id,
                    OPERATION,
                    self.ai.model(),
                    &e.to_string(),
                    duration_ms,
                );
                if let Err(log_err) = self.usage_logs.record(&log).await {
                    error!("Failed to record usage log: {}", log_err);
                }

                Err(BriefError::AIService(e.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::tests::setup_test_db;
    use crate::types::CreateBriefInput;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn setup_full_db() -> SqlitePool {
        let pool = setup_test_db().await;

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

        sqlx::query(
            r#"
            CREATE TABLE ai_response_cache (
                prompt_hash TEXT PRIMARY KEY,
                operation TEXT NOT NULL,
                model TEXT NOT NULL,
                response_json TEXT NOT NULL,
                created_at TEXT NOT NULL DEFAULT (datetime('now', 'utc'))
            )
            "#,
        )
        .execute(&pool)
        .await
        .unwrap();

        pool
    }

    fn analysis_body() -> serde_json::Value {
        json!({
            "id": "msg_test",
            "content": [{"type": "text", "text": json!({
                "projectType": "web_application",
                "industry": "retail",
                "summary": "Storefront rebuild",
                "estimatedBudgetMin": 5000.0,
                "estimatedBudgetMax": 9000.0,
                "estimatedTimeline": "6 weeks",
                "requirements": ["catalog"],
                "deliverables": ["deployed site"],
                "riskFlags": [],
                "clientInsights": ["responsive"],
                "recommendedTone": "professional",
                "recommendedPricingStrategy": "tiered"
            }).to_string()}],
            "usage": {"input_tokens": 200, "output_tokens": 150}
        })
    }

    async fn create_draft(pool: &SqlitePool) -> Brief {
        BriefStorage::new(pool.clone())
            .create(
                "user-1",
                CreateBriefInput {
                    client_id: None,
                    title: "Store".to_string(),
                    raw_text: "We need an online store".to_string(),
                },
            )
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_successful_analysis_ends_analyzed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(analysis_body()))
            .mount(&server)
            .await;

        let pool = setup_full_db().await;
        let brief = create_draft(&pool).await;

        let ai = Arc::new(AIService::with_api_key_and_base_url(
            "test-key".to_string(),
            server.uri(),
        ));
        let analyzer = BriefAnalyzer::new(pool.clone(), ai);

        let analyzed = analyzer
            .analyze("user-1", &brief.id, Some("Acme"), Some("retail"))
            .await
            .unwrap();

        assert_eq!(analyzed.status, BriefStatus::Analyzed);
        let analysis = analyzed.analysis.unwrap();
        assert_eq!(analysis.project_type, "web_application");
        assert_eq!(analysis.recommended_tone, "professional");

        // Usage was logged
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM ai_usage_logs WHERE operation = 'brief_analysis'")
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_model_failure_ends_failed_never_analyzing() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let pool = setup_full_db().await;
        let brief = create_draft(&pool).await;

        let ai = Arc::new(AIService::with_api_key_and_base_url(
            "test-key".to_string(),
            server.uri(),
        ));
        let analyzer = BriefAnalyzer::new(pool.clone(), ai);

        let result = analyzer.analyze("user-1", &brief.id, None, None).await;
        assert!(matches!(result, Err(BriefError::AIService(_))));

        let after = BriefStorage::new(pool.clone())
            .get("user-1", &brief.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(after.status, BriefStatus::Failed);

        let (errors,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM ai_usage_logs WHERE error IS NOT NULL")
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(errors, 1);
    }

    #[tokio::test]
    async fn test_non_draft_brief_is_rejected_without_model_call() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(analysis_body()))
            .expect(0)
            .mount(&server)
            .await;

        let pool = setup_full_db().await;
        let brief = create_draft(&pool).await;

        let storage = BriefStorage::new(pool.clone());
        storage
            .set_status(&brief.id, BriefStatus::Analyzed)
            .await
            .unwrap();

        let ai = Arc::new(AIService::with_api_key_and_base_url(
            "test-key".to_string(),
            server.uri(),
        ));
        let analyzer = BriefAnalyzer::new(pool.clone(), ai);

        let result = analyzer.analyze("user-1", &brief.id, None, None).await;
        assert!(matches!(result, Err(BriefError::InvalidStatus { .. })));
    }

    #[tokio::test]
    async fn test_missing_brief() {
        let pool = setup_full_db().await;
        let ai = Arc::new(AIService::with_api_key_and_base_url(
            "test-key".to_string(),
            "http://localhost:1".to_string(),
        ));
        let analyzer = BriefAnalyzer::new(pool, ai);

        let result = analyzer.analyze("user-1", "missing", None, None).await;
        assert!(matches!(result, Err(BriefError::NotFound(_))));
    }
}
