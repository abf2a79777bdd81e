// ABOUTME: Quality scorer
// ABOUTME: Grades a completed proposal against its source brief; read-side only

use std::sync::Arc;
use std::time::Instant;

use sqlx::SqlitePool;
use tracing::{error, info};

use proposalpilot_ai::{generate_cached, AIService, ResponseCache, UsageLog, UsageLogStorage};
use proposalpilot_briefs::BriefAnalysis;

use crate::error::{ProposalError, Result};
use crate::prompts::{scoring_prompt, SCORING_SYSTEM_PROMPT};
use crate::types::{PricingTier, ProposalContent, ProposalScore};

pub const OPERATION: &str = "quality_scoring";

/// Everything the scorer reads: brief text, its analysis, and the proposal
/// content in its stored form.
#[derive(Debug, Clone)]
pub struct ScoringInput {
    pub brief_text: String,
    pub analysis: BriefAnalysis,
    pub content: ProposalContent,
    pub pricing_tiers: Vec<PricingTier>,
}

pub struct QualityScorer {
    cache: ResponseCache,
    usage_logs: UsageLogStorage,
    ai: Arc<AIService>,
}

impl QualityScorer {
    pub fn new(pool: SqlitePool, ai: Arc<AIService>) -> Self {
        Self {
            cache: ResponseCache::new(pool.clone()),
            usage_logs: UsageLogStorage::new(pool),
            ai,
        }
    }

    /// Score a proposal. No persistence side effects; the caller decides
    /// whether to keep the result.
    pub async fn score(&self, user_id: &str, input: &ScoringInput) -> Result<ProposalScore> {
        let proposal_json = serde_json::to_string_pretty(&serde_json::json!({
            "content": input.content,
            "pricingTiers": input.pricing_tiers,
        }))?;

        let prompt = scoring_prompt(&input.brief_text, &input.analysis, &proposal_json);
        let started = Instant::now();

        let outcome = generate_cached::<ProposalScore>(
            &self.ai,
            &self.cache,
            OPERATION,
            &prompt,
            SCORING_SYSTEM_PROMPT,
        )
        .await;

        let duration_ms = started.elapsed().as_millis() as i64;

        match outcome {
            Ok((score, usage)) => {
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

                info!(
                    "Scored proposal: {} ({}) in {}ms",
                    score.overall_score, score.grade, duration_ms
                );

                Ok(score)
            }
            Err(e) => {
                error!("Proposal scoring failed: {}", e);

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

                Err(ProposalError::AIService(e.to_string()))
            }
        }
    }
}
