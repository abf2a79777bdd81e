// ABOUTME: Proposal generator
// ABOUTME: Turns a brief analysis plus requester context into proposal copy; persists nothing

use std::sync::Arc;
use std::time::Instant;

use serde::Deserialize;
use sqlx::SqlitePool;
use tracing::{error, info};

use proposalpilot_ai::{generate_cached, AIService, ResponseCache, UsageLog, UsageLogStorage};
use proposalpilot_briefs::BriefAnalysis;
use proposalpilot_templates::Template;

use crate::error::{ProposalError, Result};
use crate::prompts::{generation_prompt, GENERATION_SYSTEM_PROMPT};
use crate::types::{GeneratedProposal, PricingTier, ProposalContent};

pub const OPERATION: &str = "proposal_generation";

const MAX_PRICING_TIERS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProposalLength {
    Brief,
    #[default]
    Standard,
    Detailed,
}

/// Context the generator works from. Assembled by the caller from the brief,
/// the requesting user, the client, and an optional template.
#[derive(Debug, Clone)]
pub struct GenerationInput {
    pub analysis: BriefAnalysis,
    pub requester_name: String,
    pub requester_company: Option<String>,
    pub hourly_rate: Option<f64>,
    pub client_name: String,
    pub client_industry: Option<String>,
    pub tone: Option<String>,
    pub length: ProposalLength,
    pub template: Option<Template>,
}

/// Shape the model is asked to return
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeneratedProposalData {
    title: String,
    opening_hook: String,
    problem_statement: String,
    proposed_solution: String,
    methodology: String,
    timeline: String,
    why_us: String,
    next_steps: String,
    #[serde(default)]
    pricing_tiers: Vec<PricingTier>,
}

pub struct ProposalGenerator {
    cache: ResponseCache,
    usage_logs: UsageLogStorage,
    ai: Arc<AIService>,
}

impl ProposalGenerator {
    pub fn new(pool: SqlitePool, ai: Arc<AIService>) -> Self {
        Self {
            cache: ResponseCache::new(pool.clone()),
            usage_logs: UsageLogStorage::new(pool),
            ai,
        }
    }

    /// Generate proposal copy. No entity is created or modified here; on any
    /// model or parse failure the error surfaces and nothing partial exists.
    pub async fn generate(
        &self,
        user_id: &str,
        input: &GenerationInput,
    ) -> Result<GeneratedProposal> {
        let prompt = generation_prompt(input);
        let started = Instant::now();

        let outcome = generate_cached::<GeneratedProposalData>(
            &self.ai,
            &self.cache,
            OPERATION,
            &prompt,
            GENERATION_SYSTEM_PROMPT,
        )
        .await;

        let duration_ms = started.elapsed().as_millis() as i64;

        match outcome {
            Ok((data, usage)) => {
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

                let tone = input
                    .tone
                    .clone()
                    .unwrap_or_else(|| input.analysis.recommended_tone.clone());

                let mut pricing_tiers = data.pricing_tiers;
                pricing_tiers.truncate(MAX_PRICING_TIERS);

                let content = ProposalContent {
                    opening_hook: data.opening_hook,
                    problem_statement: data.problem_statement,
                    proposed_solution: data.proposed_solution,
                    methodology: data.methodology,
                    timeline: data.timeline,
                    why_us: data.why_us,
                    next_steps: data.next_steps,
                };
                let word_count = content.word_count();

                info!(
                    "Generated proposal '{}' ({} words, {} tiers) in {}ms",
                    data.title,
                    word_count,
                    pricing_tiers.len(),
                    duration_ms
                );

                Ok(GeneratedProposal {
                    title: data.title,
                    content,
                    pricing_tiers,
                    tone,
                    word_count,
                })
            }
            Err(e) => {
                error!("Proposal generation failed: {}", e);

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
