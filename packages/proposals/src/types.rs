// ABOUTME: Proposal entity types, generated output, and quality score structures
// ABOUTME: Lifecycle: draft -> sent -> viewed -> accepted | rejected | expired

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProposalStatus {
    Draft,
    Sent,
    Viewed,
    Accepted,
    Rejected,
    Expired,
}

impl ProposalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProposalStatus::Draft => "draft",
            ProposalStatus::Sent => "sent",
            ProposalStatus::Viewed => "viewed",
            ProposalStatus::Accepted => "accepted",
            ProposalStatus::Rejected => "rejected",
            ProposalStatus::Expired => "expired",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "draft" => Some(ProposalStatus::Draft),
            "sent" => Some(ProposalStatus::Sent),
            "viewed" => Some(ProposalStatus::Viewed),
            "accepted" => Some(ProposalStatus::Accepted),
            "rejected" => Some(ProposalStatus::Rejected),
            "expired" => Some(ProposalStatus::Expired),
            _ => None,
        }
    }

    /// Valid lifecycle moves. Accepted, rejected, and expired are terminal.
    pub fn can_transition_to(&self, next: ProposalStatus) -> bool {
        use ProposalStatus::*;
        matches!(
            (self, next),
            (Draft, Sent)
                | (Sent, Viewed)
                | (Sent, Accepted)
                | (Sent, Rejected)
                | (Sent, Expired)
                | (Viewed, Accepted)
                | (Viewed, Rejected)
                | (Viewed, Expired)
        )
    }
}

impl std::fmt::Display for ProposalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The seven narrative sections of a proposal, stored as one JSON blob
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalContent {
    pub opening_hook: String,
    pub problem_statement: String,
    pub proposed_solution: String,
    pub methodology: String,
    pub timeline: String,
    pub why_us: String,
    pub next_steps: String,
}

impl ProposalContent {
    pub fn word_count(&self) -> i64 {
        [
            &self.opening_hook,
            &self.problem_statement,
            &self.proposed_solution,
            &self.methodology,
            &self.timeline,
            &self.why_us,
            &self.next_steps,
        ]
        .iter()
        .map(|s| s.split_whitespace().count() as i64)
        .sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingTier {
    pub name: String,
    pub price: f64,
    pub billing_note: Option<String>,
    pub deliverables: Vec<String>,
    #[serde(default)]
    pub recommended: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Proposal {
    pub id: String,
    pub user_id: String,
    pub brief_id: String,
    pub client_id: String,
    pub template_id: Option<String>,
    pub title: String,
    pub status: ProposalStatus,
    pub content: ProposalContent,
    pub pricing_tiers: Vec<PricingTier>,
    pub tone: Option<String>,
    pub word_count: i64,
    pub model: Option<String>,
    pub sent_at: Option<DateTime<Utc>>,
    pub viewed_at: Option<DateTime<Utc>>,
    pub responded_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Output of the proposal generator. Nothing is persisted until the caller
/// stores it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedProposal {
    pub title: String,
    pub content: ProposalContent,
    pub pricing_tiers: Vec<PricingTier>,
    pub tone: String,
    pub word_count: i64,
}

/// Typed partial update for a stored proposal: a field is either present
/// with its new value or absent and left as stored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProposalInput {
    pub title: Option<String>,
    pub opening_hook: Option<String>,
    pub problem_statement: Option<String>,
    pub proposed_solution: Option<String>,
    pub methodology: Option<String>,
    pub timeline: Option<String>,
    pub why_us: Option<String>,
    pub next_steps: Option<String>,
    pub pricing_tiers: Option<Vec<PricingTier>>,
}

/// Rubric-based quality score for a completed proposal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalScore {
    pub overall_score: i64,
    pub grade: String,
    pub win_probability: String,
    pub categories: Vec<CategoryScore>,
    pub strengths: Vec<String>,
    pub improvements: Vec<Improvement>,
    pub rewrite_suggestions: Option<Vec<RewriteSuggestion>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryScore {
    pub category: String,
    pub score: i64,
    pub comment: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Improvement {
    pub priority: i64,
    pub suggestion: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewriteSuggestion {
    pub section: String,
    pub suggestion: String,
}
