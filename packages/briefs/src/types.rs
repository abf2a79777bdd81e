// ABOUTME: Brief entity types and the analysis result structure
// ABOUTME: Status machine: draft -> analyzing -> analyzed | failed

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BriefStatus {
    Draft,
    Analyzing,
    Analyzed,
    Failed,
}

impl BriefStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BriefStatus::Draft => "draft",
            BriefStatus::Analyzing => "analyzing",
            BriefStatus::Analyzed => "analyzed",
            BriefStatus::Failed => "failed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "draft" => Some(BriefStatus::Draft),
            "analyzing" => Some(BriefStatus::Analyzing),
            "analyzed" => Some(BriefStatus::Analyzed),
            "failed" => Some(BriefStatus::Failed),
            _ => None,
        }
    }
}

impl std::fmt::Display for BriefStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Brief {
    pub id: String,
    pub user_id: String,
    pub client_id: Option<String>,
    pub title: String,
    pub raw_text: String,
    pub status: BriefStatus,
    pub analysis: Option<BriefAnalysis>,
    pub analysis_model: Option<String>,
    pub estimated_tokens: Option<i64>,
    pub analyzed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Structured analysis returned by the model and stored on the brief
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BriefAnalysis {
    pub project_type: String,
    pub industry: Option<String>,
    pub summary: String,
    pub estimated_budget_min: Option<f64>,
    pub estimated_budget_max: Option<f64>,
    pub estimated_timeline: Option<String>,
    pub requirements: Vec<String>,
    pub deliverables: Vec<String>,
    pub risk_flags: Vec<RiskFlag>,
    pub client_insights: Vec<String>,
    pub recommended_tone: String,
    pub recommended_pricing_strategy: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskFlag {
    pub severity: String,
    pub description: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBriefInput {
    pub client_id: Option<String>,
    pub title: String,
    pub raw_text: String,
}

/// Partial update; only draft briefs may be edited
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBriefInput {
    pub client_id: Option<String>,
    pub title: Option<String>,
    pub raw_text: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for status in [
            BriefStatus::Draft,
            BriefStatus::Analyzing,
            BriefStatus::Analyzed,
            BriefStatus::Failed,
        ] {
            assert_eq!(BriefStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(BriefStatus::parse("deleted"), None);
    }
}
