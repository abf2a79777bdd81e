// ABOUTME: Template entity types
// ABOUTME: Starting content plus default pricing, system- or user-owned

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: String,
    /// None for system-owned templates
    pub user_id: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub content: TemplateContent,
    pub default_pricing: Option<Vec<TemplatePricing>>,
    pub is_system: bool,
    pub usage_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Starting copy for proposal sections. Sections the template leaves out are
/// generated from scratch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateContent {
    pub opening_hook: Option<String>,
    pub problem_statement: Option<String>,
    pub proposed_solution: Option<String>,
    pub methodology: Option<String>,
    pub timeline: Option<String>,
    pub why_us: Option<String>,
    pub next_steps: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplatePricing {
    pub name: String,
    pub price: f64,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTemplateInput {
    pub name: String,
    pub description: Option<String>,
    pub content: TemplateContent,
    pub default_pricing: Option<Vec<TemplatePricing>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTemplateInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub content: Option<TemplateContent>,
    pub default_pricing: Option<Vec<TemplatePricing>>,
}
