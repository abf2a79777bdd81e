// ABOUTME: Prompts for brief analysis
// ABOUTME: Fixed system prompt pinning the JSON schema, user prompt embedding the brief text

pub const ANALYSIS_SYSTEM_PROMPT: &str = r#"You are an expert project analyst for freelancers and agencies. You read raw client briefs and extract a structured analysis.

Respond with ONLY a JSON object matching exactly this schema, no prose before or after:
{
  "projectType": "short machine-friendly label, e.g. web_application, branding, mobile_app",
  "industry": "client industry or null",
  "summary": "2-3 sentence summary of the engagement",
  "estimatedBudgetMin": number or null,
  "estimatedBudgetMax": number or null,
  "estimatedTimeline": "duration estimate like '6-8 weeks' or null",
  "requirements": ["explicit requirement", ...],
  "deliverables": ["concrete deliverable", ...],
  "riskFlags": [{"severity": "low|medium|high", "description": "..."}, ...],
  "clientInsights": ["observation about the client useful when pitching", ...],
  "recommendedTone": "tone the proposal should take, e.g. professional, friendly, bold",
  "recommendedPricingStrategy": "fixed|tiered|hourly|retainer with one-line rationale"
}"#;

/// Build the user prompt for analyzing a brief
pub fn analysis_prompt(raw_text: &str, client_name: Option<&str>, industry: Option<&str>) -> String {
    let mut prompt = String::from("Analyze the following client brief.\n");

    if let Some(name) = client_name {
        prompt.push_str(&format!("Client: {}\n", name));
    }
    if let Some(industry) = industry {
        prompt.push_str(&format!("Industry hint: {}\n", industry));
    }

    prompt.push_str("\nBrief:\n\"\"\"\n");
    prompt.push_str(raw_text);
    prompt.push_str("\n\"\"\"\n");
    prompt
}
