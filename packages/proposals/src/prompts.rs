// ABOUTME: Prompts for proposal generation and quality scoring
// ABOUTME: System prompts pin the JSON schemas; user prompts assemble the context

use proposalpilot_briefs::BriefAnalysis;
use proposalpilot_templates::Template;

use crate::generator::{GenerationInput, ProposalLength};

pub const GENERATION_SYSTEM_PROMPT: &str = r#"You are an expert proposal writer for freelancers and agencies. You turn a structured brief analysis into persuasive, client-ready proposal copy.

Respond with ONLY a JSON object matching exactly this schema, no prose before or after:
{
  "title": "proposal title",
  "openingHook": "2-3 sentences that hook the client immediately",
  "problemStatement": "restate the client's problem in their terms",
  "proposedSolution": "what will be built or delivered",
  "methodology": "how the work will be run",
  "timeline": "phased schedule",
  "whyUs": "credibility and differentiation",
  "nextSteps": "clear call to action",
  "pricingTiers": [
    {
      "name": "tier name",
      "price": number,
      "billingNote": "payment terms or null",
      "deliverables": ["what this tier includes", ...],
      "recommended": boolean
    }
  ]
}

Produce exactly three pricing tiers unless the pricing strategy makes fewer appropriate. Mark exactly one tier as recommended."#;

fn length_instruction(length: ProposalLength) -> &'static str {
    match length {
        ProposalLength::Brief => "Keep the proposal concise, roughly 400 words across all sections.",
        ProposalLength::Standard => "Aim for roughly 800 words across all sections.",
        ProposalLength::Detailed => {
            "Write a thorough proposal, roughly 1500 words across all sections."
        }
    }
}

fn push_template_context(prompt: &mut String, template: &Template) {
    prompt.push_str("\nUse this template as starting material, adapting it to the client:\n");

    let sections = [
        ("Opening hook", &template.content.opening_hook),
        ("Problem statement", &template.content.problem_statement),
        ("Proposed solution", &template.content.proposed_solution),
        ("Methodology", &template.content.methodology),
        ("Timeline", &template.content.timeline),
        ("Why us", &template.content.why_us),
        ("Next steps", &template.content.next_steps),
    ];
    for (label, value) in sections {
        if let Some(value) = value {
            prompt.push_str(&format!("{}: {}\n", label, value));
        }
    }

    if let Some(pricing) = &template.default_pricing {
        prompt.push_str("Default pricing to start from:\n");
        for tier in pricing {
            prompt.push_str(&format!(
                "- {} at ${:.0}{}\n",
                tier.name,
                tier.price,
                tier.description
                    .as_deref()
                    .map(|d| format!(" ({})", d))
                    .unwrap_or_default()
            ));
        }
    }
}

/// Build the user prompt for proposal generation
pub fn generation_prompt(input: &GenerationInput) -> String {
    let analysis_json =
        serde_json::to_string_pretty(&input.analysis).unwrap_or_else(|_| "{}".to_string());

    let mut prompt = format!(
        "Write a proposal for the project below.\n\n\
         Sender: {}{}\n\
         Client: {}{}\n",
        input.requester_name,
        input
            .requester_company
            .as_deref()
            .map(|c| format!(" ({})", c))
            .unwrap_or_default(),
        input.client_name,
        input
            .client_industry
            .as_deref()
            .map(|i| format!(" (industry: {})", i))
            .unwrap_or_default(),
    );

    if let Some(rate) = input.hourly_rate {
        prompt.push_str(&format!(
            "Anchor pricing around an hourly rate of ${:.0}.\n",
            rate
        ));
    }

    let tone = input
        .tone
        .as_deref()
        .unwrap_or(&input.analysis.recommended_tone);
    prompt.push_str(&format!("Tone: {}\n", tone));
    prompt.push_str(length_instruction(input.length));
    prompt.push('\n');

    prompt.push_str("\nBrief analysis:\n");
    prompt.push_str(&analysis_json);
    prompt.push('\n');

    if let Some(template) = &input.template {
        push_template_context(&mut prompt, template);
    }

    prompt
}

pub const SCORING_SYSTEM_PROMPT: &str = r#"You are a proposal reviewer grading sales proposals against the client brief they answer.

Score each category 0-100: clarity, persuasiveness, personalization, pricingFit, completeness.

Respond with ONLY a JSON object matching exactly this schema, no prose before or after:
{
  "overallScore": number 0-100,
  "grade": "A|B|C|D|F with optional +/-",
  "winProbability": "low|moderate|high",
  "categories": [{"category": "...", "score": number, "comment": "..."}, ...],
  "strengths": ["...", ...],
  "improvements": [{"priority": 1, "suggestion": "..."}, ...],
  "rewriteSuggestions": [{"section": "sectionName", "suggestion": "..."}] or null
}

Order improvements by priority, most important first."#;

/// Build the user prompt for quality scoring. The proposal content arrives as
/// its stored JSON blob.
pub fn scoring_prompt(brief_text: &str, analysis: &BriefAnalysis, proposal_json: &str) -> String {
    let analysis_json =
        serde_json::to_string_pretty(analysis).unwrap_or_else(|_| "{}".to_string());

    format!(
        "Grade the proposal below against the brief it answers.\n\n\
         Original brief:\n\"\"\"\n{}\n\"\"\"\n\n\
         Brief analysis:\n{}\n\n\
         Proposal (stored form):\n{}\n",
        brief_text, analysis_json, proposal_json
    )
}
