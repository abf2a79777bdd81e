// ABOUTME: HTTP request handlers for proposal operations
// ABOUTME: Generation, scoring, lifecycle transitions, and typed partial updates

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use tracing::info;

use proposalpilot_briefs::BriefStatus;
use proposalpilot_proposals::{
    CreateProposalRecord, DbState, GenerationInput, ProposalError, ProposalGenerator,
    ProposalLength, ProposalStatus, QualityScorer, ScoringInput, UpdateProposalInput,
};

use crate::extract::RequesterId;
use crate::response::{
    bad_request, created, internal_error, not_found, ok, ok_or_internal_error, ok_or_not_found,
};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateProposalRequest {
    pub brief_id: String,
    pub client_id: String,
    pub template_id: Option<String>,
    pub tone: Option<String>,
    #[serde(default)]
    pub length: ProposalLength,
    pub hourly_rate: Option<f64>,
}

/// Generate a proposal from an analyzed brief. The quota middleware wraps
/// this route; by the time the handler runs the request has passed the check.
pub async fn generate_proposal(
    State(db): State<DbState>,
    RequesterId(user_id): RequesterId,
    Json(request): Json<GenerateProposalRequest>,
) -> impl IntoResponse {
    info!(
        "Generating proposal from brief {} for user: {}",
        request.brief_id, user_id
    );

    let user = match db.user_storage.get(&user_id).await {
        Ok(Some(user)) => user,
        Ok(None) => return not_found("User not found"),
        Err(e) => return internal_error(e, "Failed to generate proposal"),
    };

    let brief = match db.brief_storage.get(&user_id, &request.brief_id).await {
        Ok(Some(brief)) => brief,
        Ok(None) => return not_found("Brief not found"),
        Err(e) => return internal_error(e, "Failed to generate proposal"),
    };

    // Precondition: the analysis must exist before any model call happens
    let analysis = match (&brief.status, brief.analysis.clone()) {
        (BriefStatus::Analyzed, Some(analysis)) => analysis,
        _ => {
            return bad_request(
                ProposalError::BriefNotAnalyzed {
                    status: brief.status.to_string(),
                },
                "Brief must be analyzed before generating a proposal",
            )
        }
    };

    let client = match db.client_storage.get(&user_id, &request.client_id).await {
        Ok(Some(client)) => client,
        Ok(None) => return not_found("Client not found"),
        Err(e) => return internal_error(e, "Failed to generate proposal"),
    };

    let template = match &request.template_id {
        Some(template_id) => match db.template_storage.get(&user_id, template_id).await {
            Ok(Some(template)) => Some(template),
            Ok(None) => return not_found("Template not found"),
            Err(e) => return internal_error(e, "Failed to generate proposal"),
        },
        None => None,
    };

    let input = GenerationInput {
        analysis,
        requester_name: user.name,
        requester_company: user.company,
        hourly_rate: request.hourly_rate.or(user.default_hourly_rate),
        client_name: client.name,
        client_industry: client.industry,
        tone: request.tone,
        length: request.length,
        template: template.clone(),
    };

    let generator = ProposalGenerator::new(db.pool.clone(), db.ai.clone());
    let generated = match generator.generate(&user_id, &input).await {
        Ok(generated) => generated,
        Err(e) => return internal_error(e, "Proposal generation failed"),
    };

    let record = CreateProposalRecord {
        brief_id: request.brief_id,
        client_id: request.client_id,
        template_id: request.template_id.clone(),
        generated,
        model: db.ai.model().to_string(),
    };

    let proposal = match db.proposal_storage.create(&user_id, record).await {
        Ok(proposal) => proposal,
        Err(e) => return internal_error(e, "Failed to store generated proposal"),
    };

    if let Some(template) = &template {
        if let Err(e) = db.template_storage.increment_usage(&template.id).await {
            tracing::error!("Failed to increment template usage: {}", e);
        }
    }

    created(proposal)
}

#[derive(Deserialize)]
pub struct ListProposalsQuery {
    pub status: Option<String>,
}

/// List the requester's proposals, optionally filtered by status
pub async fn list_proposals(
    State(db): State<DbState>,
    RequesterId(user_id): RequesterId,
    Query(params): Query<ListProposalsQuery>,
) -> impl IntoResponse {
    info!("Listing proposals for user: {}", user_id);

    let status = match params.status.as_deref() {
        Some(value) => match ProposalStatus::parse(value) {
            Some(status) => Some(status),
            None => {
                return bad_request(
                    format!("Unknown proposal status: {}", value),
                    "Invalid status filter",
                )
            }
        },
        None => None,
    };

    let result = db.proposal_storage.list(&user_id, status).await;
    ok_or_internal_error(result, "Failed to list proposals")
}

/// Get a proposal by id
pub async fn get_proposal(
    State(db): State<DbState>,
    RequesterId(user_id): RequesterId,
    Path(proposal_id): Path<String>,
) -> impl IntoResponse {
    info!("Getting proposal: {}", proposal_id);

    let result = db.proposal_storage.get(&user_id, &proposal_id).await;
    ok_or_not_found(result, "Proposal not found")
}

/// Apply a typed partial update to a proposal
pub async fn update_proposal(
    State(db): State<DbState>,
    RequesterId(user_id): RequesterId,
    Path(proposal_id): Path<String>,
    Json(request): Json<UpdateProposalInput>,
) -> impl IntoResponse {
    info!("Updating proposal: {}", proposal_id);

    match db.proposal_storage.update(&user_id, &proposal_id, request).await {
        Ok(proposal) => ok(proposal),
        Err(ProposalError::NotFound(_)) => not_found("Proposal not found"),
        Err(e) => internal_error(e, "Failed to update proposal"),
    }
}

#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub status: ProposalStatus,
}

/// Move a proposal through its lifecycle
pub async fn update_proposal_status(
    State(db): State<DbState>,
    RequesterId(user_id): RequesterId,
    Path(proposal_id): Path<String>,
    Json(request): Json<UpdateStatusRequest>,
) -> impl IntoResponse {
    info!(
        "Updating proposal {} status to {}",
        proposal_id, request.status
    );

    match db
        .proposal_storage
        .update_status(&user_id, &proposal_id, request.status)
        .await
    {
        Ok(proposal) => ok(proposal),
        Err(ProposalError::NotFound(_)) => not_found("Proposal not found"),
        Err(e @ ProposalError::InvalidTransition { .. }) => {
            bad_request(e, "Invalid status transition")
        }
        Err(e) => internal_error(e, "Failed to update proposal status"),
    }
}

/// Delete a proposal
pub async fn delete_proposal(
    State(db): State<DbState>,
    RequesterId(user_id): RequesterId,
    Path(proposal_id): Path<String>,
) -> impl IntoResponse {
    info!("Deleting proposal: {}", proposal_id);

    match db.proposal_storage.delete(&user_id, &proposal_id).await {
        Ok(true) => ok(()),
        Ok(false) => not_found("Proposal not found"),
        Err(e) => internal_error(e, "Failed to delete proposal"),
    }
}

/// Score a proposal against its source brief. Read-side: the score is
/// returned, not stored.
pub async fn score_proposal(
    State(db): State<DbState>,
    RequesterId(user_id): RequesterId,
    Path(proposal_id): Path<String>,
) -> impl IntoResponse {
    info!("Scoring proposal: {} for user: {}", proposal_id, user_id);

    let proposal = match db.proposal_storage.get(&user_id, &proposal_id).await {
        Ok(Some(proposal)) => proposal,
        Ok(None) => return not_found("Proposal not found"),
        Err(e) => return internal_error(e, "Failed to score proposal"),
    };

    let brief = match db.brief_storage.get(&user_id, &proposal.brief_id).await {
        Ok(Some(brief)) => brief,
        Ok(None) => return not_found("Brief not found"),
        Err(e) => return internal_error(e, "Failed to score proposal"),
    };

    let analysis = match brief.analysis {
        Some(analysis) => analysis,
        None => {
            return bad_request(
                "The source brief has no analysis",
                "Cannot score a proposal whose brief was never analyzed",
            )
        }
    };

    let scorer = QualityScorer::new(db.pool.clone(), db.ai.clone());
    let input = ScoringInput {
        brief_text: brief.raw_text,
        analysis,
        content: proposal.content,
        pricing_tiers: proposal.pricing_tiers,
    };

    match scorer.score(&user_id, &input).await {
        Ok(score) => ok(score),
        Err(e) => internal_error(e, "Proposal scoring failed"),
    }
}
