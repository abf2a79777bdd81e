// ABOUTME: Router-level tests for the API handlers
// ABOUTME: Verifies status mapping, preconditions, and owner scoping

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use proposalpilot_ai::AIService;
use proposalpilot_proposals::DbState;
use proposalpilot_storage::connect_pool;

async fn test_state(mock_uri: &str) -> (DbState, tempfile::TempDir) {
    let tempdir = tempfile::tempdir().unwrap();
    let pool = connect_pool(&tempdir.path().join("test.db")).await.unwrap();

    let ai = Arc::new(AIService::with_api_key_and_base_url(
        "test-key".to_string(),
        mock_uri.to_string(),
    ));
    let db = DbState::init_with_pool(pool, ai).await.unwrap();

    (db, tempdir)
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    user_id: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");

    if let Some(user_id) = user_id {
        builder = builder.header("x-user-id", user_id);
    }

    let body = match body {
        Some(value) => Body::from(value.to_string()),
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let parsed = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

    (status, parsed)
}

async fn create_user(db: &DbState, email: &str) -> String {
    db.user_storage
        .create(proposalpilot_proposals::CreateUserInput {
            email: email.to_string(),
            name: "Dana".to_string(),
            company: None,
            default_hourly_rate: None,
        })
        .await
        .unwrap()
        .id
}

#[tokio::test]
async fn test_briefs_crud_and_owner_scoping() {
    let server = MockServer::start().await;
    let (db, _guard) = test_state(&server.uri()).await;
    let user_id = create_user(&db, "a@example.com").await;
    let other_id = create_user(&db, "b@example.com").await;

    let app = Router::new()
        .nest("/api/briefs", proposalpilot_api::create_briefs_router())
        .with_state(db);

    // Missing identity header
    let (status, _) = send(&app, "GET", "/api/briefs", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Empty title is rejected
    let (status, _) = send(
        &app,
        "POST",
        "/api/briefs",
        Some(&user_id),
        Some(json!({"title": "  ", "rawText": "text"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        "POST",
        "/api/briefs",
        Some(&user_id),
        Some(json!({"title": "Store", "rawText": "We need a store"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let brief_id = body["data"]["id"].as_str().unwrap().to_string();

    // Another user cannot see it
    let (status, _) = send(
        &app,
        "GET",
        &format!("/api/briefs/{}", brief_id),
        Some(&other_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(
        &app,
        "GET",
        &format!("/api/briefs/{}", brief_id),
        Some(&user_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "draft");
}

#[tokio::test]
async fn test_generate_from_unanalyzed_brief_fails_before_model_call() {
    let server = MockServer::start().await;

    // No model call may happen for a failed precondition
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let (db, _guard) = test_state(&server.uri()).await;
    let user_id = create_user(&db, "a@example.com").await;

    let client = db
        .client_storage
        .create(
            &user_id,
            proposalpilot_proposals::CreateClientInput {
                name: "Acme".to_string(),
                company: None,
                industry: None,
                email: None,
                notes: None,
            },
        )
        .await
        .unwrap();

    let brief = db
        .brief_storage
        .create(
            &user_id,
            proposalpilot_briefs::CreateBriefInput {
                client_id: None,
                title: "Store".to_string(),
                raw_text: "We need a store".to_string(),
            },
        )
        .await
        .unwrap();

    let app = Router::new()
        .nest(
            "/api/proposals",
            proposalpilot_api::create_generation_router(),
        )
        .with_state(db);

    let (status, body) = send(
        &app,
        "POST",
        "/api/proposals/generate",
        Some(&user_id),
        Some(json!({"briefId": brief.id, "clientId": client.id})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
}

#[tokio::test]
async fn test_system_template_modification_rejected_via_api() {
    let server = MockServer::start().await;
    let (db, _guard) = test_state(&server.uri()).await;
    let user_id = create_user(&db, "a@example.com").await;

    let app = Router::new()
        .nest("/api/templates", proposalpilot_api::create_templates_router())
        .with_state(db);

    // Seeded system templates are listed
    let (status, body) = send(&app, "GET", "/api/templates", Some(&user_id), None).await;
    assert_eq!(status, StatusCode::OK);
    let templates = body["data"].as_array().unwrap();
    assert!(templates.iter().any(|t| t["isSystem"] == json!(true)));

    let system_id = templates
        .iter()
        .find(|t| t["isSystem"] == json!(true))
        .unwrap()["id"]
        .as_str()
        .unwrap()
        .to_string();

    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/templates/{}", system_id),
        Some(&user_id),
        Some(json!({"name": "hijacked"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/templates/{}", system_id),
        Some(&user_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_proposal_status_endpoint_validates_transitions() {
    let server = MockServer::start().await;
    let (db, _guard) = test_state(&server.uri()).await;
    let user_id = create_user(&db, "a@example.com").await;

    let client = db
        .client_storage
        .create(
            &user_id,
            proposalpilot_proposals::CreateClientInput {
                name: "Acme".to_string(),
                company: None,
                industry: None,
                email: None,
                notes: None,
            },
        )
        .await
        .unwrap();

    let brief = db
        .brief_storage
        .create(
            &user_id,
            proposalpilot_briefs::CreateBriefInput {
                client_id: None,
                title: "Store".to_string(),
                raw_text: "We need a store".to_string(),
            },
        )
        .await
        .unwrap();

    // Stored proposal in draft
    let proposal = db
        .proposal_storage
        .create(
            &user_id,
            proposalpilot_proposals::CreateProposalRecord {
                brief_id: brief.id,
                client_id: client.id,
                template_id: None,
                generated: sample_generated(),
                model: "claude-sonnet-4-20250514".to_string(),
            },
        )
        .await
        .unwrap();

    let app = Router::new()
        .nest("/api/proposals", proposalpilot_api::create_proposals_router())
        .with_state(db);

    // draft -> viewed skips sent
    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/proposals/{}/status", proposal.id),
        Some(&user_id),
        Some(json!({"status": "viewed"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/proposals/{}/status", proposal.id),
        Some(&user_id),
        Some(json!({"status": "sent"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "sent");
    assert!(body["data"]["sentAt"].is_string());
}

fn sample_generated() -> proposalpilot_proposals::GeneratedProposal {
    let content = proposalpilot_proposals::ProposalContent {
        opening_hook: "Hello.".to_string(),
        problem_statement: "Problem.".to_string(),
        proposed_solution: "Solution.".to_string(),
        methodology: "Method.".to_string(),
        timeline: "Timeline.".to_string(),
        why_us: "Us.".to_string(),
        next_steps: "Steps.".to_string(),
    };
    let word_count = content.word_count();

    proposalpilot_proposals::GeneratedProposal {
        title: "Test".to_string(),
        content,
        pricing_tiers: vec![],
        tone: "professional".to_string(),
        word_count,
    }
}
