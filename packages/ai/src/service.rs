// ABOUTME: AI service for making structured generation calls to Anthropic Claude
// ABOUTME: Handles API requests, JSON response parsing, and token/cost estimation

use std::env;
use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info};

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com";
const MESSAGES_PATH: &str = "/v1/messages";
const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";
const DEFAULT_MAX_TOKENS: u32 = 4096;
const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Rough token estimate from raw text length. Used for reporting on stored
/// briefs, not for billing.
pub fn estimate_tokens(text: &str) -> i64 {
    ((text.chars().count() / 4).max(1)) as i64
}

/// Estimated USD cost for a call, from published per-million-token rates
pub fn estimated_cost(model: &str, input_tokens: i64, output_tokens: i64) -> f64 {
    let (input_rate, output_rate) = if model.contains("haiku") {
        (0.80, 4.00)
    } else if model.contains("opus") {
        (15.00, 75.00)
    } else {
        // Sonnet family and unknown models
        (3.00, 15.00)
    };

    (input_tokens as f64 * input_rate + output_tokens as f64 * output_rate) / 1_000_000.0
}

#[derive(Debug, Error)]
pub enum AIServiceError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("No API key configured")]
    NoApiKey,

    #[error("Invalid response format")]
    InvalidResponse,
}

pub type AIServiceResult<T> = Result<T, AIServiceError>;

#[derive(Debug, Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    #[allow(dead_code)]
    id: String,
    content: Vec<ContentBlock>,
    usage: Usage,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    #[allow(dead_code)]
    content_type: String,
    text: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl Usage {
    pub fn total_tokens(&self) -> u32 {
        self.input_tokens + self.output_tokens
    }
}

#[derive(Debug)]
pub struct AIResponse<T> {
    pub data: T,
    pub usage: Usage,
}

/// AI service for making structured generation calls
pub struct AIService {
    client: Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
}

impl AIService {
    /// Create HTTP client with timeout configuration
    fn create_client() -> Client {
        Client::builder()
            .timeout(Duration::from_secs(300))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to build HTTP client")
    }

    /// Creates a new AI service instance.
    /// API key comes from ANTHROPIC_API_KEY; model can be overridden with
    /// ANTHROPIC_MODEL.
    pub fn new() -> Self {
        let api_key = env::var("ANTHROPIC_API_KEY").ok();
        if api_key.is_none() {
            info!("ANTHROPIC_API_KEY not set - AI calls will be rejected");
        }

        let model = env::var("ANTHROPIC_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        if model != DEFAULT_MODEL {
            info!("Using custom Anthropic model: {}", model);
        }

        Self {
            client: Self::create_client(),
            api_key,
            model,
            base_url: ANTHROPIC_API_URL.to_string(),
        }
    }

    /// Creates a new AI service instance with a specific API key
    pub fn with_api_key(api_key: String) -> Self {
        let model = env::var("ANTHROPIC_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        Self {
            client: Self::create_client(),
            api_key: Some(api_key),
            model,
            base_url: ANTHROPIC_API_URL.to_string(),
        }
    }

    /// Creates an AI service pointed at a custom endpoint. Used by tests to
    /// target a mock server.
    pub fn with_api_key_and_base_url(api_key: String, base_url: String) -> Self {
        Self {
            client: Self::create_client(),
            api_key: Some(api_key),
            model: DEFAULT_MODEL.to_string(),
            base_url,
        }
    }

    /// Get the model being used by this service
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Makes a generation call to Claude and returns the raw text of the
    /// first content block, with markdown code fences stripped.
    /// The prompt should request JSON output.
    pub async fn generate_json(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
    ) -> AIServiceResult<AIResponse<String>> {
        let api_key = self.api_key.as_ref().ok_or(AIServiceError::NoApiKey)?;

        let request = AnthropicRequest {
            model: self.model.clone(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            messages: vec![Message {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            system: system_prompt.map(|s| s.to_string()),
        };

        info!(
            "Making Anthropic API request: model={}, max_tokens={}",
            request.model, request.max_tokens
        );

        let url = format!("{}{}", self.base_url, MESSAGES_PATH);
        let response = self
            .client
            .post(&url)
            .header("x-api-key", api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    error!("Anthropic API request timed out");
                    AIServiceError::ApiError("Request timed out. The AI service may be overloaded or unavailable.".to_string())
                } else if e.is_connect() {
                    error!("Failed to connect to Anthropic API: {}", e);
                    AIServiceError::ApiError(format!("Connection failed: {}", e))
                } else {
                    error!("Anthropic API request failed: {}", e);
                    AIServiceError::RequestFailed(e)
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            error!("Anthropic API error: {} - {}", status, error_text);
            return Err(AIServiceError::ApiError(format!(
                "API returned {}: {}",
                status, error_text
            )));
        }

        let anthropic_response: AnthropicResponse = response
            .json()
            .await
            .map_err(|e| AIServiceError::ParseError(e.to_string()))?;

        let text = anthropic_response
            .content
            .first()
            .ok_or(AIServiceError::InvalidResponse)?
            .text
            .clone();

        Ok(AIResponse {
            data: strip_code_fences(&text).to_string(),
            usage: anthropic_response.usage,
        })
    }

    /// Makes a structured generation call to Claude.
    /// The prompt should request JSON output and the response is parsed into `T`.
    pub async fn generate_structured<T: for<'de> Deserialize<'de>>(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
    ) -> AIServiceResult<AIResponse<T>> {
        let response = self.generate_json(prompt, system_prompt).await?;

        let data: T = serde_json::from_str(&response.data).map_err(|e| {
            error!(
                "JSON parsing failed: {}. JSON snippet: {}",
                e,
                &response.data[..response.data.len().min(500)]
            );
            AIServiceError::ParseError(format!("Failed to parse JSON: {}", e))
        })?;

        Ok(AIResponse {
            data,
            usage: response.usage,
        })
    }
}

/// Strip markdown code fences if present (```json ... ```)
fn strip_code_fences(text: &str) -> &str {
    let cleaned = text.trim();
    if cleaned.starts_with("```") {
        let start = cleaned.find('\n').map(|i| i + 1).unwrap_or(0);
        let end = cleaned[start..]
            .rfind("```")
            .map(|i| i + start)
            .unwrap_or(cleaned.len());
        cleaned[start..end].trim()
    } else {
        cleaned
    }
}

impl Default for AIService {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn messages_body(text: &str) -> serde_json::Value {
        json!({
            "id": "msg_test",
            "content": [{"type": "text", "text": text}],
            "usage": {"input_tokens": 120, "output_tokens": 48}
        })
    }

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(strip_code_fences("{\"a\": 1}"), "{\"a\": 1}");
        assert_eq!(strip_code_fences("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
        assert_eq!(strip_code_fences("```\n{\"a\": 1}\n```"), "{\"a\": 1}");
    }

    #[test]
    fn test_estimate_tokens() {
        assert_eq!(estimate_tokens(""), 1);
        assert_eq!(estimate_tokens("abcdefgh"), 2);
    }

    #[test]
    fn test_estimated_cost_by_model_family() {
        let sonnet = estimated_cost("claude-sonnet-4-20250514", 1_000_000, 0);
        assert!((sonnet - 3.0).abs() < f64::EPSILON);

        let haiku = estimated_cost("claude-haiku-4", 0, 1_000_000);
        assert!((haiku - 4.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_generate_structured_parses_json() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .and(header("x-api-key", "test-key"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(messages_body("{\"answer\": 42}")),
            )
            .mount(&server)
            .await;

        let service = AIService::with_api_key_and_base_url("test-key".to_string(), server.uri());

        #[derive(Deserialize)]
        struct Out {
            answer: i32,
        }

        let response: AIResponse<Out> = service
            .generate_structured("return json", Some("system"))
            .await
            .unwrap();

        assert_eq!(response.data.answer, 42);
        assert_eq!(response.usage.total_tokens(), 168);
    }

    #[tokio::test]
    async fn test_generate_structured_strips_fences() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(messages_body(
                "```json\n{\"answer\": 7}\n```",
            )))
            .mount(&server)
            .await;

        let service = AIService::with_api_key_and_base_url("test-key".to_string(), server.uri());

        #[derive(Deserialize)]
        struct Out {
            answer: i32,
        }

        let response: AIResponse<Out> =
            service.generate_structured("return json", None).await.unwrap();
        assert_eq!(response.data.answer, 7);
    }

    #[tokio::test]
    async fn test_api_error_surfaces() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .respond_with(ResponseTemplate::new(529).set_body_string("overloaded"))
            .mount(&server)
            .await;

        let service = AIService::with_api_key_and_base_url("test-key".to_string(), server.uri());

        let result: AIServiceResult<AIResponse<serde_json::Value>> =
            service.generate_structured("return json", None).await;

        assert!(matches!(result, Err(AIServiceError::ApiError(_))));
    }

    #[tokio::test]
    async fn test_unparseable_body_is_parse_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(messages_body("this is not json")),
            )
            .mount(&server)
            .await;

        let service = AIService::with_api_key_and_base_url("test-key".to_string(), server.uri());

        #[derive(Deserialize)]
        struct Out {
            #[allow(dead_code)]
            answer: i32,
        }

        let result: AIServiceResult<AIResponse<Out>> =
            service.generate_structured("return json", None).await;

        assert!(matches!(result, Err(AIServiceError::ParseError(_))));
    }

    #[tokio::test]
    async fn test_no_api_key() {
        let service = AIService {
            client: AIService::create_client(),
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: ANTHROPIC_API_URL.to_string(),
        };

        let result = service.generate_json("prompt", None).await;
        assert!(matches!(result, Err(AIServiceError::NoApiKey)));
    }
}
