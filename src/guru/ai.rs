use anyhow::Context;
use axum::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::AiConfig;
use crate::error::ApiError;

const HTTP_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);
const MAX_COMPLETION_TOKENS: u32 = 512;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".into(),
            content: content.into(),
        }
    }
}

#[async_trait]
pub trait AiClient: Send + Sync {
    /// Run a chat completion and return the raw assistant message content.
    async fn complete(&self, messages: &[ChatMessage]) -> anyhow::Result<String>;
}

/// Client for an OpenAI-compatible chat-completions API.
pub struct OpenAiClient {
    http: reqwest::Client,
    api_key: String,
    api_base: String,
    model: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    max_tokens: u32,
    response_format: ResponseFormat,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: String,
}

impl OpenAiClient {
    pub fn new(cfg: &AiConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .context("failed building AI HTTP client")?;
        Ok(Self {
            http,
            api_key: cfg.api_key.clone(),
            api_base: cfg.api_base.trim_end_matches('/').to_string(),
            model: cfg.model.clone(),
        })
    }
}

#[async_trait]
impl AiClient for OpenAiClient {
    async fn complete(&self, messages: &[ChatMessage]) -> anyhow::Result<String> {
        let body = ChatRequest {
            model: &self.model,
            messages,
            max_tokens: MAX_COMPLETION_TOKENS,
            response_format: ResponseFormat {
                kind: "json_object",
            },
        };

        let resp = self
            .http
            .post(format!("{}/chat/completions", self.api_base))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .context("chat completion request failed")?;

        if !resp.status().is_success() {
            anyhow::bail!("chat completion returned {}", resp.status());
        }

        let parsed: ChatResponse = resp.json().await.context("chat completion body")?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .context("chat completion had no choices")?;
        Ok(content)
    }
}

/// The plan the model is asked to emit.
#[derive(Debug, Clone, Deserialize)]
pub struct GoalPlan {
    pub name: String,
    pub steps: Vec<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Parse the model's output into a plan. Nothing is persisted until this
/// succeeds, so a malformed response rejects the whole request.
pub fn parse_plan(raw: &str) -> Result<GoalPlan, ApiError> {
    let cleaned = strip_code_fences(raw);
    let plan: GoalPlan = serde_json::from_str(cleaned)
        .map_err(|e| ApiError::MalformedAiResponse(e.to_string()))?;
    if plan.name.trim().is_empty() {
        return Err(ApiError::MalformedAiResponse("empty goal name".into()));
    }
    Ok(plan)
}

/// Models occasionally wrap JSON in a markdown fence despite instructions.
fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_well_formed_plan() {
        let plan = parse_plan(
            r#"{"name":"Learn Spanish","steps":["Finish lesson 1","Practice daily"]}"#,
        )
        .expect("plan should parse");
        assert_eq!(plan.name, "Learn Spanish");
        assert_eq!(plan.steps.len(), 2);
        assert!(plan.message.is_none());
    }

    #[test]
    fn parses_an_optional_message() {
        let plan = parse_plan(
            r#"{"name":"Run a 10k","steps":["Run 3k"],"message":"Good luck!"}"#,
        )
        .expect("plan should parse");
        assert_eq!(plan.message.as_deref(), Some("Good luck!"));
    }

    #[test]
    fn tolerates_markdown_fences() {
        let raw = "```json\n{\"name\":\"Read more\",\"steps\":[\"Pick a book\"]}\n```";
        let plan = parse_plan(raw).expect("fenced plan should parse");
        assert_eq!(plan.name, "Read more");
    }

    #[test]
    fn rejects_non_json_output() {
        let err = parse_plan("Sure! Here are some steps: 1. ...").unwrap_err();
        assert!(matches!(err, ApiError::MalformedAiResponse(_)));
    }

    #[test]
    fn rejects_a_plan_without_a_name() {
        let err = parse_plan(r#"{"steps":["a"]}"#).unwrap_err();
        assert!(matches!(err, ApiError::MalformedAiResponse(_)));

        let err = parse_plan(r#"{"name":"  ","steps":["a"]}"#).unwrap_err();
        assert!(matches!(err, ApiError::MalformedAiResponse(_)));
    }
}
