//! LLM integration for coaching
//!
//! Handles communication with the Claude Messages API: free-form coach
//! answers and structured seven-day plans.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::LlmConfig;
use crate::models::WeekSessions;
use crate::prompts::{COACH_SYSTEM_PROMPT, PLAN_SYSTEM_PROMPT};

/// ---------------------------------------------------------------------------
/// Configuration
/// ---------------------------------------------------------------------------

const API_VERSION: &str = "2023-06-01";
const PLAN_MAX_TOKENS: u32 = 1024;
const CHAT_MAX_TOKENS: u32 = 1500;

/// ---------------------------------------------------------------------------
/// Error Types
/// ---------------------------------------------------------------------------

#[derive(Error, Debug)]
pub enum LlmError {
  #[error("API key not configured (set ANTHROPIC_API_KEY)")]
  MissingApiKey,

  #[error("Request failed: {0}")]
  Request(String),

  #[error("API error: {0}")]
  Api(String),

  #[error("Parse error: {0}")]
  Parse(String),
}

/// ---------------------------------------------------------------------------
/// Claude API Types
/// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct ClaudeRequest<'a> {
  model: &'a str,
  max_tokens: u32,
  system: &'a str,
  messages: Vec<ClaudeMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ClaudeMessage<'a> {
  role: &'a str,
  content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ClaudeResponse {
  content: Vec<ContentBlock>,
  usage: Usage,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
  #[serde(rename = "type")]
  content_type: String,
  text: Option<String>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Usage {
  pub input_tokens: u32,
  pub output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ClaudeErrorResponse {
  error: ClaudeErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ClaudeErrorDetail {
  message: String,
}

/// ---------------------------------------------------------------------------
/// Claude Client
/// ---------------------------------------------------------------------------

pub struct ClaudeClient {
  client: Client,
  api_key: String,
  api_url: String,
  model: String,
}

impl ClaudeClient {
  pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
    let api_key = config.api_key.clone().ok_or(LlmError::MissingApiKey)?;

    Ok(Self {
      client: Client::new(),
      api_key,
      api_url: config.api_url.clone(),
      model: config.model.clone(),
    })
  }

  /// Call Claude with a system prompt and user message
  pub async fn complete(
    &self,
    system_prompt: &str,
    user_message: &str,
    max_tokens: u32,
  ) -> Result<(String, Usage), LlmError> {
    let request = ClaudeRequest {
      model: &self.model,
      max_tokens,
      system: system_prompt,
      messages: vec![ClaudeMessage {
        role: "user",
        content: user_message,
      }],
    };

    tracing::debug!(model = %self.model, max_tokens, "Calling Claude");

    let response = self
      .client
      .post(&self.api_url)
      .header("x-api-key", &self.api_key)
      .header("anthropic-version", API_VERSION)
      .header("content-type", "application/json")
      .json(&request)
      .send()
      .await
      .map_err(|e| LlmError::Request(e.to_string()))?;

    let status = response.status();
    let body = response
      .text()
      .await
      .map_err(|e| LlmError::Request(e.to_string()))?;

    if !status.is_success() {
      if let Ok(error_resp) = serde_json::from_str::<ClaudeErrorResponse>(&body) {
        return Err(LlmError::Api(error_resp.error.message));
      }
      return Err(LlmError::Api(format!("HTTP {}: {}", status, body)));
    }

    let claude_response: ClaudeResponse =
      serde_json::from_str(&body).map_err(|e| LlmError::Parse(e.to_string()))?;

    let text = claude_response
      .content
      .iter()
      .find(|c| c.content_type == "text")
      .and_then(|c| c.text.clone())
      .ok_or_else(|| LlmError::Parse("No text content in response".to_string()))?;

    tracing::info!(
      input_tokens = claude_response.usage.input_tokens,
      output_tokens = claude_response.usage.output_tokens,
      "Claude call complete"
    );

    Ok((text, claude_response.usage))
  }

  /// Ask for a seven-day plan; every weekday must be filled in
  pub async fn generate_week_plan(&self, user_message: &str) -> Result<(WeekSessions, Usage), LlmError> {
    let (response_text, usage) = self
      .complete(PLAN_SYSTEM_PROMPT, user_message, PLAN_MAX_TOKENS)
      .await?;

    let plan = parse_week_sessions(&response_text)?;
    if !plan.is_complete() {
      return Err(LlmError::Parse(format!(
        "Plan is missing weekdays: {}",
        response_text.trim()
      )));
    }

    Ok((plan, usage))
  }

  /// Free-form coach answer
  pub async fn coach_chat(&self, user_message: &str) -> Result<(String, Usage), LlmError> {
    let (text, usage) = self
      .complete(COACH_SYSTEM_PROMPT, user_message, CHAT_MAX_TOKENS)
      .await?;
    Ok((text.trim().to_string(), usage))
  }
}

/// Pull the weekday object out of a plan response
///
/// The model sometimes wraps the object in a code fence or a sentence. Each
/// top-level `{...}` span is tried in order and the first one that reads as
/// weekday sessions wins.
fn parse_week_sessions(text: &str) -> Result<WeekSessions, LlmError> {
  let mut last_error = None;

  for candidate in object_spans(text) {
    match serde_json::from_str::<WeekSessions>(candidate) {
      Ok(plan) => return Ok(plan),
      Err(e) => last_error = Some(e.to_string()),
    }
  }

  Err(LlmError::Parse(match last_error {
    Some(e) => format!("No weekday plan in response ({})", e),
    None => "No JSON object in response".to_string(),
  }))
}

/// Balanced top-level `{...}` spans, skipping braces inside JSON strings
fn object_spans(text: &str) -> Vec<&str> {
  let mut spans = Vec::new();
  let mut depth = 0usize;
  let mut start = 0;
  let mut in_string = false;
  let mut escaped = false;

  for (i, c) in text.char_indices() {
    if in_string {
      match c {
        _ if escaped => escaped = false,
        '\\' => escaped = true,
        '"' => in_string = false,
        _ => {}
      }
      continue;
    }

    match c {
      '"' if depth > 0 => in_string = true,
      '{' => {
        if depth == 0 {
          start = i;
        }
        depth += 1;
      }
      '}' if depth > 0 => {
        depth -= 1;
        if depth == 0 {
          spans.push(&text[start..=i]);
        }
      }
      _ => {}
    }
  }

  spans
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
