//! Runtime configuration loaded from the environment (and `.env`)

use std::env;
use std::path::PathBuf;

use thiserror::Error;
use url::Url;

use crate::analysis::DEFAULT_LOOKBACK_DAYS;

/// ---------------------------------------------------------------------------
/// Defaults
/// ---------------------------------------------------------------------------

pub const DEFAULT_ACTIVITIES_PATH: &str = "data/activities.csv";
pub const DEFAULT_PLAN_PATH: &str = "plan_reference.json";
pub const DEFAULT_MEMORY_PATH: &str = "memory.json";
pub const DEFAULT_HISTORY_PATH: &str = "runner_history.json";

pub const DEFAULT_LLM_API_URL: &str = "https://api.anthropic.com/v1/messages";
pub const DEFAULT_LLM_MODEL: &str = "claude-sonnet-4-20250514";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
  #[error("Invalid value for {0}: {1}")]
  Invalid(&'static str, String),
}

/// ---------------------------------------------------------------------------
/// Configuration
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
  pub activities_path: PathBuf,
  pub plan_path: PathBuf,
  pub memory_path: PathBuf,
  pub history_path: PathBuf,
  /// Lookback window for the training summary, in days
  pub lookback_days: i64,
  pub llm: LlmConfig,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LlmConfig {
  pub api_key: Option<String>,
  pub api_url: String,
  pub model: String,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      activities_path: PathBuf::from(DEFAULT_ACTIVITIES_PATH),
      plan_path: PathBuf::from(DEFAULT_PLAN_PATH),
      memory_path: PathBuf::from(DEFAULT_MEMORY_PATH),
      history_path: PathBuf::from(DEFAULT_HISTORY_PATH),
      lookback_days: DEFAULT_LOOKBACK_DAYS,
      llm: LlmConfig::default(),
    }
  }
}

impl Default for LlmConfig {
  fn default() -> Self {
    Self {
      api_key: None,
      api_url: DEFAULT_LLM_API_URL.to_string(),
      model: DEFAULT_LLM_MODEL.to_string(),
    }
  }
}

impl Config {
  /// Load configuration from environment variables, reading `.env` first if present
  pub fn from_env() -> Result<Self, ConfigError> {
    dotenvy::dotenv().ok();
    Self::from_vars()
  }

  /// Build configuration from the current process environment only
  pub fn from_vars() -> Result<Self, ConfigError> {
    let path = |key: &str, default: &str| PathBuf::from(env::var(key).unwrap_or_else(|_| default.to_string()));

    let lookback_days = match env::var("COACH_LOOKBACK_DAYS") {
      Ok(raw) => raw
        .trim()
        .parse::<i64>()
        .ok()
        .filter(|days| *days > 0)
        .ok_or_else(|| ConfigError::Invalid("COACH_LOOKBACK_DAYS", raw.clone()))?,
      Err(_) => DEFAULT_LOOKBACK_DAYS,
    };

    let api_url = match env::var("COACH_LLM_API_URL") {
      Ok(raw) => Url::parse(raw.trim())
        .map_err(|e| ConfigError::Invalid("COACH_LLM_API_URL", e.to_string()))?
        .to_string(),
      Err(_) => DEFAULT_LLM_API_URL.to_string(),
    };

    Ok(Self {
      activities_path: path("COACH_ACTIVITIES_PATH", DEFAULT_ACTIVITIES_PATH),
      plan_path: path("COACH_PLAN_PATH", DEFAULT_PLAN_PATH),
      memory_path: path("COACH_MEMORY_PATH", DEFAULT_MEMORY_PATH),
      history_path: path("COACH_HISTORY_PATH", DEFAULT_HISTORY_PATH),
      lookback_days,
      llm: LlmConfig {
        api_key: env::var("ANTHROPIC_API_KEY")
          .ok()
          .map(|k| k.trim().to_string())
          .filter(|k| !k.is_empty()),
        api_url,
        model: env::var("COACH_LLM_MODEL").unwrap_or_else(|_| DEFAULT_LLM_MODEL.to_string()),
      },
    })
  }
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
