use chrono::NaiveDateTime;
use serde_json::{Map, Value};

use crate::analysis::summarize_runs;
use crate::history::load_history;
use crate::llm::{ClaudeClient, LlmError};
use crate::memory::{LastPlan, Note};
use crate::plan::{find_next_week, find_week_containing};
use crate::prompts::{build_chat_message, build_plan_message, ChatContext};
use crate::state::AppState;

/// ---------------------------------------------------------------------------
/// Memory Commands
/// ---------------------------------------------------------------------------

pub fn add_note(state: &AppState, text: &str, now: NaiveDateTime) -> Result<Note, String> {
  state
    .memory
    .add_note(text, now)
    .map_err(|e| format!("Failed to save note: {}", e))
}

/// The most recent `count` notes, oldest first
pub fn get_notes(state: &AppState, count: usize) -> Result<Vec<Note>, String> {
  let memory = state
    .memory
    .load()
    .map_err(|e| format!("Failed to load memory: {}", e))?;
  Ok(memory.recent_notes(count).to_vec())
}

pub fn get_profile(state: &AppState) -> Result<Map<String, Value>, String> {
  let memory = state
    .memory
    .load()
    .map_err(|e| format!("Failed to load memory: {}", e))?;
  Ok(memory.runner_profile)
}

pub fn get_last_plan(state: &AppState) -> Result<Option<LastPlan>, String> {
  let memory = state
    .memory
    .load()
    .map_err(|e| format!("Failed to load memory: {}", e))?;
  Ok(memory.last_plan)
}

/// ---------------------------------------------------------------------------
/// Coaching Commands
/// ---------------------------------------------------------------------------

fn llm_error(e: LlmError) -> String {
  format!("Coach unavailable: {}", e)
}

/// Ask the model for a fresh seven-day plan and remember it
pub async fn generate_plan(state: &AppState, now: NaiveDateTime) -> Result<LastPlan, String> {
  let client = ClaudeClient::from_config(&state.config.llm).map_err(llm_error)?;

  let table = state
    .activities()
    .map_err(|e| format!("Failed to load activities: {}", e))?;
  let summary =
    summarize_runs(&table, state.config.lookback_days).map_err(|e| format!("Failed to summarize runs: {}", e))?;

  let mut memory = state
    .memory
    .load()
    .map_err(|e| format!("Failed to load memory: {}", e))?;

  let message = build_plan_message(&memory.runner_profile, &memory.notes, &summary)
    .map_err(|e| format!("Failed to build plan prompt: {}", e))?;
  let (plan, _usage) = client.generate_week_plan(&message).await.map_err(llm_error)?;

  let last_plan = LastPlan {
    generated_at: now,
    summary,
    plan,
  };
  memory.last_plan = Some(last_plan.clone());
  state
    .memory
    .save(&memory)
    .map_err(|e| format!("Failed to save plan: {}", e))?;

  tracing::info!("Saved generated plan");
  Ok(last_plan)
}

/// Answer a free-form question with the full training context
///
/// The reference plan and runner history are optional context: a missing
/// plan or history is logged and left out.
pub async fn coach_chat(state: &AppState, question: &str, now: NaiveDateTime) -> Result<String, String> {
  if question.trim().is_empty() {
    return Err("Question is empty".to_string());
  }

  let client = ClaudeClient::from_config(&state.config.llm).map_err(llm_error)?;

  let table = state
    .activities()
    .map_err(|e| format!("Failed to load activities: {}", e))?;
  let summary =
    summarize_runs(&table, state.config.lookback_days).map_err(|e| format!("Failed to summarize runs: {}", e))?;

  let memory = state
    .memory
    .load()
    .map_err(|e| format!("Failed to load memory: {}", e))?;

  let plan = state
    .plan()
    .inspect_err(|e| tracing::warn!(error = %e, "Reference plan unavailable for chat"))
    .ok();
  let today = now.date();
  let current_week = plan
    .as_ref()
    .and_then(|p| find_week_containing(p, today).ok().flatten());
  let next_week = plan.as_ref().and_then(|p| find_next_week(p, today).ok().flatten());

  let history = load_history(&state.config.history_path)
    .inspect_err(|e| tracing::warn!(error = %e, "Runner history unavailable for chat"))
    .ok()
    .flatten();

  let context = ChatContext {
    runner_profile: &memory.runner_profile,
    training_summary: &summary,
    notes: &memory.notes,
    current_week,
    next_week,
    runner_history: history.as_ref(),
  }
  .with_recent_notes();

  let message =
    build_chat_message(question, &context).map_err(|e| format!("Failed to build chat prompt: {}", e))?;
  let (answer, _usage) = client.coach_chat(&message).await.map_err(llm_error)?;
  Ok(answer)
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
