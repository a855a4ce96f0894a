//! Prompt assembly for the coaching model
//!
//! System prompts live in `prompts/*.txt`; the user message carries the
//! computed context as pretty JSON so the model reads numbers, not prose.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::memory::Note;
use crate::models::{PlanWeek, RunnerHistory, TrainingSummary};

pub const PLAN_SYSTEM_PROMPT: &str = include_str!("prompts/plan_system.txt");
pub const COACH_SYSTEM_PROMPT: &str = include_str!("prompts/coach_system.txt");

/// Notes included in chat context
pub const CHAT_NOTES_LIMIT: usize = 10;

/// ---------------------------------------------------------------------------
/// Seven-Day Plan
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
struct PlanRequest<'a> {
  runner_profile: Value,
  training_summary: &'a TrainingSummary,
}

/// User message asking for a new seven-day plan
///
/// Notes are folded into the profile so the model sees injuries and schedule
/// constraints next to availability.
pub fn build_plan_message(
  profile: &Map<String, Value>,
  notes: &[Note],
  summary: &TrainingSummary,
) -> Result<String, serde_json::Error> {
  let mut runner_profile = profile.clone();
  runner_profile.insert("notes".to_string(), serde_json::to_value(notes)?);

  let request = PlanRequest {
    runner_profile: Value::Object(runner_profile),
    training_summary: summary,
  };

  Ok(format!(
    r#"Create a training plan for the next 7 days.

CONTEXT:
{}

Return JSON only."#,
    to_pretty_json(&request)?
  ))
}

/// ---------------------------------------------------------------------------
/// Coach Chat
/// ---------------------------------------------------------------------------

/// Everything the coach sees when answering a question
#[derive(Debug, Clone, Serialize)]
pub struct ChatContext<'a> {
  pub runner_profile: &'a Map<String, Value>,
  pub training_summary: &'a TrainingSummary,
  pub notes: &'a [Note],
  pub current_week: Option<&'a PlanWeek>,
  pub next_week: Option<&'a PlanWeek>,
  pub runner_history: Option<&'a RunnerHistory>,
}

impl<'a> ChatContext<'a> {
  /// Keep only the most recent notes
  pub fn with_recent_notes(mut self) -> Self {
    self.notes = &self.notes[self.notes.len().saturating_sub(CHAT_NOTES_LIMIT)..];
    self
  }
}

pub fn build_chat_message(question: &str, context: &ChatContext<'_>) -> Result<String, serde_json::Error> {
  Ok(format!(
    r#"CONTEXT (JSON):
{}

QUESTION:
{}"#,
    to_pretty_json(context)?,
    question.trim()
  ))
}

fn to_pretty_json<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
  serde_json::to_string_pretty(value)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::test_utils::*;

  fn profile() -> Map<String, Value> {
    let mut profile = Map::new();
    profile.insert("goal".to_string(), Value::from("Marathon"));
    profile.insert("long_run_day".to_string(), Value::from("Saturday"));
    profile
  }

  #[test]
  fn test_plan_message_includes_summary_and_notes() {
    let notes = vec![Note {
      time: datetime("2024-01-02"),
      text: "sore hamstring".to_string(),
    }];
    let summary = TrainingSummary {
      last_week_miles: 21.5,
      ..TrainingSummary::empty(56)
    };

    let message = build_plan_message(&profile(), &notes, &summary).unwrap();

    assert!(message.contains("\"last_week_miles\": 21.5"));
    assert!(message.contains("sore hamstring"));
    assert!(message.contains("\"long_run_day\": \"Saturday\""));
    assert!(message.ends_with("Return JSON only."));
  }

  #[test]
  fn test_chat_message_keeps_last_ten_notes() {
    let notes: Vec<Note> = (0..15)
      .map(|i| Note {
        time: datetime("2024-01-02"),
        text: format!("note-{:02}", i),
      })
      .collect();
    let summary = TrainingSummary::empty(56);
    let plan = mock_plan();
    let profile = profile();

    let context = ChatContext {
      runner_profile: &profile,
      training_summary: &summary,
      notes: &notes,
      current_week: plan.weeks.first(),
      next_week: None,
      runner_history: None,
    }
    .with_recent_notes();
    let message = build_chat_message("  Can I swap Saturday and Sunday? ", &context).unwrap();

    assert_eq!(context.notes.len(), 10);
    assert!(!message.contains("note-04"));
    assert!(message.contains("note-05"));
    assert!(message.contains("\"week_label\": \"Week 1\""));
    assert!(message.contains("\"next_week\": null"));
    assert!(message.ends_with("Can I swap Saturday and Sunday?"));
  }

  #[test]
  fn test_unserializable_context_is_an_error() {
    let mut by_pair = std::collections::HashMap::new();
    by_pair.insert((1u8, 2u8), "tuple keys are not JSON object keys");

    assert!(to_pretty_json(&by_pair).is_err());
  }

  #[test]
  fn test_system_prompts_loaded() {
    assert!(PLAN_SYSTEM_PROMPT.contains("Monday, Tuesday, Wednesday"));
    assert!(COACH_SYSTEM_PROMPT.contains("running coach"));
  }
}
