use serde::Serialize;

use crate::analysis::summarize_runs;
use crate::history::load_history;
use crate::memory::Note;
use crate::models::{RunnerHistory, TrainingSummary};
use crate::state::AppState;

/// Notes shown by `status`
pub const STATUS_NOTES: usize = 5;

/// ---------------------------------------------------------------------------
/// Training Summary Commands
/// ---------------------------------------------------------------------------

/// Summarize recent running; `days` defaults to the configured lookback
pub fn get_training_summary(state: &AppState, days: Option<i64>) -> Result<TrainingSummary, String> {
  let days_back = days.unwrap_or(state.config.lookback_days);
  if days_back < 0 {
    return Err(format!("Lookback must not be negative (got {})", days_back));
  }

  let table = state
    .activities()
    .map_err(|e| format!("Failed to load activities: {}", e))?;

  summarize_runs(&table, days_back).map_err(|e| format!("Failed to summarize runs: {}", e))
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
  pub training_summary: TrainingSummary,
  pub notes: Vec<Note>,
  pub runner_history: Option<RunnerHistory>,
}

/// Training summary, recent notes, and the stored history if one was built
pub fn get_status(state: &AppState) -> Result<StatusReport, String> {
  let training_summary = get_training_summary(state, None)?;

  let memory = state
    .memory
    .load()
    .map_err(|e| format!("Failed to load memory: {}", e))?;

  let runner_history = load_history(&state.config.history_path)
    .map_err(|e| format!("Failed to load runner history: {}", e))?;

  Ok(StatusReport {
    training_summary,
    notes: memory.recent_notes(STATUS_NOTES).to_vec(),
    runner_history,
  })
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
