use chrono::NaiveDateTime;

use crate::history::{build_history, load_history, save_history};
use crate::models::RunnerHistory;
use crate::state::AppState;

/// ---------------------------------------------------------------------------
/// Runner History Commands
/// ---------------------------------------------------------------------------

/// Rebuild the runner history from the full export and write it to disk
pub fn build_runner_history(state: &AppState, now: NaiveDateTime) -> Result<RunnerHistory, String> {
  let table = state
    .activities()
    .map_err(|e| format!("Failed to load activities: {}", e))?;

  let history = build_history(&table, now).map_err(|e| format!("Failed to build runner history: {}", e))?;

  save_history(&state.config.history_path, &history)
    .map_err(|e| format!("Failed to save runner history: {}", e))?;

  Ok(history)
}

/// The stored runner history, if it has been built
pub fn get_runner_history(state: &AppState) -> Result<Option<RunnerHistory>, String> {
  load_history(&state.config.history_path).map_err(|e| format!("Failed to load runner history: {}", e))
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
