use chrono::NaiveDate;

use crate::models::{DayWorkout, PlanWeek, ScheduledDay};
use crate::plan::{find_next_week, find_week_by_label, week_label_for_query, week_schedule, workout_on};
use crate::state::AppState;

/// ---------------------------------------------------------------------------
/// Reference Plan Commands
/// ---------------------------------------------------------------------------

/// The planned workout on `date`
pub fn get_workout_on(state: &AppState, date: NaiveDate) -> Result<DayWorkout, String> {
  let plan = state.plan().map_err(|e| format!("Failed to load plan: {}", e))?;
  workout_on(&plan, date).map_err(|e| format!("Failed to look up {}: {}", date, e))
}

/// A week by label, or by bare number (`"3"` means `"Week 3"`)
pub fn get_plan_week(state: &AppState, query: &str) -> Result<PlanWeek, String> {
  let plan = state.plan().map_err(|e| format!("Failed to load plan: {}", e))?;
  let label = week_label_for_query(query);

  find_week_by_label(&plan, &label)
    .cloned()
    .ok_or_else(|| format!("Week '{}' not found. Try: plan week 1", label))
}

/// Seven days starting at `start`, rest days filled in
pub fn get_week_schedule(state: &AppState, start: NaiveDate) -> Result<Vec<ScheduledDay>, String> {
  let plan = state.plan().map_err(|e| format!("Failed to load plan: {}", e))?;
  week_schedule(&plan, start).map_err(|e| format!("Failed to build schedule: {}", e))
}

/// The first week starting after `date`
pub fn get_next_week(state: &AppState, date: NaiveDate) -> Result<Option<PlanWeek>, String> {
  let plan = state.plan().map_err(|e| format!("Failed to load plan: {}", e))?;
  find_next_week(&plan, date)
    .map(|week| week.cloned())
    .map_err(|e| format!("Failed to find next week: {}", e))
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
