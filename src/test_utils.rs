//! Test utilities and helpers for unit testing
//!
//! This module provides common test infrastructure including:
//! - Activity table factories
//! - A sample training plan
//! - Temporary workspaces with export, plan, and memory files
//! - Helper assertions

use std::fs;

use chrono::{NaiveDate, NaiveDateTime};
use tempfile::TempDir;

use crate::config::Config;
use crate::models::{
  ActivityRecord, ActivityTable, ColumnLayout, DurationColumn, PlanWeek, TrainingPlan, WeekSessions,
};
use crate::state::AppState;

/// ---------------------------------------------------------------------------
/// Time Helpers
/// ---------------------------------------------------------------------------

pub fn date(s: &str) -> NaiveDate {
  NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("test date must be YYYY-MM-DD")
}

/// Morning of the given day (07:00)
pub fn datetime(s: &str) -> NaiveDateTime {
  date(s).and_hms_opt(7, 0, 0).expect("valid time")
}

/// ---------------------------------------------------------------------------
/// Activity Factories
/// ---------------------------------------------------------------------------

/// A run named `Run <day>`
pub fn mock_run(day: &str, distance: f64, duration_seconds: Option<f64>) -> ActivityRecord {
  let mut record = mock_activity(day, "Run", Some(distance), duration_seconds);
  record.name = Some(format!("Run {}", day));
  record
}

pub fn mock_activity(
  day: &str,
  activity_type: &str,
  distance: Option<f64>,
  duration_seconds: Option<f64>,
) -> ActivityRecord {
  ActivityRecord {
    date: Some(datetime(day)),
    activity_type: Some(activity_type.to_string()),
    name: None,
    distance,
    duration_seconds,
  }
}

/// Table with every optional column present
pub fn mock_table(records: Vec<ActivityRecord>) -> ActivityTable {
  ActivityTable {
    columns: ColumnLayout {
      has_type: true,
      has_distance: true,
      has_name: true,
      duration: Some(DurationColumn::MovingTime),
    },
    records,
  }
}

/// Table from an export without an activity type column
pub fn mock_untyped_table(records: Vec<ActivityRecord>) -> ActivityTable {
  let mut table = mock_table(records);
  table.columns.has_type = false;
  table
}

/// ---------------------------------------------------------------------------
/// Plan Factories
/// ---------------------------------------------------------------------------

pub fn plan_week(label: &str, date_range: &str) -> PlanWeek {
  PlanWeek {
    week_label: label.to_string(),
    date_range: date_range.to_string(),
    goal: None,
    sessions: WeekSessions::default(),
  }
}

/// Two back-to-back weeks starting Monday 2024-01-01
pub fn mock_plan() -> TrainingPlan {
  let mut week_1 = plan_week("Week 1", "2024-01-01 to 2024-01-07");
  week_1.goal = Some("Base building".to_string());
  week_1.sessions.wednesday = Some("5 mi easy".to_string());
  week_1.sessions.saturday = Some("10 mi long run".to_string());

  let mut week_2 = plan_week("Week 2", "2024-01-08 to 2024-01-14");
  week_2.sessions.tuesday = Some("6 mi tempo".to_string());
  week_2.sessions.sunday = Some("12 mi long run".to_string());

  TrainingPlan {
    weeks: vec![week_1, week_2],
  }
}

/// A full seven-day plan as the model would return it
pub fn mock_week_sessions() -> WeekSessions {
  WeekSessions {
    monday: Some("Rest".to_string()),
    tuesday: Some("5 mi easy".to_string()),
    wednesday: Some("6 mi with 4x1 mi at threshold".to_string()),
    thursday: Some("4 mi easy".to_string()),
    friday: Some("Rest".to_string()),
    saturday: Some("12 mi long run".to_string()),
    sunday: Some("3 mi recovery".to_string()),
  }
}

/// ---------------------------------------------------------------------------
/// Workspace Utilities
/// ---------------------------------------------------------------------------

/// Export in meters with Strava-style dates, three runs and a ride in week 1
pub const SAMPLE_EXPORT: &str = "\
Activity ID,Activity Date,Activity Name,Activity Type,Elapsed Time,Distance,Moving Time
1,\"Jan 1, 2024, 7:00:00 AM\",Easy Monday,Run,2500,8046.7,2400
2,\"Jan 3, 2024, 6:30:00 PM\",Track Mile,Run,500,1609.34,420
3,\"Jan 4, 2024, 12:00:00 PM\",Lunch Ride,Ride,3700,32186.8,3600
4,\"Jan 6, 2024, 8:00:00 AM\",Long Run,Run,6000,16093.4,5700
";

/// Create a temp directory holding an export, the sample plan, and a memory
/// file, and an [`AppState`] pointing at them
///
/// Keep the returned `TempDir` alive for the duration of the test.
pub fn setup_test_state() -> (TempDir, AppState) {
  let dir = tempfile::tempdir().expect("Failed to create temp dir");

  let activities_path = dir.path().join("activities.csv");
  let plan_path = dir.path().join("plan_reference.json");
  let memory_path = dir.path().join("memory.json");

  fs::write(&activities_path, SAMPLE_EXPORT).expect("Failed to write export");
  fs::write(
    &plan_path,
    serde_json::to_string_pretty(&mock_plan()).expect("Failed to serialize plan"),
  )
  .expect("Failed to write plan");
  fs::write(
    &memory_path,
    r#"{"runner_profile": {"name": "Test Runner", "goal": "Spring marathon", "long_run_day": "Saturday"}, "notes": []}"#,
  )
  .expect("Failed to write memory");

  let config = Config {
    activities_path,
    plan_path,
    memory_path,
    history_path: dir.path().join("runner_history.json"),
    ..Config::default()
  };

  (dir, AppState::new(config))
}

/// ---------------------------------------------------------------------------
/// Test Macros
/// ---------------------------------------------------------------------------

/// Assert two floats are approximately equal within a tolerance
#[macro_export]
macro_rules! assert_approx_eq {
  ($left:expr, $right:expr, $tolerance:expr) => {
    let diff = ($left - $right).abs();
    assert!(
      diff < $tolerance,
      "Values not approximately equal: {} vs {} (diff: {}, tolerance: {})",
      $left,
      $right,
      diff,
      $tolerance
    );
  };
}

/// ---------------------------------------------------------------------------
/// Tests for Test Utilities
/// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;
  use crate::plan::validate_plan;

  #[test]
  fn test_mock_factories_create_valid_data() {
    let run = mock_run("2024-01-01", 3.1, Some(1500.0));
    assert_eq!(run.activity_type.as_deref(), Some("Run"));
    assert_eq!(run.name.as_deref(), Some("Run 2024-01-01"));

    assert!(validate_plan(&mock_plan()).is_ok());
    assert!(mock_week_sessions().is_complete());
  }

  #[test]
  fn test_setup_state_writes_files() {
    let (_dir, state) = setup_test_state();

    assert!(state.config.activities_path.exists());
    assert!(state.config.plan_path.exists());
    assert!(!state.config.history_path.exists());
  }
}
