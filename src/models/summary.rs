use serde::{Deserialize, Serialize};

/// Distance summed over one calendar week
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyBucket {
  /// ISO week label, e.g. `2024-W01`
  pub week: String,
  pub miles: f64,
}

/// Recent training load, computed fresh on every request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingSummary {
  pub days_back: i64,
  pub runs_count: usize,
  pub total_miles: f64,
  pub avg_weekly_miles_last_4_weeks: f64,
  pub max_weekly_miles: f64,
  pub last_week_miles: f64,
}

impl TrainingSummary {
  /// Summary for a window with no matching runs
  pub fn empty(days_back: i64) -> Self {
    Self {
      days_back,
      runs_count: 0,
      total_miles: 0.0,
      avg_weekly_miles_last_4_weeks: 0.0,
      max_weekly_miles: 0.0,
      last_week_miles: 0.0,
    }
  }
}
