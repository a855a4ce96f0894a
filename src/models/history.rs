use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Long-horizon view of the runner, written once per build and read by chat
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunnerHistory {
  pub generated_at: NaiveDateTime,
  pub runs_count_total: usize,
  pub date_range: DateRange,
  pub weekly_mileage_last_16_weeks: Vec<WeeklyMileage>,
  /// `None` when fewer than five paces are available
  pub pace_band_last_8_weeks_min_per_mile: Option<PaceBand>,
  pub best_efforts_last_8_weeks: BestEfforts,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
  pub start: NaiveDate,
  pub end: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyMileage {
  /// Monday of the week
  pub week_start: NaiveDate,
  pub miles: f64,
}

/// 20th/50th/80th percentile of pace in min/mile
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PaceBand {
  pub p20: f64,
  pub p50: f64,
  pub p80: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BestEffort {
  pub date: NaiveDate,
  pub distance_mi: f64,
  pub pace_min_per_mi: f64,
  pub activity_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BestEfforts {
  pub best_1_mileish: Option<BestEffort>,
  pub best_5kish: Option<BestEffort>,
  pub best_10kish: Option<BestEffort>,
}
