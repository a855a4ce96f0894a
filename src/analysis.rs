//! Deterministic training-load analysis
//!
//! Summarizes recent running volume from the activity table. The model
//! consuming these numbers interprets them; it never does the math itself.

use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};

use crate::activities::{is_run, ActivityError};
use crate::models::{ActivityRecord, ActivityTable, TrainingSummary, WeeklyBucket};
use crate::units::normalize_distances;

pub const DEFAULT_LOOKBACK_DAYS: i64 = 56;

/// Weeks included in the rolling weekly average
const ROLLING_WEEKS: usize = 4;

/// ---------------------------------------------------------------------------
/// Window Aggregation
/// ---------------------------------------------------------------------------

/// Summarize runs in the `days_back` days up to the most recent activity
///
/// Rows without a date are ignored. When the table has a type column only
/// runs are counted; without one every activity counts. A window with no
/// matching runs yields an all-zero summary.
pub fn summarize_runs(table: &ActivityTable, days_back: i64) -> Result<TrainingSummary, ActivityError> {
  let dated: Vec<(&ActivityRecord, NaiveDateTime)> = table
    .records
    .iter()
    .filter_map(|r| r.date.map(|d| (r, d)))
    .collect();

  let anchor = dated
    .iter()
    .map(|(_, d)| *d)
    .max()
    .ok_or(ActivityError::EmptyDataset)?;
  // A window reaching past the calendar range covers the whole history
  let cutoff = Duration::try_days(days_back)
    .and_then(|window| anchor.checked_sub_signed(window))
    .unwrap_or(NaiveDateTime::MIN);

  let recent: Vec<(&ActivityRecord, NaiveDateTime)> = dated
    .into_iter()
    .filter(|(_, d)| *d >= cutoff)
    .filter(|(r, _)| !table.columns.has_type || r.activity_type.as_deref().is_some_and(is_run))
    .collect();

  if !table.columns.has_distance {
    return Err(ActivityError::Schema(
      "No Distance column found in activity export".to_string(),
    ));
  }

  tracing::debug!(%anchor, %cutoff, runs = recent.len(), "Summarizing training window");

  let raw: Vec<Option<f64>> = recent.iter().map(|(r, _)| r.distance).collect();
  let miles = normalize_distances(&raw).miles;

  let rows: Vec<(NaiveDate, Option<f64>)> = recent
    .iter()
    .zip(miles)
    .map(|((_, d), m)| (d.date(), m))
    .collect();

  let runs_count = rows.iter().filter(|(_, m)| m.is_some()).count();
  if runs_count == 0 {
    return Ok(TrainingSummary::empty(days_back));
  }

  let total_miles: f64 = rows.iter().filter_map(|(_, m)| *m).sum();
  let weekly = weekly_buckets(&rows);

  let last_n = &weekly[weekly.len().saturating_sub(ROLLING_WEEKS)..];
  let avg_weekly = if last_n.is_empty() {
    0.0
  } else {
    last_n.iter().map(|w| w.miles).sum::<f64>() / last_n.len() as f64
  };
  let max_week = weekly.iter().map(|w| w.miles).fold(0.0, f64::max);
  let last_week = weekly.last().map_or(0.0, |w| w.miles);

  Ok(TrainingSummary {
    days_back,
    runs_count,
    total_miles: round2(total_miles),
    avg_weekly_miles_last_4_weeks: round2(avg_weekly),
    max_weekly_miles: round2(max_week),
    last_week_miles: round2(last_week),
  })
}

/// Sum distance per ISO week, ordered by week
///
/// Every week with an activity gets a bucket, even if none of its distances
/// were usable.
pub fn weekly_buckets(rows: &[(NaiveDate, Option<f64>)]) -> Vec<WeeklyBucket> {
  let mut weeks: BTreeMap<(i32, u32), f64> = BTreeMap::new();

  for (date, miles) in rows {
    let iso = date.iso_week();
    *weeks.entry((iso.year(), iso.week())).or_insert(0.0) += miles.unwrap_or(0.0);
  }

  weeks
    .into_iter()
    .map(|((year, week), miles)| WeeklyBucket {
      week: format!("{}-W{:02}", year, week),
      miles,
    })
    .collect()
}

/// Round to two decimals for presentation
pub fn round2(value: f64) -> f64 {
  (value * 100.0).round() / 100.0
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;
  use crate::test_utils::*;

  #[test]
  fn test_single_week_end_to_end() {
    // Arrange: 2024-01-01 is a Monday, 20 miles over the week
    let table = mock_table(vec![
      mock_run("2024-01-01", 5.0, Some(2400.0)),
      mock_run("2024-01-03", 4.0, Some(1900.0)),
      mock_run("2024-01-05", 3.0, Some(1500.0)),
      mock_run("2024-01-07", 8.0, Some(4300.0)),
    ]);

    // Act
    let summary = summarize_runs(&table, DEFAULT_LOOKBACK_DAYS).unwrap();

    // Assert
    assert_eq!(summary.days_back, 56);
    assert_eq!(summary.runs_count, 4);
    assert_eq!(summary.total_miles, 20.0);
    assert_eq!(summary.last_week_miles, 20.0);
    assert_eq!(summary.avg_weekly_miles_last_4_weeks, 20.0);
    assert_eq!(summary.max_weekly_miles, 20.0);
  }

  #[test]
  fn test_no_runs_in_window_is_zero_summary() {
    // Arrange: only rides near the anchor, runs are far outside the window
    let table = mock_table(vec![
      mock_run("2023-01-01", 5.0, None),
      mock_activity("2024-03-01", "Ride", Some(20.0), None),
      mock_activity("2024-03-02", "Ride", Some(25.0), None),
    ]);

    let summary = summarize_runs(&table, DEFAULT_LOOKBACK_DAYS).unwrap();

    assert_eq!(summary, TrainingSummary::empty(56));
  }

  #[test]
  fn test_empty_table_is_empty_dataset_error() {
    let table = mock_table(vec![]);

    let result = summarize_runs(&table, DEFAULT_LOOKBACK_DAYS);

    assert!(matches!(result, Err(ActivityError::EmptyDataset)));
  }

  #[test]
  fn test_undated_rows_only_is_empty_dataset_error() {
    let mut record = mock_run("2024-01-01", 5.0, None);
    record.date = None;
    let table = mock_table(vec![record]);

    let result = summarize_runs(&table, DEFAULT_LOOKBACK_DAYS);

    assert!(matches!(result, Err(ActivityError::EmptyDataset)));
  }

  #[test]
  fn test_missing_distance_column_is_schema_error() {
    let mut table = mock_table(vec![mock_run("2024-01-01", 5.0, None)]);
    table.columns.has_distance = false;

    let result = summarize_runs(&table, DEFAULT_LOOKBACK_DAYS);

    assert!(matches!(result, Err(ActivityError::Schema(_))));
  }

  #[test]
  fn test_type_filter_excludes_non_runs() {
    let table = mock_table(vec![
      mock_run("2024-01-01", 5.0, None),
      mock_activity("2024-01-02", "Virtual Run", Some(3.0), None),
      mock_activity("2024-01-03", "Ride", Some(30.0), None),
      mock_activity("2024-01-04", "", Some(7.0), None),
    ]);

    let summary = summarize_runs(&table, DEFAULT_LOOKBACK_DAYS).unwrap();

    assert_eq!(summary.runs_count, 2);
    assert_eq!(summary.total_miles, 8.0);
  }

  #[test]
  fn test_no_type_column_counts_everything() {
    let table = mock_untyped_table(vec![
      mock_activity("2024-01-01", "Ride", Some(10.0), None),
      mock_activity("2024-01-02", "Swim", Some(1.0), None),
    ]);

    let summary = summarize_runs(&table, DEFAULT_LOOKBACK_DAYS).unwrap();

    assert_eq!(summary.runs_count, 2);
    assert_eq!(summary.total_miles, 11.0);
  }

  #[test]
  fn test_meter_distances_converted() {
    let table = mock_table(vec![
      mock_run("2024-01-01", 8046.7, None),
      mock_run("2024-01-02", 8046.7, None),
    ]);

    let summary = summarize_runs(&table, DEFAULT_LOOKBACK_DAYS).unwrap();

    assert_approx_eq!(summary.total_miles, 10.0, 0.01);
  }

  #[test]
  fn test_rolling_average_uses_last_four_weeks() {
    // Arrange: six consecutive Mondays with 10, 20, ..., 60 miles
    let table = mock_table(vec![
      mock_run("2024-01-01", 10.0, None),
      mock_run("2024-01-08", 20.0, None),
      mock_run("2024-01-15", 30.0, None),
      mock_run("2024-01-22", 40.0, None),
      mock_run("2024-01-29", 50.0, None),
      mock_run("2024-02-05", 60.0, None),
    ]);

    let summary = summarize_runs(&table, DEFAULT_LOOKBACK_DAYS).unwrap();

    // (30 + 40 + 50 + 60) / 4
    assert_eq!(summary.avg_weekly_miles_last_4_weeks, 45.0);
    assert_eq!(summary.max_weekly_miles, 60.0);
    assert_eq!(summary.last_week_miles, 60.0);
    assert_eq!(summary.total_miles, 210.0);
  }

  #[test]
  fn test_window_boundary_is_inclusive() {
    // Anchor 2024-03-01 07:00; cutoff exactly 7 days earlier
    let table = mock_table(vec![
      mock_run("2024-02-23", 4.0, None),
      mock_run("2024-02-22", 100.0, None),
      mock_run("2024-03-01", 6.0, None),
    ]);

    let summary = summarize_runs(&table, 7).unwrap();

    assert_eq!(summary.runs_count, 2);
    assert_eq!(summary.total_miles, 10.0);
  }

  #[test]
  fn test_window_past_calendar_range_covers_all_history() {
    let table = mock_table(vec![
      mock_run("2019-06-01", 5.0, None),
      mock_run("2024-01-01", 3.0, None),
    ]);

    let summary = summarize_runs(&table, 100_000_000).unwrap();
    let widest = summarize_runs(&table, i64::MAX).unwrap();

    assert_eq!(summary.days_back, 100_000_000);
    assert_eq!(summary.runs_count, 2);
    assert_eq!(summary.total_miles, 8.0);
    assert_eq!(widest.runs_count, 2);
  }

  #[test]
  fn test_missing_distance_rows_not_counted() {
    let table = mock_table(vec![
      mock_activity("2024-01-01", "Run", None, None),
      mock_run("2024-01-02", 6.0, None),
    ]);

    let summary = summarize_runs(&table, DEFAULT_LOOKBACK_DAYS).unwrap();

    assert_eq!(summary.runs_count, 1);
    assert_eq!(summary.total_miles, 6.0);
  }

  #[test]
  fn test_summary_is_idempotent() {
    let table = mock_table(vec![
      mock_run("2024-01-01", 3.33, None),
      mock_run("2024-01-09", 7.77, None),
      mock_run("2024-01-20", 5.55, None),
    ]);

    let first = summarize_runs(&table, DEFAULT_LOOKBACK_DAYS).unwrap();
    let second = summarize_runs(&table, DEFAULT_LOOKBACK_DAYS).unwrap();

    assert_eq!(first, second);
    assert_eq!(first.total_miles.to_bits(), second.total_miles.to_bits());
  }

  #[test]
  fn test_weekly_buckets_sorted_across_year_boundary() {
    let d = |s: &str| date(s);
    let rows = vec![
      (d("2024-01-08"), Some(2.0)),
      (d("2023-12-31"), Some(1.0)),
      (d("2024-01-01"), Some(3.0)),
      (d("2024-01-02"), None),
    ];

    let buckets = weekly_buckets(&rows);

    let labels: Vec<&str> = buckets.iter().map(|b| b.week.as_str()).collect();
    assert_eq!(labels, vec!["2023-W52", "2024-W01", "2024-W02"]);
    assert_eq!(buckets[1].miles, 3.0);
  }

  #[test]
  fn test_round2() {
    assert_eq!(round2(3.14159), 3.14);
    assert_eq!(round2(2.675_1), 2.68);
    assert_eq!(round2(0.0), 0.0);
  }
}
