//! Runner history builder
//!
//! Long-horizon companion to [`crate::analysis::summarize_runs`]: a 16-week
//! mileage trend, a recent pace band, and best efforts in three distance
//! bands. The result is written to disk once and read back as chat context.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use thiserror::Error;

use crate::activities::{is_run, ActivityError};
use crate::analysis::round2;
use crate::models::{
  ActivityTable, BestEffort, BestEfforts, DateRange, PaceBand, RunnerHistory, WeeklyMileage,
};
use crate::units::normalize_distances;

/// ---------------------------------------------------------------------------
/// Configuration
/// ---------------------------------------------------------------------------

pub const TREND_WEEKS: usize = 16;
pub const RECENT_WINDOW_DAYS: i64 = 56;
pub const MIN_PACES_FOR_BAND: usize = 5;
pub const MAX_NAME_CHARS: usize = 80;

/// Inclusive distance bands in miles
pub const MILE_BAND: (f64, f64) = (0.8, 1.3);
pub const FIVE_K_BAND: (f64, f64) = (2.5, 4.0);
pub const TEN_K_BAND: (f64, f64) = (5.5, 7.0);

/// ---------------------------------------------------------------------------
/// Error Types
/// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum HistoryError {
  #[error(transparent)]
  Activity(#[from] ActivityError),

  #[error("Failed to access history file: {0}")]
  Io(#[from] std::io::Error),

  #[error("Invalid history document: {0}")]
  Json(#[from] serde_json::Error),
}

/// ---------------------------------------------------------------------------
/// Run Rows
/// ---------------------------------------------------------------------------

/// A run with a usable date and a positive distance in miles
#[derive(Debug, Clone)]
pub struct RunRow {
  pub date: NaiveDateTime,
  pub miles: f64,
  /// min/mile, `None` without a duration
  pub pace: Option<f64>,
  pub name: String,
}

/// Runs from the table, in table order, ready for history statistics
pub fn run_rows(table: &ActivityTable) -> Result<Vec<RunRow>, ActivityError> {
  if !table.columns.has_distance {
    return Err(ActivityError::Schema(
      "No Distance column found in activity export".to_string(),
    ));
  }

  let runs: Vec<_> = table
    .records
    .iter()
    .filter(|r| !table.columns.has_type || r.activity_type.as_deref().is_some_and(is_run))
    .filter_map(|r| r.date.map(|d| (r, d)))
    .collect();

  let raw: Vec<Option<f64>> = runs.iter().map(|(r, _)| r.distance).collect();
  let miles = normalize_distances(&raw).miles;

  Ok(
    runs
      .into_iter()
      .zip(miles)
      .filter_map(|((record, date), miles)| {
        let miles = miles.filter(|m| *m > 0.0)?;
        Some(RunRow {
          date,
          miles,
          pace: record
            .duration_seconds
            .map(|secs| secs / 60.0 / miles)
            .filter(|p| p.is_finite() && *p > 0.0),
          name: record.name.clone().unwrap_or_default(),
        })
      })
      .collect(),
  )
}

/// ---------------------------------------------------------------------------
/// History Builder
/// ---------------------------------------------------------------------------

/// Build the runner history document from the full activity table
pub fn build_history(table: &ActivityTable, generated_at: NaiveDateTime) -> Result<RunnerHistory, ActivityError> {
  let runs = run_rows(table)?;

  let start = runs.iter().map(|r| r.date).min().ok_or(ActivityError::EmptyDataset)?;
  let end = runs.iter().map(|r| r.date).max().ok_or(ActivityError::EmptyDataset)?;

  let cutoff = end - Duration::days(RECENT_WINDOW_DAYS);
  let recent: Vec<&RunRow> = runs.iter().filter(|r| r.date >= cutoff).collect();

  let pace_band = pace_band(&recent);
  if pace_band.is_none() {
    tracing::debug!(recent = recent.len(), "Not enough paces for a pace band");
  }

  let history = RunnerHistory {
    generated_at,
    runs_count_total: runs.len(),
    date_range: DateRange {
      start: start.date(),
      end: end.date(),
    },
    weekly_mileage_last_16_weeks: weekly_trend(&runs, TREND_WEEKS),
    pace_band_last_8_weeks_min_per_mile: pace_band,
    best_efforts_last_8_weeks: BestEfforts {
      best_1_mileish: best_effort(&recent, MILE_BAND),
      best_5kish: best_effort(&recent, FIVE_K_BAND),
      best_10kish: best_effort(&recent, TEN_K_BAND),
    },
  };

  tracing::info!(
    runs = history.runs_count_total,
    weeks = history.weekly_mileage_last_16_weeks.len(),
    "Built runner history"
  );

  Ok(history)
}

/// Weekly mileage keyed by Monday, keeping the most recent `weeks`
pub fn weekly_trend(runs: &[RunRow], weeks: usize) -> Vec<WeeklyMileage> {
  let mut totals: BTreeMap<NaiveDate, f64> = BTreeMap::new();
  for run in runs {
    *totals.entry(week_start(run.date.date())).or_insert(0.0) += run.miles;
  }

  let skip = totals.len().saturating_sub(weeks);
  totals
    .into_iter()
    .skip(skip)
    .map(|(week_start, miles)| WeeklyMileage {
      week_start,
      miles: round2(miles),
    })
    .collect()
}

/// Monday on or before `date`
pub fn week_start(date: NaiveDate) -> NaiveDate {
  date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

/// p20/p50/p80 of valid paces, when there are enough of them
pub fn pace_band(runs: &[&RunRow]) -> Option<PaceBand> {
  let mut paces: Vec<f64> = runs.iter().filter_map(|r| r.pace).collect();
  if paces.len() < MIN_PACES_FOR_BAND {
    return None;
  }
  paces.sort_by(f64::total_cmp);

  Some(PaceBand {
    p20: round2(quantile(&paces, 0.2)),
    p50: round2(quantile(&paces, 0.5)),
    p80: round2(quantile(&paces, 0.8)),
  })
}

/// Linear-interpolated quantile of sorted, non-empty values
fn quantile(sorted: &[f64], q: f64) -> f64 {
  let pos = (sorted.len() - 1) as f64 * q;
  let lo = pos.floor() as usize;
  let hi = pos.ceil() as usize;
  sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

/// Fastest run within an inclusive distance band; earliest row wins ties
pub fn best_effort(runs: &[&RunRow], (min_mi, max_mi): (f64, f64)) -> Option<BestEffort> {
  let mut best: Option<(&RunRow, f64)> = None;

  for run in runs.iter().filter(|r| r.miles >= min_mi && r.miles <= max_mi) {
    if let Some(pace) = run.pace {
      if best.map_or(true, |(_, fastest)| pace < fastest) {
        best = Some((*run, pace));
      }
    }
  }

  best.map(|(run, pace)| BestEffort {
    date: run.date.date(),
    distance_mi: round2(run.miles),
    pace_min_per_mi: round2(pace),
    activity_name: run.name.chars().take(MAX_NAME_CHARS).collect(),
  })
}

/// ---------------------------------------------------------------------------
/// Persistence
/// ---------------------------------------------------------------------------

pub fn save_history(path: &Path, history: &RunnerHistory) -> Result<(), HistoryError> {
  let json = serde_json::to_string_pretty(history)?;
  fs::write(path, json)?;
  tracing::info!(path = %path.display(), "Wrote runner history");
  Ok(())
}

/// Read a previously built history; `None` if it has not been built yet
pub fn load_history(path: &Path) -> Result<Option<RunnerHistory>, HistoryError> {
  match fs::read_to_string(path) {
    Ok(contents) => Ok(Some(serde_json::from_str(&contents)?)),
    Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
    Err(e) => Err(e.into()),
  }
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
