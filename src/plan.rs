//! Reference training plan lookups
//!
//! The plan is a list of labeled weeks, each covering an inclusive date range
//! written as `YYYY-MM-DD to YYYY-MM-DD`. Lookups are linear scans in plan
//! order, so if two weeks overlapped the one listed first would win.
//! [`load_plan`] rejects overlapping plans up front; plans built in memory are
//! taken as given.

use std::fs;
use std::path::Path;

use chrono::{Datelike, Duration, NaiveDate};
use thiserror::Error;

use crate::models::plan::day_name;
use crate::models::{DayWorkout, PlanWeek, ScheduledDay, TrainingPlan};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Shown for days without a scheduled workout
pub const REST_DAY: &str = "OFF";

/// ---------------------------------------------------------------------------
/// Error Types
/// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum PlanError {
  #[error("Week '{week_label}' has malformed date range '{date_range}' (expected YYYY-MM-DD to YYYY-MM-DD)")]
  Format { week_label: String, date_range: String },

  #[error("Week '{week_label}' ends before it starts")]
  InvertedRange { week_label: String },

  #[error("Weeks '{first}' and '{second}' overlap")]
  Overlap { first: String, second: String },

  #[error("Failed to read plan: {0}")]
  Io(#[from] std::io::Error),

  #[error("Invalid plan document: {0}")]
  Json(#[from] serde_json::Error),
}

impl PlanWeek {
  /// Parse the inclusive start and end dates of this week
  pub fn dates(&self) -> Result<(NaiveDate, NaiveDate), PlanError> {
    let malformed = || PlanError::Format {
      week_label: self.week_label.clone(),
      date_range: self.date_range.clone(),
    };

    let parts: Vec<&str> = self.date_range.split("to").map(str::trim).collect();
    let [start, end] = parts.as_slice() else {
      return Err(malformed());
    };

    let start = NaiveDate::parse_from_str(start, DATE_FORMAT).map_err(|_| malformed())?;
    let end = NaiveDate::parse_from_str(end, DATE_FORMAT).map_err(|_| malformed())?;
    Ok((start, end))
  }

  pub fn contains(&self, date: NaiveDate) -> Result<bool, PlanError> {
    let (start, end) = self.dates()?;
    Ok(start <= date && date <= end)
  }
}

/// ---------------------------------------------------------------------------
/// Lookups
/// ---------------------------------------------------------------------------

/// First week whose label matches, ignoring case
pub fn find_week_by_label<'a>(plan: &'a TrainingPlan, label: &str) -> Option<&'a PlanWeek> {
  plan
    .weeks
    .iter()
    .find(|w| w.week_label.to_lowercase() == label.to_lowercase())
}

/// First week whose range contains `date`
///
/// Weeks are parsed as they are scanned, so a malformed week listed after
/// the match is not reported.
pub fn find_week_containing(plan: &TrainingPlan, date: NaiveDate) -> Result<Option<&PlanWeek>, PlanError> {
  for week in &plan.weeks {
    if week.contains(date)? {
      return Ok(Some(week));
    }
  }
  Ok(None)
}

/// Earliest week starting strictly after `date`
pub fn find_next_week(plan: &TrainingPlan, date: NaiveDate) -> Result<Option<&PlanWeek>, PlanError> {
  let mut candidates = Vec::new();
  for week in &plan.weeks {
    let (start, _) = week.dates()?;
    if start > date {
      candidates.push((start, week));
    }
  }

  candidates.sort_by_key(|(start, _)| *start);
  Ok(candidates.into_iter().next().map(|(_, week)| week))
}

/// Week label and workout scheduled on `date`
///
/// A date outside every week is not an error: label and workout are `None`.
pub fn workout_on(plan: &TrainingPlan, date: NaiveDate) -> Result<DayWorkout, PlanError> {
  let weekday = date.weekday();
  let week = find_week_containing(plan, date)?;

  Ok(DayWorkout {
    week_label: week.map(|w| w.week_label.clone()),
    weekday: day_name(weekday).to_string(),
    workout: week.and_then(|w| w.sessions.get(weekday)).map(str::to_string),
  })
}

/// Seven consecutive days starting at `start`
pub fn week_schedule(plan: &TrainingPlan, start: NaiveDate) -> Result<Vec<ScheduledDay>, PlanError> {
  (0..7)
    .map(|offset| {
      let date = start + Duration::days(offset);
      let day = workout_on(plan, date)?;
      Ok(ScheduledDay {
        date,
        weekday: day.weekday,
        week_label: day.week_label,
        workout: day.workout.unwrap_or_else(|| REST_DAY.to_string()),
      })
    })
    .collect()
}

/// Expand a bare week number (`"3"`) into its label (`"Week 3"`)
pub fn week_label_for_query(query: &str) -> String {
  let query = query.trim();
  if !query.is_empty() && query.chars().all(|c| c.is_ascii_digit()) {
    format!("Week {}", query)
  } else {
    query.to_string()
  }
}

/// ---------------------------------------------------------------------------
/// Loading
/// ---------------------------------------------------------------------------

/// Read and validate the plan document
pub fn load_plan(path: &Path) -> Result<TrainingPlan, PlanError> {
  let contents = fs::read_to_string(path)?;
  let plan = parse_plan(&contents)?;
  tracing::info!(path = %path.display(), weeks = plan.weeks.len(), "Loaded training plan");
  Ok(plan)
}

pub fn parse_plan(json: &str) -> Result<TrainingPlan, PlanError> {
  let plan: TrainingPlan = serde_json::from_str(json)?;
  validate_plan(&plan)?;
  Ok(plan)
}

/// Every range must parse, run forwards, and not overlap another week
///
/// Gaps between weeks are allowed.
pub fn validate_plan(plan: &TrainingPlan) -> Result<(), PlanError> {
  let mut spans = Vec::with_capacity(plan.weeks.len());
  for week in &plan.weeks {
    let (start, end) = week.dates()?;
    if end < start {
      return Err(PlanError::InvertedRange {
        week_label: week.week_label.clone(),
      });
    }
    spans.push((start, end, week));
  }

  spans.sort_by_key(|(start, _, _)| *start);
  for pair in spans.windows(2) {
    let (_, prev_end, prev) = pair[0];
    let (next_start, _, next) = pair[1];
    if next_start <= prev_end {
      return Err(PlanError::Overlap {
        first: prev.week_label.clone(),
        second: next.week_label.clone(),
      });
    }
  }

  Ok(())
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
