//! Activity export loading
//!
//! Reads the delimited activity export into an [`ActivityTable`]. Columns are
//! located by name, individual cells that fail to parse become `None` and are
//! dealt with by the consumers; only a missing date column fails the load.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use thiserror::Error;

use crate::models::{ActivityRecord, ActivityTable, ColumnLayout, DurationColumn};

/// ---------------------------------------------------------------------------
/// Column Names
/// ---------------------------------------------------------------------------

pub const DATE_COLUMN: &str = "Activity Date";
pub const TYPE_COLUMN: &str = "Activity Type";
pub const NAME_COLUMN: &str = "Activity Name";
pub const DISTANCE_COLUMN: &str = "Distance";

/// Activity types counted as runs
pub const RUN_TYPES: [&str; 2] = ["Run", "Virtual Run"];

/// A rule for picking a column out of the header row
#[derive(Debug, Clone, Copy)]
pub enum ColumnMatch {
  Exact(&'static str),
  Contains(&'static str),
}

impl ColumnMatch {
  fn matches(&self, header: &str) -> bool {
    match self {
      ColumnMatch::Exact(name) => header == *name,
      ColumnMatch::Contains(fragment) => header.contains(fragment),
    }
  }
}

/// Date column candidates, highest priority first
const DATE_CANDIDATES: [ColumnMatch; 2] = [ColumnMatch::Exact(DATE_COLUMN), ColumnMatch::Contains("Date")];

/// Duration column candidates, highest priority first
const DURATION_CANDIDATES: [(ColumnMatch, DurationColumn); 2] = [
  (ColumnMatch::Exact("Moving Time"), DurationColumn::MovingTime),
  (ColumnMatch::Exact("Elapsed Time"), DurationColumn::ElapsedTime),
];

/// ---------------------------------------------------------------------------
/// Error Types
/// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ActivityError {
  #[error("Schema error: {0}")]
  Schema(String),

  #[error("No activities with a usable date")]
  EmptyDataset,

  #[error("Failed to open activity export: {0}")]
  Io(#[from] std::io::Error),

  #[error("Failed to read activity export: {0}")]
  Csv(#[from] csv::Error),
}

/// ---------------------------------------------------------------------------
/// Loading
/// ---------------------------------------------------------------------------

/// Load an activity export from disk
///
/// The file handle is released before this returns.
pub fn load_activities(path: &Path) -> Result<ActivityTable, ActivityError> {
  let table = {
    let file = File::open(path)?;
    load_activities_from_reader(file)?
  };

  tracing::info!(
    path = %path.display(),
    rows = table.len(),
    "Loaded activity export"
  );

  Ok(table)
}

/// Load an activity export from any CSV source
pub fn load_activities_from_reader<R: Read>(source: R) -> Result<ActivityTable, ActivityError> {
  let mut reader = csv::ReaderBuilder::new()
    .flexible(true)
    .trim(csv::Trim::All)
    .from_reader(source);

  let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

  let date_idx = find_column(&headers, &DATE_CANDIDATES)
    .ok_or_else(|| ActivityError::Schema("No date column found in activity export".to_string()))?;
  let type_idx = find_column(&headers, &[ColumnMatch::Exact(TYPE_COLUMN)]);
  let name_idx = find_column(&headers, &[ColumnMatch::Exact(NAME_COLUMN)]);
  let distance_idx = find_column(&headers, &[ColumnMatch::Exact(DISTANCE_COLUMN)]);
  let duration = DURATION_CANDIDATES.iter().find_map(|(rule, column)| {
    find_column(&headers, std::slice::from_ref(rule)).map(|idx| (idx, *column))
  });

  if headers[date_idx] != DATE_COLUMN {
    tracing::debug!(column = %headers[date_idx], "Using fallback date column");
  }

  let mut records = Vec::new();
  let mut unparsed_dates = 0usize;

  for row in reader.records() {
    let row = row?;
    let cell = |idx: Option<usize>| idx.and_then(|i| row.get(i));

    let date = cell(Some(date_idx)).and_then(parse_activity_date);
    if date.is_none() {
      unparsed_dates += 1;
    }

    records.push(ActivityRecord {
      date,
      activity_type: cell(type_idx).map(str::to_string),
      name: cell(name_idx).filter(|s| !s.is_empty()).map(str::to_string),
      distance: cell(distance_idx).and_then(parse_number),
      duration_seconds: cell(duration.map(|(idx, _)| idx)).and_then(parse_duration_seconds),
    });
  }

  if unparsed_dates > 0 {
    tracing::warn!(count = unparsed_dates, "Activities with unparseable dates");
  }

  Ok(ActivityTable {
    columns: ColumnLayout {
      has_type: type_idx.is_some(),
      has_distance: distance_idx.is_some(),
      has_name: name_idx.is_some(),
      duration: duration.map(|(_, column)| column),
    },
    records,
  })
}

/// Index of the first header satisfying the highest-priority rule that matches anything
pub fn find_column(headers: &[String], candidates: &[ColumnMatch]) -> Option<usize> {
  candidates
    .iter()
    .find_map(|rule| headers.iter().position(|h| rule.matches(h)))
}

/// ---------------------------------------------------------------------------
/// Cell Parsing
/// ---------------------------------------------------------------------------

const DATETIME_FORMATS: [&str; 5] = [
  "%b %d, %Y, %I:%M:%S %p",
  "%Y-%m-%d %H:%M:%S",
  "%Y-%m-%dT%H:%M:%S",
  "%Y-%m-%d %H:%M",
  "%m/%d/%Y %H:%M:%S",
];

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%m/%d/%Y", "%b %d, %Y"];

/// Parse an export timestamp; date-only values land at midnight
pub fn parse_activity_date(value: &str) -> Option<NaiveDateTime> {
  let value = value.trim();
  if value.is_empty() {
    return None;
  }

  if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
    return Some(dt.naive_local());
  }

  DATETIME_FORMATS
    .iter()
    .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
    .or_else(|| {
      DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
        .and_then(|d| d.and_hms_opt(0, 0, 0))
    })
}

/// Parse a numeric cell, tolerating thousands separators
///
/// Distances and durations are never negative, so negative cells count as
/// unparseable.
pub fn parse_number(value: &str) -> Option<f64> {
  let cleaned = value.trim().replace(',', "");
  if cleaned.is_empty() {
    return None;
  }
  cleaned.parse::<f64>().ok().filter(|v| v.is_finite() && *v >= 0.0)
}

/// Parse a duration given either as seconds or as `HH:MM:SS` / `MM:SS`
pub fn parse_duration_seconds(value: &str) -> Option<f64> {
  if let Some(seconds) = parse_number(value) {
    return Some(seconds);
  }

  let parts: Vec<&str> = value.trim().split(':').collect();
  let fields: Option<Vec<f64>> = parts
    .iter()
    .map(|p| p.trim().parse::<f64>().ok().filter(|v| v.is_finite() && *v >= 0.0))
    .collect();
  match fields?.as_slice() {
    [h, m, s] => Some(h * 3600.0 + m * 60.0 + s),
    [m, s] => Some(m * 60.0 + s),
    _ => None,
  }
}

pub fn is_run(activity_type: &str) -> bool {
  RUN_TYPES.contains(&activity_type)
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::Timelike;

  #[test]
  fn test_load_strava_style_export() {
    let csv = "\
Activity ID,Activity Date,Activity Name,Activity Type,Elapsed Time,Distance,Moving Time
1,\"Jan 1, 2024, 7:00:00 AM\",Morning Run,Run,1900,5000.0,1800
2,\"Jan 3, 2024, 6:15:30 PM\",Evening Ride,Ride,3600,20000.0,3500
";

    let table = load_activities_from_reader(csv.as_bytes()).unwrap();

    assert_eq!(table.len(), 2);
    assert!(table.columns.has_type);
    assert!(table.columns.has_distance);
    assert!(table.columns.has_name);
    assert_eq!(table.columns.duration, Some(DurationColumn::MovingTime));

    let first = &table.records[0];
    assert_eq!(first.date.unwrap().date(), NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
    assert_eq!(first.activity_type.as_deref(), Some("Run"));
    assert_eq!(first.name.as_deref(), Some("Morning Run"));
    assert_eq!(first.distance, Some(5000.0));
    // Moving Time wins over Elapsed Time
    assert_eq!(first.duration_seconds, Some(1800.0));

    assert_eq!(table.records[1].date.unwrap().hour(), 18);
  }

  #[test]
  fn test_fallback_date_column() {
    let csv = "Start Date,Distance\n2024-02-01,3.1\n";

    let table = load_activities_from_reader(csv.as_bytes()).unwrap();

    assert_eq!(table.records[0].date.unwrap().date(), NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
    assert!(!table.columns.has_type);
  }

  #[test]
  fn test_exact_date_column_preferred_over_substring() {
    let csv = "Upload Date,Activity Date,Distance\n2023-01-01,2024-02-01,3.1\n";

    let table = load_activities_from_reader(csv.as_bytes()).unwrap();

    assert_eq!(table.records[0].date.unwrap().date(), NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
  }

  #[test]
  fn test_missing_date_column_is_schema_error() {
    let csv = "Name,Distance\nLunch Run,3.1\n";

    let result = load_activities_from_reader(csv.as_bytes());

    assert!(matches!(result, Err(ActivityError::Schema(_))));
  }

  #[test]
  fn test_unparseable_values_become_missing() {
    let csv = "Activity Date,Distance,Elapsed Time\nnot a date,abc,soon\n2024-01-02,\"1,234.5\",0:45:00\n";

    let table = load_activities_from_reader(csv.as_bytes()).unwrap();

    assert_eq!(table.len(), 2);
    assert!(table.records[0].date.is_none());
    assert!(table.records[0].distance.is_none());
    assert!(table.records[0].duration_seconds.is_none());
    assert_eq!(table.records[1].distance, Some(1234.5));
    assert_eq!(table.records[1].duration_seconds, Some(2700.0));
    assert_eq!(table.columns.duration, Some(DurationColumn::ElapsedTime));
  }

  #[test]
  fn test_parse_duration_formats() {
    assert_eq!(parse_duration_seconds("3600"), Some(3600.0));
    assert_eq!(parse_duration_seconds("01:02:03"), Some(3723.0));
    assert_eq!(parse_duration_seconds("25:30"), Some(1530.0));
    assert_eq!(parse_duration_seconds(""), None);
    assert_eq!(parse_duration_seconds("1:2:3:4"), None);
  }

  #[test]
  fn test_negative_cells_become_missing() {
    let csv = "Activity Date,Distance,Moving Time\n2024-01-02,-5000,-1800\n2024-01-03,5000,-0:30:00\n";

    let table = load_activities_from_reader(csv.as_bytes()).unwrap();

    assert!(table.records[0].distance.is_none());
    assert!(table.records[0].duration_seconds.is_none());
    assert_eq!(table.records[1].distance, Some(5000.0));
    assert!(table.records[1].duration_seconds.is_none());
    assert_eq!(parse_number("-1"), None);
    assert_eq!(parse_number("0"), Some(0.0));
  }

  #[test]
  fn test_parse_activity_date_formats() {
    assert!(parse_activity_date("2024-01-05T06:30:00Z").is_some());
    assert!(parse_activity_date("2024-01-05 06:30:00").is_some());
    assert!(parse_activity_date("01/05/2024").is_some());
    assert!(parse_activity_date("Jan 5, 2024, 6:30:00 AM").is_some());
    assert!(parse_activity_date("yesterday").is_none());
  }

  #[test]
  fn test_is_run() {
    assert!(is_run("Run"));
    assert!(is_run("Virtual Run"));
    assert!(!is_run("run"));
    assert!(!is_run("Ride"));
  }
}
