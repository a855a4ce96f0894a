use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Which export column the duration values were read from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DurationColumn {
  MovingTime,
  ElapsedTime,
}

impl DurationColumn {
  pub fn header(&self) -> &'static str {
    match self {
      DurationColumn::MovingTime => "Moving Time",
      DurationColumn::ElapsedTime => "Elapsed Time",
    }
  }
}

/// Optional columns found in the export
///
/// The date column is always present once a table has been loaded, so it is
/// not tracked here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnLayout {
  pub has_type: bool,
  pub has_distance: bool,
  pub has_name: bool,
  pub duration: Option<DurationColumn>,
}

/// One row of the activity export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityRecord {
  /// `None` when the export value could not be parsed
  pub date: Option<NaiveDateTime>,
  pub activity_type: Option<String>,
  pub name: Option<String>,
  /// Raw distance, unit not yet known
  pub distance: Option<f64>,
  pub duration_seconds: Option<f64>,
}

/// Canonical in-memory activity table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActivityTable {
  pub columns: ColumnLayout,
  pub records: Vec<ActivityRecord>,
}

impl ActivityTable {
  pub fn len(&self) -> usize {
    self.records.len()
  }

  pub fn is_empty(&self) -> bool {
    self.records.is_empty()
  }
}
