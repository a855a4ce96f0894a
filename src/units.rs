//! Distance unit inference
//!
//! Exports do not say which unit the distance column is in. The decision is
//! made once for the whole column from its median: typical values above
//! 1000 can only be meters, anything else is taken as miles already.
//!
//! Known limitation: a column mixing short meter values with mile values is
//! classified as a whole, so the minority unit comes out wrong.

use serde::{Deserialize, Serialize};

pub const METERS_PER_MILE: f64 = 1609.34;

/// Median above which a column is treated as meters
pub const METERS_MEDIAN_THRESHOLD: f64 = 1000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceUnit {
  Meters,
  Miles,
  /// No values to decide from; column returned as-is
  Unknown,
}

/// A distance column converted to miles, plus the unit that was inferred
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedDistances {
  pub miles: Vec<Option<f64>>,
  pub source_unit: DistanceUnit,
}

/// Infer the unit of a distance column and convert every value to miles
pub fn normalize_distances(values: &[Option<f64>]) -> NormalizedDistances {
  let source_unit = match median(values) {
    None => DistanceUnit::Unknown,
    Some(m) if m > METERS_MEDIAN_THRESHOLD => DistanceUnit::Meters,
    Some(_) => DistanceUnit::Miles,
  };

  let miles = match source_unit {
    DistanceUnit::Meters => values
      .iter()
      .map(|v| v.map(|meters| meters / METERS_PER_MILE))
      .collect(),
    DistanceUnit::Miles | DistanceUnit::Unknown => values.to_vec(),
  };

  tracing::debug!(?source_unit, count = values.len(), "Normalized distance column");

  NormalizedDistances { miles, source_unit }
}

/// Median of the present values, averaging the middle pair for even counts
fn median(values: &[Option<f64>]) -> Option<f64> {
  let mut present: Vec<f64> = values.iter().flatten().copied().filter(|v| !v.is_nan()).collect();
  if present.is_empty() {
    return None;
  }
  present.sort_by(f64::total_cmp);

  let mid = present.len() / 2;
  if present.len() % 2 == 0 {
    Some((present[mid - 1] + present[mid]) / 2.0)
  } else {
    Some(present[mid])
  }
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
