use chrono::Weekday;
use serde::{Deserialize, Serialize};
use std::fmt;

/// All weekdays in plan order
pub const WEEKDAYS: [Weekday; 7] = [
  Weekday::Mon,
  Weekday::Tue,
  Weekday::Wed,
  Weekday::Thu,
  Weekday::Fri,
  Weekday::Sat,
  Weekday::Sun,
];

/// Full English weekday name as used for plan session keys
pub fn day_name(day: Weekday) -> &'static str {
  match day {
    Weekday::Mon => "Monday",
    Weekday::Tue => "Tuesday",
    Weekday::Wed => "Wednesday",
    Weekday::Thu => "Thursday",
    Weekday::Fri => "Friday",
    Weekday::Sat => "Saturday",
    Weekday::Sun => "Sunday",
  }
}

/// Workout per weekday; an empty slot is a rest day
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WeekSessions {
  #[serde(rename = "Monday", default, skip_serializing_if = "Option::is_none")]
  pub monday: Option<String>,
  #[serde(rename = "Tuesday", default, skip_serializing_if = "Option::is_none")]
  pub tuesday: Option<String>,
  #[serde(rename = "Wednesday", default, skip_serializing_if = "Option::is_none")]
  pub wednesday: Option<String>,
  #[serde(rename = "Thursday", default, skip_serializing_if = "Option::is_none")]
  pub thursday: Option<String>,
  #[serde(rename = "Friday", default, skip_serializing_if = "Option::is_none")]
  pub friday: Option<String>,
  #[serde(rename = "Saturday", default, skip_serializing_if = "Option::is_none")]
  pub saturday: Option<String>,
  #[serde(rename = "Sunday", default, skip_serializing_if = "Option::is_none")]
  pub sunday: Option<String>,
}

impl WeekSessions {
  pub fn get(&self, day: Weekday) -> Option<&str> {
    let slot = match day {
      Weekday::Mon => &self.monday,
      Weekday::Tue => &self.tuesday,
      Weekday::Wed => &self.wednesday,
      Weekday::Thu => &self.thursday,
      Weekday::Fri => &self.friday,
      Weekday::Sat => &self.saturday,
      Weekday::Sun => &self.sunday,
    };
    slot.as_deref()
  }

  pub fn set(&mut self, day: Weekday, workout: impl Into<String>) {
    let slot = match day {
      Weekday::Mon => &mut self.monday,
      Weekday::Tue => &mut self.tuesday,
      Weekday::Wed => &mut self.wednesday,
      Weekday::Thu => &mut self.thursday,
      Weekday::Fri => &mut self.friday,
      Weekday::Sat => &mut self.saturday,
      Weekday::Sun => &mut self.sunday,
    };
    *slot = Some(workout.into());
  }

  /// Scheduled days in Monday..Sunday order
  pub fn iter(&self) -> impl Iterator<Item = (Weekday, &str)> + '_ {
    WEEKDAYS
      .iter()
      .filter_map(move |&day| self.get(day).map(|workout| (day, workout)))
  }

  pub fn is_complete(&self) -> bool {
    WEEKDAYS.iter().all(|&day| self.get(day).is_some())
  }
}

/// One week of the reference training plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanWeek {
  pub week_label: String,
  /// `YYYY-MM-DD to YYYY-MM-DD`, inclusive
  pub date_range: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub goal: Option<String>,
  #[serde(default)]
  pub sessions: WeekSessions,
}

impl fmt::Display for PlanWeek {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let header = format!(
      "{} ({}) — {}",
      self.week_label,
      self.date_range,
      self.goal.as_deref().unwrap_or("")
    );
    write!(f, "{}", header.trim())?;
    for (day, workout) in self.sessions.iter() {
      write!(f, "\n  {}: {}", day_name(day), workout)?;
    }
    Ok(())
  }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingPlan {
  pub weeks: Vec<PlanWeek>,
}

/// Workout lookup result for a single date
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayWorkout {
  pub week_label: Option<String>,
  pub weekday: String,
  pub workout: Option<String>,
}

/// One row of a seven-day schedule view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledDay {
  pub date: chrono::NaiveDate,
  pub weekday: String,
  pub week_label: Option<String>,
  pub workout: String,
}
