pub mod activity;
pub mod history;
pub mod plan;
pub mod summary;

pub use activity::{ActivityRecord, ActivityTable, ColumnLayout, DurationColumn};
pub use history::{BestEffort, BestEfforts, DateRange, PaceBand, RunnerHistory, WeeklyMileage};
pub use plan::{DayWorkout, PlanWeek, ScheduledDay, TrainingPlan, WeekSessions};
pub use summary::{TrainingSummary, WeeklyBucket};
