use crate::activities::{load_activities, ActivityError};
use crate::config::Config;
use crate::memory::MemoryStore;
use crate::models::{ActivityTable, TrainingPlan};
use crate::plan::{load_plan, PlanError};

/// Application state shared by every command
///
/// Files are read when a command needs them, so a missing plan does not stop
/// `status` from working.
#[derive(Debug, Clone)]
pub struct AppState {
  pub config: Config,
  pub memory: MemoryStore,
}

impl AppState {
  pub fn new(config: Config) -> Self {
    let memory = MemoryStore::new(&config.memory_path);
    Self { config, memory }
  }

  /// Read the activity export
  pub fn activities(&self) -> Result<ActivityTable, ActivityError> {
    tracing::debug!(path = %self.config.activities_path.display(), "Loading activity export");
    load_activities(&self.config.activities_path)
  }

  /// Read and validate the reference plan
  pub fn plan(&self) -> Result<TrainingPlan, PlanError> {
    tracing::debug!(path = %self.config.plan_path.display(), "Loading reference plan");
    load_plan(&self.config.plan_path)
  }
}
