//! Flat JSON-file store for the runner profile, notes, and last generated plan

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{NaiveDateTime, SubsecRound};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{TrainingSummary, WeekSessions};

#[derive(Debug, Error)]
pub enum MemoryError {
  #[error("Failed to access memory file: {0}")]
  Io(#[from] std::io::Error),

  #[error("Invalid memory document: {0}")]
  Json(#[from] serde_json::Error),

  #[error("Note text is empty")]
  EmptyNote,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
  pub time: NaiveDateTime,
  pub text: String,
}

/// The most recent model-generated seven-day plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LastPlan {
  pub generated_at: NaiveDateTime,
  pub summary: TrainingSummary,
  pub plan: WeekSessions,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoachMemory {
  /// Free-form profile (goal race, availability, long run day, ...)
  #[serde(default)]
  pub runner_profile: serde_json::Map<String, serde_json::Value>,
  #[serde(default)]
  pub notes: Vec<Note>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub last_plan: Option<LastPlan>,
}

impl CoachMemory {
  pub fn add_note(&mut self, text: &str, time: NaiveDateTime) -> Result<&Note, MemoryError> {
    let text = text.trim();
    if text.is_empty() {
      return Err(MemoryError::EmptyNote);
    }

    self.notes.push(Note {
      time: time.trunc_subsecs(0),
      text: text.to_string(),
    });
    Ok(&self.notes[self.notes.len() - 1])
  }

  /// The last `count` notes, oldest first
  pub fn recent_notes(&self, count: usize) -> &[Note] {
    &self.notes[self.notes.len().saturating_sub(count)..]
  }
}

/// File-backed [`CoachMemory`]; every call reads or writes the whole file
#[derive(Debug, Clone)]
pub struct MemoryStore {
  path: PathBuf,
}

impl MemoryStore {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self { path: path.into() }
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  /// Load memory, starting empty if the file does not exist yet
  pub fn load(&self) -> Result<CoachMemory, MemoryError> {
    match fs::read_to_string(&self.path) {
      Ok(contents) => Ok(serde_json::from_str(&contents)?),
      Err(e) if e.kind() == ErrorKind::NotFound => {
        tracing::info!(path = %self.path.display(), "No memory file yet, starting empty");
        Ok(CoachMemory::default())
      }
      Err(e) => Err(e.into()),
    }
  }

  pub fn save(&self, memory: &CoachMemory) -> Result<(), MemoryError> {
    fs::write(&self.path, serde_json::to_string_pretty(memory)?)?;
    Ok(())
  }

  /// Append a note and persist it
  pub fn add_note(&self, text: &str, time: NaiveDateTime) -> Result<Note, MemoryError> {
    let mut memory = self.load()?;
    let note = memory.add_note(text, time)?.clone();
    self.save(&memory)?;
    tracing::debug!(notes = memory.notes.len(), "Saved note");
    Ok(note)
  }
}
