//! Command-line interface
//!
//! ```bash
//! run-coach status
//! run-coach plan week 3
//! run-coach plan schedule --start 2024-01-06
//! run-coach note "left calf tight after intervals"
//! run-coach chat "Should I move Saturday's long run?"
//! run-coach shell
//! ```

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use chrono::{Local, NaiveDate, NaiveDateTime};
use clap::{Parser, Subcommand};

use crate::commands::{coach, history, plan, status};
use crate::config::Config;
use crate::memory::{LastPlan, Note};
use crate::models::plan::day_name;
use crate::models::{DayWorkout, RunnerHistory, ScheduledDay, TrainingSummary};
use crate::plan::REST_DAY;
use crate::state::AppState;

/// ---------------------------------------------------------------------------
/// Arguments
/// ---------------------------------------------------------------------------

#[derive(Debug, Parser)]
#[command(
  name = "run-coach",
  version,
  about = "Running coach over a Strava activity export",
  long_about = "Summarizes recent training, answers questions about a reference plan, and asks a language model for coaching."
)]
pub struct Cli {
  #[command(subcommand)]
  pub command: Command,

  /// Activity export CSV
  #[arg(long, global = true)]
  pub activities: Option<PathBuf>,

  /// Reference plan JSON
  #[arg(long, global = true)]
  pub plan: Option<PathBuf>,

  /// Memory JSON (profile, notes, last plan)
  #[arg(long, global = true)]
  pub memory: Option<PathBuf>,

  /// Runner history JSON
  #[arg(long, global = true)]
  pub history: Option<PathBuf>,

  /// Lookback window for the training summary, in days
  #[arg(long, global = true, value_parser = clap::value_parser!(i64).range(1..))]
  pub lookback_days: Option<i64>,

  /// Enable debug logging
  #[arg(long, short = 'v', global = true)]
  pub verbose: bool,
}

impl Cli {
  /// Command-line paths win over the environment
  pub fn apply_overrides(&self, mut config: Config) -> Config {
    if let Some(path) = &self.activities {
      config.activities_path = path.clone();
    }
    if let Some(path) = &self.plan {
      config.plan_path = path.clone();
    }
    if let Some(path) = &self.memory {
      config.memory_path = path.clone();
    }
    if let Some(path) = &self.history {
      config.history_path = path.clone();
    }
    if let Some(days) = self.lookback_days {
      config.lookback_days = days;
    }
    config
  }
}

#[derive(Debug, Subcommand)]
pub enum Command {
  /// Training summary, recent notes, and history highlights
  Status,

  /// Training summary for a custom window
  Summary {
    /// Days back from the most recent activity
    #[arg(long)]
    days: Option<i64>,
  },

  /// Long-horizon runner history
  History {
    #[command(subcommand)]
    action: HistoryCommand,
  },

  /// Reference plan lookups
  Plan {
    #[command(subcommand)]
    action: PlanCommand,
  },

  /// Save a note for the coach
  Note {
    #[arg(required = true, trailing_var_arg = true)]
    text: Vec<String>,
  },

  /// Show recent notes
  Notes {
    #[arg(long, short = 'n', default_value = "5")]
    count: usize,
  },

  /// Show the runner profile
  Profile,

  /// Ask the coach a question
  Chat {
    #[arg(required = true, trailing_var_arg = true)]
    question: Vec<String>,
  },

  /// Generate a new seven-day plan
  Generate,

  /// Show the last generated plan
  Last,

  /// Interactive session
  Shell,
}

#[derive(Debug, Subcommand)]
pub enum HistoryCommand {
  /// Rebuild the history document from the full export
  Build,
  /// Print the stored history document
  Show,
}

#[derive(Debug, Subcommand)]
pub enum PlanCommand {
  /// Today's planned workout
  Today,
  /// Tomorrow's planned workout
  Tomorrow,
  /// The planned workout on a date
  On {
    #[arg(value_parser = parse_date)]
    date: NaiveDate,
  },
  /// A plan week by number or label
  Week {
    #[arg(required = true, trailing_var_arg = true)]
    week: Vec<String>,
  },
  /// Seven days of workouts, rest days shown as OFF
  Schedule {
    /// First day (defaults to today)
    #[arg(long, value_parser = parse_date)]
    start: Option<NaiveDate>,
  },
  /// The next plan week after today
  Next,
}

/// A line typed into the interactive shell
#[derive(Debug, Parser)]
#[command(no_binary_name = true, disable_help_flag = true, disable_version_flag = true)]
struct ShellLine {
  #[command(subcommand)]
  command: Command,
}

fn parse_date(value: &str) -> Result<NaiveDate, String> {
  NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| format!("expected YYYY-MM-DD, got '{}'", value))
}

fn now() -> NaiveDateTime {
  Local::now().naive_local()
}

/// ---------------------------------------------------------------------------
/// Dispatch
/// ---------------------------------------------------------------------------

/// Run one command, or the interactive shell
pub async fn execute(state: &AppState, command: Command) -> Result<(), String> {
  match command {
    Command::Shell => shell(state).await,
    other => run_command(state, other).await,
  }
}

async fn run_command(state: &AppState, command: Command) -> Result<(), String> {
  match command {
    Command::Status => {
      let report = status::get_status(state)?;
      println!("{}", format_summary(&report.training_summary));
      if let Some(history) = &report.runner_history {
        println!("{}", format_history_highlights(history));
      }
      println!("\nRecent notes:");
      println!("{}", format_notes(&report.notes));
    }
    Command::Summary { days } => {
      let summary = status::get_training_summary(state, days)?;
      println!("{}", format_summary(&summary));
    }
    Command::History { action } => match action {
      HistoryCommand::Build => {
        let built = history::build_runner_history(state, now())?;
        println!(
          "Wrote {} ({} runs, {} to {})",
          state.config.history_path.display(),
          built.runs_count_total,
          built.date_range.start,
          built.date_range.end
        );
      }
      HistoryCommand::Show => match history::get_runner_history(state)? {
        Some(stored) => println!("{}", to_pretty_json(&stored)?),
        None => println!("No runner history yet. Run: history build"),
      },
    },
    Command::Plan { action } => run_plan_command(state, action)?,
    Command::Note { text } => {
      let note = coach::add_note(state, &text.join(" "), now())?;
      println!("Saved note ({})", note.time.format("%Y-%m-%d %H:%M"));
    }
    Command::Notes { count } => {
      println!("{}", format_notes(&coach::get_notes(state, count)?));
    }
    Command::Profile => {
      println!("{}", to_pretty_json(&coach::get_profile(state)?)?);
    }
    Command::Chat { question } => {
      let answer = coach::coach_chat(state, &question.join(" "), now()).await?;
      println!("{}", answer);
    }
    Command::Generate => {
      let generated = coach::generate_plan(state, now()).await?;
      println!("{}", format_last_plan(&generated));
    }
    Command::Last => match coach::get_last_plan(state)? {
      Some(last) => println!("{}", format_last_plan(&last)),
      None => println!("No plan generated yet. Run: generate"),
    },
    Command::Shell => return Err("Already in the shell".to_string()),
  }
  Ok(())
}

fn run_plan_command(state: &AppState, action: PlanCommand) -> Result<(), String> {
  let today = now().date();
  match action {
    PlanCommand::Today => println!("{}", format_day("Today", today, &plan::get_workout_on(state, today)?)),
    PlanCommand::Tomorrow => {
      let tomorrow = today.succ_opt().ok_or("Date out of range")?;
      println!(
        "{}",
        format_day("Tomorrow", tomorrow, &plan::get_workout_on(state, tomorrow)?)
      );
    }
    PlanCommand::On { date } => {
      println!("{}", format_day("On", date, &plan::get_workout_on(state, date)?));
    }
    PlanCommand::Week { week } => println!("{}", plan::get_plan_week(state, &week.join(" "))?),
    PlanCommand::Schedule { start } => {
      let schedule = plan::get_week_schedule(state, start.unwrap_or(today))?;
      println!("{}", format_schedule(&schedule));
    }
    PlanCommand::Next => match plan::get_next_week(state, today)? {
      Some(week) => println!("{}", week),
      None => println!("No upcoming plan weeks"),
    },
  }
  Ok(())
}

/// Read commands from stdin until `exit` or end of input
async fn shell(state: &AppState) -> Result<(), String> {
  println!("run-coach shell. Type 'help' for commands, 'exit' to quit.");
  let stdin = io::stdin();
  let mut lines = stdin.lock().lines();

  loop {
    print!("coach> ");
    io::stdout().flush().map_err(|e| format!("Failed to write prompt: {}", e))?;

    let Some(line) = lines.next() else { break };
    let line = line.map_err(|e| format!("Failed to read input: {}", e))?;
    let words: Vec<&str> = line.split_whitespace().collect();

    match words.as_slice() {
      [] => continue,
      ["exit"] | ["quit"] => break,
      ["help"] => {
        println!("status | summary [--days N] | history build|show | plan today|tomorrow|on DATE|week N|schedule|next");
        println!("note TEXT | notes | profile | chat QUESTION | generate | last | exit");
        continue;
      }
      _ => {}
    }

    match ShellLine::try_parse_from(words) {
      Ok(parsed) => {
        if let Err(e) = run_command(state, parsed.command).await {
          eprintln!("Error: {}", e);
        }
      }
      Err(e) => eprintln!("{}", e),
    }
  }

  Ok(())
}

/// ---------------------------------------------------------------------------
/// Output Formatting
/// ---------------------------------------------------------------------------

fn to_pretty_json<T: serde::Serialize>(value: &T) -> Result<String, String> {
  serde_json::to_string_pretty(value).map_err(|e| format!("Failed to format output: {}", e))
}

pub fn format_summary(summary: &TrainingSummary) -> String {
  format!(
    "Last {} days: {} runs, {:.2} mi\n  Avg weekly (last 4 weeks): {:.2} mi\n  Max week: {:.2} mi\n  Last week: {:.2} mi",
    summary.days_back,
    summary.runs_count,
    summary.total_miles,
    summary.avg_weekly_miles_last_4_weeks,
    summary.max_weekly_miles,
    summary.last_week_miles
  )
}

fn format_history_highlights(history: &RunnerHistory) -> String {
  let mut out = format!(
    "History: {} runs from {} to {}",
    history.runs_count_total, history.date_range.start, history.date_range.end
  );
  if let Some(band) = &history.pace_band_last_8_weeks_min_per_mile {
    out.push_str(&format!(
      "\n  Pace band (8 weeks): {:.2} / {:.2} / {:.2} min/mi",
      band.p20, band.p50, band.p80
    ));
  }
  out
}

pub fn format_notes(notes: &[Note]) -> String {
  if notes.is_empty() {
    return "  (none)".to_string();
  }
  notes
    .iter()
    .map(|n| format!("  {}  {}", n.time.format("%Y-%m-%d %H:%M"), n.text))
    .collect::<Vec<_>>()
    .join("\n")
}

pub fn format_day(prefix: &str, date: NaiveDate, day: &DayWorkout) -> String {
  let week = day
    .week_label
    .as_deref()
    .map(|label| format!(" [{}]", label))
    .unwrap_or_default();
  let workout = day.workout.as_deref().unwrap_or("No planned workout");
  format!("{} ({}, {}){}: {}", prefix, day.weekday, date, week, workout)
}

pub fn format_schedule(schedule: &[ScheduledDay]) -> String {
  schedule
    .iter()
    .map(|d| {
      format!(
        "{} {:<9} {:<10} {}",
        d.date,
        d.weekday,
        d.week_label.as_deref().unwrap_or("-"),
        d.workout
      )
    })
    .collect::<Vec<_>>()
    .join("\n")
}

fn format_last_plan(last: &LastPlan) -> String {
  let mut out = format!("Plan generated {}", last.generated_at.format("%Y-%m-%d %H:%M"));
  for day in crate::models::plan::WEEKDAYS {
    out.push_str(&format!(
      "\n  {}: {}",
      day_name(day),
      last.plan.get(day).unwrap_or(REST_DAY)
    ));
  }
  out
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
