#[cfg(test)]
#[macro_use]
mod test_utils;

pub mod activities;
pub mod analysis;
pub mod cli;
pub mod commands;
pub mod config;
pub mod history;
pub mod llm;
pub mod memory;
pub mod models;
pub mod plan;
pub mod prompts;
pub mod state;
pub mod units;

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::Cli;
use config::Config;
use state::AppState;

/// Logs go to stderr so command output stays clean on stdout
fn init_tracing(verbose: bool) {
  let default_level = if verbose { "debug" } else { "info" };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .with_target(false)
    .init();
}

pub async fn run() -> ExitCode {
  let cli = Cli::parse();
  init_tracing(cli.verbose);

  // Load environment variables from .env file
  let config = match Config::from_env() {
    Ok(config) => cli.apply_overrides(config),
    Err(e) => {
      eprintln!("Error: {}", e);
      return ExitCode::FAILURE;
    }
  };

  let state = AppState::new(config);
  match cli::execute(&state, cli.command).await {
    Ok(()) => ExitCode::SUCCESS,
    Err(e) => {
      eprintln!("Error: {}", e);
      ExitCode::FAILURE
    }
  }
}
