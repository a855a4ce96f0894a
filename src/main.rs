use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
  run_coach_lib::run().await
}
