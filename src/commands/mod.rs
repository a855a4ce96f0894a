//! Command handlers behind the CLI
//!
//! Each handler takes the shared [`AppState`](crate::state::AppState) and
//! returns user-facing error strings.

pub mod coach;
pub mod history;
pub mod plan;
pub mod status;
