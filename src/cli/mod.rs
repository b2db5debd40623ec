//! CLI module for Wayfarer headless operation.
//!
//! This module drives the same `Navigator` as the Tauri application from the
//! command line: it calculates a route between two coordinates and, when a
//! recorded trip is given, replays it through a navigation session.
//!
//! # Architecture
//!
//! Instead of emitting events to the frontend via Tauri's event system, the
//! CLI runtime sends events through a channel that is consumed by the output
//! handler.
//!
//! ```text
//! +-----------------+     +-------------+     +---------------+
//! | Navigator       | --> | CliRuntime  | --> | output.rs     |
//! | (shared logic)  |     | (emit())    |     | (print/JSON)  |
//! +-----------------+     +-------------+     +---------------+
//! ```

mod args;
mod bootstrap;
mod output;
mod runner;

pub use args::Args;
pub use bootstrap::{initialize, CliContext};
pub use output::{run_event_loop, OutputMode};
pub use runner::execute_trip;
