//! Wayfarer CLI - Headless turn-by-turn navigation
//!
//! This binary calculates a route with the same navigator the GUI uses and
//! can replay a recorded trip through a navigation session, enabling
//! automated testing, scripting, and headless operation.
//!
//! # Usage
//!
//! ```bash
//! # Build the CLI binary
//! cargo build --features cli --no-default-features --bin wayfarer-cli
//!
//! # Calculate a route
//! ./target/debug/wayfarer-cli --origin 37.7,-122.4 --destination 37.8,-122.5
//!
//! # Walk it and replay a recorded trip
//! ./target/debug/wayfarer-cli --origin 37.7,-122.4 --destination 37.8,-122.5 \
//!     --mode walking --replay trip.jsonl
//!
//! # JSON output for scripting
//! ./target/debug/wayfarer-cli --origin 37.7,-122.4 --destination 37.8,-122.5 --json | jq .
//! ```
//!
//! # Features
//!
//! This binary requires the `cli` feature flag and is mutually exclusive
//! with the `tauri` feature (GUI application).

use anyhow::Result;
use clap::Parser;

use wayfarer_lib::cli::{execute_trip, initialize, Args};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let ctx = initialize(&args).await?;

    let result = execute_trip(&ctx).await;

    // Graceful shutdown
    ctx.shutdown().await?;

    result
}
