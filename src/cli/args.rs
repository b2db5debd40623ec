//! CLI argument parsing using clap.
//!
//! Defines the command-line interface for wayfarer-cli.

use clap::Parser;
use std::path::PathBuf;

use crate::directions::TravelMode;
use crate::route::Coordinate;

/// Wayfarer CLI - Headless turn-by-turn navigation
#[derive(Parser, Debug, Clone)]
#[command(name = "wayfarer-cli")]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Trip origin as LAT,LON
    #[arg(long, value_parser = parse_coordinate, allow_hyphen_values = true)]
    pub origin: Option<Coordinate>,

    /// Trip destination as LAT,LON
    #[arg(long, value_parser = parse_coordinate, allow_hyphen_values = true)]
    pub destination: Option<Coordinate>,

    /// Travel mode (default from settings)
    ///
    /// Options: driving, walking
    #[arg(short = 'm', long, value_parser = parse_mode)]
    pub mode: Option<TravelMode>,

    /// Mapbox access token (overrides settings and env vars)
    #[arg(long, env = "WAYFARER_ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: Option<String>,

    /// Replay a recorded trip (JSON lines of progress updates) after routing
    #[arg(long)]
    pub replay: Option<PathBuf>,

    /// Delay between replayed updates in milliseconds (default: location interval)
    #[arg(long, requires = "replay")]
    pub pace_ms: Option<u64>,

    /// Answer directions from a saved response file instead of the network
    #[arg(long)]
    pub directions_file: Option<PathBuf>,

    /// Output events as JSON lines (for scripting/parsing)
    #[arg(long)]
    pub json: bool,

    /// Only output the route summary and off-route warnings
    #[arg(long, short = 'q')]
    pub quiet: bool,

    /// Show verbose output (debug information)
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

/// Parse a `LAT,LON` pair.
///
/// Range checks are left to the directions request, which treats an
/// out-of-range endpoint as missing.
fn parse_coordinate(value: &str) -> Result<Coordinate, String> {
    let (lat, lon) = value
        .split_once(',')
        .ok_or_else(|| format!("expected LAT,LON but got '{}'", value))?;

    let latitude = lat
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("invalid latitude '{}': {}", lat.trim(), e))?;
    let longitude = lon
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("invalid longitude '{}': {}", lon.trim(), e))?;

    Ok(Coordinate::new(latitude, longitude))
}

fn parse_mode(value: &str) -> Result<TravelMode, String> {
    value.parse().map_err(|e: crate::error::NavigationError| e.to_string())
}
