//! CLI bootstrap - Initialize the navigation stack for CLI usage.
//!
//! This module provides `CliContext` which wires the same `Navigator` as the
//! Tauri application, with a channel-backed runtime in place of the webview.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tracing_subscriber::filter::LevelFilter;

use crate::directions::{DirectionsProvider, MapboxDirections, RecordedDirections, TravelMode};
use crate::navigation::{ChannelSource, ProgressSource, ReplaySource};
use crate::navigator::Navigator;
use crate::runtime::{CliRuntime, NavRuntime, RuntimeEvent};
use crate::settings::{SettingsManager, WayfarerSettings};

use super::args::Args;

/// Context for CLI execution containing all initialized services.
///
/// This mirrors the Tauri `AppState` but is owned rather than managed by Tauri.
pub struct CliContext {
    /// Channel-backed runtime; the runner swaps its sender per trip
    pub runtime: Arc<CliRuntime>,

    pub navigator: Arc<Navigator>,

    /// Travel mode resolved from args and settings
    pub mode: TravelMode,

    /// Command-line arguments
    pub args: Args,
}

impl CliContext {
    /// Graceful shutdown - stop any running session and close the runtime.
    pub async fn shutdown(self) -> Result<()> {
        if self.navigator.is_navigating() {
            if let Err(e) = self.navigator.stop_navigation() {
                tracing::warn!("Failed to stop navigation: {}", e);
            }
        }

        if let Err(e) = self.runtime.shutdown().await {
            tracing::warn!("Runtime shutdown error: {}", e);
        }

        Ok(())
    }
}

/// Initialize the CLI context with all services.
///
/// This mirrors what happens in the Tauri app's `AppState::new()`.
pub async fn initialize(args: &Args) -> Result<CliContext> {
    // Install TLS provider (required for rustls 0.23+)
    let _ = rustls::crypto::ring::default_provider().install_default();

    // Load .env file if present
    if let Err(e) = dotenvy::dotenv() {
        // Only warn on errors other than file not found
        if !matches!(e, dotenvy::Error::Io(_)) {
            tracing::warn!("Failed to load .env file: {}", e);
        }
    }

    // Load settings first so the log level can come from them
    let settings_manager = SettingsManager::new()
        .await
        .context("Failed to initialize settings manager")?;

    // Initialize logging: --verbose wins over advanced.log_level
    let log_level = if args.verbose {
        LevelFilter::DEBUG
    } else {
        settings_manager.get().await.advanced.log_level_filter()
    };
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(format!("wayfarer={}", log_level).parse()?),
        )
        .try_init();

    // Ensure settings file exists (creates template on first run)
    if let Err(e) = settings_manager.ensure_settings_file().await {
        tracing::warn!("Failed to create settings template: {}", e);
    }

    let settings = settings_manager.get().await;

    if args.verbose {
        eprintln!(
            "[cli] Settings loaded from {}",
            settings_manager.path().display()
        );
        eprintln!("[cli] Directions endpoint: {}", settings.directions.base_url);
    }

    // The runner installs a live sender for each trip
    let (event_tx, _) = mpsc::unbounded_channel::<RuntimeEvent>();
    let runtime = Arc::new(CliRuntime::new(event_tx));

    let directions = build_directions(&settings, args)?;
    let source = build_source(args);
    let navigator = Navigator::new(
        runtime.clone(),
        directions,
        source,
        settings.location.clone(),
    );

    if let Some(token) = resolve_access_token(args, settings_manager.mapbox_token().await) {
        navigator.set_credential(token);
    }
    if !navigator.has_credential() {
        tracing::warn!(
            "No Mapbox access token configured; set api_keys.mapbox, MAPBOX_ACCESS_TOKEN or --access-token"
        );
    }

    let mode = args.mode.unwrap_or(settings.directions.default_mode);
    if args.verbose {
        eprintln!("[cli] Travel mode: {}", mode);
    }

    Ok(CliContext {
        runtime,
        navigator: Arc::new(navigator),
        mode,
        args: args.clone(),
    })
}

fn build_directions(settings: &WayfarerSettings, args: &Args) -> Result<Arc<dyn DirectionsProvider>> {
    if let Some(ref path) = args.directions_file {
        if args.verbose {
            eprintln!("[cli] Directions from file: {}", path.display());
        }
        return Ok(Arc::new(RecordedDirections::new(path)));
    }

    let mapbox = MapboxDirections::from_settings(&settings.directions)
        .context("Invalid directions settings")?;
    Ok(Arc::new(mapbox))
}

fn build_source(args: &Args) -> Arc<dyn ProgressSource> {
    match args.replay {
        Some(ref path) => {
            let mut source = ReplaySource::new(path);
            if let Some(pace_ms) = args.pace_ms {
                source = source.with_pace(Duration::from_millis(pace_ms));
            }
            Arc::new(source)
        }
        None => Arc::new(ChannelSource::new()),
    }
}

/// Resolve the access token: CLI argument (or its env var) first, then
/// settings with environment fallback.
fn resolve_access_token(args: &Args, from_settings: Option<String>) -> Option<String> {
    args.access_token
        .clone()
        .filter(|token| !token.trim().is_empty())
        .or(from_settings)
}
