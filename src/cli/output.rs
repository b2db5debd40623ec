//! CLI output handling - Event receiver loop.
//!
//! Receives events from the navigator via the runtime channel and renders
//! them according to the output mode (terminal, JSON, or quiet).

use std::io::{self, Write};

use anyhow::Result;
use tokio::sync::{mpsc, oneshot};

use crate::navigation::{OffRoutePayload, ProgressPayload};
use crate::runtime::RuntimeEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Terminal,
    Json,
    Quiet,
}

impl OutputMode {
    /// JSON wins over quiet so scripts always get the full event stream.
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if json {
            OutputMode::Json
        } else if quiet {
            OutputMode::Quiet
        } else {
            OutputMode::Terminal
        }
    }
}

/// Run the event loop until every sender is gone.
///
/// `source_closed` fires once, the first time the progress source reports
/// that it has no more updates, so the runner can end the trip.
pub async fn run_event_loop(
    mut event_rx: mpsc::UnboundedReceiver<RuntimeEvent>,
    mode: OutputMode,
    source_closed: Option<oneshot::Sender<()>>,
) -> Result<()> {
    let mut source_closed = source_closed;

    while let Some(event) = event_rx.recv().await {
        if let Some(line) = render(&event, mode) {
            println!("{}", line);
            io::stdout().flush()?;
        }

        if matches!(event, RuntimeEvent::SourceClosed { .. }) {
            if let Some(tx) = source_closed.take() {
                let _ = tx.send(());
            }
        }
    }

    Ok(())
}

/// Render one event, or `None` when the mode hides it.
fn render(event: &RuntimeEvent, mode: OutputMode) -> Option<String> {
    match mode {
        OutputMode::Json => {
            let json = serde_json::json!({
                "event": event.name(),
                "payload": event.payload(),
            });
            Some(json.to_string())
        }
        OutputMode::Terminal => Some(render_terminal(event)),
        OutputMode::Quiet => match event {
            RuntimeEvent::OffRoute(_) => Some(render_terminal(event)),
            RuntimeEvent::Custom { name, .. } if name == "routeCalculated" => {
                Some(render_terminal(event))
            }
            _ => None,
        },
    }
}

fn render_terminal(event: &RuntimeEvent) -> String {
    match event {
        RuntimeEvent::ProgressUpdated(payload) => render_progress(payload),
        RuntimeEvent::OffRoute(OffRoutePayload { location }) => format!(
            "[off-route] at {:.5}, {:.5}",
            location.latitude, location.longitude
        ),
        RuntimeEvent::NavigationStopped { session_id } => {
            format!("[stopped] session {}", session_id)
        }
        RuntimeEvent::SourceClosed { .. } => "[source] no more location updates".to_string(),
        RuntimeEvent::Custom { name, payload } if name == "routeCalculated" => {
            let distance = payload["distanceMeters"].as_f64().unwrap_or_default();
            let duration = payload["durationSeconds"].as_f64().unwrap_or_default();
            let steps: usize = payload["legs"]
                .as_array()
                .map(|legs| {
                    legs.iter()
                        .filter_map(|leg| leg["steps"].as_array())
                        .map(Vec::len)
                        .sum()
                })
                .unwrap_or_default();
            format!(
                "[route] {}, {} ({} steps)",
                format_distance(distance),
                format_duration(duration),
                steps
            )
        }
        RuntimeEvent::Custom { name, payload } => format!("[{}] {}", name, payload),
    }
}

fn render_progress(payload: &ProgressPayload) -> String {
    let remaining = format!(
        "{}, {} remaining",
        format_distance(payload.remaining_distance),
        format_duration(payload.remaining_duration)
    );

    match payload.current_step {
        Some(ref step) => format!(
            "[{}] {} in {} | {}",
            step.direction,
            step.text,
            format_distance(step.distance_to_end),
            remaining
        ),
        None => format!("[progress] {}", remaining),
    }
}

/// Format meters for display: whole meters below 1 km, one decimal above.
fn format_distance(meters: f64) -> String {
    if meters < 1000.0 {
        format!("{:.0} m", meters.max(0.0))
    } else {
        format!("{:.1} km", meters / 1000.0)
    }
}

/// Format seconds as `Xh Ym`, `Ym`, or `Xs`.
fn format_duration(seconds: f64) -> String {
    let total = seconds.max(0.0).round() as u64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;

    if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else if minutes > 0 {
        format!("{} min", minutes)
    } else {
        format!("{}s", total)
    }
}
