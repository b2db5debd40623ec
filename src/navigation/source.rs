//! Position/progress sources and their subscriptions.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::types::ProgressUpdate;
use crate::error::{NavigationError, Result};
use crate::route::Route;

/// Accuracy/power trade-off requested from the positioning subsystem.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationPriority {
    #[default]
    HighAccuracy,
    Balanced,
    LowPower,
    Passive,
}

/// Sampling policy a subscription is opened with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationRequest {
    /// Desired interval between samples
    pub interval_ms: u64,

    /// Longest the source may batch samples before delivering them
    pub max_wait_ms: u64,

    pub priority: LocationPriority,
}

impl Default for LocationRequest {
    fn default() -> Self {
        Self {
            interval_ms: 1000,
            max_wait_ms: 3000,
            priority: LocationPriority::HighAccuracy,
        }
    }
}

impl LocationRequest {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

/// Supplier of location samples and route progress for an active route.
///
/// Each call to `subscribe` opens an independent, ordered stream with one
/// update per position fix: `OffRoute` when the fix left the route corridor,
/// `Progress` otherwise. The stream ends when the source stops delivering;
/// dropping the receiver tells the source to stop.
pub trait ProgressSource: Send + Sync + 'static {
    fn subscribe(
        &self,
        route: Arc<Route>,
        request: &LocationRequest,
    ) -> Result<mpsc::UnboundedReceiver<ProgressUpdate>>;
}

/// Handle on the task draining one subscription.
///
/// Cancelling or dropping the handle stops delivery.
pub struct Subscription {
    task: JoinHandle<()>,
}

impl Subscription {
    pub(crate) fn new(task: JoinHandle<()>) -> Self {
        Self { task }
    }

    pub fn cancel(self) {
        self.task.abort();
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.task.abort();
    }
}

// ============================================================================
// ChannelSource - updates pushed in by the host
// ============================================================================

/// Source fed by the host, e.g. a UI forwarding platform location callbacks.
///
/// Only the latest subscription receives pushed updates; subscribing again
/// closes the previous stream.
#[derive(Default)]
pub struct ChannelSource {
    sender: Mutex<Option<mpsc::UnboundedSender<ProgressUpdate>>>,
}

impl ChannelSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver an update to the current subscriber.
    ///
    /// Push exactly one update per fix. A host whose platform reports
    /// progress and off-route in separate callbacks merges them into a
    /// single `ProgressUpdate::OffRoute` carrying the snapshot.
    pub fn push(&self, update: ProgressUpdate) -> Result<()> {
        let sender = self.sender.lock();
        let tx = sender
            .as_ref()
            .ok_or_else(|| NavigationError::Source("no active subscription".to_string()))?;

        tx.send(update)
            .map_err(|_| NavigationError::Source("subscription closed".to_string()))
    }

    /// End the current stream, as a disconnected positioning service would.
    pub fn close(&self) {
        self.sender.lock().take();
    }
}

impl ProgressSource for ChannelSource {
    fn subscribe(
        &self,
        _route: Arc<Route>,
        request: &LocationRequest,
    ) -> Result<mpsc::UnboundedReceiver<ProgressUpdate>> {
        let (tx, rx) = mpsc::unbounded_channel();
        tracing::debug!(
            interval_ms = request.interval_ms,
            priority = ?request.priority,
            "Opening channel subscription"
        );
        *self.sender.lock() = Some(tx);
        Ok(rx)
    }
}

// ============================================================================
// ReplaySource - recorded trip from a JSON-lines file
// ============================================================================

/// Source that replays a recorded trip.
///
/// The file holds one JSON-encoded [`ProgressUpdate`] per line. Blank lines
/// and lines starting with `#` are ignored; lines that fail to parse are
/// logged and skipped. Updates are paced at the request interval unless a
/// pace override is set.
pub struct ReplaySource {
    path: PathBuf,
    pace: Option<Duration>,
}

impl ReplaySource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            pace: None,
        }
    }

    /// Override the delay between replayed updates.
    pub fn with_pace(mut self, pace: Duration) -> Self {
        self.pace = Some(pace);
        self
    }
}

impl ProgressSource for ReplaySource {
    fn subscribe(
        &self,
        _route: Arc<Route>,
        request: &LocationRequest,
    ) -> Result<mpsc::UnboundedReceiver<ProgressUpdate>> {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| NavigationError::Source(e.to_string()))?;

        let (tx, rx) = mpsc::unbounded_channel();
        let path = self.path.clone();
        let pace = self.pace.unwrap_or_else(|| request.interval());

        runtime.spawn(async move {
            if let Err(e) = replay(path.clone(), pace, tx).await {
                tracing::warn!("Replay of {:?} ended early: {}", path, e);
            }
        });

        Ok(rx)
    }
}

async fn replay(
    path: PathBuf,
    pace: Duration,
    tx: mpsc::UnboundedSender<ProgressUpdate>,
) -> std::io::Result<()> {
    let file = tokio::fs::File::open(&path).await?;
    let mut lines = BufReader::new(file).lines();
    let mut line_number = 0usize;
    let mut delivered = 0usize;

    while let Some(line) = lines.next_line().await? {
        line_number += 1;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let update: ProgressUpdate = match serde_json::from_str(line) {
            Ok(update) => update,
            Err(e) => {
                tracing::warn!("Skipping replay line {}: {}", line_number, e);
                continue;
            }
        };

        if delivered > 0 && !pace.is_zero() {
            tokio::time::sleep(pace).await;
        }

        if tx.send(update).is_err() {
            // Subscriber went away
            return Ok(());
        }
        delivered += 1;
    }

    tracing::debug!("Replay of {:?} finished after {} update(s)", path, delivered);
    Ok(())
}
