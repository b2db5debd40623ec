// Runtime abstraction for CLI vs Tauri environments
//
// The `tauri` and `cli` features are mutually exclusive. Each provides a different
// implementation of the NavRuntime trait for their respective environments.

// Compile-time guard: ensure tauri and cli features are mutually exclusive
#[cfg(all(feature = "tauri", feature = "cli"))]
compile_error!("Features 'tauri' and 'cli' are mutually exclusive. Use --features tauri OR --features cli, not both.");

use async_trait::async_trait;
use thiserror::Error;

use crate::navigation::{OffRoutePayload, ProgressPayload};

/// Runtime-specific errors
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("Failed to emit event: {0}")]
    EmitFailed(String),

    #[error("Event receiver closed")]
    ReceiverClosed,
}

/// Events delivered to the consuming UI layer.
#[derive(Debug, Clone, PartialEq)]
pub enum RuntimeEvent {
    /// Guidance state for one progress tick
    ProgressUpdated(ProgressPayload),

    /// The traveler left the corridor of the active route
    OffRoute(OffRoutePayload),

    /// A session was stopped by the caller
    NavigationStopped { session_id: String },

    /// The progress source stopped delivering updates
    SourceClosed { session_id: String },

    /// Generic extensibility
    Custom {
        name: String,
        payload: serde_json::Value,
    },
}

impl RuntimeEvent {
    /// The event name the UI listens on.
    pub fn name(&self) -> &str {
        match self {
            RuntimeEvent::ProgressUpdated(_) => "progressUpdated",
            RuntimeEvent::OffRoute(_) => "offRoute",
            RuntimeEvent::NavigationStopped { .. } => "navigationStopped",
            RuntimeEvent::SourceClosed { .. } => "sourceClosed",
            RuntimeEvent::Custom { name, .. } => name,
        }
    }

    /// The structured payload sent alongside the name.
    pub fn payload(&self) -> serde_json::Value {
        match self {
            RuntimeEvent::ProgressUpdated(p) => serde_json::to_value(p).unwrap_or_default(),
            RuntimeEvent::OffRoute(p) => serde_json::to_value(p).unwrap_or_default(),
            RuntimeEvent::NavigationStopped { session_id }
            | RuntimeEvent::SourceClosed { session_id } => {
                serde_json::json!({ "sessionId": session_id })
            }
            RuntimeEvent::Custom { payload, .. } => payload.clone(),
        }
    }
}

/// Event sink for guidance events.
///
/// This trait is object-safe and intended to be used as `Arc<dyn NavRuntime>`.
/// `emit` is synchronous: the session calls it while holding its state lock,
/// so implementations must not block on the consumer.
#[async_trait]
pub trait NavRuntime: Send + Sync + 'static {
    /// Emit an event to the frontend/output
    ///
    /// # Errors
    /// Returns `RuntimeError::EmitFailed` if the event cannot be delivered
    /// (e.g., receiver dropped, channel full).
    fn emit(&self, event: RuntimeEvent) -> Result<(), RuntimeError>;

    /// Graceful shutdown - flush events, close channels, etc.
    async fn shutdown(&self) -> Result<(), RuntimeError>;
}

// Feature-gated runtime implementations
#[cfg(feature = "cli")]
pub mod cli;
#[cfg(feature = "tauri")]
pub mod tauri;

// Re-exports for convenience (feature-gated)
#[cfg(feature = "cli")]
pub use cli::CliRuntime;
#[cfg(feature = "tauri")]
pub use tauri::TauriRuntime;
