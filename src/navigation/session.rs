//! Navigation session state machine.
//!
//! A session moves `Idle -> Navigating -> Stopped`; `Idle` and `Stopped`
//! are both valid entry points for a new start. All session state lives in
//! one mutex-guarded core that only `start`, `stop` and the tick handler
//! touch. Every start bumps a generation counter, and a tick is applied only
//! if it was delivered for the current generation, so nothing from a
//! stopped or superseded subscription is observable once `stop`/`start`
//! returns.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::mpsc;
use uuid::Uuid;

use super::progress::ProgressTracker;
use super::source::{LocationRequest, ProgressSource, Subscription};
use super::types::{BannerInstruction, ProgressUpdate};
use crate::error::{NavigationError, Result};
use crate::route::Route;
use crate::runtime::{NavRuntime, RuntimeEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Idle,
    Navigating,
    Stopped,
}

/// Identifies a started session.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionHandle {
    pub session_id: String,
    pub started_at: DateTime<Utc>,
}

struct SessionCore {
    state: SessionState,
    generation: u64,
    session_id: Option<String>,
    active_route: Option<Arc<Route>>,
    tracker: ProgressTracker,
}

impl SessionCore {
    fn is_current(&self, generation: u64) -> bool {
        self.generation == generation && self.state == SessionState::Navigating
    }

    fn teardown(&mut self, state: SessionState) -> Option<String> {
        self.state = state;
        self.generation += 1;
        self.active_route = None;
        self.tracker.reset();
        self.session_id.take()
    }
}

/// Applies the updates of one subscription to the session core.
struct TickHandler {
    core: Arc<Mutex<SessionCore>>,
    runtime: Arc<dyn NavRuntime>,
    generation: u64,
}

impl TickHandler {
    /// Apply one update. Returns `false` once the subscription is stale.
    fn handle(&self, update: ProgressUpdate) -> bool {
        let mut core = self.core.lock();
        if !core.is_current(self.generation) {
            tracing::trace!("Dropping tick from stale subscription");
            return false;
        }

        match core.tracker.apply(&update) {
            Ok(guidance) => {
                // Emit under the lock so a concurrent stop cannot overtake us
                if let Err(e) = self.runtime.emit(guidance.into()) {
                    tracing::warn!("Failed to emit guidance: {}", e);
                }
            }
            Err(e) => {
                tracing::warn!(sample = ?update.sample(), "Skipping malformed tick: {}", e);
            }
        }
        true
    }

    /// The source stopped delivering. The session stays active.
    fn source_closed(&self) {
        let core = self.core.lock();
        if !core.is_current(self.generation) {
            return;
        }

        let session_id = core.session_id.clone().unwrap_or_default();
        tracing::warn!(session = %session_id, "Progress source disconnected");
        if let Err(e) = self.runtime.emit(RuntimeEvent::SourceClosed { session_id }) {
            tracing::warn!("Failed to emit source closed: {}", e);
        }
    }

    async fn run(self, mut updates: mpsc::UnboundedReceiver<ProgressUpdate>) {
        while let Some(update) = updates.recv().await {
            if !self.handle(update) {
                return;
            }
        }
        self.source_closed();
    }
}

/// The stateful navigation core.
pub struct NavigationSession {
    core: Arc<Mutex<SessionCore>>,
    runtime: Arc<dyn NavRuntime>,
    /// Held for the whole of start/stop, which serializes lifecycle changes
    subscription: Mutex<Option<Subscription>>,
}

impl NavigationSession {
    pub fn new(runtime: Arc<dyn NavRuntime>) -> Self {
        Self {
            core: Arc::new(Mutex::new(SessionCore {
                state: SessionState::Idle,
                generation: 0,
                session_id: None,
                active_route: None,
                tracker: ProgressTracker::new(),
            })),
            runtime,
            subscription: Mutex::new(None),
        }
    }

    /// Start navigating `route`, replacing any running session.
    ///
    /// Returns as soon as the subscription is open; guidance events arrive
    /// asynchronously. Must be called within a tokio runtime.
    pub fn start(
        &self,
        route: Arc<Route>,
        source: &dyn ProgressSource,
        request: &LocationRequest,
    ) -> Result<SessionHandle> {
        let tokio_handle = tokio::runtime::Handle::try_current()
            .map_err(|e| NavigationError::Source(e.to_string()))?;

        let mut subscription = self.subscription.lock();

        // Tear down the previous session before anything new is created
        if let Some(previous) = subscription.take() {
            previous.cancel();
        }
        {
            let mut core = self.core.lock();
            if core.state == SessionState::Navigating {
                let previous = core.teardown(SessionState::Stopped);
                tracing::info!(session = ?previous, "Replacing running navigation session");
            }
        }

        let updates = source.subscribe(route.clone(), request)?;

        let session_id = Uuid::new_v4().to_string();
        let generation = {
            let mut core = self.core.lock();
            core.generation += 1;
            core.state = SessionState::Navigating;
            core.session_id = Some(session_id.clone());
            core.active_route = Some(route.clone());
            core.tracker.reset();
            core.generation
        };

        let handler = TickHandler {
            core: self.core.clone(),
            runtime: self.runtime.clone(),
            generation,
        };
        *subscription = Some(Subscription::new(tokio_handle.spawn(handler.run(updates))));

        tracing::info!(
            session = %session_id,
            distance = route.distance_meters,
            legs = route.legs.len(),
            "Navigation started"
        );

        Ok(SessionHandle {
            session_id,
            started_at: Utc::now(),
        })
    }

    /// Stop the running session.
    ///
    /// # Errors
    /// `NoActiveSession` unless the session is navigating.
    pub fn stop(&self) -> Result<()> {
        let mut subscription = self.subscription.lock();

        let session_id = {
            let mut core = self.core.lock();
            if core.state != SessionState::Navigating {
                return Err(NavigationError::NoActiveSession);
            }
            core.teardown(SessionState::Stopped).unwrap_or_default()
        };

        if let Some(active) = subscription.take() {
            active.cancel();
        }

        tracing::info!(session = %session_id, "Navigation stopped");
        if let Err(e) = self
            .runtime
            .emit(RuntimeEvent::NavigationStopped { session_id })
        {
            tracing::warn!("Failed to emit navigation stopped: {}", e);
        }
        Ok(())
    }

    /// Apply an update delivered directly by the host.
    ///
    /// Updates arriving while the session is not navigating are dropped.
    pub fn on_tick(&self, update: ProgressUpdate) {
        let generation = self.core.lock().generation;
        let handler = TickHandler {
            core: self.core.clone(),
            runtime: self.runtime.clone(),
            generation,
        };
        handler.handle(update);
    }

    pub fn state(&self) -> SessionState {
        self.core.lock().state
    }

    pub fn is_navigating(&self) -> bool {
        self.state() == SessionState::Navigating
    }

    pub fn session_id(&self) -> Option<String> {
        self.core.lock().session_id.clone()
    }

    pub fn active_route(&self) -> Option<Arc<Route>> {
        self.core.lock().active_route.clone()
    }

    pub fn sticky_instruction(&self) -> Option<BannerInstruction> {
        self.core.lock().tracker.sticky_instruction().cloned()
    }
}
