//! Navigation session core.
//!
//! Converts a stream of location samples and route-progress snapshots into
//! guidance events:
//!
//! ```text
//! +----------------+     +-------------------+     +-----------------+     +------------+
//! | ProgressSource | --> | NavigationSession | --> | ProgressTracker | --> | NavRuntime |
//! | (subscription) |     | (state machine)   |     | (derivation)    |     | (emit())   |
//! +----------------+     +-------------------+     +-----------------+     +------------+
//! ```

mod progress;
mod session;
mod source;
mod types;

pub use progress::{haversine, Guidance, ProgressTracker, TickError, EARTH_RADIUS_M};
pub use session::{NavigationSession, SessionHandle, SessionState};
pub use source::{
    ChannelSource, LocationPriority, LocationRequest, ProgressSource, ReplaySource, Subscription,
};
pub use types::{
    BannerInstruction, CurrentStep, LocationSample, OffRoutePayload, ProgressPayload,
    ProgressSnapshot, ProgressUpdate,
};
