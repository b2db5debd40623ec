use serde::{Deserialize, Serialize};

use crate::route::Coordinate;

/// The most recently announced maneuver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BannerInstruction {
    pub primary_text: String,
    pub modifier: String,
    pub remaining_step_distance_meters: f64,
}

/// A single position fix from the positioning subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocationSample {
    pub latitude: f64,
    pub longitude: f64,
}

impl LocationSample {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }
}

/// Route progress as reported alongside a location sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSnapshot {
    /// Polyline points of the step currently being traveled
    #[serde(default)]
    pub current_step_points: Vec<Coordinate>,

    /// A fresh instruction, if the source announced one on this tick
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub banner_instruction: Option<BannerInstruction>,

    /// Meters left on the current leg
    pub leg_distance_remaining: f64,

    /// Seconds left on the current leg
    pub leg_duration_remaining: f64,
}

/// One update delivered by a progress source subscription.
///
/// Each position fix is delivered as exactly one update. A fix the
/// positioning subsystem judged off-route is an `OffRoute` tick, never a
/// `Progress` tick followed by a separate notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProgressUpdate {
    /// Regular progress tick
    Progress {
        sample: LocationSample,
        snapshot: ProgressSnapshot,
    },

    /// The traveler left the corridor of the active route on this fix
    OffRoute {
        sample: LocationSample,
        /// Progress reported for the same fix, if any
        #[serde(default, skip_serializing_if = "Option::is_none")]
        snapshot: Option<ProgressSnapshot>,
    },
}

impl ProgressUpdate {
    pub fn sample(&self) -> &LocationSample {
        match self {
            ProgressUpdate::Progress { sample, .. } | ProgressUpdate::OffRoute { sample, .. } => {
                sample
            }
        }
    }
}

/// Guidance for the maneuver in progress.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentStep {
    pub text: String,
    pub direction: String,
    pub distance_to_end: f64,
}

/// Payload of the `progressUpdated` event.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_step: Option<CurrentStep>,
    pub remaining_distance: f64,
    pub remaining_duration: f64,
}

/// Payload of the `offRoute` event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OffRoutePayload {
    pub location: Coordinate,
}
