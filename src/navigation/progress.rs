//! Progress derivation.
//!
//! Decides, per tick, which guidance event the session emits. The banner
//! instruction is sticky: snapshots that arrive without one keep the last
//! announced maneuver and re-derive its remaining distance from the
//! traveler's position.

use thiserror::Error;

use super::types::{
    BannerInstruction, CurrentStep, LocationSample, OffRoutePayload, ProgressPayload,
    ProgressSnapshot, ProgressUpdate,
};
use crate::route::Coordinate;
use crate::runtime::RuntimeEvent;

/// Earth radius in meters (WGS84 mean).
pub const EARTH_RADIUS_M: f64 = 6_371_008.8;

/// Haversine distance between two points in meters.
pub fn haversine(a: &Coordinate, b: &Coordinate) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let dlat = (b.latitude - a.latitude).to_radians();
    let dlon = (b.longitude - a.longitude).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_M * h.sqrt().min(1.0).asin()
}

/// Why a tick was skipped.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TickError {
    #[error("location sample is not a valid coordinate: ({0}, {1})")]
    InvalidSample(f64, f64),

    #[error("progress snapshot has no current step points")]
    MissingStepPoints,

    #[error("progress snapshot has non-finite leg progress")]
    InvalidLegProgress,
}

/// Result of deriving one tick.
#[derive(Debug, Clone, PartialEq)]
pub enum Guidance {
    Progress(ProgressPayload),
    OffRoute(OffRoutePayload),
}

impl From<Guidance> for RuntimeEvent {
    fn from(guidance: Guidance) -> Self {
        match guidance {
            Guidance::Progress(payload) => RuntimeEvent::ProgressUpdated(payload),
            Guidance::OffRoute(payload) => RuntimeEvent::OffRoute(payload),
        }
    }
}

/// Per-session derivation state.
#[derive(Debug, Default)]
pub struct ProgressTracker {
    sticky_instruction: Option<BannerInstruction>,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sticky_instruction(&self) -> Option<&BannerInstruction> {
        self.sticky_instruction.as_ref()
    }

    pub fn reset(&mut self) {
        self.sticky_instruction = None;
    }

    /// Derive the guidance for one update.
    ///
    /// An off-route tick yields only `offRoute`; an instruction announced
    /// on that fix is still adopted as the sticky one.
    pub fn apply(&mut self, update: &ProgressUpdate) -> Result<Guidance, TickError> {
        match update {
            ProgressUpdate::OffRoute { sample, snapshot } => {
                validate_sample(sample)?;
                if let Some(banner) = snapshot.as_ref().and_then(|s| s.banner_instruction.as_ref()) {
                    self.sticky_instruction = Some(banner.clone());
                }
                Ok(Guidance::OffRoute(OffRoutePayload {
                    location: sample.coordinate(),
                }))
            }
            ProgressUpdate::Progress { sample, snapshot } => {
                self.derive(sample, snapshot).map(Guidance::Progress)
            }
        }
    }

    fn derive(
        &mut self,
        sample: &LocationSample,
        snapshot: &ProgressSnapshot,
    ) -> Result<ProgressPayload, TickError> {
        validate_sample(sample)?;
        if !snapshot.leg_distance_remaining.is_finite()
            || !snapshot.leg_duration_remaining.is_finite()
        {
            return Err(TickError::InvalidLegProgress);
        }

        let current_step = if let Some(banner) = &snapshot.banner_instruction {
            self.sticky_instruction = Some(banner.clone());
            Some(CurrentStep {
                text: banner.primary_text.clone(),
                direction: banner.modifier.clone(),
                distance_to_end: banner.remaining_step_distance_meters,
            })
        } else if let Some(sticky) = &self.sticky_instruction {
            let step_end = snapshot
                .current_step_points
                .last()
                .ok_or(TickError::MissingStepPoints)?;
            Some(CurrentStep {
                text: sticky.primary_text.clone(),
                direction: sticky.modifier.clone(),
                distance_to_end: haversine(step_end, &sample.coordinate()),
            })
        } else {
            // No maneuver announced yet
            None
        };

        Ok(ProgressPayload {
            current_step,
            remaining_distance: snapshot.leg_distance_remaining,
            remaining_duration: snapshot.leg_duration_remaining,
        })
    }
}

fn validate_sample(sample: &LocationSample) -> Result<(), TickError> {
    if sample.coordinate().is_valid() {
        Ok(())
    } else {
        Err(TickError::InvalidSample(sample.latitude, sample.longitude))
    }
}
