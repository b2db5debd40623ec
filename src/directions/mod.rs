//! Directions lookup.
//!
//! The directions service is an external collaborator: given an origin,
//! a destination and a travel mode it returns zero or more candidate
//! routes. [`DirectionsProvider`] is the seam; [`MapboxDirections`] is the
//! shipped HTTP implementation and [`RecordedDirections`] replays a saved
//! response.

mod mapbox;

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{NavigationError, Result};
use crate::route::{Coordinate, Route};

pub use mapbox::{friendly_message, MapboxDirections, RecordedDirections, DEFAULT_BASE_URL};

/// How the traveler moves.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TravelMode {
    #[default]
    Driving,
    Walking,
}

impl TravelMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TravelMode::Driving => "driving",
            TravelMode::Walking => "walking",
        }
    }
}

impl fmt::Display for TravelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TravelMode {
    type Err = NavigationError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "driving" => Ok(TravelMode::Driving),
            "walking" => Ok(TravelMode::Walking),
            other => Err(NavigationError::InvalidTravelMode(other.to_string())),
        }
    }
}

/// A validated directions query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DirectionsRequest {
    pub origin: Coordinate,
    pub destination: Coordinate,
    pub mode: TravelMode,
}

impl DirectionsRequest {
    /// Build a request from possibly-missing endpoints.
    ///
    /// An endpoint with non-finite or out-of-range components counts as
    /// missing.
    pub fn new(
        origin: Option<Coordinate>,
        destination: Option<Coordinate>,
        mode: TravelMode,
    ) -> Result<Self> {
        let origin = origin
            .filter(Coordinate::is_valid)
            .ok_or(NavigationError::MissingOrigin)?;
        let destination = destination
            .filter(Coordinate::is_valid)
            .ok_or(NavigationError::MissingDestination)?;

        Ok(Self {
            origin,
            destination,
            mode,
        })
    }
}

/// Source of candidate routes.
///
/// Implementations return candidates in provider order; selection happens
/// in [`crate::route::select_route`].
#[async_trait]
pub trait DirectionsProvider: Send + Sync + 'static {
    /// Fetch candidate routes for a request.
    ///
    /// # Errors
    /// Returns `NavigationError::TransportFailure` with the provider's
    /// message when the call fails.
    async fn routes(&self, request: &DirectionsRequest, access_token: &str) -> Result<Vec<Route>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_travel_mode_parse() {
        assert_eq!("driving".parse::<TravelMode>().unwrap(), TravelMode::Driving);
        assert_eq!(" Walking ".parse::<TravelMode>().unwrap(), TravelMode::Walking);
        assert!(matches!(
            "cycling".parse::<TravelMode>(),
            Err(NavigationError::InvalidTravelMode(m)) if m == "cycling"
        ));
    }

    #[test]
    fn test_request_requires_origin() {
        let result = DirectionsRequest::new(
            None,
            Some(Coordinate::new(37.8, -122.5)),
            TravelMode::Driving,
        );
        assert!(matches!(result, Err(NavigationError::MissingOrigin)));
    }

    #[test]
    fn test_request_requires_destination() {
        let result = DirectionsRequest::new(
            Some(Coordinate::new(37.7, -122.4)),
            Some(Coordinate::new(f64::NAN, -122.5)),
            TravelMode::Walking,
        );
        assert!(matches!(result, Err(NavigationError::MissingDestination)));
    }
}
