//! Mapbox Directions v5 client.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use url::Url;

use super::{DirectionsProvider, DirectionsRequest, TravelMode};
use crate::error::{NavigationError, Result};
use crate::route::{Coordinate, Leg, Route, Step};
use crate::settings::schema::DirectionsSettings;

pub const DEFAULT_BASE_URL: &str = "https://api.mapbox.com";

const UNMATCHED_LOCATION: &str = "could not be associated with a roadway or pathway";

/// Directions provider backed by the Mapbox Directions HTTP API.
pub struct MapboxDirections {
    client: reqwest::Client,
    base_url: Url,
}

impl MapboxDirections {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url).map_err(|e| {
            NavigationError::TransportFailure(format!("Invalid directions URL '{}': {}", base_url, e))
        })?;

        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self { client, base_url })
    }

    pub fn from_settings(settings: &DirectionsSettings) -> Result<Self> {
        Self::new(&settings.base_url, Duration::from_secs(settings.timeout_secs))
    }

    fn profile(mode: TravelMode) -> &'static str {
        match mode {
            TravelMode::Driving => "driving-traffic",
            TravelMode::Walking => "walking",
        }
    }

    fn request_url(&self, request: &DirectionsRequest, access_token: &str) -> Result<Url> {
        let coordinates = format!(
            "{};{}",
            lon_lat(&request.origin),
            lon_lat(&request.destination)
        );

        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                NavigationError::TransportFailure(format!(
                    "Directions URL cannot be a base: {}",
                    self.base_url
                ))
            })?
            .pop_if_empty()
            .extend([
                "directions",
                "v5",
                "mapbox",
                Self::profile(request.mode),
                coordinates.as_str(),
            ]);

        url.query_pairs_mut()
            .append_pair("access_token", access_token)
            .append_pair("steps", "true")
            .append_pair("overview", "full")
            .append_pair("geometries", "polyline6")
            .append_pair("banner_instructions", "true");

        Ok(url)
    }
}

#[async_trait]
impl DirectionsProvider for MapboxDirections {
    async fn routes(&self, request: &DirectionsRequest, access_token: &str) -> Result<Vec<Route>> {
        let url = self.request_url(request, access_token)?;
        tracing::debug!(
            mode = %request.mode,
            origin = ?request.origin,
            destination = ?request.destination,
            "Requesting directions"
        );

        let response = self.client.get(url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(|b| b.message)
                .unwrap_or_else(|| status.to_string());
            tracing::warn!(%status, "Directions request rejected: {}", message);
            return Err(NavigationError::TransportFailure(friendly_message(&message)));
        }

        parse_routes(&body)
    }
}

/// Provider that answers every request from a saved Directions API response.
///
/// Used for offline runs and recorded trips; the request itself is ignored.
pub struct RecordedDirections {
    path: PathBuf,
}

impl RecordedDirections {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl DirectionsProvider for RecordedDirections {
    async fn routes(&self, request: &DirectionsRequest, _access_token: &str) -> Result<Vec<Route>> {
        tracing::debug!(mode = %request.mode, "Answering directions from {:?}", self.path);
        let body = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            NavigationError::TransportFailure(format!("Failed to read {:?}: {}", self.path, e))
        })?;
        parse_routes(&body)
    }
}

/// Rewrite provider messages that are meaningless to a traveler.
pub fn friendly_message(message: &str) -> String {
    if message.contains(UNMATCHED_LOCATION) {
        "One of the addresses may be incomplete or invalid".to_string()
    } else {
        message.to_string()
    }
}

fn lon_lat(coordinate: &Coordinate) -> String {
    format!("{},{}", coordinate.longitude, coordinate.latitude)
}

fn parse_routes(body: &str) -> Result<Vec<Route>> {
    let response: DirectionsResponse = serde_json::from_str(body).map_err(|e| {
        NavigationError::TransportFailure(format!("Invalid directions response: {}", e))
    })?;

    if response.routes.is_empty() {
        if let Some(message) = response.message {
            tracing::debug!(code = ?response.code, "Directions returned no routes: {}", message);
        }
    }

    Ok(response.routes.into_iter().map(Route::from).collect())
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DirectionsResponse {
    code: Option<String>,
    message: Option<String>,
    #[serde(default)]
    routes: Vec<WireRoute>,
}

#[derive(Debug, Deserialize)]
struct WireRoute {
    distance: f64,
    duration: f64,
    #[serde(default)]
    geometry: String,
    #[serde(default)]
    legs: Vec<WireLeg>,
}

#[derive(Debug, Deserialize)]
struct WireLeg {
    #[serde(default)]
    summary: String,
    distance: f64,
    duration: f64,
    #[serde(default)]
    steps: Vec<WireStep>,
}

#[derive(Debug, Deserialize)]
struct WireStep {
    name: Option<String>,
    destinations: Option<String>,
    exits: Option<String>,
    geometry: Option<String>,
    #[serde(rename = "ref")]
    reference: Option<String>,
}

impl From<WireRoute> for Route {
    fn from(route: WireRoute) -> Self {
        Route {
            distance_meters: route.distance,
            duration_seconds: route.duration,
            geometry: route.geometry,
            legs: route.legs.into_iter().map(Leg::from).collect(),
        }
    }
}

impl From<WireLeg> for Leg {
    fn from(leg: WireLeg) -> Self {
        Leg {
            summary: leg.summary,
            distance_meters: leg.distance,
            duration_seconds: leg.duration,
            steps: leg.steps.into_iter().map(Step::from).collect(),
        }
    }
}

impl From<WireStep> for Step {
    fn from(step: WireStep) -> Self {
        Step {
            name: step.name,
            destinations: step.destinations,
            exits: step.exits,
            geometry: step.geometry,
            reference: step.reference,
        }
    }
}
