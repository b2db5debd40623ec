//! Navigator - the operations exposed to the UI layer.
//!
//! Holds the provider credential, the route selected by the last
//! successful `calculate_route`, and the navigation session. Both hosts
//! (Tauri commands and the CLI) drive navigation through this type.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::directions::{DirectionsProvider, DirectionsRequest, TravelMode};
use crate::error::{NavigationError, Result};
use crate::navigation::{
    LocationRequest, NavigationSession, ProgressSource, SessionHandle, SessionState,
};
use crate::route::{select_route, Coordinate, Route};
use crate::runtime::{NavRuntime, RuntimeEvent};

pub struct Navigator {
    credential: RwLock<Option<String>>,
    directions: Arc<dyn DirectionsProvider>,
    source: Arc<dyn ProgressSource>,
    location_request: LocationRequest,
    selected_route: RwLock<Option<Arc<Route>>>,
    runtime: Arc<dyn NavRuntime>,
    session: NavigationSession,
}

impl Navigator {
    pub fn new(
        runtime: Arc<dyn NavRuntime>,
        directions: Arc<dyn DirectionsProvider>,
        source: Arc<dyn ProgressSource>,
        location_request: LocationRequest,
    ) -> Self {
        Self {
            credential: RwLock::new(None),
            directions,
            source,
            location_request,
            selected_route: RwLock::new(None),
            session: NavigationSession::new(runtime.clone()),
            runtime,
        }
    }

    /// Set the directions provider credential. An empty key clears it.
    pub fn set_credential(&self, key: impl Into<String>) {
        let key = key.into();
        let key = key.trim();
        *self.credential.write() = if key.is_empty() {
            None
        } else {
            Some(key.to_string())
        };
    }

    /// Whether `calculate_route` can reach the directions provider.
    pub fn has_credential(&self) -> bool {
        self.credential.read().is_some()
    }

    /// Look up directions and select the route to navigate.
    ///
    /// The selected route replaces any previous one and is used by the next
    /// `start_navigation`. A running session keeps navigating its own route.
    pub async fn calculate_route(
        &self,
        origin: Option<Coordinate>,
        destination: Option<Coordinate>,
        mode: TravelMode,
    ) -> Result<Arc<Route>> {
        let access_token = self
            .credential
            .read()
            .clone()
            .ok_or(NavigationError::MissingCredential)?;
        let request = DirectionsRequest::new(origin, destination, mode)?;

        let candidates = self.directions.routes(&request, &access_token).await?;
        let route = Arc::new(select_route(candidates)?);

        *self.selected_route.write() = Some(route.clone());
        tracing::info!(
            mode = %mode,
            distance = route.distance_meters,
            duration = route.duration_seconds,
            steps = route.step_count(),
            "Route calculated"
        );

        let payload = serde_json::to_value(&*route).unwrap_or_default();
        if let Err(e) = self.runtime.emit(RuntimeEvent::Custom {
            name: "routeCalculated".to_string(),
            payload,
        }) {
            tracing::warn!("Failed to emit route calculated: {}", e);
        }

        Ok(route)
    }

    /// Start navigating the selected route, replacing any running session.
    ///
    /// # Errors
    /// `NoActiveRoute` if no route has been calculated.
    pub fn start_navigation(&self) -> Result<SessionHandle> {
        let route = self
            .selected_route
            .read()
            .clone()
            .ok_or(NavigationError::NoActiveRoute)?;

        self.session
            .start(route, self.source.as_ref(), &self.location_request)
    }

    /// Stop the running session.
    ///
    /// # Errors
    /// `NoActiveSession` if nothing is navigating.
    pub fn stop_navigation(&self) -> Result<()> {
        self.session.stop()
    }

    /// The route selected by the last successful `calculate_route`.
    pub fn active_route(&self) -> Option<Arc<Route>> {
        self.selected_route.read().clone()
    }

    pub fn is_navigating(&self) -> bool {
        self.session.is_navigating()
    }

    pub fn state(&self) -> SessionState {
        self.session.state()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::{ChannelSource, LocationSample, ProgressSnapshot, ProgressUpdate};
    use crate::route::{Leg, Step};
    use crate::runtime::testing::RecordingRuntime;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::time::Duration;

    /// Directions provider returning canned candidates.
    struct MockDirections {
        candidates: Vec<Route>,
        failure: Option<String>,
        requests: Mutex<Vec<(DirectionsRequest, String)>>,
    }

    impl MockDirections {
        fn with_routes(candidates: Vec<Route>) -> Self {
            Self {
                candidates,
                failure: None,
                requests: Mutex::new(Vec::new()),
            }
        }

        fn failing(message: &str) -> Self {
            Self {
                candidates: vec![],
                failure: Some(message.to_string()),
                requests: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl DirectionsProvider for MockDirections {
        async fn routes(
            &self,
            request: &DirectionsRequest,
            access_token: &str,
        ) -> Result<Vec<Route>> {
            self.requests
                .lock()
                .push((request.clone(), access_token.to_string()));
            match &self.failure {
                Some(message) => Err(NavigationError::TransportFailure(message.clone())),
                None => Ok(self.candidates.clone()),
            }
        }
    }

    fn candidate(distance: f64, geometry: &str) -> Route {
        Route {
            distance_meters: distance,
            duration_seconds: distance / 12.5,
            geometry: geometry.to_string(),
            legs: vec![Leg {
                summary: "Geary Boulevard".to_string(),
                distance_meters: distance,
                duration_seconds: distance / 12.5,
                steps: vec![
                    Step {
                        name: Some("Geary Boulevard".to_string()),
                        ..Default::default()
                    },
                    Step {
                        name: Some("Park Presidio Boulevard".to_string()),
                        reference: Some("CA 1".to_string()),
                        ..Default::default()
                    },
                ],
            }],
        }
    }

    struct Fixture {
        runtime: Arc<RecordingRuntime>,
        directions: Arc<MockDirections>,
        source: Arc<ChannelSource>,
        navigator: Navigator,
    }

    fn fixture(directions: MockDirections) -> Fixture {
        let runtime = Arc::new(RecordingRuntime::new());
        let directions = Arc::new(directions);
        let source = Arc::new(ChannelSource::new());
        let navigator = Navigator::new(
            runtime.clone(),
            directions.clone(),
            source.clone(),
            LocationRequest::default(),
        );
        Fixture {
            runtime,
            directions,
            source,
            navigator,
        }
    }

    fn origin() -> Option<Coordinate> {
        Some(Coordinate::new(37.7, -122.4))
    }

    fn destination() -> Option<Coordinate> {
        Some(Coordinate::new(37.8, -122.5))
    }

    #[tokio::test]
    async fn test_calculate_route_returns_first_candidate() {
        let f = fixture(MockDirections::with_routes(vec![
            candidate(14_820.3, "first_polyline"),
            candidate(15_100.0, "second_polyline"),
        ]));
        f.navigator.set_credential("pk.test");

        let route = f
            .navigator
            .calculate_route(origin(), destination(), TravelMode::Driving)
            .await
            .unwrap();

        assert_eq!(route.distance_meters, 14_820.3);
        assert_eq!(route.duration_seconds, 14_820.3 / 12.5);
        assert_eq!(route.geometry, "first_polyline");
        assert_eq!(*route, candidate(14_820.3, "first_polyline"));
        assert_eq!(f.navigator.active_route(), Some(route));

        let requests = f.directions.requests.lock();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].0.origin, Coordinate::new(37.7, -122.4));
        assert_eq!(requests[0].0.destination, Coordinate::new(37.8, -122.5));
        assert_eq!(requests[0].0.mode, TravelMode::Driving);
        assert_eq!(requests[0].1, "pk.test");

        let events = f.runtime.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].name(), "routeCalculated");
        assert_eq!(events[0].payload()["geometry"], "first_polyline");
    }

    #[tokio::test]
    async fn test_calculate_route_requires_credential() {
        let f = fixture(MockDirections::with_routes(vec![candidate(1.0, "g")]));

        let result = f
            .navigator
            .calculate_route(origin(), destination(), TravelMode::Driving)
            .await;
        assert!(matches!(result, Err(NavigationError::MissingCredential)));

        f.navigator.set_credential("   ");
        assert!(!f.navigator.has_credential());
    }

    #[tokio::test]
    async fn test_calculate_route_missing_endpoints() {
        let f = fixture(MockDirections::with_routes(vec![candidate(1.0, "g")]));
        f.navigator.set_credential("pk.test");

        let result = f
            .navigator
            .calculate_route(None, destination(), TravelMode::Walking)
            .await;
        assert!(matches!(result, Err(NavigationError::MissingOrigin)));

        let result = f
            .navigator
            .calculate_route(origin(), None, TravelMode::Walking)
            .await;
        assert!(matches!(result, Err(NavigationError::MissingDestination)));
        assert!(f.directions.requests.lock().is_empty());
    }

    #[tokio::test]
    async fn test_calculate_route_no_candidates() {
        let f = fixture(MockDirections::with_routes(vec![]));
        f.navigator.set_credential("pk.test");

        let result = f
            .navigator
            .calculate_route(origin(), destination(), TravelMode::Driving)
            .await;
        assert!(matches!(result, Err(NavigationError::NoRouteFound)));
        assert!(f.navigator.active_route().is_none());
    }

    #[tokio::test]
    async fn test_calculate_route_transport_failure() {
        let f = fixture(MockDirections::failing("connection reset"));
        f.navigator.set_credential("pk.test");

        let result = f
            .navigator
            .calculate_route(origin(), destination(), TravelMode::Driving)
            .await;
        assert!(matches!(
            result,
            Err(NavigationError::TransportFailure(m)) if m == "connection reset"
        ));
    }

    #[tokio::test]
    async fn test_start_requires_calculated_route() {
        let f = fixture(MockDirections::with_routes(vec![]));
        assert!(matches!(
            f.navigator.start_navigation(),
            Err(NavigationError::NoActiveRoute)
        ));
        assert_eq!(f.navigator.state(), SessionState::Idle);
    }

    #[tokio::test]
    async fn test_full_trip() {
        let f = fixture(MockDirections::with_routes(vec![candidate(500.0, "g")]));
        f.navigator.set_credential("pk.test");
        f.navigator
            .calculate_route(origin(), destination(), TravelMode::Walking)
            .await
            .unwrap();
        f.runtime.take();

        let handle = f.navigator.start_navigation().unwrap();
        assert!(f.navigator.is_navigating());

        f.source
            .push(ProgressUpdate::Progress {
                sample: LocationSample::new(37.7, -122.4),
                snapshot: ProgressSnapshot {
                    current_step_points: vec![Coordinate::new(37.701, -122.4)],
                    banner_instruction: None,
                    leg_distance_remaining: 480.0,
                    leg_duration_remaining: 400.0,
                },
            })
            .unwrap();

        for _ in 0..200 {
            if !f.runtime.events().is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        f.navigator.stop_navigation().unwrap();
        assert!(matches!(
            f.navigator.stop_navigation(),
            Err(NavigationError::NoActiveSession)
        ));

        let events = f.runtime.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].name(), "progressUpdated");
        assert_eq!(
            events[1],
            RuntimeEvent::NavigationStopped {
                session_id: handle.session_id
            }
        );

        // The selected route survives the stop and can be navigated again
        assert!(f.navigator.active_route().is_some());
        f.navigator.start_navigation().unwrap();
        assert!(f.navigator.is_navigating());
    }
}
