use crate::error::{NavigationError, Result};

use super::model::Route;

/// Pick the route to navigate from the provider's candidates.
///
/// The first candidate wins and is returned as-is, leg and step order
/// included. An empty candidate list is `NoRouteFound`.
pub fn select_route(candidates: Vec<Route>) -> Result<Route> {
    let total = candidates.len();
    let route = candidates
        .into_iter()
        .next()
        .ok_or(NavigationError::NoRouteFound)?;

    tracing::debug!(
        candidates = total,
        distance = route.distance_meters,
        legs = route.legs.len(),
        "Selected route"
    );
    Ok(route)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route::{Leg, Step};

    fn step(name: &str) -> Step {
        Step {
            name: Some(name.to_string()),
            ..Default::default()
        }
    }

    fn route(distance: f64, geometry: &str) -> Route {
        Route {
            distance_meters: distance,
            duration_seconds: distance / 10.0,
            geometry: geometry.to_string(),
            legs: vec![
                Leg {
                    summary: "first".to_string(),
                    distance_meters: distance / 2.0,
                    duration_seconds: distance / 20.0,
                    steps: vec![step("a"), step("b"), step("c")],
                },
                Leg {
                    summary: "second".to_string(),
                    distance_meters: distance / 2.0,
                    duration_seconds: distance / 20.0,
                    steps: vec![step("d")],
                },
            ],
        }
    }

    #[test]
    fn test_select_route_returns_first_candidate() {
        let first = route(1000.0, "first_geometry");
        let second = route(900.0, "second_geometry");

        let selected = select_route(vec![first.clone(), second]).unwrap();
        assert_eq!(selected, first);
    }

    #[test]
    fn test_select_route_preserves_leg_and_step_order() {
        let selected = select_route(vec![route(1000.0, "g")]).unwrap();

        let summaries: Vec<&str> = selected.legs.iter().map(|l| l.summary.as_str()).collect();
        assert_eq!(summaries, vec!["first", "second"]);

        let names: Vec<&str> = selected.legs[0]
            .steps
            .iter()
            .filter_map(|s| s.name.as_deref())
            .collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert_eq!(selected.step_count(), 4);
    }

    #[test]
    fn test_select_route_empty_candidates() {
        let result = select_route(vec![]);
        assert!(matches!(result, Err(NavigationError::NoRouteFound)));
    }
}
