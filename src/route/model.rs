use serde::{Deserialize, Serialize};

/// A geographic point in WGS84 degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Both components are finite and within the valid degree ranges.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// The route selected for a trip.
///
/// Immutable once constructed. The geometry is an encoded polyline that is
/// passed through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    pub distance_meters: f64,
    pub duration_seconds: f64,
    pub geometry: String,
    #[serde(default)]
    pub legs: Vec<Leg>,
}

/// One leg of a route, between two waypoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Leg {
    #[serde(default)]
    pub summary: String,
    pub distance_meters: f64,
    pub duration_seconds: f64,
    #[serde(default)]
    pub steps: Vec<Step>,
}

/// A single maneuver step. Every field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Step {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destinations: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exits: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geometry: Option<String>,
    #[serde(rename = "ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

impl Route {
    /// Total number of steps across all legs.
    pub fn step_count(&self) -> usize {
        self.legs.iter().map(|leg| leg.steps.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_serializes_without_absent_fields() {
        let step = Step {
            name: Some("Market Street".to_string()),
            reference: Some("CA 1".to_string()),
            ..Default::default()
        };

        let json = serde_json::to_value(&step).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"name": "Market Street", "ref": "CA 1"})
        );
    }

    #[test]
    fn test_route_uses_camel_case_keys() {
        let route = Route {
            distance_meters: 1200.0,
            duration_seconds: 180.0,
            geometry: "abc".to_string(),
            legs: vec![],
        };

        let json = serde_json::to_value(&route).unwrap();
        assert_eq!(json["distanceMeters"], 1200.0);
        assert_eq!(json["durationSeconds"], 180.0);
    }

    #[test]
    fn test_coordinate_validity() {
        assert!(Coordinate::new(37.7, -122.4).is_valid());
        assert!(!Coordinate::new(f64::NAN, 0.0).is_valid());
        assert!(!Coordinate::new(91.0, 0.0).is_valid());
        assert!(!Coordinate::new(0.0, 181.0).is_valid());
    }
}
