use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NavigationError {
    #[error("Directions access token has not been set")]
    MissingCredential,

    #[error("Origin has not been set for this trip")]
    MissingOrigin,

    #[error("Destination has not been set for this trip")]
    MissingDestination,

    #[error("No routes found for the supplied coordinates")]
    NoRouteFound,

    #[error("Directions request failed: {0}")]
    TransportFailure(String),

    #[error("No route has been calculated for this trip")]
    NoActiveRoute,

    #[error("Navigation has not been started")]
    NoActiveSession,

    #[error("Unsupported travel mode: {0}")]
    InvalidTravelMode(String),

    #[error("Progress source error: {0}")]
    Source(String),
}

// Implement Serialize for Tauri
impl Serialize for NavigationError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl From<reqwest::Error> for NavigationError {
    fn from(err: reqwest::Error) -> Self {
        NavigationError::TransportFailure(err.to_string())
    }
}

// Convert to Tauri-compatible result
pub type Result<T> = std::result::Result<T, NavigationError>;
