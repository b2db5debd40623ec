//! Settings schema definitions for Wayfarer configuration.
//!
//! All settings structs use `#[serde(default)]` to allow partial configuration files.
//! Missing fields are filled with sensible defaults.

use serde::{Deserialize, Serialize};
use tracing_subscriber::filter::LevelFilter;

use crate::directions::{TravelMode, DEFAULT_BASE_URL};
use crate::navigation::LocationRequest;

/// Root settings structure for Wayfarer.
///
/// Loaded from `~/.wayfarer/settings.toml` with environment variable interpolation support.
/// Version field enables future migrations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WayfarerSettings {
    /// Schema version for migrations
    pub version: u32,

    /// API keys for external services
    pub api_keys: ApiKeysSettings,

    /// Directions service configuration
    pub directions: DirectionsSettings,

    /// Location sampling policy for navigation sessions
    pub location: LocationRequest,

    /// Advanced/debug settings
    pub advanced: AdvancedSettings,
}

/// API keys for external services.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ApiKeysSettings {
    /// Mapbox access token (supports $ENV_VAR syntax)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mapbox: Option<String>,
}

/// Directions service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectionsSettings {
    /// Base URL of the directions API
    pub base_url: String,

    /// Travel mode used when none is given: "driving" | "walking"
    pub default_mode: TravelMode,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

/// Advanced/debug settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvancedSettings {
    /// Log level: "error" | "warn" | "info" | "debug" | "trace"
    pub log_level: String,
}

// =============================================================================
// Default implementations
// =============================================================================

impl Default for WayfarerSettings {
    fn default() -> Self {
        Self {
            version: 1,
            api_keys: ApiKeysSettings::default(),
            directions: DirectionsSettings::default(),
            location: LocationRequest::default(),
            advanced: AdvancedSettings::default(),
        }
    }
}

impl Default for DirectionsSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            default_mode: TravelMode::Driving,
            timeout_secs: 30,
        }
    }
}

impl AdvancedSettings {
    /// Level for the `wayfarer` log target. Unknown values fall back to info.
    pub fn log_level_filter(&self) -> LevelFilter {
        self.log_level.trim().parse().unwrap_or(LevelFilter::INFO)
    }
}

impl Default for AdvancedSettings {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}
