//! TOML-based settings for Wayfarer.
//!
//! Settings are loaded from `~/.wayfarer/settings.toml`. String values of the
//! form `$VAR` / `${VAR}` are resolved from the environment, and the Mapbox
//! token falls back to `$MAPBOX_ACCESS_TOKEN` when the file leaves it unset.
//!
//! # Usage
//!
//! ```rust,ignore
//! use crate::settings::SettingsManager;
//!
//! let manager = SettingsManager::new().await?;
//! let settings = manager.get().await;
//! let token = manager.mapbox_token().await;
//! ```

#[cfg(feature = "tauri")]
pub mod commands;
pub mod loader;
pub mod schema;

#[cfg(feature = "tauri")]
pub use commands::*;
pub use loader::SettingsManager;
pub use schema::WayfarerSettings;
