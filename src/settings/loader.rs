//! Settings loading, saving, and environment variable interpolation.
//!
//! The `SettingsManager` handles:
//! - Loading settings from `~/.wayfarer/settings.toml`
//! - Resolving `$VAR` and `${VAR}` environment variable references
//! - Atomic file writes with temp file + rename
//! - First-run template generation

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::sync::RwLock;

use super::schema::WayfarerSettings;

/// Embedded template for first-run generation.
const TEMPLATE: &str = include_str!("template.toml");

/// Environment variables consulted for the Mapbox token, in order.
const MAPBOX_TOKEN_VARS: &[&str] = &["MAPBOX_ACCESS_TOKEN", "MAPBOX_API_KEY"];

/// Get the path to the global settings file.
fn settings_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".wayfarer")
        .join("settings.toml")
}

/// Manages settings loading, interpolation, and persistence.
pub struct SettingsManager {
    /// Cached settings (with env vars resolved)
    settings: RwLock<WayfarerSettings>,

    /// Path to the settings file
    path: PathBuf,
}

impl SettingsManager {
    /// Create a new SettingsManager, loading from disk if available.
    pub async fn new() -> Result<Self> {
        Self::with_path(settings_path()).await
    }

    /// Create a SettingsManager backed by a specific file.
    pub async fn with_path(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let settings = Self::load_from_path(&path).await?;

        Ok(Self {
            settings: RwLock::new(settings),
            path,
        })
    }

    /// Load settings from a specific path.
    async fn load_from_path(path: &Path) -> Result<WayfarerSettings> {
        if !path.exists() {
            tracing::debug!("Settings file not found at {:?}, using defaults", path);
            return Ok(WayfarerSettings::default());
        }

        let contents = tokio::fs::read_to_string(path)
            .await
            .context("Failed to read settings file")?;

        // Parse into typed struct
        let mut settings: WayfarerSettings =
            toml::from_str(&contents).context("Failed to deserialize settings")?;

        // Resolve environment variable references
        Self::resolve_env_vars(&mut settings);

        tracing::info!("Loaded settings from {:?}", path);
        Ok(settings)
    }

    /// Resolve $ENV_VAR references in string fields.
    ///
    /// Optional values whose variable is unset are cleared so that the
    /// environment fallback can take over.
    fn resolve_env_vars(settings: &mut WayfarerSettings) {
        fn resolve_opt(value: &mut Option<String>) {
            if let Some(v) = value.as_deref() {
                if is_env_ref(v) {
                    let resolved = resolve_env_ref(v);
                    *value = resolved;
                }
            }
        }

        resolve_opt(&mut settings.api_keys.mapbox);

        if let Some(resolved) = resolve_env_ref(&settings.directions.base_url) {
            settings.directions.base_url = resolved;
        }
    }

    /// Get the current settings (read-only).
    pub async fn get(&self) -> WayfarerSettings {
        self.settings.read().await.clone()
    }

    /// The Mapbox token from settings, else the first non-empty
    /// `MAPBOX_TOKEN_VARS` environment variable.
    pub async fn mapbox_token(&self) -> Option<String> {
        let configured = self.settings.read().await.api_keys.mapbox.clone();
        configured
            .filter(|token| !token.trim().is_empty())
            .or_else(|| token_from_env(MAPBOX_TOKEN_VARS))
    }

    /// Update settings and persist to disk.
    pub async fn update(&self, new_settings: WayfarerSettings) -> Result<()> {
        let toml_string =
            toml::to_string_pretty(&new_settings).context("Failed to serialize settings")?;

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        // Atomic write: write to temp file, then rename
        let temp_path = self.path.with_extension("toml.tmp");
        tokio::fs::write(&temp_path, &toml_string).await?;
        tokio::fs::rename(&temp_path, &self.path).await?;

        *self.settings.write().await = new_settings;
        tracing::info!("Saved settings to {:?}", self.path);
        Ok(())
    }

    /// Get one setting by dot path (e.g., "directions.base_url").
    pub async fn get_value(&self, key: &str) -> Result<serde_json::Value> {
        let json = serde_json::to_value(&*self.settings.read().await)?;
        json.pointer(&json_pointer(key))
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("Setting '{}' not found", key))
    }

    /// Set one existing setting by dot path and persist.
    pub async fn set_value(&self, key: &str, value: serde_json::Value) -> Result<()> {
        let mut json = serde_json::to_value(self.get().await)?;

        let (parent, leaf) = match key.rsplit_once('.') {
            Some((parent, leaf)) => (json_pointer(parent), leaf),
            None => (String::new(), key),
        };
        let section = json
            .pointer_mut(&parent)
            .and_then(serde_json::Value::as_object_mut)
            .filter(|section| section.contains_key(leaf))
            .ok_or_else(|| anyhow::anyhow!("Setting '{}' not found", key))?;
        section.insert(leaf.to_string(), value);

        let settings = serde_json::from_value(json)
            .with_context(|| format!("Invalid value for setting '{}'", key))?;
        self.update(settings).await
    }

    /// Reset to defaults and persist.
    pub async fn reset(&self) -> Result<()> {
        self.update(WayfarerSettings::default()).await
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Write the commented template on first run.
    ///
    /// Returns `true` if a new file was created.
    pub async fn ensure_settings_file(&self) -> Result<bool> {
        if self.path.exists() {
            return Ok(false);
        }

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        tokio::fs::write(&self.path, TEMPLATE).await?;
        tracing::info!("Generated settings template at {:?}", self.path);
        Ok(true)
    }

    /// Reload settings from disk.
    pub async fn reload(&self) -> Result<()> {
        let settings = Self::load_from_path(&self.path).await?;
        *self.settings.write().await = settings;
        Ok(())
    }
}

/// "location.interval_ms" -> "/location/interval_ms"
fn json_pointer(key: &str) -> String {
    format!("/{}", key.replace('.', "/"))
}

fn token_from_env(vars: &[&str]) -> Option<String> {
    vars.iter()
        .filter_map(|var| std::env::var(var).ok())
        .find(|value| !value.trim().is_empty())
}

fn is_env_ref(value: &str) -> bool {
    value.trim().starts_with('$')
}

/// Resolve a `$VAR` or `${VAR}` reference; `None` when unset or not a reference.
fn resolve_env_ref(value: &str) -> Option<String> {
    let trimmed = value.trim();
    let var_name = trimmed
        .strip_prefix("${")
        .and_then(|rest| rest.strip_suffix('}'))
        .or_else(|| trimmed.strip_prefix('$'))?;

    std::env::var(var_name).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directions::TravelMode;

    fn in_memory(settings: WayfarerSettings) -> SettingsManager {
        SettingsManager {
            settings: RwLock::new(settings),
            path: PathBuf::from("/nonexistent/settings.toml"),
        }
    }

    #[test]
    fn test_resolve_env_ref_formats() {
        std::env::set_var("WAYFARER_TEST_VAR_1", "test_value_1");

        assert_eq!(
            resolve_env_ref("$WAYFARER_TEST_VAR_1"),
            Some("test_value_1".to_string())
        );
        assert_eq!(
            resolve_env_ref("${WAYFARER_TEST_VAR_1}"),
            Some("test_value_1".to_string())
        );

        std::env::remove_var("WAYFARER_TEST_VAR_1");
    }

    #[test]
    fn test_resolve_env_ref_no_match() {
        assert_eq!(resolve_env_ref("regular_value"), None);
        assert_eq!(resolve_env_ref("$NONEXISTENT_VAR_XYZ_12345"), None);
    }

    #[test]
    fn test_unresolved_token_reference_is_cleared() {
        let mut settings = WayfarerSettings::default();
        settings.api_keys.mapbox = Some("$NONEXISTENT_MAPBOX_VAR_98765".to_string());

        SettingsManager::resolve_env_vars(&mut settings);
        assert!(settings.api_keys.mapbox.is_none());
    }

    #[test]
    fn test_token_from_env_skips_blank_values() {
        std::env::set_var("WAYFARER_TOKEN_BLANK", "  ");
        std::env::set_var("WAYFARER_TOKEN_SET", "pk.from_env");

        let token = token_from_env(&[
            "WAYFARER_TOKEN_MISSING_XYZ",
            "WAYFARER_TOKEN_BLANK",
            "WAYFARER_TOKEN_SET",
        ]);
        assert_eq!(token.as_deref(), Some("pk.from_env"));
        assert!(token_from_env(&["WAYFARER_TOKEN_MISSING_XYZ"]).is_none());

        std::env::remove_var("WAYFARER_TOKEN_BLANK");
        std::env::remove_var("WAYFARER_TOKEN_SET");
    }

    #[tokio::test]
    async fn test_mapbox_token_from_settings() {
        let mut settings = WayfarerSettings::default();
        settings.api_keys.mapbox = Some("pk.from_settings".to_string());

        assert_eq!(
            in_memory(settings).mapbox_token().await,
            Some("pk.from_settings".to_string())
        );
    }

    #[tokio::test]
    async fn test_settings_manager_defaults() {
        let manager = SettingsManager::with_path("/nonexistent/settings.toml")
            .await
            .unwrap();

        let settings = manager.get().await;
        assert_eq!(settings.version, 1);
        assert_eq!(settings.directions.default_mode, TravelMode::Driving);
    }

    #[tokio::test]
    async fn test_settings_manager_get_value() {
        let manager = in_memory(WayfarerSettings::default());

        let value = manager.get_value("directions.default_mode").await.unwrap();
        assert_eq!(value, serde_json::json!("driving"));

        let value = manager.get_value("location.interval_ms").await.unwrap();
        assert_eq!(value, serde_json::json!(1000));

        assert!(manager.get_value("location.missing").await.is_err());
    }

    #[tokio::test]
    async fn test_set_value_persists_and_reloads() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("nested").join("settings.toml");
        let manager = SettingsManager::with_path(&path).await.unwrap();

        manager
            .set_value("directions.default_mode", serde_json::json!("walking"))
            .await
            .unwrap();
        manager
            .set_value("location.interval_ms", serde_json::json!(500))
            .await
            .unwrap();
        assert!(path.exists());

        let reloaded = SettingsManager::with_path(&path).await.unwrap();
        let settings = reloaded.get().await;
        assert_eq!(settings.directions.default_mode, TravelMode::Walking);
        assert_eq!(settings.location.interval_ms, 500);
    }

    #[tokio::test]
    async fn test_set_value_rejects_unknown_or_invalid() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("settings.toml");
        let manager = SettingsManager::with_path(&path).await.unwrap();

        assert!(manager
            .set_value("location.cadence", serde_json::json!(5))
            .await
            .is_err());
        assert!(manager
            .set_value("directions.default_mode", serde_json::json!("cycling"))
            .await
            .is_err());

        // Nothing was written and the cache is untouched
        assert!(!path.exists());
        assert_eq!(manager.get().await.directions.default_mode, TravelMode::Driving);
    }

    #[tokio::test]
    async fn test_ensure_settings_file_writes_template_once() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("settings.toml");
        let manager = SettingsManager::with_path(&path).await.unwrap();

        assert!(manager.ensure_settings_file().await.unwrap());
        assert!(!manager.ensure_settings_file().await.unwrap());

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("[location]"));
        manager.reload().await.unwrap();
    }
}
