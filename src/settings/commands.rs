//! Tauri commands for settings management.
//!
//! Every command that changes the file re-applies the Mapbox token to the
//! navigator, so a key entered in the settings UI takes effect for the next
//! `calculate_route` without a restart.

use tauri::State;

use super::schema::WayfarerSettings;
use crate::state::AppState;

fn to_message(e: anyhow::Error) -> String {
    e.to_string()
}

#[tauri::command]
pub async fn get_settings(state: State<'_, AppState>) -> Result<WayfarerSettings, String> {
    Ok(state.settings_manager.get().await)
}

#[tauri::command]
pub async fn update_settings(
    state: State<'_, AppState>,
    settings: WayfarerSettings,
) -> Result<(), String> {
    state.settings_manager.update(settings).await.map_err(to_message)?;
    state.refresh_credential().await;
    Ok(())
}

/// Get one setting by dot path, e.g. `"location.interval_ms"`.
#[tauri::command]
pub async fn get_setting(
    state: State<'_, AppState>,
    key: String,
) -> Result<serde_json::Value, String> {
    state.settings_manager.get_value(&key).await.map_err(to_message)
}

/// Set one setting by dot path, e.g. `"api_keys.mapbox"`.
#[tauri::command]
pub async fn set_setting(
    state: State<'_, AppState>,
    key: String,
    value: serde_json::Value,
) -> Result<(), String> {
    state
        .settings_manager
        .set_value(&key, value)
        .await
        .map_err(to_message)?;
    if key.starts_with("api_keys") {
        state.refresh_credential().await;
    }
    Ok(())
}

#[tauri::command]
pub async fn reset_settings(state: State<'_, AppState>) -> Result<(), String> {
    state.settings_manager.reset().await.map_err(to_message)?;
    state.refresh_credential().await;
    Ok(())
}

#[tauri::command]
pub fn get_settings_path(state: State<'_, AppState>) -> String {
    state.settings_manager.path().display().to_string()
}

/// Re-read the file from disk, picking up external edits.
#[tauri::command]
pub async fn reload_settings(state: State<'_, AppState>) -> Result<(), String> {
    state.settings_manager.reload().await.map_err(to_message)?;
    state.refresh_credential().await;
    Ok(())
}
