use crate::error::Result;
use crate::navigation::{ProgressUpdate, SessionHandle};
use crate::route::{Coordinate, Route};
use crate::state::AppState;
use tauri::State;

#[tauri::command]
pub fn set_credential(state: State<'_, AppState>, key: String) {
    state.navigator.set_credential(key);
}

#[tauri::command]
pub async fn calculate_route(
    state: State<'_, AppState>,
    origin: Option<Coordinate>,
    destination: Option<Coordinate>,
    mode: Option<String>,
) -> Result<Route> {
    let mode = match mode {
        Some(mode) => mode.parse()?,
        None => state.settings_manager.get().await.directions.default_mode,
    };

    let route = state
        .navigator
        .calculate_route(origin, destination, mode)
        .await?;
    Ok((*route).clone())
}

// Async so the session's drain task is spawned on the async runtime
#[tauri::command]
pub async fn start_navigation(state: State<'_, AppState>) -> Result<SessionHandle> {
    state.navigator.start_navigation()
}

#[tauri::command]
pub async fn stop_navigation(state: State<'_, AppState>) -> Result<()> {
    state.navigator.stop_navigation()
}

#[tauri::command]
pub async fn get_active_route(state: State<'_, AppState>) -> Result<Option<Route>> {
    Ok(state.navigator.active_route().map(|route| (*route).clone()))
}

/// Forward a platform location/progress callback into the active session.
#[tauri::command]
pub async fn push_location_update(
    state: State<'_, AppState>,
    update: ProgressUpdate,
) -> Result<()> {
    state.location_source.push(update)
}

/// The platform location service went away; the session reports `sourceClosed`.
#[tauri::command]
pub async fn end_location_updates(state: State<'_, AppState>) -> Result<()> {
    state.location_source.close();
    Ok(())
}
