#[cfg(feature = "cli")]
pub mod cli;
#[cfg(feature = "tauri")]
mod commands;
pub mod directions;
pub mod error;
pub mod navigation;
pub mod navigator;
pub mod route;
pub mod runtime;
pub mod settings;
#[cfg(feature = "tauri")]
mod state;

#[cfg(feature = "tauri")]
use commands::*;
#[cfg(feature = "tauri")]
use settings::{
    get_setting, get_settings, get_settings_path, reload_settings, reset_settings, set_setting,
    update_settings,
};
#[cfg(feature = "tauri")]
use settings::SettingsManager;
#[cfg(feature = "tauri")]
use state::AppState;
#[cfg(feature = "tauri")]
use tauri::Manager;

#[cfg(feature = "tauri")]
#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    let settings_manager = std::sync::Arc::new(
        tauri::async_runtime::block_on(SettingsManager::new()).expect("failed to load settings"),
    );
    let log_level =
        tauri::async_runtime::block_on(settings_manager.get()).advanced.log_level_filter();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(format!("wayfarer={}", log_level).parse().unwrap()),
        )
        .init();

    tauri::Builder::default()
        .plugin(tauri_plugin_opener::init())
        .setup(move |app| {
            let runtime = std::sync::Arc::new(runtime::TauriRuntime::new(app.handle().clone()));
            let state =
                tauri::async_runtime::block_on(AppState::new(runtime, settings_manager.clone()))?;
            app.manage(state);
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            // Navigation commands
            set_credential,
            calculate_route,
            start_navigation,
            stop_navigation,
            get_active_route,
            push_location_update,
            end_location_updates,
            // Settings commands
            get_settings,
            update_settings,
            get_setting,
            set_setting,
            reset_settings,
            get_settings_path,
            reload_settings,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
