use std::sync::Arc;

use crate::directions::MapboxDirections;
use crate::navigation::ChannelSource;
use crate::navigator::Navigator;
use crate::runtime::NavRuntime;
use crate::settings::SettingsManager;

pub struct AppState {
    pub navigator: Arc<Navigator>,
    pub location_source: Arc<ChannelSource>,
    pub settings_manager: Arc<SettingsManager>,
}

impl AppState {
    pub async fn new(
        runtime: Arc<dyn NavRuntime>,
        settings_manager: Arc<SettingsManager>,
    ) -> anyhow::Result<Self> {
        if let Err(e) = settings_manager.ensure_settings_file().await {
            tracing::warn!("Failed to create settings template: {}", e);
        }
        let settings = settings_manager.get().await;

        let directions = MapboxDirections::from_settings(&settings.directions)?;
        let location_source = Arc::new(ChannelSource::new());
        let navigator = Navigator::new(
            runtime,
            Arc::new(directions),
            location_source.clone(),
            settings.location.clone(),
        );

        let state = Self {
            navigator: Arc::new(navigator),
            location_source,
            settings_manager,
        };
        state.refresh_credential().await;

        Ok(state)
    }

    /// Apply the configured Mapbox token, if any.
    ///
    /// A missing token leaves a key set through `set_credential` in place.
    pub async fn refresh_credential(&self) {
        match self.settings_manager.mapbox_token().await {
            Some(token) => self.navigator.set_credential(token),
            None => tracing::debug!("Mapbox token not configured, waiting for set_credential"),
        }
    }
}
