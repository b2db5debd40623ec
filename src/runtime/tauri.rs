use super::{NavRuntime, RuntimeError, RuntimeEvent};
use async_trait::async_trait;
use tauri::{AppHandle, Emitter};

pub struct TauriRuntime {
    app_handle: AppHandle,
}

impl TauriRuntime {
    pub fn new(app_handle: AppHandle) -> Self {
        Self { app_handle }
    }
}

#[async_trait]
impl NavRuntime for TauriRuntime {
    fn emit(&self, event: RuntimeEvent) -> Result<(), RuntimeError> {
        // Every event goes out on its own named channel
        self.app_handle
            .emit(event.name(), event.payload())
            .map_err(|e| RuntimeError::EmitFailed(e.to_string()))
    }

    async fn shutdown(&self) -> Result<(), RuntimeError> {
        Ok(())
    }
}
