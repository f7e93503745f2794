use crate::config::AppConfig;
use crate::renderer::CameraMode;

pub struct UiState {
    pub camera_mode: CameraMode,
    pub vsync_enabled: bool,
    pub wireframe: bool,
    pub show_stats: bool,

    /// Blocking message shown until the user dismisses it.
    pub pending_warning: Option<String>,
}

impl UiState {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            camera_mode: if config.camera.orbital {
                CameraMode::Orbital
            } else {
                CameraMode::Free
            },
            vsync_enabled: config.render.vsync,
            wireframe: config.render.wireframe,
            ..Self::default()
        }
    }

    pub fn is_blocked(&self) -> bool {
        self.pending_warning.is_some()
    }
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            camera_mode: CameraMode::Orbital,
            vsync_enabled: true,
            wireframe: true,
            show_stats: true,
            pending_warning: None,
        }
    }
}
