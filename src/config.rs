use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::renderer::mesh_buffers::default_max_renderable_level;

pub const DEFAULT_CONFIG_PATH: &str = "sierpinski.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ConfigError {
    fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub window: WindowConfig,
    pub fractal: FractalConfig,
    pub camera: CameraConfig,
    pub render: RenderConfig,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Sierpinski Tetrahedron".to_string(),
            width: 1600,
            height: 900,
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FractalConfig {
    pub initial_level: u32,
    pub max_level: u32,
    pub side: f32,
    /// Y rotation given to a fractal when it enters the scene.
    pub initial_rotation_deg: f32,
    /// Radians of Y rotation per wall-clock millisecond while spinning.
    pub rotation_speed: f32,
    pub rotating: bool,
}

impl Default for FractalConfig {
    fn default() -> Self {
        Self {
            initial_level: 2,
            max_level: 8,
            side: 500.0,
            initial_rotation_deg: 60.0,
            rotation_speed: 0.0004,
            rotating: false,
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct CameraConfig {
    pub position: [f32; 3],
    pub target: [f32; 3],
    pub fov_deg: f32,
    pub near: f32,
    pub far: f32,
    pub orbital: bool,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: [0.0, 1200.0, 0.0],
            target: [0.0, 0.0, 0.0],
            fov_deg: 45.0,
            near: 1.0,
            far: 10000.0,
            orbital: true,
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    pub wireframe: bool,
    pub vsync: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            wireframe: true,
            vsync: true,
        }
    }
}

impl AppConfig {
    /// Reads `path`, falling back to defaults when the file does not exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            log::info!("no config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        log::info!("loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let fractal = &self.fractal;
        let deepest = default_max_renderable_level();
        if fractal.max_level == 0 || fractal.max_level > deepest {
            return Err(ConfigError::invalid(
                "fractal.max_level",
                format!("must be between 1 and {deepest}"),
            ));
        }
        if fractal.initial_level == 0 || fractal.initial_level > fractal.max_level {
            return Err(ConfigError::invalid(
                "fractal.initial_level",
                format!("must be between 1 and max_level ({})", fractal.max_level),
            ));
        }
        if !fractal.side.is_finite() || fractal.side <= 0.0 {
            return Err(ConfigError::invalid("fractal.side", "must be positive"));
        }
        if !fractal.rotation_speed.is_finite() {
            return Err(ConfigError::invalid("fractal.rotation_speed", "must be finite"));
        }

        let camera = &self.camera;
        if !(1.0..180.0).contains(&camera.fov_deg) {
            return Err(ConfigError::invalid("camera.fov_deg", "must be in [1, 180)"));
        }
        if camera.near <= 0.0 || camera.far <= camera.near {
            return Err(ConfigError::invalid(
                "camera.far",
                "near must be positive and far must exceed near",
            ));
        }
        if camera.position == camera.target {
            return Err(ConfigError::invalid(
                "camera.position",
                "must differ from camera.target",
            ));
        }

        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::invalid("window", "width and height must be non-zero"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let config = AppConfig::from_toml_str("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.fractal.initial_level, 2);
        assert_eq!(config.fractal.side, 500.0);
        assert!(!config.fractal.rotating);
        assert!(config.render.wireframe);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = AppConfig::from_toml_str(
            r#"
            [fractal]
            initial_level = 4
            initial_rotation_deg = 0.0

            [camera]
            position = [0.0, 300.0, 900.0]
            "#,
        )
        .unwrap();

        assert_eq!(config.fractal.initial_level, 4);
        assert_eq!(config.fractal.initial_rotation_deg, 0.0);
        assert_eq!(config.fractal.max_level, 8);
        assert_eq!(config.camera.position, [0.0, 300.0, 900.0]);
        assert_eq!(config.camera.fov_deg, 45.0);
        assert_eq!(config.window, WindowConfig::default());
    }

    #[test]
    fn rejects_out_of_range_levels() {
        let err = AppConfig::from_toml_str("[fractal]\ninitial_level = 0\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "fractal.initial_level",
                ..
            }
        ));

        let err = AppConfig::from_toml_str("[fractal]\ninitial_level = 9\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));

        let err = AppConfig::from_toml_str("[fractal]\nmax_level = 40\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "fractal.max_level",
                ..
            }
        ));
    }

    #[test]
    fn max_level_is_bounded_by_drawable_geometry() {
        let config = AppConfig::from_toml_str("[fractal]\nmax_level = 10\n").unwrap();
        assert_eq!(config.fractal.max_level, 10);

        let err = AppConfig::from_toml_str("[fractal]\nmax_level = 11\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "fractal.max_level",
                ..
            }
        ));
    }

    #[test]
    fn rejects_bad_side_and_camera() {
        assert!(AppConfig::from_toml_str("[fractal]\nside = -1.0\n").is_err());
        assert!(AppConfig::from_toml_str("[camera]\nnear = 10.0\nfar = 5.0\n").is_err());
        assert!(AppConfig::from_toml_str("[camera]\nposition = [0.0, 0.0, 0.0]\n").is_err());
    }

    #[test]
    fn unknown_keys_are_parse_errors() {
        let err = AppConfig::from_toml_str("[fractal]\nlevle = 3\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn bundled_config_matches_defaults() {
        let config = AppConfig::from_toml_str(include_str!("../sierpinski.toml")).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let path = Path::new("definitely/not/here/sierpinski.toml");
        assert_eq!(AppConfig::load(path).unwrap(), AppConfig::default());
    }
}
