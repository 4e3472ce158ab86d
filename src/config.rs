// config.rs — tunables for the dual viewer, optionally read from TOML

use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::layout::Orientation;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ViewerConfig {
    /// Degrees of orbit per pixel of drag.
    pub drag_sensitivity: f32,
    /// Degrees of FOV per unit of wheel deltaY.
    pub zoom_speed: f32,
    pub zoom_min_fov: f32,
    pub zoom_max_fov: f32,
    // Wider than the zoom range so a captured camera's real vfov is honoured.
    pub initial_fov_min: f32,
    pub initial_fov_max: f32,
    pub default_fov: f32,
    pub lat_limit: f32,

    pub sphere_radius: f32,
    pub width_segments: u32,
    pub height_segments: u32,
    pub near: f32,
    pub far: f32,

    /// Pixels per wheel "line", for devices that report line deltas.
    pub wheel_line_px: f32,
    pub pinch_scale: f32,

    pub orientation: Orientation,
    pub divider_px: u32,
    pub clear_color: [f32; 3],
    pub vsync: bool,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            drag_sensitivity: 0.1,
            zoom_speed: 0.08,
            zoom_min_fov: 30.0,
            zoom_max_fov: 100.0,
            initial_fov_min: 30.0,
            initial_fov_max: 120.0,
            default_fov: 75.0,
            lat_limit: 85.0,
            sphere_radius: 500.0,
            width_segments: 60,
            height_segments: 40,
            near: 0.1,
            far: 1000.0,
            wheel_line_px: 100.0,
            pinch_scale: 100.0,
            orientation: Orientation::SideBySide,
            divider_px: 2,
            clear_color: [0.067, 0.067, 0.067],
            vsync: true,
        }
    }
}

impl ViewerConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: ViewerConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| Err(ConfigError::Invalid(msg));

        if self.zoom_min_fov <= 0.0 || self.zoom_min_fov > self.zoom_max_fov {
            return invalid(format!(
                "zoom fov range [{}, {}] is empty or non-positive",
                self.zoom_min_fov, self.zoom_max_fov
            ));
        }
        if self.initial_fov_min <= 0.0 || self.initial_fov_min > self.initial_fov_max {
            return invalid(format!(
                "initial fov range [{}, {}] is empty or non-positive",
                self.initial_fov_min, self.initial_fov_max
            ));
        }
        if self.zoom_max_fov >= 180.0 || self.initial_fov_max >= 180.0 {
            return invalid("fov must stay below 180 degrees".to_string());
        }
        if !(0.0..90.0).contains(&self.lat_limit) {
            return invalid(format!("lat_limit {} must be in [0, 90)", self.lat_limit));
        }
        if self.near <= 0.0 || self.near >= self.far {
            return invalid(format!("near {} must be positive and below far {}", self.near, self.far));
        }
        if self.sphere_radius <= self.near || self.sphere_radius >= self.far {
            return invalid(format!(
                "sphere_radius {} must lie between near {} and far {}",
                self.sphere_radius, self.near, self.far
            ));
        }
        if self.width_segments < 3 || self.height_segments < 2 {
            return invalid("sphere needs at least 3x2 segments".to_string());
        }
        Ok(())
    }
}
