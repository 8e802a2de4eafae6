use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::geometry::LogicalSize;
use crate::layout::Direction;
use crate::route::CurveStyle;

/// How the initial scale is chosen when a diagram is loaded.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InitialScale {
    /// Fit the diagram width into the container after layout.
    #[default]
    Auto,
    /// Zoom to a fixed scale around the container center.
    Fixed(f32),
}

/// Editor settings. Every field has a default, so an empty JSON object is a
/// valid configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Wheel zoom strength: one notch scales by `exp(zoom_factor / 3)`.
    pub zoom_factor: f32,
    pub min_scale: f32,
    pub max_scale: f32,
    pub initial_scale: InitialScale,
    pub editable: bool,
    pub pan_enabled: bool,
    pub drag_sensitivity: f32,
    pub default_stroke_width: f32,
    pub curve: f32,
    pub node_size: f32,
    pub default_node_width: f32,
    pub default_node_height: f32,
    pub layout_direction: Direction,
    pub activation_window_ms: u64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            zoom_factor: 0.3,
            min_scale: 0.05,
            max_scale: 100.0,
            initial_scale: InitialScale::Auto,
            editable: true,
            pan_enabled: true,
            drag_sensitivity: 1.0,
            default_stroke_width: 12.0,
            curve: 300.0,
            node_size: 300.0,
            default_node_width: 450.0,
            default_node_height: 300.0,
            layout_direction: Direction::LeftToRight,
            activation_window_ms: 300,
        }
    }
}

impl EditorConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let valid = self.min_scale > 0.0
            && self.min_scale.is_finite()
            && self.min_scale <= self.max_scale;
        if !valid {
            return Err(ConfigError::ScaleBounds {
                min: self.min_scale,
                max: self.max_scale,
            });
        }
        Ok(())
    }

    /// Clamp a requested scale into `[min_scale, max_scale]`.
    pub fn clamp_scale(&self, scale: f32) -> f32 {
        if scale.is_nan() {
            return self.min_scale;
        }
        scale.clamp(self.min_scale, self.max_scale)
    }

    pub fn curve_style(&self) -> CurveStyle {
        CurveStyle {
            curve: self.curve,
            node_size: self.node_size,
        }
    }

    pub fn default_node_size(&self) -> LogicalSize {
        LogicalSize::new(self.default_node_width, self.default_node_height)
    }

    pub fn activation_window(&self) -> Duration {
        Duration::from_millis(self.activation_window_ms)
    }
}
