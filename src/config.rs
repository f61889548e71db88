use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::tool::ToolSettings;

/// Startup settings for an editing session.
///
/// Missing fields fall back to their defaults, so a partial JSON object is a
/// valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub scale: f32,
    /// Color strings go through the lenient parser; bad values become black
    pub primary_color: String,
    pub secondary_color: String,
    pub brush_radius: f32,
    pub eraser_radius: f32,
    pub font_size: f32,
    pub font_family: String,
    pub fill_tolerance: u8,
    /// Maximum number of history entries; `None` keeps everything
    pub max_history: Option<usize>,
    /// Pick radius around selection handles
    pub handle_radius: f32,
    /// Distance of the rotation handle above the selection's top edge
    pub rotation_handle_offset: f32,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            canvas_width: 800,
            canvas_height: 600,
            scale: 1.0,
            primary_color: "#000000ff".to_string(),
            secondary_color: "#ffffffff".to_string(),
            brush_radius: 5.0,
            eraser_radius: 5.0,
            font_size: 16.0,
            font_family: "sans-serif".to_string(),
            fill_tolerance: 0,
            max_history: None,
            handle_radius: 8.0,
            rotation_handle_offset: 30.0,
        }
    }
}

impl EditorConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.canvas_width == 0 || self.canvas_height == 0 {
            return Err(ConfigError::Invalid(format!(
                "canvas must not be empty, got {}x{}",
                self.canvas_width, self.canvas_height
            )));
        }
        let positive = [
            ("scale", self.scale),
            ("brush_radius", self.brush_radius),
            ("eraser_radius", self.eraser_radius),
            ("font_size", self.font_size),
        ];
        if let Some((name, value)) = positive
            .into_iter()
            .find(|(_, value)| !value.is_finite() || *value <= 0.0)
        {
            return Err(ConfigError::Invalid(format!("{name} must be positive, got {value}")));
        }
        if self.handle_radius < 0.0 || self.rotation_handle_offset < 0.0 {
            return Err(ConfigError::Invalid(
                "handle sizes must not be negative".to_string(),
            ));
        }
        if self.max_history == Some(0) {
            warn!("max_history of 0 is raised to 1");
        }
        Ok(())
    }

    pub(crate) fn tool_settings(&self) -> ToolSettings {
        ToolSettings {
            brush_radius: self.brush_radius,
            eraser_radius: self.eraser_radius,
            fill_tolerance: self.fill_tolerance,
            font_size: self.font_size,
            handle_radius: self.handle_radius,
            rotation_handle_offset: self.rotation_handle_offset,
        }
    }
}
