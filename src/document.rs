use egui::{Pos2, Rect, Vec2, pos2, vec2};
use image::Rgba;
use log::{debug, info};

use crate::color::parse_color;
use crate::config::EditorConfig;
use crate::tool::ToolId;

/// Session-wide settings shared by every tool
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    canvas_width: u32,
    canvas_height: u32,
    scale: f32,
    pub primary_color: Rgba<u8>,
    pub secondary_color: Rgba<u8>,
    active_tool: ToolId,
    /// Lets the view jump back after a momentary switch, e.g. an eyedropper pick
    previous_tool: ToolId,
}

impl Document {
    pub fn new(config: &EditorConfig) -> Self {
        Self {
            canvas_width: config.canvas_width,
            canvas_height: config.canvas_height,
            scale: config.scale,
            primary_color: parse_color(&config.primary_color),
            secondary_color: parse_color(&config.secondary_color),
            active_tool: ToolId::default(),
            previous_tool: ToolId::default(),
        }
    }

    pub fn canvas_width(&self) -> u32 {
        self.canvas_width
    }

    pub fn canvas_height(&self) -> u32 {
        self.canvas_height
    }

    /// Canvas area in canvas coordinates
    pub fn canvas_rect(&self) -> Rect {
        Rect::from_min_size(
            Pos2::ZERO,
            vec2(self.canvas_width as f32, self.canvas_height as f32),
        )
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Change the view scale. Non-positive or non-finite values are ignored.
    pub fn set_scale(&mut self, scale: f32) -> bool {
        if !scale.is_finite() || scale <= 0.0 {
            debug!("Ignoring invalid scale {scale}");
            return false;
        }
        self.scale = scale;
        true
    }

    /// Map a screen position to canvas coordinates given where the canvas'
    /// top-left corner is drawn on screen
    pub fn screen_to_canvas(&self, screen: Pos2, canvas_origin: Pos2) -> Pos2 {
        let offset: Vec2 = (screen - canvas_origin) / self.scale;
        pos2(offset.x, offset.y)
    }

    pub fn active_tool(&self) -> ToolId {
        self.active_tool
    }

    pub fn previous_tool(&self) -> ToolId {
        self.previous_tool
    }

    /// Record `id` as active, remembering the tool it replaces. Returns the
    /// replaced tool, or `None` when `id` was already active.
    pub(crate) fn set_active_tool(&mut self, id: ToolId) -> Option<ToolId> {
        if self.active_tool == id {
            return None;
        }
        self.previous_tool = self.active_tool;
        self.active_tool = id;
        info!("Tool changed: {:?} -> {:?}", self.previous_tool, id);
        Some(self.previous_tool)
    }

    pub fn swap_colors(&mut self) {
        std::mem::swap(&mut self.primary_color, &mut self.secondary_color);
    }
}
