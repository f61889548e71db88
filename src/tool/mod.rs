//! Tool variants, their per-variant state and the registry that keeps one
//! instance of each alive for the whole session.

pub mod types;

use egui::{CursorIcon, Key, Modifiers, PointerButton, Pos2};
use image::Rgba;
use serde::{Deserialize, Serialize};

use crate::document::Document;
use crate::error::EditorResult;
use crate::layer::LayerSet;
use crate::text::TextRasterizer;

pub use types::{BrushTool, EraserTool, EyedropperTool, FillTool, SelectTool, TextTool};

/// Identifies a tool variant
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ToolId {
    #[default]
    Brush,
    Eraser,
    Fill,
    Select,
    Eyedropper,
    Text,
}

impl ToolId {
    pub const ALL: [ToolId; 6] = [
        ToolId::Brush,
        ToolId::Eraser,
        ToolId::Fill,
        ToolId::Select,
        ToolId::Eyedropper,
        ToolId::Text,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Brush => "Brush",
            Self::Eraser => "Eraser",
            Self::Fill => "Fill",
            Self::Select => "Select",
            Self::Eyedropper => "Eyedropper",
            Self::Text => "Text",
        }
    }

    /// Single-key shortcut shown in the toolbar
    pub fn shortcut(self) -> char {
        match self {
            Self::Brush => 'b',
            Self::Eraser => 'e',
            Self::Fill => 'f',
            Self::Select => 'v',
            Self::Eyedropper => 'i',
            Self::Text => 't',
        }
    }

    pub fn from_key(key: Key) -> Option<Self> {
        match key {
            Key::B => Some(Self::Brush),
            Key::E => Some(Self::Eraser),
            Key::F => Some(Self::Fill),
            Key::V => Some(Self::Select),
            Key::I => Some(Self::Eyedropper),
            Key::T => Some(Self::Text),
            _ => None,
        }
    }

    pub fn cursor_icon(self) -> CursorIcon {
        match self {
            Self::Brush => CursorIcon::Cell,
            Self::Eraser => CursorIcon::Grab,
            Self::Fill => CursorIcon::Copy,
            Self::Select => CursorIcon::Crosshair,
            Self::Eyedropper => CursorIcon::ContextMenu,
            Self::Text => CursorIcon::Text,
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Everything a tool may touch while handling an event
pub struct ToolContext<'a> {
    pub layers: &'a mut LayerSet,
    pub document: &'a mut Document,
    pub text: &'a dyn TextRasterizer,
}

impl ToolContext<'_> {
    /// Primary color for the primary button, secondary for anything else
    pub fn color_for(&self, button: PointerButton) -> Rgba<u8> {
        if button == PointerButton::Primary {
            self.document.primary_color
        } else {
            self.document.secondary_color
        }
    }
}

/// What a tool handler did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolOutcome {
    /// Nothing observable changed
    Unchanged,
    /// Tool state or document settings changed, no layer content was committed
    Updated,
    /// Layer content was committed and should be recorded in history
    Commit,
}

impl ToolOutcome {
    /// Combine two outcomes of the same event, keeping the stronger one
    pub fn max(self, other: Self) -> Self {
        match (self, other) {
            (Self::Commit, _) | (_, Self::Commit) => Self::Commit,
            (Self::Updated, _) | (_, Self::Updated) => Self::Updated,
            _ => Self::Unchanged,
        }
    }
}

/// A tool and its state
#[derive(Debug, Clone)]
pub enum Tool {
    Brush(BrushTool),
    Eraser(EraserTool),
    Fill(FillTool),
    Select(SelectTool),
    Eyedropper(EyedropperTool),
    Text(TextTool),
}

impl Tool {
    pub fn id(&self) -> ToolId {
        match self {
            Self::Brush(_) => ToolId::Brush,
            Self::Eraser(_) => ToolId::Eraser,
            Self::Fill(_) => ToolId::Fill,
            Self::Select(_) => ToolId::Select,
            Self::Eyedropper(_) => ToolId::Eyedropper,
            Self::Text(_) => ToolId::Text,
        }
    }

    /// Whether a pointer gesture is in progress
    pub fn is_in_gesture(&self) -> bool {
        match self {
            Self::Brush(tool) => tool.is_drawing(),
            Self::Eraser(tool) => tool.is_drawing(),
            Self::Select(tool) => tool.state().is_gesture(),
            Self::Fill(_) | Self::Eyedropper(_) | Self::Text(_) => false,
        }
    }

    pub fn on_pointer_down(
        &mut self,
        pos: Pos2,
        button: PointerButton,
        ctx: &mut ToolContext<'_>,
    ) -> EditorResult<ToolOutcome> {
        Ok(match self {
            Self::Brush(tool) => tool.on_pointer_down(pos, button, ctx),
            Self::Eraser(tool) => tool.on_pointer_down(pos, ctx),
            Self::Fill(tool) => return tool.on_pointer_down(pos, button, ctx),
            Self::Select(tool) => tool.on_pointer_down(pos, ctx),
            Self::Eyedropper(tool) => tool.on_pointer_down(pos, button, ctx),
            Self::Text(tool) => tool.on_pointer_down(pos, button, ctx),
        })
    }

    pub fn on_pointer_move(&mut self, pos: Pos2, ctx: &mut ToolContext<'_>) -> ToolOutcome {
        match self {
            Self::Brush(tool) => tool.on_pointer_move(pos, ctx),
            Self::Eraser(tool) => tool.on_pointer_move(pos, ctx),
            Self::Select(tool) => tool.on_pointer_move(pos),
            Self::Fill(_) | Self::Eyedropper(_) | Self::Text(_) => ToolOutcome::Unchanged,
        }
    }

    pub fn on_pointer_up(&mut self, pos: Pos2, ctx: &mut ToolContext<'_>) -> ToolOutcome {
        match self {
            Self::Brush(tool) => tool.on_pointer_up(pos, ctx),
            Self::Eraser(tool) => tool.on_pointer_up(pos, ctx),
            Self::Select(tool) => tool.on_pointer_up(pos, ctx),
            Self::Fill(_) | Self::Eyedropper(_) | Self::Text(_) => ToolOutcome::Unchanged,
        }
    }

    /// Bring any in-progress work to a consistent end: strokes are finished,
    /// selection gestures settle and typed text is committed.
    pub fn finish_gesture(&mut self, ctx: &mut ToolContext<'_>) -> ToolOutcome {
        match self {
            Self::Brush(tool) => tool.finish_gesture(),
            Self::Eraser(tool) => tool.finish_gesture(),
            Self::Select(tool) => tool.finish_gesture(ctx),
            Self::Text(tool) => tool.commit(ctx),
            Self::Fill(_) | Self::Eyedropper(_) => ToolOutcome::Unchanged,
        }
    }

    pub fn on_text(&mut self, text: &str) -> ToolOutcome {
        match self {
            Self::Text(tool) => tool.on_text(text),
            _ => ToolOutcome::Unchanged,
        }
    }

    pub fn on_key(&mut self, key: Key, modifiers: Modifiers, ctx: &mut ToolContext<'_>) -> ToolOutcome {
        match self {
            Self::Text(tool) => tool.on_key(key, modifiers, ctx),
            _ => ToolOutcome::Unchanged,
        }
    }

    /// Whether this tool wants keyboard input instead of shortcuts
    pub fn captures_keyboard(&self) -> bool {
        matches!(self, Self::Text(tool) if tool.is_typing())
    }

    pub fn as_select(&self) -> Option<&SelectTool> {
        match self {
            Self::Select(tool) => Some(tool),
            _ => None,
        }
    }

    pub fn as_select_mut(&mut self) -> Option<&mut SelectTool> {
        match self {
            Self::Select(tool) => Some(tool),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&TextTool> {
        match self {
            Self::Text(tool) => Some(tool),
            _ => None,
        }
    }

    pub fn as_text_mut(&mut self) -> Option<&mut TextTool> {
        match self {
            Self::Text(tool) => Some(tool),
            _ => None,
        }
    }
}

/// Settings the registry needs to build its tools
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToolSettings {
    pub brush_radius: f32,
    pub eraser_radius: f32,
    pub fill_tolerance: u8,
    pub font_size: f32,
    pub handle_radius: f32,
    pub rotation_handle_offset: f32,
}

/// One instance per tool variant, indexed by [`ToolId`].
///
/// Switching tools never rebuilds an instance, so per-tool settings survive
/// a round trip through another tool.
#[derive(Debug, Clone)]
pub struct ToolRegistry {
    tools: Vec<Tool>,
}

impl ToolRegistry {
    pub fn new(settings: &ToolSettings, font_family: &str, canvas: egui::Rect) -> Self {
        let tools = ToolId::ALL
            .into_iter()
            .map(|id| match id {
                ToolId::Brush => Tool::Brush(BrushTool::new(settings.brush_radius)),
                ToolId::Eraser => Tool::Eraser(EraserTool::new(settings.eraser_radius)),
                ToolId::Fill => Tool::Fill(FillTool::new(settings.fill_tolerance)),
                ToolId::Select => Tool::Select(SelectTool::new(
                    canvas,
                    settings.handle_radius,
                    settings.rotation_handle_offset,
                )),
                ToolId::Eyedropper => Tool::Eyedropper(EyedropperTool),
                ToolId::Text => Tool::Text(TextTool::new(settings.font_size, font_family)),
            })
            .collect();
        Self { tools }
    }

    pub fn get(&self, id: ToolId) -> &Tool {
        &self.tools[id.index()]
    }

    pub fn get_mut(&mut self, id: ToolId) -> &mut Tool {
        &mut self.tools[id.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tool> {
        self.tools.iter()
    }

    pub fn select(&self) -> Option<&SelectTool> {
        self.get(ToolId::Select).as_select()
    }

    pub fn select_mut(&mut self) -> Option<&mut SelectTool> {
        self.get_mut(ToolId::Select).as_select_mut()
    }

    pub fn text(&self) -> Option<&TextTool> {
        self.get(ToolId::Text).as_text()
    }

    /// Drop strokes, selections and pending text without committing
    /// anything. Settings such as radius and font are kept.
    pub fn reset_transient(&mut self) {
        for tool in &mut self.tools {
            match tool {
                Tool::Brush(tool) => {
                    tool.finish_gesture();
                }
                Tool::Eraser(tool) => {
                    tool.finish_gesture();
                }
                Tool::Select(tool) => {
                    tool.clear();
                }
                Tool::Text(tool) => tool.cancel(),
                Tool::Fill(_) | Tool::Eyedropper(_) => {}
            }
        }
    }
}
