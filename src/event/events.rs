use image::Rgba;

use crate::selection::SelectState;
use crate::tool::ToolId;

#[derive(Debug, Clone, PartialEq)]
pub enum EditorEvent {
    ToolChanged {
        old: ToolId,
        new: ToolId,
    },
    ColorChanged {
        primary: Rgba<u8>,
        secondary: Rgba<u8>,
    },
    LayerChanged(LayerEvent),
    HistoryChanged {
        index: isize,
        len: usize,
    },
    SelectionChanged(SelectState),
    /// Pending text or caret position changed
    TextChanged,
    ScaleChanged(f32),
    /// One-shot commands, emitted after they were applied
    Undo,
    Redo,
    Reset,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LayerEvent {
    Added { index: usize },
    Removed { index: usize },
    ActiveChanged { index: usize },
    VisibilityChanged { index: usize, visible: bool },
    LockChanged { index: usize, locked: bool },
    OpacityChanged { index: usize, opacity: u8 },
    ContentChanged { index: usize },
}
