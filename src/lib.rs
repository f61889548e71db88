#![warn(clippy::all, rust_2018_idioms)]

pub mod buffer;
pub mod color;
pub mod command;
pub mod config;
pub mod document;
pub mod error;
pub mod event;
pub mod flood_fill;
pub mod geometry;
pub mod input;
pub mod layer;
pub mod selection;
pub mod state;
pub mod stroke;
pub mod text;
pub mod tool;

pub use buffer::{PixelBuffer, PngCodec, Snapshot, SnapshotCodec};
pub use command::{Command, CommandFlags, HistoryManager};
pub use config::EditorConfig;
pub use document::Document;
pub use error::{ConfigError, EditorError, EditorResult, SnapshotError};
pub use event::{EditorEvent, EventBus, EventHandler, LayerEvent};
pub use flood_fill::flood_fill;
pub use input::InputEvent;
pub use layer::{Layer, LayerSet};
pub use selection::{SelectState, SelectionTransform};
pub use state::EditorContext;
pub use text::{GlyphRasterizer, TextRasterizer};
pub use tool::{Tool, ToolId, ToolOutcome, ToolRegistry};
