pub mod brush;
pub mod eraser;
pub mod eyedropper;
pub mod fill;
pub mod select;
pub mod text;

pub use brush::BrushTool;
pub use eraser::EraserTool;
pub use eyedropper::EyedropperTool;
pub use fill::FillTool;
pub use select::SelectTool;
pub use text::TextTool;
