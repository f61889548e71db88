use egui::{PointerButton, Pos2};
use log::debug;

use crate::error::EditorResult;
use crate::flood_fill::flood_fill;
use crate::tool::{ToolContext, ToolOutcome};

/// Bucket fill of the 4-connected region under the pointer
#[derive(Debug, Clone)]
pub struct FillTool {
    /// Per-channel distance still treated as the seed color
    pub tolerance: u8,
}

impl FillTool {
    pub fn new(tolerance: u8) -> Self {
        Self { tolerance }
    }

    /// Fill from the pixel under `pos`. A seed outside the canvas is an error;
    /// a locked or hidden layer is a silent no-op.
    pub fn on_pointer_down(
        &self,
        pos: Pos2,
        button: PointerButton,
        ctx: &mut ToolContext<'_>,
    ) -> EditorResult<ToolOutcome> {
        let color = ctx.color_for(button);
        let Some(pixels) = ctx.layers.editable_pixels() else {
            return Ok(ToolOutcome::Unchanged);
        };
        let seed = (pos.x.floor() as i64, pos.y.floor() as i64);
        let filled = flood_fill(pixels, seed, color, self.tolerance)?;
        debug!("Filled {} pixels from {:?}", filled, seed);
        Ok(if filled > 0 {
            ToolOutcome::Commit
        } else {
            ToolOutcome::Unchanged
        })
    }
}
