use egui::{PointerButton, Pos2};
use log::debug;

use crate::color::to_hex;
use crate::tool::{ToolContext, ToolOutcome};

/// Picks the composited color under the pointer into the primary color, or
/// the secondary color for any other button.
#[derive(Debug, Clone, Copy, Default)]
pub struct EyedropperTool;

impl EyedropperTool {
    pub fn on_pointer_down(
        &self,
        pos: Pos2,
        button: PointerButton,
        ctx: &mut ToolContext<'_>,
    ) -> ToolOutcome {
        let Some(color) = ctx.layers.sample(pos.x.floor() as i64, pos.y.floor() as i64) else {
            return ToolOutcome::Unchanged;
        };
        let slot = if button == PointerButton::Primary {
            &mut ctx.document.primary_color
        } else {
            &mut ctx.document.secondary_color
        };
        if *slot == color {
            return ToolOutcome::Unchanged;
        }
        *slot = color;
        debug!("Picked {} ({:?} button)", to_hex(color), button);
        ToolOutcome::Updated
    }
}
