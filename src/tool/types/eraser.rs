use egui::Pos2;
use log::debug;

use crate::color::TRANSPARENT;
use crate::stroke::Stroke;
use crate::tool::{ToolContext, ToolOutcome};

/// Clears pixels to fully transparent along the pointer path
#[derive(Debug, Clone)]
pub struct EraserTool {
    pub radius: f32,
    stroke: Option<Stroke>,
}

impl EraserTool {
    pub fn new(radius: f32) -> Self {
        Self {
            radius,
            stroke: None,
        }
    }

    pub fn is_drawing(&self) -> bool {
        self.stroke.is_some()
    }

    pub fn on_pointer_down(&mut self, pos: Pos2, ctx: &mut ToolContext<'_>) -> ToolOutcome {
        if self.is_drawing() {
            return ToolOutcome::Unchanged;
        }
        self.stroke = Some(Stroke::begin(
            ctx.layers.editable_pixels(),
            pos,
            self.radius,
            TRANSPARENT,
        ));
        ToolOutcome::Updated
    }

    pub fn on_pointer_move(&mut self, pos: Pos2, ctx: &mut ToolContext<'_>) -> ToolOutcome {
        let Some(stroke) = &mut self.stroke else {
            return ToolOutcome::Unchanged;
        };
        stroke.extend(ctx.layers.editable_pixels(), pos, self.radius);
        ToolOutcome::Updated
    }

    pub fn on_pointer_up(&mut self, pos: Pos2, ctx: &mut ToolContext<'_>) -> ToolOutcome {
        self.on_pointer_move(pos, ctx);
        self.finish_gesture()
    }

    pub fn finish_gesture(&mut self) -> ToolOutcome {
        let Some(stroke) = self.stroke.take() else {
            return ToolOutcome::Unchanged;
        };
        debug!("Eraser stroke finished, {} pixels", stroke.painted());
        if stroke.painted() > 0 {
            ToolOutcome::Commit
        } else {
            ToolOutcome::Updated
        }
    }
}
