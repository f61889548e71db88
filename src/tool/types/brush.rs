use egui::{PointerButton, Pos2};
use log::debug;

use crate::stroke::Stroke;
use crate::tool::{ToolContext, ToolOutcome};

/// Freehand brush painting discs of `radius` in the button's color
#[derive(Debug, Clone)]
pub struct BrushTool {
    pub radius: f32,
    /// Present while the pointer is down
    stroke: Option<Stroke>,
}

impl BrushTool {
    pub fn new(radius: f32) -> Self {
        Self {
            radius,
            stroke: None,
        }
    }

    pub fn is_drawing(&self) -> bool {
        self.stroke.is_some()
    }

    pub fn on_pointer_down(
        &mut self,
        pos: Pos2,
        button: PointerButton,
        ctx: &mut ToolContext<'_>,
    ) -> ToolOutcome {
        if self.is_drawing() {
            return ToolOutcome::Unchanged;
        }
        let color = ctx.color_for(button);
        self.stroke = Some(Stroke::begin(ctx.layers.editable_pixels(), pos, self.radius, color));
        debug!("Brush stroke started at {:?}", pos);
        ToolOutcome::Updated
    }

    pub fn on_pointer_move(&mut self, pos: Pos2, ctx: &mut ToolContext<'_>) -> ToolOutcome {
        match &mut self.stroke {
            Some(stroke) => {
                stroke.extend(ctx.layers.editable_pixels(), pos, self.radius);
                ToolOutcome::Updated
            }
            None => ToolOutcome::Unchanged,
        }
    }

    pub fn on_pointer_up(&mut self, pos: Pos2, ctx: &mut ToolContext<'_>) -> ToolOutcome {
        self.on_pointer_move(pos, ctx);
        self.finish_gesture()
    }

    /// End the stroke. It is committed only if it wrote at least one pixel.
    pub fn finish_gesture(&mut self) -> ToolOutcome {
        match self.stroke.take() {
            Some(stroke) if stroke.painted() > 0 => {
                debug!("Brush stroke finished, {} pixels", stroke.painted());
                ToolOutcome::Commit
            }
            Some(_) => ToolOutcome::Updated,
            None => ToolOutcome::Unchanged,
        }
    }
}
