use egui::{Pos2, Rect};
use image::RgbaImage;
use log::{debug, info};

use crate::selection::{FloatingSelection, SelectState, SelectionChange, SelectionTransform};
use crate::tool::{ToolContext, ToolOutcome};

/// Rectangular selection over the active layer.
///
/// Completing a selection lifts the pixels underneath into a floating copy;
/// nothing is written back to the layer until [`SelectTool::commit`].
#[derive(Debug, Clone)]
pub struct SelectTool {
    /// Skip pixels matching the secondary color when committing
    pub is_transparent: bool,
    transform: SelectionTransform,
    floating: Option<FloatingSelection>,
}

impl SelectTool {
    pub fn new(canvas: Rect, handle_radius: f32, rotation_handle_offset: f32) -> Self {
        Self {
            is_transparent: false,
            transform: SelectionTransform::new(canvas, handle_radius, rotation_handle_offset),
            floating: None,
        }
    }

    pub fn state(&self) -> SelectState {
        self.transform.state()
    }

    pub fn transform(&self) -> &SelectionTransform {
        &self.transform
    }

    pub fn floating(&self) -> Option<&FloatingSelection> {
        self.floating.as_ref()
    }

    pub fn on_pointer_down(&mut self, pos: Pos2, _ctx: &mut ToolContext<'_>) -> ToolOutcome {
        let change = self.transform.on_pointer_down(pos);
        self.outcome(change)
    }

    pub fn on_pointer_move(&mut self, pos: Pos2) -> ToolOutcome {
        let change = self.transform.on_pointer_move(pos);
        self.outcome(change)
    }

    pub fn on_pointer_up(&mut self, pos: Pos2, ctx: &mut ToolContext<'_>) -> ToolOutcome {
        let change = self.transform.on_pointer_up(pos);
        self.settle(change, ctx)
    }

    pub fn finish_gesture(&mut self, ctx: &mut ToolContext<'_>) -> ToolOutcome {
        let change = self.transform.finish_gesture();
        self.settle(change, ctx)
    }

    /// Write the floating content into the active layer at the current rect
    /// and angle, clearing the area it was lifted from, then drop the
    /// selection. On a locked or hidden layer the selection is kept and
    /// nothing is written.
    pub fn commit(&mut self, ctx: &mut ToolContext<'_>) -> ToolOutcome {
        let settled = self.finish_gesture(ctx);
        if !self.transform.has_selection() {
            return settled;
        }
        let Some(floating) = &self.floating else {
            self.clear();
            return ToolOutcome::Updated;
        };

        let key = self.is_transparent.then_some(ctx.document.secondary_color);
        let rect = self.transform.rect();
        let angle = self.transform.rotation_angle();
        let Some(pixels) = ctx.layers.editable_pixels() else {
            return settled;
        };
        floating.clear_origin(pixels);
        let written = floating.stamp_into(pixels, rect, angle, key);
        info!("Committed selection at {:?}, {} pixels", rect, written);
        self.clear();
        ToolOutcome::Commit
    }

    /// Copy the floating content again from `source` after another tool
    /// edited the layer it was lifted from
    pub fn refresh_floating(&mut self, source: &RgbaImage) {
        if let Some(floating) = &mut self.floating {
            floating.refresh(source);
            debug!("Refreshed floating selection at {:?}", floating.origin);
        }
    }

    /// Drop the selection without touching the layer
    pub fn clear(&mut self) -> ToolOutcome {
        if self.transform.state() == SelectState::Idle && self.floating.is_none() {
            return ToolOutcome::Unchanged;
        }
        self.transform.discard();
        self.floating = None;
        ToolOutcome::Updated
    }

    fn settle(&mut self, change: SelectionChange, ctx: &mut ToolContext<'_>) -> ToolOutcome {
        if change == SelectionChange::Completed {
            self.floating =
                FloatingSelection::lift(ctx.layers.active_layer().pixels(), self.transform.rect());
            debug!(
                "Lifted {:?} from layer {}",
                self.floating.as_ref().map(|f| f.origin),
                ctx.layers.active_index()
            );
        }
        self.outcome(change)
    }

    fn outcome(&mut self, change: SelectionChange) -> ToolOutcome {
        match change {
            SelectionChange::None => ToolOutcome::Unchanged,
            SelectionChange::Discarded => {
                self.floating = None;
                ToolOutcome::Updated
            }
            SelectionChange::Started
            | SelectionChange::Updated
            | SelectionChange::Completed
            | SelectionChange::GestureStarted
            | SelectionChange::GestureEnded => ToolOutcome::Updated,
        }
    }
}
