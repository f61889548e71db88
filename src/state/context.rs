//! The root editing session.
//!
//! `EditorContext` owns the document, the layer stack, every tool instance and
//! the history log. Input flows in through [`EditorContext::handle_event`],
//! is routed to the active tool only, and completed edits are snapshotted
//! into history. Observers subscribe to the [`EventBus`] instead of polling.

use egui::{Pos2, Rect};
use image::{Rgba, RgbaImage};
use log::{debug, info, warn};

use crate::buffer::{PngCodec, SnapshotCodec};
use crate::color::parse_color;
use crate::command::{Command, CommandFlags, HistoryManager, Restore};
use crate::config::EditorConfig;
use crate::document::Document;
use crate::error::{EditorError, EditorResult};
use crate::event::{EditorEvent, EventBus, EventHandler, LayerEvent};
use crate::input::InputEvent;
use crate::layer::LayerSet;
use crate::selection::SelectState;
use crate::text::{GlyphRasterizer, TextRasterizer};
use crate::tool::{Tool, ToolContext, ToolId, ToolOutcome, ToolRegistry};

/// Observable state compared before and after each operation to decide which
/// change events to emit
#[derive(Debug, Clone, PartialEq)]
struct Observed {
    primary: Rgba<u8>,
    secondary: Rgba<u8>,
    select: (SelectState, Rect, f32),
    text: (bool, String, Pos2),
}

pub struct EditorContext {
    document: Document,
    layers: LayerSet,
    tools: ToolRegistry,
    history: HistoryManager,
    commands: CommandFlags,
    event_bus: EventBus,
    codec: Box<dyn SnapshotCodec>,
    text: Box<dyn TextRasterizer>,
}

impl std::fmt::Debug for EditorContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorContext")
            .field("document", &self.document)
            .field("layers", &self.layers.len())
            .field("history_index", &self.history.history_index())
            .field("commands", &self.commands)
            .field("event_bus", &self.event_bus)
            .finish_non_exhaustive()
    }
}

impl EditorContext {
    /// A session with PNG snapshots and a rasterizer with no fonts loaded
    pub fn new(config: &EditorConfig) -> Self {
        Self::with_collaborators(config, Box::new(PngCodec), Box::new(GlyphRasterizer::new()))
    }

    pub fn with_collaborators(
        config: &EditorConfig,
        codec: Box<dyn SnapshotCodec>,
        text: Box<dyn TextRasterizer>,
    ) -> Self {
        let document = Document::new(config);
        let layers = LayerSet::new(document.canvas_width(), document.canvas_height());
        let tools = ToolRegistry::new(
            &config.tool_settings(),
            &config.font_family,
            document.canvas_rect(),
        );
        let history = match config.max_history {
            Some(max) => HistoryManager::with_capacity_limit(max),
            None => HistoryManager::new(),
        };
        info!(
            "Editor session started: {}x{} canvas",
            document.canvas_width(),
            document.canvas_height()
        );
        Self {
            document,
            layers,
            tools,
            history,
            commands: CommandFlags::default(),
            event_bus: EventBus::new(),
            codec,
            text,
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn layers(&self) -> &LayerSet {
        &self.layers
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    pub fn history(&self) -> &HistoryManager {
        &self.history
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    pub fn subscribe(&self, handler: Box<dyn EventHandler>) {
        self.event_bus.subscribe(handler);
    }

    pub fn active_tool(&self) -> &Tool {
        self.tools.get(self.document.active_tool())
    }

    /// Tool settings such as radius or tolerance can be edited in place
    pub fn tool_mut(&mut self, id: ToolId) -> &mut Tool {
        self.tools.get_mut(id)
    }

    /// Whether the active tool is between pointer-down and pointer-up
    pub fn is_gesture_active(&self) -> bool {
        self.active_tool().is_in_gesture()
    }

    /// Route one input event to the active tool.
    ///
    /// Only a fill seeded outside the canvas fails; the tool is left in a
    /// consistent state either way.
    pub fn handle_event(&mut self, event: &InputEvent) -> EditorResult<()> {
        let before = self.observe();
        let result = match event {
            InputEvent::PointerDown { pos, button } => {
                self.dispatch(|tool, ctx| tool.on_pointer_down(*pos, *button, ctx))
            }
            InputEvent::PointerMove { pos } => {
                Ok(self.dispatch(|tool, ctx| tool.on_pointer_move(*pos, ctx)))
            }
            InputEvent::PointerUp { pos, .. } => {
                Ok(self.dispatch(|tool, ctx| tool.on_pointer_up(*pos, ctx)))
            }
            InputEvent::PointerCaptureLost => Ok(self.finish_pointer_gesture()),
            InputEvent::Key { key, modifiers } => Ok(self.handle_key(*key, *modifiers)),
            InputEvent::Text(text) => Ok(self.dispatch(|tool, _| tool.on_text(text))),
        };
        let result = result.map(|outcome| self.apply_outcome(outcome));
        self.notify_changes(before);
        result
    }

    /// Handle a frame's worth of input, then drain pending commands. Event
    /// errors are logged and do not stop the remaining events.
    pub fn process_frame<'a>(
        &mut self,
        events: impl IntoIterator<Item = &'a InputEvent>,
    ) -> Vec<Command> {
        for event in events {
            if let Err(err) = self.handle_event(event) {
                warn!("Input event {:?} failed: {}", event, err);
            }
        }
        self.process_commands()
    }

    /// End the active gesture as if the pointer had been released
    pub fn cancel_gesture(&mut self) {
        let before = self.observe();
        let outcome = self.finish_pointer_gesture();
        self.apply_outcome(outcome);
        self.notify_changes(before);
    }

    /// Make `id` the active tool, finishing whatever the current tool was
    /// doing. The new tool keeps the state it had when last used.
    pub fn set_active_tool(&mut self, id: ToolId) {
        let before = self.observe();
        self.switch_tool(id);
        self.notify_changes(before);
    }

    /// Go back to the tool that was active before the current one
    pub fn revert_tool(&mut self) {
        self.set_active_tool(self.document.previous_tool());
    }

    /// Raise a one-shot command flag. Repeated requests before the next
    /// [`process_commands`](Self::process_commands) collapse into one.
    pub fn request(&mut self, command: Command) {
        debug!("Requested {:?}", command);
        self.commands.request(command);
    }

    pub fn pending_commands(&self) -> CommandFlags {
        self.commands
    }

    /// Apply and clear the raised command flags. While a pointer gesture is
    /// in progress the flags stay raised for a later cycle.
    pub fn process_commands(&mut self) -> Vec<Command> {
        if !self.commands.any() {
            return Vec::new();
        }
        if self.is_gesture_active() {
            debug!("Gesture in progress, deferring {:?}", self.commands);
            return Vec::new();
        }
        let commands = self.commands.drain();
        for command in &commands {
            match command {
                Command::Undo => {
                    self.undo();
                }
                Command::Redo => {
                    self.redo();
                }
                Command::Reset => self.reset(),
            }
        }
        commands
    }

    /// Step back one history entry. Returns `false` when already at the start.
    pub fn undo(&mut self) -> bool {
        self.cancel_gesture();
        let Some(restore) = self.history.undo() else {
            debug!("Nothing to undo");
            return false;
        };
        self.apply_restore(restore);
        self.event_bus.emit(EditorEvent::Undo);
        true
    }

    /// Step forward one history entry. Returns `false` at the newest entry.
    pub fn redo(&mut self) -> bool {
        self.cancel_gesture();
        let Some(restore) = self.history.redo() else {
            debug!("Nothing to redo");
            return false;
        };
        self.apply_restore(restore);
        self.event_bus.emit(EditorEvent::Redo);
        true
    }

    /// Clear history and return to a single blank layer. Any in-progress
    /// gesture, selection or pending text is dropped.
    pub fn reset(&mut self) {
        let before = self.observe();
        self.tools.reset_transient();
        self.history.reset();
        self.layers.reset();
        info!("Editor reset");
        self.notify_changes(before);
        self.emit_history_changed();
        self.event_bus.emit(EditorEvent::LayerChanged(LayerEvent::ContentChanged {
            index: 0,
        }));
        self.event_bus.emit(EditorEvent::Reset);
    }

    /// Stamp the floating selection into the active layer and drop the
    /// selection. Returns whether pixels were committed. A stroke still in
    /// progress is finished first so the lifted content includes it.
    pub fn commit_selection(&mut self) -> bool {
        self.cancel_gesture();
        let before = self.observe();
        let outcome = self.dispatch_to(ToolId::Select, |tool, ctx| {
            tool.as_select_mut()
                .map_or(ToolOutcome::Unchanged, |select| select.commit(ctx))
        });
        self.apply_outcome(outcome);
        self.notify_changes(before);
        outcome == ToolOutcome::Commit
    }

    /// Drop the selection without changing any pixels
    pub fn clear_selection(&mut self) {
        let before = self.observe();
        if let Some(select) = self.tools.select_mut() {
            select.clear();
        }
        self.notify_changes(before);
    }

    pub fn set_selection_transparent(&mut self, transparent: bool) {
        if let Some(select) = self.tools.select_mut() {
            select.is_transparent = transparent;
        }
    }

    /// Draw the pending text into the active layer
    pub fn commit_text(&mut self) -> bool {
        let before = self.observe();
        let outcome = self.dispatch_to(ToolId::Text, |tool, ctx| {
            tool.as_text_mut()
                .map_or(ToolOutcome::Unchanged, |text| text.commit(ctx))
        });
        self.apply_outcome(outcome);
        self.notify_changes(before);
        outcome == ToolOutcome::Commit
    }

    /// Set the primary color from a color string; unparseable input becomes
    /// opaque black
    pub fn set_primary_color(&mut self, color: &str) {
        let before = self.observe();
        self.document.primary_color = parse_color(color);
        self.notify_changes(before);
    }

    pub fn set_secondary_color(&mut self, color: &str) {
        let before = self.observe();
        self.document.secondary_color = parse_color(color);
        self.notify_changes(before);
    }

    pub fn swap_colors(&mut self) {
        let before = self.observe();
        self.document.swap_colors();
        self.notify_changes(before);
    }

    pub fn set_scale(&mut self, scale: f32) -> bool {
        let changed = self.document.set_scale(scale);
        if changed {
            self.event_bus.emit(EditorEvent::ScaleChanged(scale));
        }
        changed
    }

    /// Append a blank layer and make it active
    pub fn add_layer(&mut self, name: &str) -> usize {
        self.cancel_gesture();
        self.drop_selection_for_layer_change();
        let index = self.layers.add_layer(name);
        self.emit_layer(LayerEvent::Added { index });
        self.emit_layer(LayerEvent::ActiveChanged { index });
        index
    }

    /// Remove a layer. The only remaining layer is never removed. History is
    /// cleared because its entries refer to layers by index.
    pub fn remove_layer(&mut self, index: usize) -> EditorResult<bool> {
        self.cancel_gesture();
        if self.layers.remove_layer(index)?.is_none() {
            return Ok(false);
        }
        self.drop_selection_for_layer_change();
        self.history.reset();
        info!("History cleared after removing layer {index}");
        self.emit_layer(LayerEvent::Removed { index });
        self.emit_layer(LayerEvent::ActiveChanged {
            index: self.layers.active_index(),
        });
        self.emit_history_changed();
        Ok(true)
    }

    pub fn set_active_layer(&mut self, index: usize) -> EditorResult<()> {
        if index == self.layers.active_index() {
            return Ok(());
        }
        if index >= self.layers.len() {
            return Err(EditorError::LayerNotFound(index));
        }
        self.cancel_gesture();
        self.drop_selection_for_layer_change();
        self.layers.set_active(index)?;
        self.emit_layer(LayerEvent::ActiveChanged { index });
        Ok(())
    }

    pub fn set_layer_visible(&mut self, index: usize, visible: bool) -> EditorResult<()> {
        self.layers.set_visible(index, visible)?;
        self.emit_layer(LayerEvent::VisibilityChanged { index, visible });
        Ok(())
    }

    pub fn set_layer_locked(&mut self, index: usize, locked: bool) -> EditorResult<()> {
        self.layers.set_locked(index, locked)?;
        self.emit_layer(LayerEvent::LockChanged { index, locked });
        Ok(())
    }

    pub fn set_layer_opacity(&mut self, index: usize, opacity: u8) -> EditorResult<()> {
        self.layers.set_opacity(index, opacity)?;
        let opacity = self.layers.get(index).map_or(opacity, |l| l.opacity());
        self.emit_layer(LayerEvent::OpacityChanged { index, opacity });
        Ok(())
    }

    /// Flattened visible layers, for display or export
    pub fn composite(&self) -> RgbaImage {
        self.layers.composite()
    }

    fn dispatch<R>(&mut self, f: impl FnOnce(&mut Tool, &mut ToolContext<'_>) -> R) -> R {
        self.dispatch_to(self.document.active_tool(), f)
    }

    fn dispatch_to<R>(
        &mut self,
        id: ToolId,
        f: impl FnOnce(&mut Tool, &mut ToolContext<'_>) -> R,
    ) -> R {
        let Self {
            document,
            layers,
            tools,
            text,
            ..
        } = self;
        let mut ctx = ToolContext {
            layers,
            document,
            text: &**text,
        };
        f(tools.get_mut(id), &mut ctx)
    }

    fn finish_pointer_gesture(&mut self) -> ToolOutcome {
        self.dispatch(|tool, ctx| {
            if tool.is_in_gesture() {
                debug!("Finishing {:?} gesture", tool.id());
                tool.finish_gesture(ctx)
            } else {
                ToolOutcome::Unchanged
            }
        })
    }

    fn handle_key(&mut self, key: egui::Key, modifiers: egui::Modifiers) -> ToolOutcome {
        if modifiers.command {
            match key {
                egui::Key::Z if modifiers.shift => {
                    self.request(Command::Redo);
                    return ToolOutcome::Unchanged;
                }
                egui::Key::Z => {
                    self.request(Command::Undo);
                    return ToolOutcome::Unchanged;
                }
                egui::Key::Y => {
                    self.request(Command::Redo);
                    return ToolOutcome::Unchanged;
                }
                _ => {}
            }
        }

        if self.active_tool().captures_keyboard() {
            return self.dispatch(|tool, ctx| tool.on_key(key, modifiers, ctx));
        }
        if modifiers.is_none() {
            if let Some(id) = ToolId::from_key(key) {
                self.switch_tool(id);
            }
        }
        ToolOutcome::Unchanged
    }

    fn switch_tool(&mut self, id: ToolId) {
        if self.document.active_tool() == id {
            return;
        }
        let outcome = self.dispatch(|tool, ctx| tool.finish_gesture(ctx));
        self.apply_outcome(outcome);
        if let Some(old) = self.document.set_active_tool(id) {
            self.event_bus.emit(EditorEvent::ToolChanged { old, new: id });
        }
    }

    fn apply_outcome(&mut self, outcome: ToolOutcome) {
        if outcome == ToolOutcome::Commit {
            self.record_commit();
        }
    }

    /// Lifted content belongs to the active layer; it cannot follow a
    /// change of layer
    fn drop_selection_for_layer_change(&mut self) {
        if self.tools.select().is_some_and(|select| select.floating().is_some()) {
            debug!("Active layer changing, dropping floating selection");
        }
        self.clear_selection();
    }

    /// Snapshot the active layer into history after a committed edit
    fn record_commit(&mut self) {
        let index = self.layers.active_index();
        if let Some(select) = self.tools.select_mut() {
            select.refresh_floating(self.layers.active_layer().pixels());
        }
        match self.layers.snapshot(index, self.codec.as_ref()) {
            Ok(snapshot) => {
                self.history.push(index, snapshot);
                self.emit_history_changed();
            }
            Err(err) => warn!("Failed to snapshot layer {index}, edit not recorded: {err}"),
        }
        self.emit_layer(LayerEvent::ContentChanged { index });
    }

    fn apply_restore(&mut self, restore: Restore) {
        let Restore {
            layer_index,
            snapshot,
        } = restore;
        if let Err(err) = self
            .layers
            .restore(layer_index, snapshot.as_ref(), self.codec.as_ref())
        {
            warn!("Failed to restore layer {layer_index}: {err}");
        }
        // Lifted pixels no longer match the layer underneath
        self.clear_selection();
        self.emit_layer(LayerEvent::ContentChanged { index: layer_index });
        self.emit_history_changed();
    }

    fn emit_layer(&self, event: LayerEvent) {
        self.event_bus.emit(EditorEvent::LayerChanged(event));
    }

    fn emit_history_changed(&self) {
        self.event_bus.emit(EditorEvent::HistoryChanged {
            index: self.history.history_index(),
            len: self.history.len(),
        });
    }

    fn observe(&self) -> Observed {
        let select = self.tools.select().map_or(
            (SelectState::Idle, Rect::ZERO, 0.0),
            |select| {
                let transform = select.transform();
                (transform.state(), transform.rect(), transform.rotation_angle())
            },
        );
        let text = self.tools.text().map_or((false, String::new(), Pos2::ZERO), |text| {
            (
                text.is_typing(),
                text.current_text().to_string(),
                text.text_input_position(),
            )
        });
        Observed {
            primary: self.document.primary_color,
            secondary: self.document.secondary_color,
            select,
            text,
        }
    }

    fn notify_changes(&self, before: Observed) {
        let after = self.observe();
        if before.primary != after.primary || before.secondary != after.secondary {
            self.event_bus.emit(EditorEvent::ColorChanged {
                primary: after.primary,
                secondary: after.secondary,
            });
        }
        if before.select != after.select {
            self.event_bus.emit(EditorEvent::SelectionChanged(after.select.0));
        }
        if before.text != after.text {
            self.event_bus.emit(EditorEvent::TextChanged);
        }
    }
}
