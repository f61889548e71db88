mod common;

use std::cell::RefCell;
use std::rc::Rc;

use canvas_editor::{Command, EditorConfig, EditorContext, EditorEvent, Tool, ToolId};
use common::*;
use egui::{PointerButton, pos2};

fn small_brush(ctx: &mut EditorContext) {
    if let Tool::Brush(brush) = ctx.tool_mut(ToolId::Brush) {
        brush.radius = 2.0;
    }
}

#[test]
fn test_undo_redo_round_trip() {
    let mut ctx = context(32, 32);
    small_brush(&mut ctx);
    let before = pixels(&ctx, 0);

    drag(&mut ctx, pos2(5.0, 5.0), pos2(5.0, 25.0));
    drag(&mut ctx, pos2(15.0, 5.0), pos2(15.0, 25.0));
    drag(&mut ctx, pos2(25.0, 5.0), pos2(25.0, 25.0));
    let after = pixels(&ctx, 0);
    assert_eq!(ctx.history().len(), 3);

    for _ in 0..3 {
        assert!(ctx.undo());
    }
    assert_eq!(pixels(&ctx, 0), before);
    assert_eq!(ctx.history().history_index(), -1);

    for _ in 0..3 {
        assert!(ctx.redo());
    }
    assert_eq!(pixels(&ctx, 0), after);
    assert_eq!(ctx.history().history_index(), 2);
}

#[test]
fn test_push_after_undo_truncates() {
    let mut ctx = context(32, 32);
    small_brush(&mut ctx);

    drag(&mut ctx, pos2(5.0, 5.0), pos2(6.0, 5.0));
    drag(&mut ctx, pos2(15.0, 5.0), pos2(16.0, 5.0));
    ctx.undo();
    drag(&mut ctx, pos2(25.0, 5.0), pos2(26.0, 5.0));

    assert_eq!(ctx.history().len(), 2);
    assert_eq!(ctx.history().history_index(), 1);
    assert!(!ctx.history().can_redo());
    assert_eq!(pixel(&ctx, 0, 15, 5), CLEAR);
    assert_eq!(pixel(&ctx, 0, 25, 5), BLACK);
    assert!(!ctx.redo());
}

#[test]
fn test_undo_at_start_is_noop() {
    let mut ctx = context(8, 8);
    let before = pixels(&ctx, 0);
    assert!(!ctx.undo());
    assert_eq!(ctx.history().history_index(), -1);
    assert_eq!(pixels(&ctx, 0), before);
}

#[test]
fn test_reset_returns_to_blank_document() {
    let mut ctx = context(16, 16);
    drag(&mut ctx, pos2(4.0, 4.0), pos2(10.0, 10.0));
    ctx.add_layer("Ink");
    ctx.set_layer_locked(1, true).unwrap();
    ctx.set_layer_opacity(1, 40).unwrap();

    ctx.request(Command::Reset);
    assert_eq!(ctx.process_commands(), vec![Command::Reset]);

    assert_eq!(ctx.history().history_index(), -1);
    assert!(ctx.history().is_empty());
    assert_eq!(ctx.layers().len(), 1);
    let layer = ctx.layers().active_layer();
    assert!(layer.visible);
    assert!(!layer.locked);
    assert_eq!(layer.opacity(), 100);
    assert!(layer.is_blank());
}

#[test]
fn test_repeated_undo_requests_collapse() {
    let mut ctx = context(32, 32);
    small_brush(&mut ctx);
    for x in [5.0, 15.0, 25.0] {
        drag(&mut ctx, pos2(x, 5.0), pos2(x, 6.0));
    }

    for _ in 0..3 {
        ctx.request(Command::Undo);
    }
    assert_eq!(ctx.process_commands(), vec![Command::Undo]);
    assert_eq!(ctx.history().history_index(), 1);
    assert!(ctx.process_commands().is_empty());
}

#[test]
fn test_commands_wait_for_gesture_end() {
    let mut ctx = context(16, 16);
    down(&mut ctx, 5.0, 5.0, PointerButton::Primary);
    ctx.request(Command::Undo);

    assert!(ctx.process_commands().is_empty());
    assert!(ctx.pending_commands().undo);

    up(&mut ctx, 6.0, 5.0);
    assert_eq!(ctx.history().len(), 1);
    assert_eq!(ctx.process_commands(), vec![Command::Undo]);
    assert_eq!(ctx.history().history_index(), -1);
    assert!(ctx.layers().active_layer().is_blank());
}

#[test]
fn test_same_color_fill_is_undoable() {
    let mut ctx = context(4, 4);
    ctx.set_active_tool(ToolId::Fill);
    ctx.set_primary_color("#ff0000");

    click(&mut ctx, 1.0, 1.0);
    click(&mut ctx, 1.0, 1.0);
    assert_eq!(ctx.history().len(), 2);

    ctx.undo();
    assert_eq!(pixel(&ctx, 0, 3, 3), RED);
    ctx.undo();
    assert_eq!(pixel(&ctx, 0, 3, 3), CLEAR);
}

#[test]
fn test_capacity_limit_keeps_evicted_baseline() {
    init_logging();
    let mut ctx = EditorContext::new(&EditorConfig {
        canvas_width: 32,
        canvas_height: 32,
        max_history: Some(2),
        ..EditorConfig::default()
    });
    small_brush(&mut ctx);
    for x in [5.0, 15.0, 25.0] {
        drag(&mut ctx, pos2(x, 5.0), pos2(x, 6.0));
    }
    assert_eq!(ctx.history().len(), 2);

    assert!(ctx.undo());
    assert!(ctx.undo());
    assert!(!ctx.undo());
    assert_eq!(pixel(&ctx, 0, 5, 5), BLACK);
    assert_eq!(pixel(&ctx, 0, 15, 5), CLEAR);
    assert_eq!(pixel(&ctx, 0, 25, 5), CLEAR);
}

#[test]
fn test_undo_across_layers() {
    let mut ctx = context(16, 16);
    small_brush(&mut ctx);
    drag(&mut ctx, pos2(4.0, 4.0), pos2(5.0, 4.0));
    ctx.add_layer("Top");
    drag(&mut ctx, pos2(10.0, 10.0), pos2(11.0, 10.0));

    ctx.undo();
    assert!(ctx.layers().get(1).unwrap().is_blank());
    assert_eq!(pixel(&ctx, 0, 4, 4), BLACK);

    ctx.undo();
    assert!(ctx.layers().get(0).unwrap().is_blank());

    ctx.redo();
    ctx.redo();
    assert_eq!(pixel(&ctx, 0, 4, 4), BLACK);
    assert_eq!(pixel(&ctx, 1, 10, 10), BLACK);
}

#[test]
fn test_removing_layer_clears_history() {
    let mut ctx = context(8, 8);
    ctx.add_layer("Top");
    drag(&mut ctx, pos2(2.0, 2.0), pos2(3.0, 3.0));
    assert_eq!(ctx.history().len(), 1);

    assert!(ctx.remove_layer(1).unwrap());
    assert!(ctx.history().is_empty());
    assert!(!ctx.remove_layer(0).unwrap());
    assert_eq!(ctx.layers().len(), 1);
}

#[test]
fn test_history_events_are_emitted() {
    let mut ctx = context(8, 8);
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    ctx.subscribe(Box::new(move |event: &EditorEvent| {
        sink.borrow_mut().push(event.clone());
    }));

    drag(&mut ctx, pos2(2.0, 2.0), pos2(3.0, 3.0));
    ctx.request(Command::Undo);
    ctx.process_commands();

    let events = seen.borrow();
    assert!(events.contains(&EditorEvent::HistoryChanged { index: 0, len: 1 }));
    assert!(events.contains(&EditorEvent::HistoryChanged { index: -1, len: 1 }));
    assert_eq!(events.last(), Some(&EditorEvent::Undo));
}
