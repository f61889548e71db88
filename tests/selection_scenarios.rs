mod common;

use std::f32::consts::{PI, TAU};

use canvas_editor::geometry::hit_testing::rotation_handle_pos;
use canvas_editor::{EditorConfig, EditorContext, SelectState, Tool, ToolId};
use egui::PointerButton;
use common::*;
use egui::{Key, Rect, pos2, vec2};

fn dot_at(ctx: &mut EditorContext, x: f32, y: f32) {
    let previous = ctx.document().active_tool();
    ctx.set_active_tool(ToolId::Brush);
    if let Tool::Brush(brush) = ctx.tool_mut(ToolId::Brush) {
        brush.radius = 0.5;
    }
    click(ctx, x, y);
    ctx.set_active_tool(previous);
}

fn selection_rect(ctx: &EditorContext) -> Rect {
    ctx.tools().select().unwrap().transform().rect()
}

fn select_state(ctx: &EditorContext) -> SelectState {
    ctx.tools().select().unwrap().state()
}

#[test]
fn test_rubber_band_selection() {
    let mut ctx = context(100, 100);
    ctx.set_active_tool(ToolId::Select);
    drag(&mut ctx, pos2(10.0, 10.0), pos2(50.0, 30.0));

    assert_eq!(select_state(&ctx), SelectState::Selected);
    assert_eq!(
        selection_rect(&ctx),
        Rect::from_min_size(pos2(10.0, 10.0), vec2(40.0, 20.0))
    );
    assert!(ctx.history().is_empty());
}

#[test]
fn test_move_and_commit_selection() {
    let mut ctx = context(40, 40);
    dot_at(&mut ctx, 5.5, 5.5);
    assert_eq!(pixel(&ctx, 0, 5, 5), BLACK);
    assert_eq!(ctx.history().len(), 1);

    ctx.set_active_tool(ToolId::Select);
    drag(&mut ctx, pos2(2.0, 2.0), pos2(22.0, 22.0));
    let floating = ctx.tools().select().unwrap().floating().unwrap();
    assert_eq!(floating.origin, (2, 2, 20, 20));

    // Grab the body away from the handles and move right by 10.
    drag(&mut ctx, pos2(12.0, 12.0), pos2(22.0, 12.0));
    assert_eq!(
        selection_rect(&ctx),
        Rect::from_min_size(pos2(12.0, 2.0), vec2(20.0, 20.0))
    );
    // Nothing is written until commit.
    assert_eq!(pixel(&ctx, 0, 5, 5), BLACK);

    assert!(ctx.commit_selection());
    assert_eq!(pixel(&ctx, 0, 5, 5), CLEAR);
    assert_eq!(pixel(&ctx, 0, 15, 5), BLACK);
    assert_eq!(select_state(&ctx), SelectState::Idle);
    assert_eq!(ctx.history().len(), 2);

    ctx.undo();
    assert_eq!(pixel(&ctx, 0, 5, 5), BLACK);
    assert_eq!(pixel(&ctx, 0, 15, 5), CLEAR);
}

#[test]
fn test_commit_on_locked_layer_keeps_selection() {
    let mut ctx = context(20, 20);
    dot_at(&mut ctx, 5.5, 5.5);
    ctx.set_active_tool(ToolId::Select);
    drag(&mut ctx, pos2(4.0, 4.0), pos2(8.0, 8.0));
    ctx.set_layer_locked(0, true).unwrap();

    assert!(!ctx.commit_selection());
    assert_eq!(select_state(&ctx), SelectState::Selected);
    assert_eq!(pixel(&ctx, 0, 5, 5), BLACK);
    assert_eq!(ctx.history().len(), 1);
}

#[test]
fn test_click_outside_discards_selection() {
    let mut ctx = context(100, 100);
    ctx.set_active_tool(ToolId::Select);
    drag(&mut ctx, pos2(10.0, 10.0), pos2(30.0, 30.0));
    click(&mut ctx, 80.0, 80.0);

    let select = ctx.tools().select().unwrap();
    assert_eq!(select.state(), SelectState::Idle);
    assert!(select.floating().is_none());
}

#[test]
fn test_rotate_then_rotate_back() {
    let mut ctx = context(200, 200);
    ctx.set_active_tool(ToolId::Select);
    drag(&mut ctx, pos2(50.0, 80.0), pos2(150.0, 130.0));
    let rect = selection_rect(&ctx);
    let center = rect.center();
    let handle = rotation_handle_pos(rect, 0.0, 30.0);
    let radius = handle.distance(center);

    drag(&mut ctx, handle, center + vec2(radius, 0.0));
    let angle = ctx.tools().select().unwrap().transform().rotation_angle();
    assert!((angle - PI / 2.0).abs() < 1e-4);

    let rotated = rotation_handle_pos(rect, angle, 30.0);
    drag(&mut ctx, rotated, center - vec2(0.0, radius));
    let angle = ctx.tools().select().unwrap().transform().rotation_angle();
    assert!(angle.min(TAU - angle) < 1e-4, "angle {angle}");
    assert_eq!(selection_rect(&ctx), rect);
}

#[test]
fn test_selection_survives_tool_switch() {
    let mut ctx = context(100, 100);
    ctx.set_active_tool(ToolId::Select);
    drag(&mut ctx, pos2(10.0, 10.0), pos2(30.0, 30.0));
    let rect = selection_rect(&ctx);

    key(&mut ctx, Key::B);
    key(&mut ctx, Key::V);
    assert_eq!(select_state(&ctx), SelectState::Selected);
    assert_eq!(selection_rect(&ctx), rect);
}

#[test]
fn test_tool_switch_mid_move_settles() {
    let mut ctx = context(100, 100);
    ctx.set_active_tool(ToolId::Select);
    drag(&mut ctx, pos2(10.0, 10.0), pos2(30.0, 30.0));

    down(&mut ctx, 20.0, 20.0, egui::PointerButton::Primary);
    move_to(&mut ctx, 25.0, 20.0);
    assert_eq!(select_state(&ctx), SelectState::Moving);

    ctx.set_active_tool(ToolId::Fill);
    assert_eq!(select_state(&ctx), SelectState::Selected);
    assert!(ctx.tools().select().unwrap().transform().interaction().is_none());
    assert_eq!(
        selection_rect(&ctx),
        Rect::from_min_size(pos2(15.0, 10.0), vec2(20.0, 20.0))
    );
}

#[test]
fn test_transparent_commit_skips_secondary_color() {
    init_logging();
    let mut ctx = EditorContext::new(&EditorConfig {
        canvas_width: 10,
        canvas_height: 10,
        handle_radius: 0.5,
        ..EditorConfig::default()
    });
    // White background, one black dot
    ctx.set_active_tool(ToolId::Fill);
    ctx.set_primary_color("#ffffff");
    click(&mut ctx, 0.0, 0.0);
    ctx.set_primary_color("#000000");
    dot_at(&mut ctx, 2.5, 2.5);

    ctx.set_active_tool(ToolId::Select);
    ctx.set_selection_transparent(true);
    drag(&mut ctx, pos2(1.0, 1.0), pos2(4.0, 4.0));
    drag(&mut ctx, pos2(2.5, 2.5), pos2(7.5, 2.5));
    assert!(ctx.commit_selection());

    assert_eq!(pixel(&ctx, 0, 7, 2), BLACK);
    // White pixels of the lifted block were skipped, so the cleared origin
    // and the surroundings of the stamped dot stay as they were.
    assert_eq!(pixel(&ctx, 0, 2, 2), CLEAR);
    assert_eq!(pixel(&ctx, 0, 6, 2), image::Rgba([255, 255, 255, 255]));
}

#[test]
fn test_small_selection_moves_by_body() {
    let mut ctx = context(40, 40);
    ctx.set_active_tool(ToolId::Select);
    drag(&mut ctx, pos2(10.0, 10.0), pos2(22.0, 22.0));

    down(&mut ctx, 16.0, 16.0, PointerButton::Primary);
    assert_eq!(select_state(&ctx), SelectState::Moving);
    move_to(&mut ctx, 20.0, 16.0);
    up(&mut ctx, 20.0, 16.0);
    assert_eq!(
        selection_rect(&ctx),
        Rect::from_min_size(pos2(14.0, 10.0), vec2(12.0, 12.0))
    );
}

#[test]
fn test_stroke_inside_selection_survives_commit() {
    let mut ctx = context(40, 40);
    dot_at(&mut ctx, 5.5, 5.5);
    ctx.set_active_tool(ToolId::Select);
    drag(&mut ctx, pos2(2.0, 2.0), pos2(22.0, 22.0));

    dot_at(&mut ctx, 10.5, 10.5);
    assert_eq!(select_state(&ctx), SelectState::Selected);
    assert!(ctx.commit_selection());

    assert_eq!(pixel(&ctx, 0, 5, 5), BLACK);
    assert_eq!(pixel(&ctx, 0, 10, 10), BLACK);
    assert_eq!(ctx.history().len(), 3);
}

#[test]
fn test_commit_finishes_stroke_in_progress() {
    let mut ctx = context(40, 40);
    ctx.set_active_tool(ToolId::Select);
    drag(&mut ctx, pos2(2.0, 2.0), pos2(22.0, 22.0));

    ctx.set_active_tool(ToolId::Brush);
    if let Tool::Brush(brush) = ctx.tool_mut(ToolId::Brush) {
        brush.radius = 0.5;
    }
    down(&mut ctx, 10.5, 10.5, PointerButton::Primary);
    assert!(ctx.commit_selection());

    assert!(!ctx.is_gesture_active());
    assert_eq!(pixel(&ctx, 0, 10, 10), BLACK);
    assert_eq!(ctx.history().len(), 2);
}

#[test]
fn test_changing_layer_drops_floating_selection() {
    let mut ctx = context(40, 40);
    dot_at(&mut ctx, 5.5, 5.5);
    ctx.add_layer("Layer 2");
    ctx.set_active_layer(0).unwrap();

    ctx.set_active_tool(ToolId::Select);
    drag(&mut ctx, pos2(2.0, 2.0), pos2(22.0, 22.0));
    ctx.set_active_layer(1).unwrap();
    assert_eq!(select_state(&ctx), SelectState::Idle);
    assert!(ctx.tools().select().unwrap().floating().is_none());

    dot_at(&mut ctx, 10.5, 10.5);
    assert!(!ctx.commit_selection());

    assert_eq!(pixel(&ctx, 0, 5, 5), BLACK);
    assert_eq!(pixel(&ctx, 1, 5, 5), CLEAR);
    assert_eq!(pixel(&ctx, 1, 10, 10), BLACK);
}

#[test]
fn test_adding_layer_drops_floating_selection() {
    let mut ctx = context(40, 40);
    ctx.set_active_tool(ToolId::Select);
    drag(&mut ctx, pos2(2.0, 2.0), pos2(22.0, 22.0));

    ctx.add_layer("Layer 2");
    assert_eq!(select_state(&ctx), SelectState::Idle);
    assert!(!ctx.commit_selection());
}

#[test]
fn test_oversized_selection_commit_is_clipped() {
    let mut ctx = context(40, 40);
    ctx.set_active_tool(ToolId::Select);
    drag(&mut ctx, pos2(10.0, 10.0), pos2(30.0, 30.0));
    // Drag the bottom-right corner far past the canvas.
    drag(&mut ctx, pos2(30.0, 30.0), pos2(3000.0, 3000.0));
    assert!(selection_rect(&ctx).width() > 1000.0);

    ctx.commit_selection();
    assert_eq!(select_state(&ctx), SelectState::Idle);
}
