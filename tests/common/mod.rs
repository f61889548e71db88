#![allow(dead_code)]

use canvas_editor::{EditorConfig, EditorContext, InputEvent};
use egui::{Key, Modifiers, PointerButton, Pos2, pos2};
use image::{Rgba, RgbaImage};

pub const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);
pub const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
pub const CLEAR: Rgba<u8> = Rgba([0, 0, 0, 0]);

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn context(width: u32, height: u32) -> EditorContext {
    init_logging();
    EditorContext::new(&EditorConfig {
        canvas_width: width,
        canvas_height: height,
        ..EditorConfig::default()
    })
}

pub fn down(ctx: &mut EditorContext, x: f32, y: f32, button: PointerButton) {
    ctx.handle_event(&InputEvent::PointerDown {
        pos: pos2(x, y),
        button,
    })
    .unwrap();
}

pub fn move_to(ctx: &mut EditorContext, x: f32, y: f32) {
    ctx.handle_event(&InputEvent::PointerMove { pos: pos2(x, y) })
        .unwrap();
}

pub fn up(ctx: &mut EditorContext, x: f32, y: f32) {
    ctx.handle_event(&InputEvent::PointerUp {
        pos: pos2(x, y),
        button: PointerButton::Primary,
    })
    .unwrap();
}

/// Full primary-button gesture from `from` to `to`
pub fn drag(ctx: &mut EditorContext, from: Pos2, to: Pos2) {
    down(ctx, from.x, from.y, PointerButton::Primary);
    move_to(ctx, to.x, to.y);
    up(ctx, to.x, to.y);
}

pub fn click(ctx: &mut EditorContext, x: f32, y: f32) {
    down(ctx, x, y, PointerButton::Primary);
    up(ctx, x, y);
}

pub fn key(ctx: &mut EditorContext, key: Key) {
    ctx.handle_event(&InputEvent::Key {
        key,
        modifiers: Modifiers::NONE,
    })
    .unwrap();
}

pub fn pixels(ctx: &EditorContext, layer: usize) -> RgbaImage {
    ctx.layers().get(layer).unwrap().pixels().clone()
}

pub fn pixel(ctx: &EditorContext, layer: usize, x: u32, y: u32) -> Rgba<u8> {
    *ctx.layers().get(layer).unwrap().pixels().get_pixel(x, y)
}
