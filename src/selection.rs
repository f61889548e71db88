//! Rectangular selection with move, rotate and resize gestures.
//!
//! Every gesture captures an [`InteractionStart`] when it begins and computes
//! each update from that fixed snapshot, never from the previous frame, so a
//! long drag cannot accumulate error.

use std::f32::consts::TAU;

use egui::{Pos2, Rect, Vec2};
use image::{Rgba, RgbaImage};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::buffer::PixelBuffer;
use crate::color::TRANSPARENT;
use crate::geometry::hit_testing::{
    self, ResizeHandle, SelectionHit, angle_from_center, rotate, to_local,
};

/// Selections never shrink below this many pixels per side while resizing
const MIN_SIZE: f32 = 1.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectState {
    #[default]
    Idle,
    Selecting,
    Selected,
    Moving,
    Rotating,
    Resizing,
}

impl SelectState {
    /// States that carry an [`InteractionStart`]
    pub fn is_transforming(self) -> bool {
        matches!(self, Self::Moving | Self::Rotating | Self::Resizing)
    }

    /// States that only end on pointer-up
    pub fn is_gesture(self) -> bool {
        self == Self::Selecting || self.is_transforming()
    }
}

/// Snapshot taken when a move/rotate/resize gesture begins
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InteractionStart {
    pub start_mouse: Pos2,
    pub start_rect: Rect,
    pub start_angle: f32,
    /// Distance from the rect center to `start_mouse`
    pub start_distance: f32,
    /// Angle from the rect center to `start_mouse`
    pub start_mouse_angle: f32,
    /// Set only for resize gestures
    pub handle: Option<ResizeHandle>,
}

impl InteractionStart {
    fn capture(mouse: Pos2, rect: Rect, angle: f32, handle: Option<ResizeHandle>) -> Self {
        Self {
            start_mouse: mouse,
            start_rect: rect,
            start_angle: angle,
            start_distance: mouse.distance(rect.center()),
            start_mouse_angle: angle_from_center(mouse, rect),
            handle,
        }
    }
}

/// What a pointer event did to the selection, for the caller to react to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionChange {
    None,
    /// Rubber band started
    Started,
    /// Rect or angle changed during a gesture
    Updated,
    /// A new selection was completed; its pixels can be lifted now
    Completed,
    /// A move/rotate/resize gesture began
    GestureStarted,
    /// A move/rotate/resize gesture ended back in `Selected`
    GestureEnded,
    /// The selection was dropped
    Discarded,
}

/// Selection state machine.
///
/// `interaction` is `Some` exactly while the state is moving, rotating or
/// resizing.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionTransform {
    state: SelectState,
    rect: Rect,
    previous_rect: Rect,
    rotation_angle: f32,
    interaction: Option<InteractionStart>,
    /// Rubber band anchor while selecting
    anchor: Option<Pos2>,
    bounds: Rect,
    handle_radius: f32,
    rotation_handle_offset: f32,
}

impl SelectionTransform {
    pub fn new(bounds: Rect, handle_radius: f32, rotation_handle_offset: f32) -> Self {
        Self {
            state: SelectState::Idle,
            rect: Rect::ZERO,
            previous_rect: Rect::ZERO,
            rotation_angle: 0.0,
            interaction: None,
            anchor: None,
            bounds,
            handle_radius,
            rotation_handle_offset,
        }
    }

    pub fn state(&self) -> SelectState {
        self.state
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    /// The rect as of the last transition into `Selected`
    pub fn previous_rect(&self) -> Rect {
        self.previous_rect
    }

    /// Rotation in radians, in `[0, 2π)`
    pub fn rotation_angle(&self) -> f32 {
        self.rotation_angle
    }

    pub fn interaction(&self) -> Option<&InteractionStart> {
        self.interaction.as_ref()
    }

    pub fn has_selection(&self) -> bool {
        self.state != SelectState::Idle && self.state != SelectState::Selecting
    }

    pub fn hit_test(&self, pos: Pos2) -> Option<SelectionHit> {
        hit_testing::hit_test(
            pos,
            self.rect,
            self.rotation_angle,
            self.handle_radius,
            self.rotation_handle_offset,
        )
    }

    pub fn on_pointer_down(&mut self, pos: Pos2) -> SelectionChange {
        match self.state {
            SelectState::Idle => {
                if !self.bounds.contains(pos) {
                    return SelectionChange::None;
                }
                self.anchor = Some(pos);
                self.rect = Rect::from_min_size(pos, Vec2::ZERO);
                self.rotation_angle = 0.0;
                self.state = SelectState::Selecting;
                debug!("Selection started at {:?}", pos);
                SelectionChange::Started
            }
            SelectState::Selected => match self.hit_test(pos) {
                Some(hit) => {
                    let (state, handle) = match hit {
                        SelectionHit::Body => (SelectState::Moving, None),
                        SelectionHit::Rotate => (SelectState::Rotating, None),
                        SelectionHit::Resize(handle) => (SelectState::Resizing, Some(handle)),
                    };
                    self.interaction = Some(InteractionStart::capture(
                        pos,
                        self.rect,
                        self.rotation_angle,
                        handle,
                    ));
                    self.state = state;
                    debug!("Selection {:?} started", state);
                    SelectionChange::GestureStarted
                }
                None => {
                    self.discard();
                    SelectionChange::Discarded
                }
            },
            // A second button pressed mid-gesture does not restart it.
            SelectState::Selecting
            | SelectState::Moving
            | SelectState::Rotating
            | SelectState::Resizing => SelectionChange::None,
        }
    }

    pub fn on_pointer_move(&mut self, pos: Pos2) -> SelectionChange {
        match self.state {
            SelectState::Selecting => {
                let Some(anchor) = self.anchor else {
                    return SelectionChange::None;
                };
                let pos = pos.clamp(self.bounds.min, self.bounds.max);
                self.rect = Rect::from_two_pos(anchor, pos);
                SelectionChange::Updated
            }
            SelectState::Moving | SelectState::Rotating | SelectState::Resizing => {
                let Some(start) = self.interaction else {
                    return SelectionChange::None;
                };
                match self.state {
                    SelectState::Moving => {
                        self.rect = start.start_rect.translate(pos - start.start_mouse);
                    }
                    SelectState::Rotating => {
                        let delta = angle_from_center(pos, start.start_rect) - start.start_mouse_angle;
                        self.rotation_angle = (start.start_angle + delta).rem_euclid(TAU);
                    }
                    _ => self.rect = resized_rect(&start, pos),
                }
                SelectionChange::Updated
            }
            SelectState::Idle | SelectState::Selected => SelectionChange::None,
        }
    }

    pub fn on_pointer_up(&mut self, pos: Pos2) -> SelectionChange {
        if self.state.is_gesture() {
            self.on_pointer_move(pos);
        }
        self.finish_gesture()
    }

    /// End whatever gesture is in progress as if the pointer was released
    /// where it last moved. Used when the tool is switched or pointer capture
    /// is lost.
    pub fn finish_gesture(&mut self) -> SelectionChange {
        match self.state {
            SelectState::Selecting => {
                self.anchor = None;
                if self.rect.width() < MIN_SIZE || self.rect.height() < MIN_SIZE {
                    debug!("Empty selection dropped");
                    self.discard();
                    SelectionChange::Discarded
                } else {
                    self.enter_selected();
                    SelectionChange::Completed
                }
            }
            SelectState::Moving | SelectState::Rotating | SelectState::Resizing => {
                self.enter_selected();
                SelectionChange::GestureEnded
            }
            SelectState::Idle | SelectState::Selected => SelectionChange::None,
        }
    }

    /// Drop the selection and return to `Idle`
    pub fn discard(&mut self) {
        self.state = SelectState::Idle;
        self.interaction = None;
        self.anchor = None;
        self.rect = Rect::ZERO;
        self.rotation_angle = 0.0;
    }

    fn enter_selected(&mut self) {
        self.interaction = None;
        self.state = SelectState::Selected;
        self.previous_rect = self.rect;
        debug!(
            "Selection settled at {:?}, angle {:.3}",
            self.rect, self.rotation_angle
        );
    }
}

fn resized_rect(start: &InteractionStart, pos: Pos2) -> Rect {
    let center = start.start_rect.center();
    let size = start.start_rect.size();

    let new_size = match start.handle {
        Some(handle) if !handle.is_corner() => {
            let now = to_local(pos, start.start_rect, start.start_angle);
            let then = to_local(start.start_mouse, start.start_rect, start.start_angle);
            match handle {
                ResizeHandle::Left | ResizeHandle::Right => {
                    Vec2::new(size.x * axis_ratio(now.x, then.x), size.y)
                }
                _ => Vec2::new(size.x, size.y * axis_ratio(now.y, then.y)),
            }
        }
        _ => {
            if start.start_distance <= f32::EPSILON {
                size
            } else {
                size * (pos.distance(center) / start.start_distance)
            }
        }
    };

    Rect::from_center_size(center, new_size.max(Vec2::splat(MIN_SIZE)))
}

fn axis_ratio(now: f32, then: f32) -> f32 {
    if then.abs() <= f32::EPSILON {
        1.0
    } else {
        now.abs() / then.abs()
    }
}

/// Pixels lifted out of a layer when a selection completes
#[derive(Debug, Clone, PartialEq)]
pub struct FloatingSelection {
    pub pixels: RgbaImage,
    /// Integer pixel rect the content was lifted from
    pub origin: (i64, i64, u32, u32),
}

impl FloatingSelection {
    /// Copy the pixels under `rect` out of `source`
    pub fn lift<B: PixelBuffer + ?Sized>(source: &B, rect: Rect) -> Option<Self> {
        let (x, y, width, height) = pixel_rect(rect);
        if width == 0 || height == 0 {
            return None;
        }
        let pixels = RgbaImage::from_fn(width, height, |px, py| {
            source
                .get(x + i64::from(px), y + i64::from(py))
                .unwrap_or(TRANSPARENT)
        });
        Some(Self {
            pixels,
            origin: (x, y, width, height),
        })
    }

    /// Clear the area the content was lifted from
    pub fn clear_origin<B: PixelBuffer + ?Sized>(&self, target: &mut B) {
        let (x, y, width, height) = self.origin;
        for py in 0..i64::from(height) {
            for px in 0..i64::from(width) {
                target.set(x + px, y + py, TRANSPARENT);
            }
        }
    }

    /// Draw the content into `target` mapped onto `rect` rotated by `angle`
    /// around its center, sampling nearest-neighbour. With `transparent`
    /// set, fully transparent pixels and pixels equal to the key color are
    /// skipped. Returns the number of pixels written.
    pub fn stamp_into<B: PixelBuffer + ?Sized>(
        &self,
        target: &mut B,
        rect: Rect,
        angle: f32,
        transparent: Option<Rgba<u8>>,
    ) -> usize {
        let (src_w, src_h) = self.pixels.dimensions();
        let size = rect.size();
        if size.x <= 0.0 || size.y <= 0.0 {
            return 0;
        }

        // Bounding box of the rotated rect
        let half = size / 2.0;
        let corners = [
            Vec2::new(-half.x, -half.y),
            Vec2::new(half.x, -half.y),
            Vec2::new(-half.x, half.y),
            Vec2::new(half.x, half.y),
        ]
        .map(|c| rect.center() + rotate(c, angle));
        let bounds = Rect::from_points(&corners);
        let (min_x, max_x) = clip_span(bounds.min.x, bounds.max.x, target.width());
        let (min_y, max_y) = clip_span(bounds.min.y, bounds.max.y, target.height());

        let mut written = 0;
        for y in min_y..max_y {
            for x in min_x..max_x {
                let sample = Pos2::new(x as f32 + 0.5, y as f32 + 0.5);
                let local = to_local(sample, rect, angle) + half;
                if local.x < 0.0 || local.y < 0.0 || local.x >= size.x || local.y >= size.y {
                    continue;
                }
                let sx = ((local.x / size.x) * src_w as f32) as u32;
                let sy = ((local.y / size.y) * src_h as f32) as u32;
                let color = *self.pixels.get_pixel(sx.min(src_w - 1), sy.min(src_h - 1));
                if let Some(key) = transparent {
                    if color.0[3] == 0 || color == key {
                        continue;
                    }
                }
                target.set(x, y, color);
                written += 1;
            }
        }
        written
    }

    /// Copy the content again from `source` at the same origin, picking up
    /// edits made to the layer since the lift
    pub fn refresh<B: PixelBuffer + ?Sized>(&mut self, source: &B) {
        let (x, y, _, _) = self.origin;
        for (px, py, pixel) in self.pixels.enumerate_pixels_mut() {
            *pixel = source
                .get(x + i64::from(px), y + i64::from(py))
                .unwrap_or(TRANSPARENT);
        }
    }
}

/// Pixel span `[min, max)` covering `from..to`, clipped to `0..len`
fn clip_span(from: f32, to: f32, len: u32) -> (i64, i64) {
    let len = i64::from(len);
    let min = (from.floor() as i64).clamp(0, len);
    let max = (to.ceil() as i64).clamp(min, len);
    (min, max)
}

/// Round a float rect to whole pixels (origin floored, size rounded)
fn pixel_rect(rect: Rect) -> (i64, i64, u32, u32) {
    (
        rect.min.x.floor() as i64,
        rect.min.y.floor() as i64,
        rect.width().round().max(0.0) as u32,
        rect.height().round().max(0.0) as u32,
    )
}
