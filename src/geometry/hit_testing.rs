use egui::{Pos2, Rect, Vec2, vec2};

/// Resize handles around a selection: corners scale uniformly, edges scale
/// one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResizeHandle {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
    Top,
    Bottom,
    Left,
    Right,
}

impl ResizeHandle {
    pub const ALL: [ResizeHandle; 8] = [
        ResizeHandle::TopLeft,
        ResizeHandle::TopRight,
        ResizeHandle::BottomLeft,
        ResizeHandle::BottomRight,
        ResizeHandle::Top,
        ResizeHandle::Bottom,
        ResizeHandle::Left,
        ResizeHandle::Right,
    ];

    pub fn is_corner(self) -> bool {
        matches!(
            self,
            Self::TopLeft | Self::TopRight | Self::BottomLeft | Self::BottomRight
        )
    }

    /// Handle position relative to the rect center, before rotation
    fn local_offset(self, half: Vec2) -> Vec2 {
        match self {
            Self::TopLeft => vec2(-half.x, -half.y),
            Self::TopRight => vec2(half.x, -half.y),
            Self::BottomLeft => vec2(-half.x, half.y),
            Self::BottomRight => vec2(half.x, half.y),
            Self::Top => vec2(0.0, -half.y),
            Self::Bottom => vec2(0.0, half.y),
            Self::Left => vec2(-half.x, 0.0),
            Self::Right => vec2(half.x, 0.0),
        }
    }
}

/// What a pointer landed on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionHit {
    Rotate,
    Resize(ResizeHandle),
    Body,
}

/// Rotate `v` by `angle` radians (screen space, y down)
pub fn rotate(v: Vec2, angle: f32) -> Vec2 {
    let (sin, cos) = angle.sin_cos();
    vec2(v.x * cos - v.y * sin, v.x * sin + v.y * cos)
}

/// Pointer position in the rect's own frame: origin at the center, axes
/// aligned with the unrotated rect.
pub fn to_local(pos: Pos2, rect: Rect, angle: f32) -> Vec2 {
    rotate(pos - rect.center(), -angle)
}

/// Angle of `pos` seen from the center of `rect`
pub fn angle_from_center(pos: Pos2, rect: Rect) -> f32 {
    let v = pos - rect.center();
    v.y.atan2(v.x)
}

/// Where the rotation handle sits: above the top edge, rotated with the rect
pub fn rotation_handle_pos(rect: Rect, angle: f32, offset: f32) -> Pos2 {
    let local = vec2(0.0, -rect.height() / 2.0 - offset);
    rect.center() + rotate(local, angle)
}

pub fn resize_handle_pos(handle: ResizeHandle, rect: Rect, angle: f32) -> Pos2 {
    rect.center() + rotate(handle.local_offset(rect.size() / 2.0), angle)
}

/// Hit test in priority order: rotation handle, resize handles, body.
///
/// Resize handles pick within at most a third of the shorter side, so the
/// middle of a small rect still hits the body.
pub fn hit_test(
    pos: Pos2,
    rect: Rect,
    angle: f32,
    handle_radius: f32,
    rotation_offset: f32,
) -> Option<SelectionHit> {
    if pos.distance(rotation_handle_pos(rect, angle, rotation_offset)) <= handle_radius {
        return Some(SelectionHit::Rotate);
    }

    let pick_radius = handle_radius.min(rect.width().min(rect.height()) / 3.0);
    let handle = ResizeHandle::ALL
        .into_iter()
        .find(|h| pos.distance(resize_handle_pos(*h, rect, angle)) <= pick_radius);
    if let Some(handle) = handle {
        return Some(SelectionHit::Resize(handle));
    }

    let local = to_local(pos, rect, angle);
    let half = rect.size() / 2.0;
    (local.x.abs() <= half.x && local.y.abs() <= half.y).then_some(SelectionHit::Body)
}
