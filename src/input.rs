use egui::{Key, Modifiers, PointerButton, Pos2};

/// Input delivered to the editing core, in canvas coordinates
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    PointerDown { pos: Pos2, button: PointerButton },
    PointerMove { pos: Pos2 },
    PointerUp { pos: Pos2, button: PointerButton },
    /// The pointer left the window or capture was lost mid-gesture
    PointerCaptureLost,
    /// Key was pressed
    Key { key: Key, modifiers: Modifiers },
    /// Committed text input
    Text(String),
}

impl InputEvent {
    /// Translate a raw egui event. `to_canvas` maps screen positions into
    /// canvas space, e.g. with [`Document::screen_to_canvas`].
    ///
    /// [`Document::screen_to_canvas`]: crate::document::Document::screen_to_canvas
    pub fn from_egui(event: &egui::Event, to_canvas: impl Fn(Pos2) -> Pos2) -> Option<Self> {
        match event {
            egui::Event::PointerButton {
                pos,
                button,
                pressed: true,
                ..
            } => Some(Self::PointerDown {
                pos: to_canvas(*pos),
                button: *button,
            }),
            egui::Event::PointerButton {
                pos,
                button,
                pressed: false,
                ..
            } => Some(Self::PointerUp {
                pos: to_canvas(*pos),
                button: *button,
            }),
            egui::Event::PointerMoved(pos) => Some(Self::PointerMove {
                pos: to_canvas(*pos),
            }),
            egui::Event::PointerGone => Some(Self::PointerCaptureLost),
            egui::Event::Key {
                key,
                pressed: true,
                modifiers,
                ..
            } => Some(Self::Key {
                key: *key,
                modifiers: *modifiers,
            }),
            egui::Event::Text(text) => Some(Self::Text(text.clone())),
            _ => None,
        }
    }

    pub fn position(&self) -> Option<Pos2> {
        match self {
            Self::PointerDown { pos, .. } | Self::PointerMove { pos } | Self::PointerUp { pos, .. } => {
                Some(*pos)
            }
            Self::PointerCaptureLost | Self::Key { .. } | Self::Text(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::pos2;

    #[test]
    fn egui_pointer_events_are_mapped_to_canvas() {
        let raw = egui::Event::PointerButton {
            pos: pos2(110.0, 60.0),
            button: PointerButton::Primary,
            pressed: true,
            modifiers: Modifiers::NONE,
        };
        let event = InputEvent::from_egui(&raw, |p| p - egui::vec2(100.0, 50.0)).unwrap();
        assert_eq!(
            event,
            InputEvent::PointerDown {
                pos: pos2(10.0, 10.0),
                button: PointerButton::Primary
            }
        );
        assert_eq!(event.position(), Some(pos2(10.0, 10.0)));
    }

    #[test]
    fn key_release_is_ignored() {
        let raw = egui::Event::Key {
            key: Key::B,
            physical_key: None,
            pressed: false,
            repeat: false,
            modifiers: Modifiers::NONE,
        };
        assert_eq!(InputEvent::from_egui(&raw, |p| p), None);
        assert_eq!(
            InputEvent::from_egui(&egui::Event::PointerGone, |p| p),
            Some(InputEvent::PointerCaptureLost)
        );
    }
}
