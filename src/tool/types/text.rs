use egui::{Key, Modifiers, PointerButton, Pos2, Rect, vec2};
use log::{debug, info};

use crate::buffer::PixelBuffer;
use crate::layer::blend_over;
use crate::tool::{ToolContext, ToolOutcome};

/// Click to place a caret, type, then commit the text into the active layer.
///
/// Text is committed when Escape is pressed, when the canvas is clicked
/// outside the current text box, or when another tool is activated.
#[derive(Debug, Clone)]
pub struct TextTool {
    pub font_size: f32,
    pub font_family: String,
    is_typing: bool,
    /// Primary button placed the caret; picks primary over secondary color
    is_left_click: bool,
    current_text: String,
    text_input_position: Pos2,
}

impl TextTool {
    pub fn new(font_size: f32, font_family: &str) -> Self {
        Self {
            font_size,
            font_family: font_family.to_string(),
            is_typing: false,
            is_left_click: true,
            current_text: String::new(),
            text_input_position: Pos2::ZERO,
        }
    }

    pub fn is_typing(&self) -> bool {
        self.is_typing
    }

    pub fn current_text(&self) -> &str {
        &self.current_text
    }

    pub fn text_input_position(&self) -> Pos2 {
        self.text_input_position
    }

    /// Box the pending text occupies on the canvas, at least one glyph cell
    pub fn text_box(&self, ctx: &ToolContext<'_>) -> Rect {
        let measured = ctx
            .text
            .measure(&self.current_text, self.font_size, &self.font_family);
        let min = vec2(self.font_size, self.font_size * 1.2);
        Rect::from_min_size(self.text_input_position, measured.max(min))
    }

    pub fn on_pointer_down(
        &mut self,
        pos: Pos2,
        button: PointerButton,
        ctx: &mut ToolContext<'_>,
    ) -> ToolOutcome {
        if self.is_typing && self.text_box(ctx).contains(pos) {
            return ToolOutcome::Unchanged;
        }
        let committed = self.commit(ctx);

        self.is_typing = true;
        self.is_left_click = button == PointerButton::Primary;
        self.current_text.clear();
        self.text_input_position = pos;
        debug!("Text caret placed at {:?}", pos);
        committed.max(ToolOutcome::Updated)
    }

    pub fn on_text(&mut self, text: &str) -> ToolOutcome {
        if !self.is_typing {
            return ToolOutcome::Unchanged;
        }
        let before = self.current_text.len();
        self.current_text
            .extend(text.chars().filter(|c| !c.is_control()));
        if self.current_text.len() == before {
            ToolOutcome::Unchanged
        } else {
            ToolOutcome::Updated
        }
    }

    pub fn on_key(&mut self, key: Key, _modifiers: Modifiers, ctx: &mut ToolContext<'_>) -> ToolOutcome {
        if !self.is_typing {
            return ToolOutcome::Unchanged;
        }
        match key {
            Key::Backspace => match self.current_text.pop() {
                Some(_) => ToolOutcome::Updated,
                None => ToolOutcome::Unchanged,
            },
            Key::Enter => {
                self.current_text.push('\n');
                ToolOutcome::Updated
            }
            Key::Escape => self.commit(ctx),
            _ => ToolOutcome::Unchanged,
        }
    }

    /// Stop typing and draw the pending text into the active layer. Blank
    /// text, a missing font or an uneditable layer end typing without a
    /// commit.
    pub fn commit(&mut self, ctx: &mut ToolContext<'_>) -> ToolOutcome {
        if !self.is_typing {
            return ToolOutcome::Unchanged;
        }
        self.is_typing = false;
        let text = std::mem::take(&mut self.current_text);
        if text.trim().is_empty() {
            return ToolOutcome::Updated;
        }

        let color = if self.is_left_click {
            ctx.document.primary_color
        } else {
            ctx.document.secondary_color
        };
        let Some(rendered) = ctx
            .text
            .rasterize(&text, self.font_size, &self.font_family, color)
        else {
            return ToolOutcome::Updated;
        };
        let Some(pixels) = ctx.layers.editable_pixels() else {
            return ToolOutcome::Updated;
        };

        let origin_x = self.text_input_position.x.floor() as i64;
        let origin_y = self.text_input_position.y.floor() as i64;
        let mut written = 0;
        for (x, y, src) in rendered.enumerate_pixels() {
            if src.0[3] == 0 {
                continue;
            }
            let (tx, ty) = (origin_x + i64::from(x), origin_y + i64::from(y));
            if let Some(dst) = pixels.get(tx, ty) {
                pixels.set(tx, ty, blend_over(dst, *src, 1.0));
                written += 1;
            }
        }

        if written == 0 {
            return ToolOutcome::Updated;
        }
        info!("Committed text {:?} at {:?}", text, self.text_input_position);
        ToolOutcome::Commit
    }

    /// Drop pending text without drawing it
    pub fn cancel(&mut self) {
        self.is_typing = false;
        self.current_text.clear();
    }
}
