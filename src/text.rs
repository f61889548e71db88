//! Text rasterization behind a trait so the text tool can be driven without
//! real font files.

use std::collections::HashMap;

use ab_glyph::{Font, FontArc, GlyphId, ScaleFont, point};
use egui::{Vec2, vec2};
use image::{Rgba, RgbaImage};
use log::{debug, info};

use crate::color::TRANSPARENT;
use crate::error::{EditorError, EditorResult};

/// Turns a string into pixels. Lines are split on `'\n'`; the top-left of the
/// returned image is the text origin.
pub trait TextRasterizer {
    /// Size of the box the text occupies
    fn measure(&self, text: &str, font_size: f32, font_family: &str) -> Vec2;

    /// Render `text` in `color`. `None` when nothing can be drawn, e.g. no
    /// font is available for the family.
    fn rasterize(
        &self,
        text: &str,
        font_size: f32,
        font_family: &str,
        color: Rgba<u8>,
    ) -> Option<RgbaImage>;
}

/// [`TextRasterizer`] backed by fonts registered per family name
#[derive(Default, Clone)]
pub struct GlyphRasterizer {
    fonts: HashMap<String, FontArc>,
    fallback: Option<String>,
}

impl GlyphRasterizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a TrueType/OpenType font under `family`. The first family
    /// registered becomes the fallback for unknown names.
    pub fn add_font(&mut self, family: &str, bytes: Vec<u8>) -> EditorResult<()> {
        let font = FontArc::try_from_vec(bytes).map_err(|_| EditorError::InvalidFont {
            family: family.to_string(),
        })?;
        self.fonts.insert(family.to_string(), font);
        self.fallback.get_or_insert_with(|| family.to_string());
        info!("Registered font family {family}");
        Ok(())
    }

    pub fn has_fonts(&self) -> bool {
        !self.fonts.is_empty()
    }

    fn font(&self, family: &str) -> Option<&FontArc> {
        self.fonts
            .get(family)
            .or_else(|| self.fallback.as_ref().and_then(|f| self.fonts.get(f)))
    }
}

impl std::fmt::Debug for GlyphRasterizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlyphRasterizer")
            .field("families", &self.fonts.keys().collect::<Vec<_>>())
            .field("fallback", &self.fallback)
            .finish()
    }
}

/// Width of one line including kerning
fn line_width(font: &FontArc, line: &str, font_size: f32) -> f32 {
    let scaled = font.as_scaled(font_size);
    let mut width = 0.0;
    let mut last: Option<GlyphId> = None;
    for ch in line.chars() {
        let id = font.glyph_id(ch);
        if let Some(prev) = last {
            width += scaled.kern(prev, id);
        }
        width += scaled.h_advance(id);
        last = Some(id);
    }
    width
}

impl TextRasterizer for GlyphRasterizer {
    fn measure(&self, text: &str, font_size: f32, font_family: &str) -> Vec2 {
        let lines = text.split('\n').count() as f32;
        match self.font(font_family) {
            Some(font) => {
                let scaled = font.as_scaled(font_size);
                let width = text
                    .split('\n')
                    .map(|line| line_width(font, line, font_size))
                    .fold(0.0, f32::max);
                vec2(width, lines * (scaled.height() + scaled.line_gap()))
            }
            // Rough box so hit testing still works without fonts
            None => {
                let chars = text.split('\n').map(|l| l.chars().count()).max().unwrap_or(0);
                vec2(chars as f32 * font_size * 0.6, lines * font_size * 1.2)
            }
        }
    }

    fn rasterize(
        &self,
        text: &str,
        font_size: f32,
        font_family: &str,
        color: Rgba<u8>,
    ) -> Option<RgbaImage> {
        let Some(font) = self.font(font_family) else {
            debug!("No font available for {font_family:?}, text not drawn");
            return None;
        };
        let size = self.measure(text, font_size, font_family);
        let (width, height) = (size.x.ceil() as u32, size.y.ceil() as u32);
        if width == 0 || height == 0 {
            return None;
        }

        let scaled = font.as_scaled(font_size);
        let line_height = scaled.height() + scaled.line_gap();
        let mut out = RgbaImage::from_pixel(width, height, TRANSPARENT);

        for (row, line) in text.split('\n').enumerate() {
            let baseline = scaled.ascent() + row as f32 * line_height;
            let mut caret = 0.0;
            let mut last: Option<GlyphId> = None;
            for ch in line.chars() {
                let id = font.glyph_id(ch);
                if let Some(prev) = last {
                    caret += scaled.kern(prev, id);
                }
                let glyph = id.with_scale_and_position(font_size, point(caret, baseline));
                caret += scaled.h_advance(id);
                last = Some(id);

                let Some(outlined) = font.outline_glyph(glyph) else {
                    continue;
                };
                let bounds = outlined.px_bounds();
                outlined.draw(|gx, gy, coverage| {
                    let x = bounds.min.x as i64 + i64::from(gx);
                    let y = bounds.min.y as i64 + i64::from(gy);
                    if x < 0 || y < 0 || x >= i64::from(width) || y >= i64::from(height) {
                        return;
                    }
                    let alpha = (coverage.clamp(0.0, 1.0) * f32::from(color.0[3])).round() as u8;
                    let pixel = out.get_pixel_mut(x as u32, y as u32);
                    if alpha > pixel.0[3] {
                        *pixel = Rgba([color.0[0], color.0[1], color.0[2], alpha]);
                    }
                });
            }
        }
        Some(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn without_fonts_nothing_is_drawn() {
        let rasterizer = GlyphRasterizer::new();
        assert!(!rasterizer.has_fonts());
        assert!(rasterizer.rasterize("hi", 16.0, "sans-serif", Rgba([0, 0, 0, 255])).is_none());
    }

    #[test]
    fn measure_estimates_without_fonts() {
        let rasterizer = GlyphRasterizer::new();
        let one = rasterizer.measure("abcd", 10.0, "sans-serif");
        let two = rasterizer.measure("abcd\nab", 10.0, "sans-serif");
        assert!(one.x > 0.0);
        assert_eq!(one.x, two.x);
        assert!(two.y > one.y);
    }

    #[test]
    fn invalid_font_bytes_are_rejected() {
        let mut rasterizer = GlyphRasterizer::new();
        let err = rasterizer.add_font("broken", vec![0, 1, 2, 3]).unwrap_err();
        assert!(matches!(err, EditorError::InvalidFont { .. }));
        assert!(!rasterizer.has_fonts());
    }
}
