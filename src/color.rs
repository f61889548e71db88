//! Conversion between the textual colors used at the view boundary and the
//! RGBA byte tuples the pixel code works with.

use egui::Color32;
use image::Rgba;
use log::debug;

pub const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);
pub const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
pub const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Parse `#rrggbb`, `#rrggbbaa` or `rgba(r, g, b, a)` into a color.
///
/// Anything unrecognized falls back to opaque black instead of failing, so a
/// malformed persisted color never blocks editing.
pub fn parse_color(text: &str) -> Rgba<u8> {
    let text = text.trim();
    let parsed = if text.starts_with("rgb") {
        parse_functional(text)
    } else {
        parse_hex(text)
    };

    parsed.unwrap_or_else(|| {
        debug!("Unrecognized color {:?}, using black", text);
        BLACK
    })
}

fn parse_hex(text: &str) -> Option<Rgba<u8>> {
    let hex = text.strip_prefix('#').unwrap_or(text);
    if !hex.is_ascii() || !(hex.len() == 6 || hex.len() == 8) {
        return None;
    }

    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    let alpha = if hex.len() == 8 { channel(6)? } else { 255 };
    Some(Rgba([channel(0)?, channel(2)?, channel(4)?, alpha]))
}

fn parse_functional(text: &str) -> Option<Rgba<u8>> {
    let open = text.find('(')?;
    let inner = text[open + 1..].strip_suffix(')')?;
    let parts: Vec<&str> = inner.split(',').map(str::trim).collect();

    let (rgb, alpha) = match parts.as_slice() {
        [r, g, b] => ([*r, *g, *b], None),
        [r, g, b, a] => ([*r, *g, *b], Some(*a)),
        _ => return None,
    };

    let mut out = [0u8, 0, 0, 255];
    for (slot, part) in out.iter_mut().zip(rgb) {
        *slot = part.parse().ok()?;
    }
    if let Some(alpha) = alpha {
        out[3] = parse_alpha(alpha)?;
    }
    Some(Rgba(out))
}

// Integer alphas are bytes, fractional ones are CSS-style 0..=1.
fn parse_alpha(text: &str) -> Option<u8> {
    if text.contains('.') {
        let value: f32 = text.parse().ok()?;
        if !(0.0..=1.0).contains(&value) {
            return None;
        }
        Some((value * 255.0).round() as u8)
    } else {
        text.parse().ok()
    }
}

/// Render a color as `#rrggbbaa`
pub fn to_hex(color: Rgba<u8>) -> String {
    let [r, g, b, a] = color.0;
    format!("#{r:02x}{g:02x}{b:02x}{a:02x}")
}

/// Exact byte-wise match when `tolerance` is 0, otherwise every channel may
/// differ by at most `tolerance`.
pub fn colors_match(a: Rgba<u8>, b: Rgba<u8>, tolerance: u8) -> bool {
    a.0.iter()
        .zip(b.0.iter())
        .all(|(x, y)| x.abs_diff(*y) <= tolerance)
}

/// Convert for display by the view layer
pub fn to_color32(color: Rgba<u8>) -> Color32 {
    let [r, g, b, a] = color.0;
    Color32::from_rgba_unmultiplied(r, g, b, a)
}

pub fn from_color32(color: Color32) -> Rgba<u8> {
    Rgba(color.to_srgba_unmultiplied())
}
