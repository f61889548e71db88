use egui::Pos2;
use image::Rgba;

use crate::buffer::PixelBuffer;

/// In-progress brush or eraser stroke
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    last: Pos2,
    color: Rgba<u8>,
    painted: usize,
}

impl Stroke {
    /// Start a stroke with an initial stamp at `pos`. `pixels` is `None` when
    /// the target layer rejects edits; the stroke still runs so the gesture
    /// lifecycle stays intact.
    pub fn begin<B: PixelBuffer + ?Sized>(
        pixels: Option<&mut B>,
        pos: Pos2,
        radius: f32,
        color: Rgba<u8>,
    ) -> Self {
        let painted = pixels.map_or(0, |p| stamp_disc(p, pos, radius, color));
        Self {
            last: pos,
            color,
            painted,
        }
    }

    /// Extend the stroke to `pos`, filling the gap from the previous point
    pub fn extend<B: PixelBuffer + ?Sized>(&mut self, pixels: Option<&mut B>, pos: Pos2, radius: f32) {
        if let Some(pixels) = pixels {
            self.painted += stamp_line(pixels, self.last, pos, radius, self.color);
        }
        self.last = pos;
    }

    /// Pixels written so far; zero means there is nothing to record
    pub fn painted(&self) -> usize {
        self.painted
    }
}

/// Write every pixel whose center lies within `radius` of `center`.
/// At least the pixel under `center` is written.
pub fn stamp_disc<B: PixelBuffer + ?Sized>(
    pixels: &mut B,
    center: Pos2,
    radius: f32,
    color: Rgba<u8>,
) -> usize {
    let radius = radius.max(0.5);
    // Only the part of the disc's bounding box that lies on the buffer
    let min_x = ((center.x - radius).floor() as i64).max(0);
    let max_x = ((center.x + radius).ceil() as i64).min(i64::from(pixels.width()) - 1);
    let min_y = ((center.y - radius).floor() as i64).max(0);
    let max_y = ((center.y + radius).ceil() as i64).min(i64::from(pixels.height()) - 1);

    let mut written = 0;
    for y in min_y..=max_y {
        for x in min_x..=max_x {
            let dx = x as f32 + 0.5 - center.x;
            let dy = y as f32 + 0.5 - center.y;
            if dx * dx + dy * dy <= radius * radius {
                pixels.set(x, y, color);
                written += 1;
            }
        }
    }
    written
}

/// Stamp discs from `from` (exclusive) to `to` (inclusive) at half-radius
/// spacing so fast pointer motion leaves no gaps.
pub fn stamp_line<B: PixelBuffer + ?Sized>(
    pixels: &mut B,
    from: Pos2,
    to: Pos2,
    radius: f32,
    color: Rgba<u8>,
) -> usize {
    let spacing = (radius * 0.5).max(0.5);
    let steps = (from.distance(to) / spacing).ceil() as usize;
    (1..=steps)
        .map(|i| {
            let t = i as f32 / steps as f32;
            stamp_disc(pixels, from.lerp(to, t), radius, color)
        })
        .sum()
}
