use std::collections::VecDeque;

use image::Rgba;
use log::debug;

use crate::buffer::PixelBuffer;
use crate::color::colors_match;
use crate::error::{EditorError, EditorResult};

/// Fill the 4-connected region around `seed` whose pixels match the seed's
/// color, returning the number of pixels written.
///
/// The traversal uses an explicit work-list, so stack depth does not grow with
/// the region size. Each pixel is marked when enqueued and written when
/// dequeued, which means every matched pixel is written exactly once. Filling
/// a region with its own color still writes (and counts) those pixels.
pub fn flood_fill<B: PixelBuffer + ?Sized>(
    buffer: &mut B,
    seed: (i64, i64),
    fill_color: Rgba<u8>,
    tolerance: u8,
) -> EditorResult<usize> {
    let (seed_x, seed_y) = seed;
    let Some(target) = buffer.get(seed_x, seed_y) else {
        return Err(EditorError::InvalidSeed {
            x: seed_x,
            y: seed_y,
        });
    };

    let width = i64::from(buffer.width());
    let index = |x: i64, y: i64| (y * width + x) as usize;

    let mut visited = vec![false; buffer.width() as usize * buffer.height() as usize];
    let mut queue = VecDeque::with_capacity(1024);
    visited[index(seed_x, seed_y)] = true;
    queue.push_back((seed_x, seed_y));

    let mut filled = 0;
    while let Some((x, y)) = queue.pop_front() {
        buffer.set(x, y, fill_color);
        filled += 1;

        for (nx, ny) in [(x - 1, y), (x + 1, y), (x, y - 1), (x, y + 1)] {
            if !buffer.contains(nx, ny) || visited[index(nx, ny)] {
                continue;
            }
            let matches = buffer
                .get(nx, ny)
                .is_some_and(|color| colors_match(color, target, tolerance));
            if matches {
                visited[index(nx, ny)] = true;
                queue.push_back((nx, ny));
            }
        }
    }

    debug!(
        "Flood fill from ({}, {}) wrote {} pixels",
        seed_x, seed_y, filled
    );
    Ok(filled)
}
