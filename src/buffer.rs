use std::fmt;
use std::io::Cursor;
use std::sync::Arc;

use image::{ImageFormat, Rgba, RgbaImage};

use crate::error::SnapshotError;

/// Read/write access to RGBA pixels addressed by (x, y).
///
/// Coordinates are signed so callers can pass pointer-derived positions
/// straight through; reads outside the buffer return `None` and writes
/// outside it are ignored.
pub trait PixelBuffer {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    fn get(&self, x: i64, y: i64) -> Option<Rgba<u8>>;
    fn set(&mut self, x: i64, y: i64, color: Rgba<u8>);

    fn contains(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && x < i64::from(self.width()) && y < i64::from(self.height())
    }
}

impl PixelBuffer for RgbaImage {
    fn width(&self) -> u32 {
        self.dimensions().0
    }

    fn height(&self) -> u32 {
        self.dimensions().1
    }

    fn get(&self, x: i64, y: i64) -> Option<Rgba<u8>> {
        self.contains(x, y)
            .then(|| *self.get_pixel(x as u32, y as u32))
    }

    fn set(&mut self, x: i64, y: i64, color: Rgba<u8>) {
        if self.contains(x, y) {
            self.put_pixel(x as u32, y as u32, color);
        }
    }
}

/// An opaque capture of a layer's pixels.
///
/// Cloning is cheap; the history log and the layer that produced a snapshot
/// share the same bytes.
#[derive(Clone, PartialEq, Eq)]
pub struct Snapshot(Arc<[u8]>);

impl Snapshot {
    pub fn from_bytes(bytes: impl Into<Arc<[u8]>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Snapshot")
            .field(&format!("<{} bytes>", self.0.len()))
            .finish()
    }
}

/// Turns a pixel buffer into a [`Snapshot`] and back.
///
/// The core never inspects snapshot bytes; it only hands them to a codec.
pub trait SnapshotCodec {
    fn encode(&self, pixels: &RgbaImage) -> Result<Snapshot, SnapshotError>;
    fn decode(&self, snapshot: &Snapshot) -> Result<RgbaImage, SnapshotError>;
}

/// Lossless PNG snapshots
#[derive(Debug, Clone, Copy, Default)]
pub struct PngCodec;

impl SnapshotCodec for PngCodec {
    fn encode(&self, pixels: &RgbaImage) -> Result<Snapshot, SnapshotError> {
        let mut bytes = Cursor::new(Vec::new());
        pixels
            .write_to(&mut bytes, ImageFormat::Png)
            .map_err(SnapshotError::Encode)?;
        Ok(Snapshot::from_bytes(bytes.into_inner()))
    }

    fn decode(&self, snapshot: &Snapshot) -> Result<RgbaImage, SnapshotError> {
        let image = image::load_from_memory_with_format(snapshot.as_bytes(), ImageFormat::Png)
            .map_err(SnapshotError::Decode)?;
        Ok(image.into_rgba8())
    }
}
