use image::{Rgba, RgbaImage};
use log::{debug, info};
use uuid::Uuid;

use crate::buffer::{PixelBuffer, Snapshot, SnapshotCodec};
use crate::color::TRANSPARENT;
use crate::error::{EditorError, EditorResult, SnapshotError};

/// Represents a single raster layer in the document
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    /// Unique identifier for the layer
    pub id: Uuid,
    /// Display name of the layer
    pub name: String,
    /// Hidden layers are skipped when compositing
    pub visible: bool,
    /// Locked layers reject pixel mutation
    pub locked: bool,
    /// `0`-`100`
    opacity: u8,
    pixels: RgbaImage,
}

impl Layer {
    pub fn new(name: &str, width: u32, height: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            visible: true,
            locked: false,
            opacity: 100,
            pixels: RgbaImage::from_pixel(width, height, TRANSPARENT),
        }
    }

    pub fn opacity(&self) -> u8 {
        self.opacity
    }

    pub fn set_opacity(&mut self, opacity: u8) {
        self.opacity = opacity.min(100);
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Whether tools may write pixels into this layer
    pub fn is_editable(&self) -> bool {
        self.visible && !self.locked
    }

    pub fn is_blank(&self) -> bool {
        self.pixels.pixels().all(|p| p.0[3] == 0)
    }

    fn clear(&mut self) {
        self.pixels
            .pixels_mut()
            .for_each(|p| *p = TRANSPARENT);
    }
}

/// Ordered stack of layers; index 0 is the bottom of the stack.
///
/// There is always at least one layer.
#[derive(Debug, Clone)]
pub struct LayerSet {
    layers: Vec<Layer>,
    active: usize,
    width: u32,
    height: u32,
}

impl LayerSet {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            layers: vec![Layer::new("Background", width, height)],
            active: 0,
            width,
            height,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Layer> {
        self.layers.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Layer> {
        self.layers.get(index)
    }

    fn get_mut(&mut self, index: usize) -> EditorResult<&mut Layer> {
        self.layers
            .get_mut(index)
            .ok_or(EditorError::LayerNotFound(index))
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn active_layer(&self) -> &Layer {
        &self.layers[self.active]
    }

    pub fn set_active(&mut self, index: usize) -> EditorResult<()> {
        if index >= self.layers.len() {
            return Err(EditorError::LayerNotFound(index));
        }
        self.active = index;
        Ok(())
    }

    /// Append a blank layer on top of the stack and make it active
    pub fn add_layer(&mut self, name: &str) -> usize {
        self.layers.push(Layer::new(name, self.width, self.height));
        self.active = self.layers.len() - 1;
        info!("Added layer {} ({})", self.active, name);
        self.active
    }

    /// Remove a layer. The last remaining layer is never removed; `Ok(None)`
    /// is returned in that case.
    pub fn remove_layer(&mut self, index: usize) -> EditorResult<Option<Layer>> {
        if index >= self.layers.len() {
            return Err(EditorError::LayerNotFound(index));
        }
        if self.layers.len() == 1 {
            debug!("Refusing to remove the only layer");
            return Ok(None);
        }

        let removed = self.layers.remove(index);
        if self.active >= self.layers.len() || self.active > index {
            self.active = self.active.saturating_sub(1);
        }
        info!("Removed layer {} ({})", index, removed.name);
        Ok(Some(removed))
    }

    pub fn set_visible(&mut self, index: usize, visible: bool) -> EditorResult<()> {
        self.get_mut(index)?.visible = visible;
        Ok(())
    }

    pub fn set_locked(&mut self, index: usize, locked: bool) -> EditorResult<()> {
        self.get_mut(index)?.locked = locked;
        Ok(())
    }

    pub fn set_opacity(&mut self, index: usize, opacity: u8) -> EditorResult<()> {
        self.get_mut(index)?.set_opacity(opacity);
        Ok(())
    }

    /// Mutable pixels of the active layer, or `None` when the layer is locked
    /// or hidden. Tools treat `None` as a silent no-op.
    pub fn editable_pixels(&mut self) -> Option<&mut RgbaImage> {
        let layer = &mut self.layers[self.active];
        if layer.is_editable() {
            Some(&mut layer.pixels)
        } else {
            debug!(
                "Layer {} is {}, ignoring pixel edit",
                self.active,
                if layer.locked { "locked" } else { "hidden" }
            );
            None
        }
    }

    pub fn snapshot(&self, index: usize, codec: &dyn SnapshotCodec) -> EditorResult<Snapshot> {
        let layer = self
            .layers
            .get(index)
            .ok_or(EditorError::LayerNotFound(index))?;
        Ok(codec.encode(&layer.pixels)?)
    }

    /// Replace a layer's pixels with a snapshot, or clear them when `snapshot`
    /// is `None`. Restoring ignores the lock: history owns the content.
    pub fn restore(
        &mut self,
        index: usize,
        snapshot: Option<&Snapshot>,
        codec: &dyn SnapshotCodec,
    ) -> EditorResult<()> {
        let (width, height) = (self.width, self.height);
        let layer = self.get_mut(index)?;
        match snapshot {
            Some(snapshot) => {
                let pixels = codec.decode(snapshot)?;
                if pixels.dimensions() != (width, height) {
                    return Err(SnapshotError::SizeMismatch {
                        expected: (width, height),
                        actual: pixels.dimensions(),
                    }
                    .into());
                }
                layer.pixels = pixels;
            }
            None => layer.clear(),
        }
        Ok(())
    }

    /// Back to a single visible, unlocked, fully opaque blank layer
    pub fn reset(&mut self) {
        *self = Self::new(self.width, self.height);
    }

    /// Flatten the visible layers into one buffer (source-over, per-layer
    /// opacity applied)
    pub fn composite(&self) -> RgbaImage {
        let mut out = RgbaImage::from_pixel(self.width, self.height, TRANSPARENT);
        for layer in self.layers.iter().filter(|l| l.visible && l.opacity > 0) {
            let opacity = f32::from(layer.opacity) / 100.0;
            for (dst, src) in out.pixels_mut().zip(layer.pixels.pixels()) {
                *dst = blend_over(*dst, *src, opacity);
            }
        }
        out
    }

    /// Composited color at a canvas position
    pub fn sample(&self, x: i64, y: i64) -> Option<Rgba<u8>> {
        if !self.layers[0].pixels.contains(x, y) {
            return None;
        }
        let mut out = TRANSPARENT;
        for layer in self.layers.iter().filter(|l| l.visible && l.opacity > 0) {
            let src = layer.pixels.get(x, y)?;
            out = blend_over(out, src, f32::from(layer.opacity) / 100.0);
        }
        Some(out)
    }
}

pub(crate) fn blend_over(dst: Rgba<u8>, src: Rgba<u8>, opacity: f32) -> Rgba<u8> {
    let sa = f32::from(src.0[3]) / 255.0 * opacity;
    if sa <= 0.0 {
        return dst;
    }
    let da = f32::from(dst.0[3]) / 255.0;
    let out_a = sa + da * (1.0 - sa);

    let mut out = [0u8; 4];
    for c in 0..3 {
        let value = (f32::from(src.0[c]) * sa + f32::from(dst.0[c]) * da * (1.0 - sa)) / out_a;
        out[c] = value.round().clamp(0.0, 255.0) as u8;
    }
    out[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
    Rgba(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::PngCodec;
    use crate::color::{BLACK, WHITE};

    #[test]
    fn new_set_has_one_blank_layer() {
        let layers = LayerSet::new(4, 4);
        assert_eq!(layers.len(), 1);
        let layer = layers.active_layer();
        assert!(layer.visible && !layer.locked);
        assert_eq!(layer.opacity(), 100);
        assert!(layer.is_blank());
    }

    #[test]
    fn locked_and_hidden_layers_are_not_editable() {
        let mut layers = LayerSet::new(2, 2);
        layers.set_locked(0, true).unwrap();
        assert!(layers.editable_pixels().is_none());

        layers.set_locked(0, false).unwrap();
        layers.set_visible(0, false).unwrap();
        assert!(layers.editable_pixels().is_none());

        layers.set_visible(0, true).unwrap();
        assert!(layers.editable_pixels().is_some());
    }

    #[test]
    fn opacity_is_clamped() {
        let mut layers = LayerSet::new(1, 1);
        layers.set_opacity(0, 250).unwrap();
        assert_eq!(layers.active_layer().opacity(), 100);
    }

    #[test]
    fn remove_keeps_last_layer_and_fixes_active() {
        let mut layers = LayerSet::new(2, 2);
        assert_eq!(layers.add_layer("Top"), 1);
        assert!(layers.remove_layer(1).unwrap().is_some());
        assert_eq!(layers.active_index(), 0);
        assert!(layers.remove_layer(0).unwrap().is_none());
        assert!(matches!(
            layers.remove_layer(5),
            Err(EditorError::LayerNotFound(5))
        ));
    }

    #[test]
    fn snapshot_restore_round_trip() {
        let mut layers = LayerSet::new(3, 3);
        layers.editable_pixels().unwrap().set(1, 1, BLACK);
        let snapshot = layers.snapshot(0, &PngCodec).unwrap();

        layers.restore(0, None, &PngCodec).unwrap();
        assert!(layers.active_layer().is_blank());

        layers.restore(0, Some(&snapshot), &PngCodec).unwrap();
        assert_eq!(layers.active_layer().pixels().get(1, 1), Some(BLACK));
    }

    #[test]
    fn restore_rejects_wrong_size() {
        let mut layers = LayerSet::new(3, 3);
        let other = LayerSet::new(2, 2);
        let snapshot = other.snapshot(0, &PngCodec).unwrap();
        assert!(matches!(
            layers.restore(0, Some(&snapshot), &PngCodec),
            Err(EditorError::Snapshot(SnapshotError::SizeMismatch { .. }))
        ));
    }

    #[test]
    fn composite_skips_hidden_and_applies_opacity() {
        let mut layers = LayerSet::new(1, 1);
        layers.editable_pixels().unwrap().set(0, 0, WHITE);
        layers.add_layer("Top");
        layers.editable_pixels().unwrap().set(0, 0, BLACK);

        assert_eq!(layers.sample(0, 0), Some(BLACK));

        layers.set_opacity(1, 50).unwrap();
        let half = layers.composite().get_pixel(0, 0).0;
        assert!((126..=129).contains(&half[0]));
        assert_eq!(half[3], 255);

        layers.set_visible(1, false).unwrap();
        assert_eq!(layers.sample(0, 0), Some(WHITE));
    }

    #[test]
    fn reset_returns_to_single_blank_layer() {
        let mut layers = LayerSet::new(2, 2);
        layers.add_layer("Extra");
        layers.set_locked(1, true).unwrap();
        layers.reset();
        assert_eq!(layers.len(), 1);
        assert!(layers.active_layer().is_editable());
        assert!(layers.active_layer().is_blank());
    }
}
