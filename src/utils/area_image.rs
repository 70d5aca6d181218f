use std::cell::RefCell;
use std::rc::Rc;

use anyhow::Context as _;
use image::RgbaImage;
use uuid::Uuid;

use crate::layer::{AnchorMode, Layer, SharedImage};
use crate::registry::LoadState;
use crate::utils::area::Area;

pub type OnImageLoaded = Box<dyn FnOnce(&RgbaImage)>;
pub type OnImageFailed = Box<dyn FnOnce(&anyhow::Error)>;

/// An image bound to an area. Unlike the preload-queued wrappers this
/// loads immediately at construction, so it can be created at any
/// lifecycle point.
pub struct AreaImage {
    area: Area,
    key: Uuid,
    image: SharedImage,
}

impl AreaImage {
    pub fn new(area: Area, image_path: &str) -> Self {
        Self::with_callbacks(area, image_path, None, None)
    }

    pub fn with_callbacks(
        area: Area,
        image_path: &str,
        on_loaded: Option<OnImageLoaded>,
        on_failed: Option<OnImageFailed>,
    ) -> Self {
        let image: SharedImage = Rc::new(RefCell::new(LoadState::Pending));
        match image::open(image_path).with_context(|| format!("load image at '{image_path}'")) {
            Ok(decoded) => {
                let rgba = decoded.to_rgba8();
                if let Some(hook) = on_loaded {
                    hook(&rgba);
                }
                *image.borrow_mut() = LoadState::Loaded(rgba);
            }
            Err(err) => {
                match on_failed {
                    Some(hook) => hook(&err),
                    None => log::error!("Failed to load area image: {err:#}"),
                }
                *image.borrow_mut() = LoadState::Failed(format!("{err:#}"));
            }
        }
        Self {
            area,
            key: Uuid::new_v4(),
            image,
        }
    }

    pub fn area(&self) -> &Area {
        &self.area
    }

    pub fn area_mut(&mut self) -> &mut Area {
        &mut self.area
    }

    pub fn is_loaded(&self) -> bool {
        self.image.borrow().is_loaded()
    }

    /// Queues the image over its area.
    pub fn draw(&self, layer: &mut Layer) {
        self.draw_image(layer, self.key, self.image.clone());
    }

    /// Queues the image with `(x, y)` as its center.
    pub fn draw_at(&self, layer: &mut Layer, x: f32, y: f32) {
        self.draw_image_at(layer, self.key, self.image.clone(), x, y);
    }

    /// Queues the area's rectangle.
    pub fn draw_area(&self, layer: &mut Layer) {
        self.area.draw(layer);
    }

    fn draw_image(&self, layer: &mut Layer, key: Uuid, image: SharedImage) {
        if !image.borrow().is_loaded() {
            return;
        }
        layer.set_image_mode(AnchorMode::Corner);
        layer.queue_image(
            key,
            image,
            crate::utils::geom::Rectangle::new(
                self.area.x(),
                self.area.y(),
                self.area.w(),
                self.area.h(),
            ),
        );
    }

    fn draw_image_at(&self, layer: &mut Layer, key: Uuid, image: SharedImage, x: f32, y: f32) {
        if !image.borrow().is_loaded() {
            return;
        }
        layer.set_image_mode(AnchorMode::Center);
        layer.queue_image(
            key,
            image,
            crate::utils::geom::Rectangle::new(x, y, self.area.w(), self.area.h()),
        );
    }
}

/// A horizontal strip of equally-wide frames with a selectable current
/// frame.
pub struct AreaSpriteSheet {
    base: AreaImage,
    frames: Vec<(Uuid, SharedImage)>,
    sprite: usize,
}

impl AreaSpriteSheet {
    /// Loads the sheet and splits it into `sprite_w`-wide frames. A
    /// trailing narrower frame is kept as-is.
    pub fn new(sprite_w: u32, area: Area, image_path: &str) -> Self {
        let mut frames = Vec::new();
        let base = AreaImage::new(area, image_path);
        if let LoadState::Loaded(sheet) = &*base.image.borrow() {
            frames = split_frames(sheet, sprite_w)
                .into_iter()
                .map(|frame| {
                    let shared: SharedImage = Rc::new(RefCell::new(LoadState::Loaded(frame)));
                    (Uuid::new_v4(), shared)
                })
                .collect();
        }
        Self {
            base,
            frames,
            sprite: 0,
        }
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn sprite(&self) -> usize {
        self.sprite
    }

    /// Selects the current frame, clamped to the available range.
    pub fn set_sprite(&mut self, index: usize) {
        self.sprite = index.min(self.frames.len().saturating_sub(1));
    }

    /// Selects the current frame from a 0..1 fraction of the strip.
    pub fn set_sprite_t(&mut self, t: f32) {
        let index = (t * self.frames.len() as f32) as usize;
        self.set_sprite(index);
    }

    pub fn area(&self) -> &Area {
        self.base.area()
    }

    pub fn area_mut(&mut self) -> &mut Area {
        self.base.area_mut()
    }

    pub fn is_loaded(&self) -> bool {
        !self.frames.is_empty()
    }

    /// Queues the current frame over the area.
    pub fn draw(&self, layer: &mut Layer) {
        if let Some((key, image)) = self.frames.get(self.sprite) {
            self.base.draw_image(layer, *key, image.clone());
        }
    }

    /// Queues the current frame with `(x, y)` as its center.
    pub fn draw_at(&self, layer: &mut Layer, x: f32, y: f32) {
        if let Some((key, image)) = self.frames.get(self.sprite) {
            self.base.draw_image_at(layer, *key, image.clone(), x, y);
        }
    }

    pub fn draw_area(&self, layer: &mut Layer) {
        self.base.draw_area(layer);
    }
}

/// Splits a sheet into `sprite_w`-wide full-height frames, left to
/// right.
pub fn split_frames(sheet: &RgbaImage, sprite_w: u32) -> Vec<RgbaImage> {
    let mut frames = Vec::new();
    if sprite_w == 0 {
        return frames;
    }
    let mut x = 0;
    while x < sheet.width() {
        let w = sprite_w.min(sheet.width() - x);
        frames.push(image::imageops::crop_imm(sheet, x, 0, w, sheet.height()).to_image());
        x += sprite_w;
    }
    frames
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn striped_sheet(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, _| Rgba([(x % 256) as u8, 0, 0, 255]))
    }

    #[test]
    fn sheets_split_into_full_width_frames() {
        let sheet = striped_sheet(48, 16);
        let frames = split_frames(&sheet, 16);
        assert_eq!(frames.len(), 3);
        assert!(frames.iter().all(|f| f.width() == 16 && f.height() == 16));
        // Frames keep their source columns.
        assert_eq!(frames[1].get_pixel(0, 0)[0], 16);
        assert_eq!(frames[2].get_pixel(0, 0)[0], 32);
    }

    #[test]
    fn trailing_partial_frame_is_kept() {
        let sheet = striped_sheet(40, 8);
        let frames = split_frames(&sheet, 16);
        assert_eq!(frames.len(), 3);
        assert_eq!(frames[2].width(), 8);
    }

    #[test]
    fn zero_width_frames_yield_nothing() {
        let sheet = striped_sheet(8, 8);
        assert!(split_frames(&sheet, 0).is_empty());
    }
}
