use std::cell::RefCell;
use std::rc::Rc;

use anyhow::Context as _;
use uuid::Uuid;

use crate::context::SketchContext;
use crate::layer::{Layer, SharedImage};
use crate::registry::LoadState;
use crate::utils::geom::{Rectangle, Size};

/// A raster image loaded from the resources `images/` folder during
/// preload. Must be created before the preload phase runs.
#[derive(Clone)]
pub struct ImageAsset {
    path: String,
    key: Uuid,
    image: SharedImage,
}

impl ImageAsset {
    pub fn new(ctx: &mut SketchContext, image_path: &str) -> Self {
        let image: SharedImage = Rc::new(RefCell::new(LoadState::Pending));
        let asset = Self {
            path: image_path.to_string(),
            key: Uuid::new_v4(),
            image: image.clone(),
        };

        if ctx.is_after_preload() {
            log::error!(
                "Image must be created before '{}'.",
                SketchContext::PRELOAD_EVENT_NAME
            );
            return asset;
        }

        let relative = image_path.to_string();
        ctx.registry_mut()
            .add_preload(format!("image '{image_path}'"), move |root| {
                let full = root.join("images").join(&relative);
                let decoded = image::open(&full)
                    .with_context(|| format!("load image at '{}'", full.display()))?;
                *image.borrow_mut() = LoadState::Loaded(decoded.to_rgba8());
                Ok(())
            });

        asset
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn is_loaded(&self) -> bool {
        self.image.borrow().is_loaded()
    }

    /// Pixel dimensions of the decoded image, once loaded.
    pub fn size(&self) -> Option<Size> {
        self.image
            .borrow()
            .get()
            .map(|img| Size::new(img.width() as f32, img.height() as f32))
    }

    /// Queues this image at its native size. A no-op until loaded.
    pub fn draw(&self, layer: &mut Layer, x: f32, y: f32, scale: f32) {
        let Some(size) = self.size() else {
            return;
        };
        layer.queue_image(
            self.key,
            self.image.clone(),
            Rectangle::new(x, y, size.width * scale, size.height * scale),
        );
    }

    /// Queues this image stretched to the given rectangle. A no-op until
    /// loaded.
    pub fn draw_at_rect(&self, layer: &mut Layer, x: f32, y: f32, w: f32, h: f32) {
        if !self.is_loaded() {
            return;
        }
        layer.queue_image(self.key, self.image.clone(), Rectangle::new(x, y, w, h));
    }
}
