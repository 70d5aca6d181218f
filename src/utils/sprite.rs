use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

use anyhow::Context as _;
use serde::Deserialize;
use uuid::Uuid;

use crate::context::SketchContext;
use crate::layer::{Layer, SharedImage};
use crate::registry::LoadState;
use crate::utils::geom::Rectangle;

/// Metadata describing one sprite: the image file name and its pixel
/// dimensions, usually extracted from an asset's JSON document.
#[derive(Debug, Clone, Deserialize)]
pub struct SpriteMeta {
    pub name: String,
    pub dim: Vec<u32>,
}

/// A fixed-size image loaded from an asset folder during preload.
/// Invalid metadata fails the sprite immediately without queueing a
/// load.
pub struct Sprite {
    name: String,
    width: u32,
    height: u32,
    key: Uuid,
    image: SharedImage,
}

impl Sprite {
    pub fn new(ctx: &mut SketchContext, asset_path: &str, meta: &SpriteMeta) -> Self {
        let image: SharedImage = Rc::new(RefCell::new(LoadState::Pending));

        if meta.name.len() < 2 || meta.dim.len() != 2 {
            log::error!("Failed to load sprite: '{}'.", meta.name);
            *image.borrow_mut() = LoadState::Failed("invalid sprite metadata".to_string());
            return Self {
                name: meta.name.clone(),
                width: 1,
                height: 1,
                key: Uuid::new_v4(),
                image,
            };
        }

        let sprite = Self {
            name: meta.name.clone(),
            width: meta.dim[0],
            height: meta.dim[1],
            key: Uuid::new_v4(),
            image: image.clone(),
        };

        if ctx.is_after_preload() {
            log::error!(
                "Sprite must be created before '{}'.",
                SketchContext::PRELOAD_EVENT_NAME
            );
            return sprite;
        }

        let name = meta.name.clone();
        let asset_root = asset_path.to_string();
        ctx.registry_mut()
            .add_preload(format!("sprite '{}'", meta.name), move |_root| {
                let full = Path::new(&asset_root).join(&name);
                match image::open(&full)
                    .with_context(|| format!("load sprite at '{}'", full.display()))
                {
                    Ok(decoded) => {
                        *image.borrow_mut() = LoadState::Loaded(decoded.to_rgba8());
                        Ok(())
                    }
                    Err(err) => {
                        *image.borrow_mut() = LoadState::Failed(format!("{err:#}"));
                        Err(err)
                    }
                }
            });

        sprite
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Pixel width from the sprite metadata.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Pixel height from the sprite metadata.
    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn is_loaded(&self) -> bool {
        self.image.borrow().is_loaded()
    }

    pub fn is_failed(&self) -> bool {
        self.image.borrow().is_failed()
    }

    /// Queues the sprite at its metadata size times `scale`. A no-op
    /// until loaded.
    pub fn draw(&self, layer: &mut Layer, x: f32, y: f32, scale: f32) {
        if !self.is_loaded() {
            return;
        }
        layer.queue_image(
            self.key,
            self.image.clone(),
            Rectangle::new(
                x,
                y,
                self.width as f32 * scale,
                self.height as f32 * scale,
            ),
        );
    }

    /// Queues the sprite stretched to the given rectangle. A no-op until
    /// loaded.
    pub fn draw_at_rect(&self, layer: &mut Layer, x: f32, y: f32, w: f32, h: f32) {
        if !self.is_loaded() {
            return;
        }
        layer.queue_image(self.key, self.image.clone(), Rectangle::new(x, y, w, h));
    }
}
