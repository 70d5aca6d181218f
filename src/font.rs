use std::cell::RefCell;
use std::fs;
use std::rc::Rc;

use anyhow::{anyhow, Context as _};
use rusttype::{point, Scale};

use crate::context::SketchContext;
use crate::registry::LoadState;
use crate::utils::geom::Rectangle;

/// A font loaded from the resources `fonts/` folder during preload.
/// Must be created before the preload phase runs; a font constructed
/// later logs a diagnostic and never loads.
#[derive(Clone)]
pub struct Font {
    path: String,
    face: Rc<RefCell<LoadState<rusttype::Font<'static>>>>,
}

impl Font {
    pub fn new(ctx: &mut SketchContext, font_path: &str) -> Self {
        let face: Rc<RefCell<LoadState<rusttype::Font<'static>>>> =
            Rc::new(RefCell::new(LoadState::Pending));
        let font = Self {
            path: font_path.to_string(),
            face: face.clone(),
        };

        if ctx.is_after_preload() {
            log::error!(
                "Font must be created before '{}'.",
                SketchContext::PRELOAD_EVENT_NAME
            );
            return font;
        }

        let relative = font_path.to_string();
        ctx.registry_mut()
            .add_preload(format!("font '{font_path}'"), move |root| {
                let full = root.join("fonts").join(&relative);
                let bytes = fs::read(&full)
                    .with_context(|| format!("read font at '{}'", full.display()))?;
                let parsed = rusttype::Font::try_from_vec(bytes).ok_or_else(|| {
                    anyhow!("font data at '{}' is not a valid font", full.display())
                })?;
                *face.borrow_mut() = LoadState::Loaded(parsed);
                Ok(())
            });

        font
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn is_loaded(&self) -> bool {
        self.face.borrow().is_loaded()
    }

    /// Runs `f` against the loaded face, or returns `None` while the
    /// font is not loaded.
    pub fn with_face<R>(&self, f: impl FnOnce(&rusttype::Font<'static>) -> R) -> Option<R> {
        match &*self.face.borrow() {
            LoadState::Loaded(face) => Some(f(face)),
            _ => None,
        }
    }

    /// Layout bounds of `text` rendered at `font_size`, anchored with its
    /// top-left corner at `(x, y)`. `None` while the font is not loaded.
    pub fn text_bounds(&self, text: &str, x: f32, y: f32, font_size: f32) -> Option<Rectangle> {
        self.with_face(|face| {
            let scale = Scale::uniform(font_size);
            let v_metrics = face.v_metrics(scale);
            let width = face
                .layout(text, scale, point(0.0, v_metrics.ascent))
                .last()
                .map(|glyph| {
                    glyph.position().x + glyph.unpositioned().h_metrics().advance_width
                })
                .unwrap_or(0.0);
            Rectangle::new(x, y, width, v_metrics.ascent - v_metrics.descent)
        })
    }
}
