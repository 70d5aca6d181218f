use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use serde::Deserialize;
use winit::window::Window;

use crate::context::SketchContext;
use crate::draw_settings::DrawSettings;
use crate::font::Font;
use crate::layer::Layer;
use crate::renderer::{Renderer, TargetId};
use crate::shader::program::Shader;
use crate::validation::{dimension_or_default, path_or_default};

pub const DEFAULT_WIDTH: u32 = 800;
pub const DEFAULT_HEIGHT: u32 = 800;
pub const DEFAULT_FONT_PATH: &str = "Roboto/Roboto-Regular.ttf";

/// Construction settings. Every field falls back to its default on a
/// missing or invalid value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SketchSettings {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub default_font_path: Option<String>,
}

impl SketchSettings {
    /// Reads settings from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("read sketch settings at '{}'", path.display()))?;
        toml::from_str(&text)
            .with_context(|| format!("parse sketch settings at '{}'", path.display()))
    }
}

/// Mutable view of the sketch handed to setup, update and draw
/// listeners.
pub struct FrameView<'a> {
    pub graphics: &'a mut Layer,
    pub graphics_ui: &'a mut Layer,
    pub pixel: &'a mut Layer,
    pub settings: &'a mut DrawSettings,
    pub ctx: &'a mut SketchContext,
    pub width: u32,
    pub height: u32,
    visibility: &'a mut Option<bool>,
}

impl FrameView<'_> {
    /// Asks the sketch to hide itself; applied at the next tick.
    pub fn request_hide(&mut self) {
        *self.visibility = Some(false);
    }

    /// Asks the sketch to show itself; applied at the next tick.
    pub fn request_show(&mut self) {
        *self.visibility = Some(true);
    }
}

type FrameListener = Box<dyn FnMut(&mut FrameView)>;

enum ListenerKind {
    Setup,
    Update,
    Draw,
}

/// The orchestrator: owns the three layers, the listener lists, the
/// per-layer and global shader lists and the draw settings, and
/// sequences the preload/setup/draw lifecycle over them.
pub struct Sketch {
    width: u32,
    height: u32,
    can_start: bool,
    is_hidden: bool,
    default_font: Option<Font>,
    graphics: Layer,
    graphics_ui: Layer,
    pixel: Layer,
    settings: DrawSettings,
    setup_listeners: Vec<FrameListener>,
    update_listeners: Vec<FrameListener>,
    draw_listeners: Vec<FrameListener>,
    shaders: Vec<Shader>,
    global_shaders: Vec<Shader>,
    pending_resize: Option<(u32, u32)>,
    pending_visibility: Option<bool>,
    window: Option<Arc<Window>>,
}

impl Sketch {
    /// Builds the sketch and claims the context's active-sketch slot.
    /// A second sketch on the same context logs an error and comes back
    /// inert: it keeps its settings but refuses to start.
    pub fn new(ctx: &mut SketchContext, settings: SketchSettings) -> Self {
        let width = dimension_or_default(settings.width, DEFAULT_WIDTH, "sketch width");
        let height = dimension_or_default(settings.height, DEFAULT_HEIGHT, "sketch height");

        let mut sketch = Self {
            width,
            height,
            can_start: false,
            is_hidden: false,
            default_font: None,
            graphics: Layer::new("graphics", true),
            graphics_ui: Layer::new("graphicsUI", true),
            pixel: Layer::new("pixel", false),
            settings: DrawSettings::default(),
            setup_listeners: Vec::new(),
            update_listeners: Vec::new(),
            draw_listeners: Vec::new(),
            shaders: Vec::new(),
            global_shaders: Vec::new(),
            pending_resize: None,
            pending_visibility: None,
            window: None,
        };

        if !ctx.try_claim_sketch() {
            log::error!("There can be only one sketch per context. Aborting.");
            return sketch;
        }

        let font_path = path_or_default(
            settings.default_font_path,
            DEFAULT_FONT_PATH,
            "sketch default font path",
        );
        sketch.default_font = Some(Font::new(ctx, &font_path));
        sketch.can_start = true;
        sketch
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Whether construction claimed the active-sketch slot.
    pub fn can_start(&self) -> bool {
        self.can_start
    }

    pub fn is_hidden(&self) -> bool {
        self.is_hidden
    }

    /// The automatically loaded default font; `None` on an inert sketch.
    pub fn default_font(&self) -> Option<&Font> {
        self.default_font.as_ref()
    }

    pub fn draw_settings(&self) -> &DrawSettings {
        &self.settings
    }

    pub fn draw_settings_mut(&mut self) -> &mut DrawSettings {
        &mut self.settings
    }

    pub fn graphics(&mut self) -> &mut Layer {
        &mut self.graphics
    }

    pub fn graphics_ui(&mut self) -> &mut Layer {
        &mut self.graphics_ui
    }

    pub fn pixel_graphics(&mut self) -> &mut Layer {
        &mut self.pixel
    }

    pub fn on_setup(&mut self, listener: impl FnMut(&mut FrameView) + 'static) {
        self.setup_listeners.push(Box::new(listener));
    }

    pub fn on_update(&mut self, listener: impl FnMut(&mut FrameView) + 'static) {
        self.update_listeners.push(Box::new(listener));
    }

    pub fn on_draw(&mut self, listener: impl FnMut(&mut FrameView) + 'static) {
        self.draw_listeners.push(Box::new(listener));
    }

    /// Records a pending size; the surfaces are reallocated at the next
    /// draw tick so a frame is never resized mid-flight.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.pending_resize = Some((width, height));
    }

    pub fn pending_resize(&self) -> Option<(u32, u32)> {
        self.pending_resize
    }

    /// Hides the window and pauses perceived time. Returns false when
    /// already hidden.
    pub fn hide(&mut self, ctx: &mut SketchContext) -> bool {
        if self.is_hidden {
            return false;
        }
        self.is_hidden = true;
        if let Some(window) = &self.window {
            window.set_visible(false);
        }
        ctx.clock_mut().set_time_scale(0.0);
        true
    }

    /// Shows the window and resumes perceived time. Returns false when
    /// already shown.
    pub fn show(&mut self, ctx: &mut SketchContext) -> bool {
        if !self.is_hidden {
            return false;
        }
        self.is_hidden = false;
        if let Some(window) = &self.window {
            window.set_visible(true);
        }
        ctx.clock_mut().set_time_scale(1.0);
        true
    }

    /// Runs the sketch: opens the window and drives the event loop until
    /// it closes. An inert instance refuses to run.
    pub fn run(self, ctx: SketchContext) -> Result<()> {
        if !self.can_start {
            log::error!("This sketch instance is inert and cannot start.");
            return Ok(());
        }
        crate::app::run_sketch(ctx, self)
    }

    pub(crate) fn attach_window(&mut self, window: Arc<Window>) {
        self.window = Some(window);
    }

    /// The setup phase: baselines the clock, sorts the pending shaders
    /// into the per-layer and global lists, runs setup listeners, drains
    /// queued setup events, then compiles every claimed shader.
    pub(crate) fn run_setup(&mut self, ctx: &mut SketchContext, renderer: &mut Renderer) {
        ctx.begin_setup();
        ctx.clock_mut().synchronize_millis();

        let pending = ctx.registry_mut().drain_shaders();
        for shader in &pending {
            if shader.layer().is_global() {
                self.global_shaders.push(shader.clone());
            } else {
                self.shaders.push(shader.clone());
            }
        }

        ctx.finish_setup();

        self.run_listeners(ListenerKind::Setup, ctx);
        for event in ctx.registry_mut().drain_setup() {
            event();
        }

        for shader in pending {
            shader.compile(renderer);
        }
    }

    /// One draw tick, in the fixed order: clock, update listeners,
    /// transform pop (skipped on the first frame), pending resize,
    /// transform push, early-out while hidden, draw listeners, shader
    /// application and layer compositing.
    pub(crate) fn draw_tick(
        &mut self,
        ctx: &mut SketchContext,
        renderer: &mut Renderer,
        raw_delta_ms: f64,
    ) {
        ctx.clock_mut().update(raw_delta_ms);
        ctx.input_mut().advance_pointer_frame();

        self.run_listeners(ListenerKind::Update, ctx);

        if let Some(visible) = self.pending_visibility.take() {
            if visible {
                self.show(ctx);
            } else {
                self.hide(ctx);
            }
        }

        if ctx.clock().frame_count() > 1 {
            self.graphics.pop();
            self.graphics_ui.pop();
            self.pixel.pop();
        }

        if let Some((width, height)) = self.pending_resize.take() {
            self.apply_resize(width, height, renderer);
        }

        self.graphics.push();
        self.graphics_ui.push();
        self.pixel.push();

        if self.is_hidden {
            return;
        }

        self.run_listeners(ListenerKind::Draw, ctx);

        renderer.flush_layer(TargetId::Graphics, &mut self.graphics);
        renderer.flush_layer(TargetId::GraphicsUi, &mut self.graphics_ui);
        renderer.flush_layer(TargetId::Pixel, &mut self.pixel);

        for shader in &self.shaders {
            if shader.auto_applied() {
                shader.apply(renderer);
            }
        }

        renderer.composite_layers(&self.settings);

        for shader in &self.global_shaders {
            if shader.auto_applied() {
                shader.apply(renderer);
            }
        }

        if let Err(err) = renderer.present_frame() {
            log::error!("Failed to present frame: {err:#}");
        }
    }

    fn apply_resize(&mut self, width: u32, height: u32, renderer: &mut Renderer) {
        self.width = width;
        self.height = height;
        self.graphics.reset_transforms();
        self.graphics_ui.reset_transforms();
        self.pixel.reset_transforms();
        renderer.resize_targets(width, height);
        if let Some(window) = &self.window {
            let _ = window.request_inner_size(winit::dpi::PhysicalSize::new(width, height));
        }
    }

    fn run_listeners(&mut self, kind: ListenerKind, ctx: &mut SketchContext) {
        let listeners = match kind {
            ListenerKind::Setup => &mut self.setup_listeners,
            ListenerKind::Update => &mut self.update_listeners,
            ListenerKind::Draw => &mut self.draw_listeners,
        };
        let mut view = FrameView {
            graphics: &mut self.graphics,
            graphics_ui: &mut self.graphics_ui,
            pixel: &mut self.pixel,
            settings: &mut self.settings,
            ctx,
            width: self.width,
            height: self.height,
            visibility: &mut self.pending_visibility,
        };
        for listener in listeners.iter_mut() {
            listener(&mut view);
        }
    }
}
