/// Flags controlling how the layers are composited each frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawSettings {
    /// Whether the graphics layer is drawn onto the canvas.
    pub draw_graphics: bool,
    /// Whether the UI layer is drawn onto the canvas.
    pub draw_graphics_ui: bool,
    /// Whether the pixel layer is drawn into the graphics layer.
    pub draw_pixel_graphics: bool,
    /// Whether the canvas is cleared before compositing.
    pub auto_clear_canvas: bool,
}

impl Default for DrawSettings {
    fn default() -> Self {
        Self {
            draw_graphics: true,
            draw_graphics_ui: true,
            draw_pixel_graphics: true,
            auto_clear_canvas: false,
        }
    }
}
