/// Logical target a shader is applied to. The renderer resolves each
/// variant to its concrete render target with an exhaustive match, so an
/// unknown layer cannot exist at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderLayer {
    /// Applied to the canvas after the graphics and UI layers have been
    /// composited onto it.
    Global,
    /// Applied to the graphics layer.
    Graphics,
    /// Applied to the UI layer.
    GraphicsUi,
}

impl ShaderLayer {
    /// Diagnostic label used in log messages.
    pub fn key(self) -> &'static str {
        match self {
            ShaderLayer::Global => "global",
            ShaderLayer::Graphics => "graphics",
            ShaderLayer::GraphicsUi => "graphicsUI",
        }
    }

    pub fn is_global(self) -> bool {
        matches!(self, ShaderLayer::Global)
    }
}
