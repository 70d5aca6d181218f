use cadmium_sketch::{Shader, ShaderLayer, SketchContext};

const FRAG: &str = "#version 450\nlayout(location = 0) out vec4 color;\nvoid main() { color = vec4(1.0); }";
const VERT: &str = "#version 450\nvoid main() { gl_Position = vec4(0.0, 0.0, 0.0, 1.0); }";

#[test]
fn shader_layers_are_a_closed_set() {
    assert_eq!(ShaderLayer::Global.key(), "global");
    assert_eq!(ShaderLayer::Graphics.key(), "graphics");
    assert_eq!(ShaderLayer::GraphicsUi.key(), "graphicsUI");
    assert!(ShaderLayer::Global.is_global());
    assert!(!ShaderLayer::Graphics.is_global());
    assert_ne!(ShaderLayer::Graphics, ShaderLayer::GraphicsUi);
}

#[test]
fn constructed_shaders_queue_for_the_sketch_to_claim() {
    let mut ctx = SketchContext::new();
    let filter = Shader::from_source(&mut ctx, ShaderLayer::Graphics, true, FRAG, "");
    let full = Shader::from_source(&mut ctx, ShaderLayer::Global, false, FRAG, VERT);
    assert!(filter.is_enabled() && full.is_enabled());
    assert!(filter.is_filter() && !full.is_filter());
    assert!(!filter.is_compiled());

    let pending = ctx.registry_mut().drain_shaders();
    assert_eq!(pending.len(), 2);
    assert_eq!(pending[0].layer(), ShaderLayer::Graphics);
    assert_eq!(pending[1].layer(), ShaderLayer::Global);
    assert_eq!(ctx.registry().pending_shader_len(), 0);
}

#[test]
fn auto_applied_is_shared_across_clones() {
    let mut ctx = SketchContext::new();
    let shader = Shader::from_source(&mut ctx, ShaderLayer::GraphicsUi, true, FRAG, "");
    assert!(shader.auto_applied());

    let queued = ctx.registry_mut().drain_shaders().remove(0);
    shader.set_auto_applied(false);
    assert!(!queued.auto_applied());
}

#[test]
fn file_shaders_created_after_preload_stay_disabled() {
    let mut ctx = SketchContext::new();
    ctx.run_preload();
    let shader = Shader::from_files(
        &mut ctx,
        ShaderLayer::Graphics,
        true,
        "glow/glow.frag",
        "",
    );
    assert!(!shader.is_enabled());
    assert!(!shader.is_compiled());
    assert_eq!(ctx.registry().pending_shader_len(), 0);
}

#[test]
fn shader_path_helpers_follow_the_resource_layout() {
    let ctx = SketchContext::with_resources_root("./res");
    let folder = Shader::shader_folder(&ctx, "glow");
    assert!(folder.ends_with("shaders/glow"));
    let (frag, vert) = Shader::shader_paths(&ctx, "glow");
    assert!(frag.ends_with("shaders/glow/glow.frag"));
    assert!(vert.ends_with("shaders/glow/glow.vert"));
}
