use cadmium_sketch::{Shader, ShaderLayer, Sketch, SketchContext, SketchSettings};

// Filter fragment stages sample their layer through the texture and
// sampler bound at set 0.
const INVERT_FRAG: &str = r#"
#version 450
layout(location = 0) in vec2 v_tex_coords;
layout(location = 0) out vec4 out_color;
layout(set = 0, binding = 0) uniform texture2D u_texture;
layout(set = 0, binding = 1) uniform sampler u_sampler;

void main() {
    vec4 color = texture(sampler2D(u_texture, u_sampler), v_tex_coords);
    out_color = vec4(vec3(1.0) - color.rgb, color.a);
}
"#;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut ctx = SketchContext::new();
    let mut sketch = Sketch::new(&mut ctx, SketchSettings::default());

    let invert = Shader::from_source(&mut ctx, ShaderLayer::Graphics, true, INVERT_FRAG, "");
    assert!(invert.is_enabled());

    sketch.on_draw(move |frame| {
        frame.graphics.clear();
        frame.graphics.set_fill([0.1, 0.3, 0.8, 1.0]);
        let t = (frame.ctx.clock().millis() * 0.001).sin() as f32;
        frame
            .graphics
            .rect(300.0 + t * 100.0, 300.0, 200.0, 200.0);
    });

    sketch.run(ctx)?;
    Ok(())
}
