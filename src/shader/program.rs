use std::cell::RefCell;
use std::fs;
use std::path::PathBuf;
use std::rc::Rc;

use anyhow::Context as _;

use crate::context::SketchContext;
use crate::renderer::Renderer;
use crate::shader::layer::ShaderLayer;
use crate::validation::validate_file_path;

/// Source text for the two programmable stages. Filter shaders leave the
/// vertex stage empty and get the built-in fullscreen stage instead.
#[derive(Debug, Default)]
pub struct ShaderSources {
    pub frag: Option<String>,
    pub vert: Option<String>,
}

impl ShaderSources {
    fn missing(source: &Option<String>) -> bool {
        source.as_deref().map_or(true, str::is_empty)
    }

    /// Resolves the stages needed to build a pipeline. A required stage
    /// with no source is a programmer error and panics.
    pub fn for_pipeline(&self, is_filter: bool) -> (&str, Option<&str>) {
        let frag = match self.frag.as_deref() {
            Some(source) if !source.is_empty() => source,
            _ if is_filter => panic!("Filter shader is missing fragment source."),
            _ => panic!("Shader is missing fragment source."),
        };
        if is_filter {
            return (frag, None);
        }
        match self.vert.as_deref() {
            Some(source) if !source.is_empty() => (frag, Some(source)),
            _ => panic!("Shader is missing vertex source."),
        }
    }
}

struct ShaderState {
    sources: ShaderSources,
    pipeline: Option<wgpu::RenderPipeline>,
    auto_applied: bool,
    enabled: bool,
}

/// A fragment/vertex program bound to one shader layer. Created before
/// setup, compiled during setup, applied to its layer's contents during
/// the draw tick. Clones share the same program state.
#[derive(Clone)]
pub struct Shader {
    layer: ShaderLayer,
    is_filter: bool,
    state: Rc<RefCell<ShaderState>>,
}

impl Shader {
    /// Folder of a named shader inside the resources root.
    pub fn shader_folder(ctx: &SketchContext, shader_name: &str) -> PathBuf {
        ctx.resources_root().join("shaders").join(shader_name)
    }

    /// Conventional fragment and vertex paths of a named shader.
    pub fn shader_paths(ctx: &SketchContext, shader_name: &str) -> (PathBuf, PathBuf) {
        let folder = Self::shader_folder(ctx, shader_name);
        (
            folder.join(format!("{shader_name}.frag")),
            folder.join(format!("{shader_name}.vert")),
        )
    }

    fn empty(layer: ShaderLayer, is_filter: bool) -> Self {
        Self {
            layer,
            is_filter,
            state: Rc::new(RefCell::new(ShaderState {
                sources: ShaderSources::default(),
                pipeline: None,
                auto_applied: true,
                enabled: true,
            })),
        }
    }

    fn disable(&self) {
        self.state.borrow_mut().enabled = false;
    }

    /// Builds a shader whose stage sources are loaded from files during
    /// preload. Filter shaders only load the fragment stage.
    pub fn from_files(
        ctx: &mut SketchContext,
        layer: ShaderLayer,
        is_filter: bool,
        frag_path: &str,
        vert_path: &str,
    ) -> Self {
        let shader = Self::empty(layer, is_filter);

        if let Err(err) = validate_file_path(frag_path, &["frag"], "Shader fragment path") {
            log::error!("{err}");
            shader.disable();
            return shader;
        }
        if !is_filter {
            if let Err(err) = validate_file_path(vert_path, &["vert"], "Shader vertex path") {
                log::error!("{err}");
                shader.disable();
                return shader;
            }
        }

        if ctx.is_after_preload() {
            log::error!(
                "A shader loading from files must be created before {}. Aborting.",
                SketchContext::PRELOAD_EVENT_NAME
            );
            shader.disable();
            return shader;
        }

        let state = shader.state.clone();
        let frag = frag_path.to_string();
        let vert = vert_path.to_string();
        ctx.registry_mut()
            .add_preload(format!("shader '{frag_path}'"), move |_root| {
                let frag_source = fs::read_to_string(&frag)
                    .with_context(|| format!("read fragment shader at '{frag}'"))?;
                let mut borrowed = state.borrow_mut();
                borrowed.sources.frag = Some(frag_source);
                if is_filter {
                    return Ok(());
                }
                let vert_source = fs::read_to_string(&vert)
                    .with_context(|| format!("read vertex shader at '{vert}'"))?;
                borrowed.sources.vert = Some(vert_source);
                Ok(())
            });

        shader.finish_construction(ctx)
    }

    /// Builds a shader from literal source text.
    pub fn from_source(
        ctx: &mut SketchContext,
        layer: ShaderLayer,
        is_filter: bool,
        frag_source: &str,
        vert_source: &str,
    ) -> Self {
        let shader = Self::empty(layer, is_filter);
        {
            let mut state = shader.state.borrow_mut();
            state.sources.frag = Some(frag_source.to_string());
            if !is_filter {
                state.sources.vert = Some(vert_source.to_string());
            }
        }
        shader.finish_construction(ctx)
    }

    /// Shared tail of construction: the setup-phase guard and the
    /// pending-shader queue registration.
    fn finish_construction(self, ctx: &mut SketchContext) -> Self {
        if !self.state.borrow().enabled {
            return self;
        }
        if ctx.is_after_setup() {
            log::error!(
                "Every shader must be created before {}. Aborting.",
                SketchContext::SETUP_EVENT_NAME
            );
            self.disable();
            return self;
        }
        ctx.registry_mut().add_shader(self.clone());
        self
    }

    pub fn layer(&self) -> ShaderLayer {
        self.layer
    }

    pub fn is_filter(&self) -> bool {
        self.is_filter
    }

    pub fn is_compiled(&self) -> bool {
        self.state.borrow().pipeline.is_some()
    }

    /// Whether construction succeeded; a shader created in the wrong
    /// lifecycle phase stays disabled and never compiles.
    pub fn is_enabled(&self) -> bool {
        self.state.borrow().enabled
    }

    pub fn auto_applied(&self) -> bool {
        self.state.borrow().auto_applied
    }

    /// Whether the sketch applies this shader automatically each frame.
    pub fn set_auto_applied(&self, value: bool) {
        self.state.borrow_mut().auto_applied = value;
    }

    /// Compiles the program against the renderer. Missing required
    /// sources panic; backend validation failures are logged and leave
    /// the shader uncompiled.
    pub(crate) fn compile(&self, renderer: &mut Renderer) {
        let mut state = self.state.borrow_mut();
        if !state.enabled {
            return;
        }
        let (frag, vert) = state.sources.for_pipeline(self.is_filter);
        match renderer.build_shader_pipeline(self.layer, frag, vert) {
            Ok(pipeline) => state.pipeline = Some(pipeline),
            Err(err) => log::error!(
                "Shader failed to compile for layer '{}': {err:#}",
                self.layer.key()
            ),
        }
    }

    /// Runs the program over its layer's current contents. A no-op until
    /// compiled; application errors are logged, never propagated.
    pub fn apply(&self, renderer: &mut Renderer) {
        let state = self.state.borrow();
        let Some(pipeline) = &state.pipeline else {
            return;
        };
        if let Err(err) = renderer.run_filter_pass(self.layer, pipeline) {
            log::error!("Shader failed to apply. Maybe a syntax error?\n{err:#}");
        }
    }
}
