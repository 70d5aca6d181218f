use std::path::Path;

use anyhow::Result;

use crate::shader::program::Shader;

/// Load lifecycle of a deferred resource. A resource that never resolves
/// stays `Pending`; a resolved one is either `Loaded` or `Failed` and
/// never changes again.
#[derive(Debug)]
pub enum LoadState<T> {
    Pending,
    Loaded(T),
    Failed(String),
}

impl<T> Default for LoadState<T> {
    fn default() -> Self {
        LoadState::Pending
    }
}

impl<T> LoadState<T> {
    pub fn is_loaded(&self) -> bool {
        matches!(self, LoadState::Loaded(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, LoadState::Failed(_))
    }

    pub fn get(&self) -> Option<&T> {
        match self {
            LoadState::Loaded(value) => Some(value),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&str> {
        match self {
            LoadState::Failed(reason) => Some(reason),
            _ => None,
        }
    }
}

type LoadFn = Box<dyn FnOnce(&Path) -> Result<()>>;
type SetupFn = Box<dyn FnOnce()>;

struct LoadRequest {
    label: String,
    run: LoadFn,
}

/// Result of one resolved load request.
pub struct LoadOutcome {
    pub label: String,
    pub result: Result<()>,
}

impl LoadOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Two-phase resource registry: typed load requests accumulate while the
/// sketch is being configured and are resolved exactly once during
/// preload. Setup closures and pending shaders queue here as well, each
/// drained once at its own lifecycle point.
#[derive(Default)]
pub struct ResourceRegistry {
    preload: Vec<LoadRequest>,
    setup: Vec<SetupFn>,
    shaders: Vec<Shader>,
}

impl ResourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a load request for the preload phase. The closure receives
    /// the resources root when it runs.
    pub fn add_preload(
        &mut self,
        label: impl Into<String>,
        run: impl FnOnce(&Path) -> Result<()> + 'static,
    ) {
        self.preload.push(LoadRequest {
            label: label.into(),
            run: Box::new(run),
        });
    }

    /// Queues a closure invoked after the setup phase.
    pub fn add_setup(&mut self, run: impl FnOnce() + 'static) {
        self.setup.push(Box::new(run));
    }

    /// Queues a shader for the sketch to claim during setup.
    pub fn add_shader(&mut self, shader: Shader) {
        self.shaders.push(shader);
    }

    pub fn preload_len(&self) -> usize {
        self.preload.len()
    }

    pub fn pending_shader_len(&self) -> usize {
        self.shaders.len()
    }

    /// Runs every queued load request in registration order and drains
    /// the queue. Failures are logged and reported per request, never
    /// propagated.
    pub fn resolve_all(&mut self, resources_root: &Path) -> Vec<LoadOutcome> {
        std::mem::take(&mut self.preload)
            .into_iter()
            .map(|request| {
                let result = (request.run)(resources_root);
                if let Err(err) = &result {
                    log::error!("Failed to load '{}': {err:#}", request.label);
                }
                LoadOutcome {
                    label: request.label,
                    result,
                }
            })
            .collect()
    }

    pub fn drain_setup(&mut self) -> Vec<SetupFn> {
        std::mem::take(&mut self.setup)
    }

    pub fn drain_shaders(&mut self) -> Vec<Shader> {
        std::mem::take(&mut self.shaders)
    }
}
