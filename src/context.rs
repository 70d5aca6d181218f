use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::input::Input;
use crate::registry::{LoadOutcome, LoadState, ResourceRegistry};
use crate::time::Clock;

/// Lifecycle phase of a sketch context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecyclePhase {
    /// Resources and the sketch are being constructed.
    Configuring,
    /// The preload queue is being resolved.
    Preloading,
    /// Every queued load has resolved; setup has not run.
    AfterPreload,
    /// Rendering surfaces are being allocated.
    SetupRun,
    /// The draw loop is running.
    AfterSetup,
}

/// Shared services every component is constructed against: the load
/// registry, the frame clock, input state and the resources root. Owned
/// by the application entry point; at most one sketch is active per
/// context.
pub struct SketchContext {
    resources_root: PathBuf,
    registry: ResourceRegistry,
    clock: Clock,
    input: Input,
    phase: LifecyclePhase,
    sketch_active: bool,
    json_assets: Vec<Rc<RefCell<LoadState<serde_json::Value>>>>,
}

impl SketchContext {
    /// Default resources folder, relative to the working directory.
    pub const RESOURCES_PATH: &'static str = "./res";
    /// Diagnostic name of the preload phase.
    pub const PRELOAD_EVENT_NAME: &'static str = "preload";
    /// Diagnostic name of the setup phase.
    pub const SETUP_EVENT_NAME: &'static str = "setup";

    pub fn new() -> Self {
        Self::with_resources_root(Self::RESOURCES_PATH)
    }

    pub fn with_resources_root(root: impl Into<PathBuf>) -> Self {
        Self {
            resources_root: root.into(),
            registry: ResourceRegistry::new(),
            clock: Clock::new(),
            input: Input::new(),
            phase: LifecyclePhase::Configuring,
            sketch_active: false,
            json_assets: Vec::new(),
        }
    }

    pub fn resources_root(&self) -> &Path {
        &self.resources_root
    }

    pub fn registry(&self) -> &ResourceRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut ResourceRegistry {
        &mut self.registry
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut Clock {
        &mut self.clock
    }

    pub fn input(&self) -> &Input {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut Input {
        &mut self.input
    }

    pub fn phase(&self) -> LifecyclePhase {
        self.phase
    }

    pub fn is_after_preload(&self) -> bool {
        matches!(
            self.phase,
            LifecyclePhase::AfterPreload | LifecyclePhase::SetupRun | LifecyclePhase::AfterSetup
        )
    }

    pub fn is_after_setup(&self) -> bool {
        self.phase == LifecyclePhase::AfterSetup
    }

    pub fn is_sketch_active(&self) -> bool {
        self.sketch_active
    }

    /// Claims the single active-sketch slot. Returns false when another
    /// sketch already claimed it.
    pub(crate) fn try_claim_sketch(&mut self) -> bool {
        if self.sketch_active {
            false
        } else {
            self.sketch_active = true;
            true
        }
    }

    /// Resolves the preload queue exactly once and advances past the
    /// preload phase. Outcomes are returned per request; failures have
    /// already been logged.
    pub fn run_preload(&mut self) -> Vec<LoadOutcome> {
        self.phase = LifecyclePhase::Preloading;
        let root = self.resources_root.clone();
        let outcomes = self.registry.resolve_all(&root);
        self.phase = LifecyclePhase::AfterPreload;
        outcomes
    }

    pub(crate) fn begin_setup(&mut self) {
        self.phase = LifecyclePhase::SetupRun;
    }

    pub(crate) fn finish_setup(&mut self) {
        self.phase = LifecyclePhase::AfterSetup;
    }

    /// Tracks a JSON asset for the all-loaded query. Only assets whose
    /// load was actually queued take part.
    pub(crate) fn register_json_asset(
        &mut self,
        handle: Rc<RefCell<LoadState<serde_json::Value>>>,
    ) {
        self.json_assets.push(handle);
    }

    /// AND-reduction of `is_loaded` over every tracked JSON asset.
    pub fn are_all_json_assets_loaded(&self) -> bool {
        self.json_assets
            .iter()
            .all(|asset| asset.borrow().is_loaded())
    }
}

impl Default for SketchContext {
    fn default() -> Self {
        Self::new()
    }
}
