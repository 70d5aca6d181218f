use std::cell::RefCell;
use std::fs;
use std::path::Path;
use std::rc::Rc;

use anyhow::Context as _;

use crate::context::SketchContext;
use crate::registry::LoadState;

/// Hook invoked with the parsed value and the asset folder once the
/// asset loads.
pub type OnLoaded = Box<dyn FnOnce(&serde_json::Value, &Path)>;

/// A JSON document loaded from `<asset_path>/<key>/<key>.json` during
/// preload. Loading instances register in the context's roster, which
/// backs [`SketchContext::are_all_json_assets_loaded`].
#[derive(Clone)]
pub struct JsonAsset {
    key: String,
    data: Rc<RefCell<LoadState<serde_json::Value>>>,
}

impl JsonAsset {
    /// Creates the asset and queues its load. Passing `load = false`
    /// marks the asset failed immediately and keeps it out of the
    /// roster.
    pub fn new(ctx: &mut SketchContext, key: &str, asset_path: &str, load: bool) -> Self {
        Self::with_on_loaded(ctx, key, asset_path, load, None)
    }

    pub fn with_on_loaded(
        ctx: &mut SketchContext,
        key: &str,
        asset_path: &str,
        load: bool,
        on_loaded: Option<OnLoaded>,
    ) -> Self {
        let data = Rc::new(RefCell::new(if load {
            LoadState::Pending
        } else {
            LoadState::Failed("loading disabled".to_string())
        }));
        let asset = Self {
            key: key.to_string(),
            data: data.clone(),
        };
        if !load {
            return asset;
        }

        if ctx.is_after_preload() {
            log::error!(
                "JsonAsset must be created before '{}'.",
                SketchContext::PRELOAD_EVENT_NAME
            );
            return asset;
        }

        ctx.register_json_asset(data.clone());

        let key_owned = key.to_string();
        let asset_root = asset_path.to_string();
        ctx.registry_mut()
            .add_preload(format!("json asset '{key}'"), move |_root| {
                let folder = Path::new(&asset_root).join(&key_owned);
                let file = folder.join(format!("{key_owned}.json"));
                let parse = || -> anyhow::Result<serde_json::Value> {
                    let text = fs::read_to_string(&file)
                        .with_context(|| format!("read json asset at '{}'", file.display()))?;
                    serde_json::from_str(&text)
                        .with_context(|| format!("parse json asset at '{}'", file.display()))
                };
                match parse() {
                    Ok(value) => {
                        *data.borrow_mut() = LoadState::Loaded(value);
                        if let Some(hook) = on_loaded {
                            if let LoadState::Loaded(value) = &*data.borrow() {
                                hook(value, &folder);
                            }
                        }
                        Ok(())
                    }
                    Err(err) => {
                        *data.borrow_mut() = LoadState::Failed(format!("{err:#}"));
                        Err(err)
                    }
                }
            });

        asset
    }

    /// One instance per configured key.
    pub fn load_batch(ctx: &mut SketchContext, asset_path: &str, keys: &[&str]) -> Vec<JsonAsset> {
        keys.iter()
            .map(|key| Self::new(ctx, key, asset_path, true))
            .collect()
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn is_loaded(&self) -> bool {
        self.data.borrow().is_loaded()
    }

    pub fn is_failed(&self) -> bool {
        self.data.borrow().is_failed()
    }

    /// Runs `f` against the parsed document, or returns `None` while the
    /// asset is not loaded.
    pub fn with_data<R>(&self, f: impl FnOnce(&serde_json::Value) -> R) -> Option<R> {
        match &*self.data.borrow() {
            LoadState::Loaded(value) => Some(f(value)),
            _ => None,
        }
    }
}
