use std::cell::RefCell;
use std::fs;
use std::path::PathBuf;
use std::rc::Rc;

use cadmium_sketch::{JsonAsset, SketchContext};

/// Creates `<root>/<key>/<key>.json` holding the given document.
fn write_asset(root: &PathBuf, key: &str, body: &str) {
    let folder = root.join(key);
    fs::create_dir_all(&folder).unwrap();
    fs::write(folder.join(format!("{key}.json")), body).unwrap();
}

fn asset_root(tag: &str) -> PathBuf {
    let root = std::env::temp_dir().join(format!(
        "cadmium_json_{tag}_{}",
        std::process::id()
    ));
    let _ = fs::remove_dir_all(&root);
    fs::create_dir_all(&root).unwrap();
    root
}

#[test]
fn assets_load_during_preload() {
    let root = asset_root("load");
    write_asset(&root, "tiles", r#"{"count": 4}"#);

    let mut ctx = SketchContext::new();
    let asset = JsonAsset::new(&mut ctx, "tiles", root.to_str().unwrap(), true);
    assert!(!asset.is_loaded());
    assert!(!asset.is_failed());

    let outcomes = ctx.run_preload();
    assert!(outcomes[0].is_ok());
    assert!(asset.is_loaded());
    assert_eq!(asset.with_data(|data| data["count"].as_i64()), Some(Some(4)));
    assert!(ctx.are_all_json_assets_loaded());

    let _ = fs::remove_dir_all(root);
}

#[test]
fn a_missing_document_fails_the_asset() {
    let root = asset_root("missing");
    let mut ctx = SketchContext::new();
    let asset = JsonAsset::new(&mut ctx, "ghost", root.to_str().unwrap(), true);
    ctx.run_preload();
    assert!(asset.is_failed());
    assert!(!asset.is_loaded());
    assert!(!ctx.are_all_json_assets_loaded());

    let _ = fs::remove_dir_all(root);
}

#[test]
fn malformed_json_fails_the_asset() {
    let root = asset_root("malformed");
    write_asset(&root, "broken", "{not json");
    let mut ctx = SketchContext::new();
    let asset = JsonAsset::new(&mut ctx, "broken", root.to_str().unwrap(), true);
    ctx.run_preload();
    assert!(asset.is_failed());

    let _ = fs::remove_dir_all(root);
}

#[test]
fn disabled_assets_fail_immediately_and_stay_out_of_the_roster() {
    let root = asset_root("disabled");
    write_asset(&root, "real", "{}");

    let mut ctx = SketchContext::new();
    let disabled = JsonAsset::new(&mut ctx, "real", root.to_str().unwrap(), false);
    assert!(disabled.is_failed());
    assert_eq!(ctx.registry().preload_len(), 0);

    // The disabled instance does not drag the roster query down.
    let loaded = JsonAsset::new(&mut ctx, "real", root.to_str().unwrap(), true);
    ctx.run_preload();
    assert!(loaded.is_loaded());
    assert!(disabled.is_failed());
    assert!(ctx.are_all_json_assets_loaded());

    let _ = fs::remove_dir_all(root);
}

#[test]
fn all_loaded_is_an_and_reduction() {
    let root = asset_root("reduction");
    write_asset(&root, "a", "{}");
    write_asset(&root, "b", "{}");

    let mut ctx = SketchContext::new();
    let assets = JsonAsset::load_batch(&mut ctx, root.to_str().unwrap(), &["a", "b", "c"]);
    assert_eq!(assets.len(), 3);
    assert_eq!(assets[0].key(), "a");

    ctx.run_preload();
    assert!(assets[0].is_loaded());
    assert!(assets[1].is_loaded());
    assert!(assets[2].is_failed());
    assert!(!ctx.are_all_json_assets_loaded());

    let _ = fs::remove_dir_all(root);
}

#[test]
fn the_on_loaded_hook_sees_the_document_and_folder() {
    let root = asset_root("hook");
    write_asset(&root, "sheet", r#"{"name": "walk"}"#);

    let seen = Rc::new(RefCell::new(None));
    let sink = seen.clone();
    let mut ctx = SketchContext::new();
    let asset = JsonAsset::with_on_loaded(
        &mut ctx,
        "sheet",
        root.to_str().unwrap(),
        true,
        Some(Box::new(move |data, folder| {
            *sink.borrow_mut() =
                Some((data["name"].as_str().map(String::from), folder.to_path_buf()));
        })),
    );
    ctx.run_preload();
    assert!(asset.is_loaded());
    let seen = seen.borrow();
    let (name, folder) = seen.as_ref().expect("hook ran");
    assert_eq!(name.as_deref(), Some("walk"));
    assert_eq!(folder, &root.join("sheet"));

    let _ = fs::remove_dir_all(root);
}

#[test]
fn assets_created_after_preload_never_load() {
    let root = asset_root("late");
    write_asset(&root, "tardy", "{}");

    let mut ctx = SketchContext::new();
    ctx.run_preload();
    let asset = JsonAsset::new(&mut ctx, "tardy", root.to_str().unwrap(), true);
    assert!(!asset.is_loaded());
    assert!(!asset.is_failed());
    assert_eq!(ctx.registry().preload_len(), 0);

    let _ = fs::remove_dir_all(root);
}
