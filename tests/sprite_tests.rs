use std::fs;
use std::path::PathBuf;

use image::{Rgba, RgbaImage};

use cadmium_sketch::{Area, AreaImage, AreaSpriteSheet, SketchContext, Sprite, SpriteMeta};

fn asset_root(tag: &str) -> PathBuf {
    let root = std::env::temp_dir().join(format!(
        "cadmium_sprite_{tag}_{}",
        std::process::id()
    ));
    let _ = fs::remove_dir_all(&root);
    fs::create_dir_all(&root).unwrap();
    root
}

#[test]
fn invalid_metadata_fails_the_sprite_without_queueing_a_load() {
    let mut ctx = SketchContext::new();
    let meta = SpriteMeta {
        name: "x".to_string(),
        dim: vec![8, 8],
    };
    let sprite = Sprite::new(&mut ctx, "assets", &meta);
    assert!(sprite.is_failed());
    assert_eq!(ctx.registry().preload_len(), 0);

    let meta = SpriteMeta {
        name: "hero.png".to_string(),
        dim: vec![8],
    };
    let sprite = Sprite::new(&mut ctx, "assets", &meta);
    assert!(sprite.is_failed());
    assert_eq!(ctx.registry().preload_len(), 0);
}

#[test]
fn sprites_load_their_image_during_preload() {
    let root = asset_root("load");
    RgbaImage::from_pixel(8, 8, Rgba([10, 20, 30, 255]))
        .save(root.join("hero.png"))
        .unwrap();

    let mut ctx = SketchContext::new();
    let meta = SpriteMeta {
        name: "hero.png".to_string(),
        dim: vec![8, 8],
    };
    let sprite = Sprite::new(&mut ctx, root.to_str().unwrap(), &meta);
    assert_eq!(ctx.registry().preload_len(), 1);
    assert!(!sprite.is_loaded());

    ctx.run_preload();
    assert!(sprite.is_loaded());
    assert_eq!((sprite.width(), sprite.height()), (8, 8));

    let _ = fs::remove_dir_all(root);
}

#[test]
fn a_missing_sprite_image_fails_the_sprite() {
    let root = asset_root("missing");
    let mut ctx = SketchContext::new();
    let meta = SpriteMeta {
        name: "ghost.png".to_string(),
        dim: vec![16, 16],
    };
    let sprite = Sprite::new(&mut ctx, root.to_str().unwrap(), &meta);
    ctx.run_preload();
    assert!(sprite.is_failed());
    // Metadata dimensions survive the failed load.
    assert_eq!((sprite.width(), sprite.height()), (16, 16));

    let _ = fs::remove_dir_all(root);
}

#[test]
fn area_images_load_immediately() {
    let root = asset_root("area");
    let path = root.join("photo.png");
    RgbaImage::from_pixel(6, 4, Rgba([1, 2, 3, 255]))
        .save(&path)
        .unwrap();

    let image = AreaImage::new(Area::new(0.0, 0.0, 6.0, 4.0), path.to_str().unwrap());
    assert!(image.is_loaded());

    let missing = AreaImage::new(
        Area::new(0.0, 0.0, 1.0, 1.0),
        root.join("nope.png").to_str().unwrap(),
    );
    assert!(!missing.is_loaded());

    let _ = fs::remove_dir_all(root);
}

#[test]
fn sprite_sheets_split_and_clamp_their_frame_index() {
    let root = asset_root("sheet");
    let path = root.join("walk.png");
    RgbaImage::from_fn(48, 16, |x, _| Rgba([(x / 16) as u8, 0, 0, 255]))
        .save(&path)
        .unwrap();

    let mut sheet = AreaSpriteSheet::new(
        16,
        Area::new(0.0, 0.0, 16.0, 16.0),
        path.to_str().unwrap(),
    );
    assert!(sheet.is_loaded());
    assert_eq!(sheet.frame_count(), 3);

    sheet.set_sprite(10);
    assert_eq!(sheet.sprite(), 2);
    sheet.set_sprite_t(0.5);
    assert_eq!(sheet.sprite(), 1);
    sheet.set_sprite_t(1.0);
    assert_eq!(sheet.sprite(), 2);
    sheet.set_sprite_t(0.0);
    assert_eq!(sheet.sprite(), 0);

    let _ = fs::remove_dir_all(root);
}

#[test]
fn a_broken_sheet_has_no_frames() {
    let sheet = AreaSpriteSheet::new(
        16,
        Area::new(0.0, 0.0, 16.0, 16.0),
        "/nonexistent/sheet.png",
    );
    assert!(!sheet.is_loaded());
    assert_eq!(sheet.frame_count(), 0);
    assert_eq!(sheet.sprite(), 0);
}
