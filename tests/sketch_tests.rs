use cadmium_sketch::{Font, Sketch, SketchContext, SketchSettings};

#[test]
fn construction_applies_defaults_and_queues_the_default_font() {
    let mut ctx = SketchContext::new();
    let sketch = Sketch::new(&mut ctx, SketchSettings::default());
    assert!(sketch.can_start());
    assert_eq!((sketch.width(), sketch.height()), (800, 800));
    let font = sketch.default_font().expect("default font");
    assert_eq!(font.path(), "Roboto/Roboto-Regular.ttf");
    assert_eq!(ctx.registry().preload_len(), 1);
}

#[test]
fn invalid_dimensions_fall_back_to_defaults() {
    let mut ctx = SketchContext::new();
    let sketch = Sketch::new(
        &mut ctx,
        SketchSettings {
            width: Some(0),
            height: Some(600),
            ..Default::default()
        },
    );
    assert_eq!((sketch.width(), sketch.height()), (800, 600));
}

#[test]
fn a_second_sketch_on_the_same_context_is_inert() {
    let mut ctx = SketchContext::new();
    let first = Sketch::new(&mut ctx, SketchSettings::default());
    assert!(first.can_start());
    assert_eq!(ctx.registry().preload_len(), 1);

    let second = Sketch::new(&mut ctx, SketchSettings::default());
    assert!(!second.can_start());
    assert!(second.default_font().is_none());
    // The rejected instance queued nothing.
    assert_eq!(ctx.registry().preload_len(), 1);
}

#[test]
fn hide_and_show_are_idempotent_and_drive_the_time_scale() {
    let mut ctx = SketchContext::new();
    let mut sketch = Sketch::new(&mut ctx, SketchSettings::default());

    assert!(!sketch.is_hidden());
    assert!(sketch.hide(&mut ctx));
    assert!(sketch.is_hidden());
    assert_eq!(ctx.clock().time_scale(), 0.0);
    assert!(!sketch.hide(&mut ctx));

    assert!(sketch.show(&mut ctx));
    assert!(!sketch.is_hidden());
    assert_eq!(ctx.clock().time_scale(), 1.0);
    assert!(!sketch.show(&mut ctx));
}

#[test]
fn resize_is_deferred_until_the_next_tick() {
    let mut ctx = SketchContext::new();
    let mut sketch = Sketch::new(&mut ctx, SketchSettings::default());
    assert!(sketch.pending_resize().is_none());
    sketch.resize(1024, 768);
    assert_eq!(sketch.pending_resize(), Some((1024, 768)));
    // The recorded size does not touch the live dimensions yet.
    assert_eq!((sketch.width(), sketch.height()), (800, 800));
}

#[test]
fn fonts_created_after_preload_never_load() {
    let mut ctx = SketchContext::new();
    ctx.run_preload();
    let font = Font::new(&mut ctx, "Late/Late-Regular.ttf");
    assert!(!font.is_loaded());
    assert_eq!(ctx.registry().preload_len(), 0);
}

#[test]
fn a_missing_font_file_fails_its_load_outcome() {
    let mut ctx = SketchContext::with_resources_root("/nonexistent/res");
    let font = Font::new(&mut ctx, "Missing/Missing-Regular.ttf");
    let outcomes = ctx.run_preload();
    assert_eq!(outcomes.len(), 1);
    assert!(!outcomes[0].is_ok());
    assert!(!font.is_loaded());
}
