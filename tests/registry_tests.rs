use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

use cadmium_sketch::{ResourceRegistry, SketchContext};

#[test]
fn requests_resolve_in_registration_order() {
    let mut registry = ResourceRegistry::new();
    let order = Rc::new(RefCell::new(Vec::new()));

    for name in ["first", "second", "third"] {
        let order = order.clone();
        registry.add_preload(name, move |_root| {
            order.borrow_mut().push(name);
            Ok(())
        });
    }

    let outcomes = registry.resolve_all(Path::new("./res"));
    assert_eq!(*order.borrow(), vec!["first", "second", "third"]);
    assert_eq!(outcomes.len(), 3);
    assert!(outcomes.iter().all(|o| o.is_ok()));
    assert_eq!(outcomes[0].label, "first");
    assert_eq!(outcomes[2].label, "third");
}

#[test]
fn failures_are_reported_per_request_and_do_not_stop_the_drain() {
    let mut registry = ResourceRegistry::new();
    let ran = Rc::new(RefCell::new(0));

    registry.add_preload("broken", |_root| anyhow::bail!("file missing"));
    let counter = ran.clone();
    registry.add_preload("fine", move |_root| {
        *counter.borrow_mut() += 1;
        Ok(())
    });

    let outcomes = registry.resolve_all(Path::new("./res"));
    assert!(!outcomes[0].is_ok());
    assert!(outcomes[1].is_ok());
    assert_eq!(*ran.borrow(), 1);
}

#[test]
fn the_queue_drains_exactly_once() {
    let mut registry = ResourceRegistry::new();
    registry.add_preload("only", |_root| Ok(()));
    assert_eq!(registry.preload_len(), 1);

    assert_eq!(registry.resolve_all(Path::new("./res")).len(), 1);
    assert_eq!(registry.preload_len(), 0);
    assert!(registry.resolve_all(Path::new("./res")).is_empty());
}

#[test]
fn requests_see_the_resources_root() {
    let mut registry = ResourceRegistry::new();
    let seen = Rc::new(RefCell::new(None));
    let sink = seen.clone();
    registry.add_preload("probe", move |root| {
        *sink.borrow_mut() = Some(root.to_path_buf());
        Ok(())
    });
    registry.resolve_all(Path::new("/tmp/assets"));
    assert_eq!(seen.borrow().as_deref(), Some(Path::new("/tmp/assets")));
}

#[test]
fn context_preload_runs_once_and_advances_the_phase() {
    let mut ctx = SketchContext::new();
    assert!(!ctx.is_after_preload());
    let count = Rc::new(RefCell::new(0));
    let counter = count.clone();
    ctx.registry_mut().add_preload("tick", move |_root| {
        *counter.borrow_mut() += 1;
        Ok(())
    });

    ctx.run_preload();
    assert!(ctx.is_after_preload());
    assert!(!ctx.is_after_setup());
    assert_eq!(*count.borrow(), 1);

    // A second run has nothing left to do.
    assert!(ctx.run_preload().is_empty());
    assert_eq!(*count.borrow(), 1);
}

#[test]
fn setup_events_drain_once() {
    let mut ctx = SketchContext::new();
    let count = Rc::new(RefCell::new(0));
    let counter = count.clone();
    ctx.registry_mut().add_setup(move || {
        *counter.borrow_mut() += 1;
    });

    for event in ctx.registry_mut().drain_setup() {
        event();
    }
    assert_eq!(*count.borrow(), 1);
    assert!(ctx.registry_mut().drain_setup().is_empty());
}
