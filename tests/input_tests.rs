use std::cell::RefCell;
use std::rc::Rc;

use cadmium_sketch::input::{Input, MouseButton, MouseEvent};
use cadmium_sketch::time::Clock;

fn press_event(button: MouseButton) -> MouseEvent {
    MouseEvent {
        x: 5.0,
        y: 6.0,
        button: Some(button),
    }
}

#[test]
fn listeners_run_in_registration_order() {
    let mut input = Input::new();
    let order = Rc::new(RefCell::new(Vec::new()));

    for tag in [1, 2, 3] {
        let order = order.clone();
        input.add_mouse_pressed_event(move |_event| order.borrow_mut().push(tag));
    }
    input.dispatch_mouse_pressed(0, &press_event(MouseButton::Left));
    assert_eq!(*order.borrow(), vec![1, 2, 3]);
}

#[test]
fn every_registry_is_independent() {
    let mut input = Input::new();
    let hits = Rc::new(RefCell::new(0));
    let sink = hits.clone();
    input.add_mouse_released_event(move |_event| *sink.borrow_mut() += 1);

    input.dispatch_mouse_pressed(0, &press_event(MouseButton::Left));
    assert_eq!(*hits.borrow(), 0);
    input.dispatch_mouse_released(&press_event(MouseButton::Left));
    assert_eq!(*hits.borrow(), 1);
}

#[test]
fn press_frames_are_tracked_per_button() {
    let mut input = Input::new();
    let mut clock = Clock::new();

    assert_eq!(
        input.frames_since_last_mouse_press(&clock, MouseButton::Left),
        -1
    );

    for _ in 0..3 {
        clock.update(16.0);
    }
    input.dispatch_mouse_pressed(clock.frame_count(), &press_event(MouseButton::Left));
    clock.update(16.0);
    clock.update(16.0);

    assert_eq!(
        input.frames_since_last_mouse_press(&clock, MouseButton::Left),
        2
    );
    assert_eq!(
        input.frames_since_last_mouse_press(&clock, MouseButton::Right),
        -1
    );
}

#[test]
fn state_getters_return_neutral_defaults() {
    let input = Input::new();
    assert_eq!(input.mouse_x(), 0.0);
    assert_eq!(input.mouse_y(), 0.0);
    assert_eq!(input.pmouse_x(), 0.0);
    assert_eq!(input.win_mouse_x(), 0.0);
    assert!(!input.mouse_is_pressed());
    assert_eq!(input.mouse_button(), None);
    assert!(input.touches().is_empty());
    assert!(!input.is_key_down('a'));
}

#[test]
fn dispatch_carries_the_event_payload() {
    let mut input = Input::new();
    let seen = Rc::new(RefCell::new(None));
    let sink = seen.clone();
    input.add_mouse_moved_event(move |event| {
        *sink.borrow_mut() = Some((event.x, event.y));
    });
    input.dispatch_mouse_moved(&MouseEvent {
        x: 12.5,
        y: -3.0,
        button: None,
    });
    assert_eq!(*seen.borrow(), Some((12.5, -3.0)));
}
