use std::cell::RefCell;
use std::rc::Rc;

use cadmium_sketch::{Area, AreaSpec, Collision, Input, Position, Size};

#[test]
fn unparented_areas_resolve_to_their_own_position() {
    let area = Area::new(10.0, 20.0, 30.0, 40.0);
    assert_eq!(area.x(), area.local_x());
    assert_eq!(area.y(), area.local_y());
    assert_eq!((area.x(), area.y()), (10.0, 20.0));
}

#[test]
fn parented_areas_add_the_parent_chain() {
    let root = Rc::new(RefCell::new(Area::new(100.0, 200.0, 500.0, 500.0)));
    let panel = Rc::new(RefCell::new(Area::with_parent(
        10.0,
        20.0,
        100.0,
        100.0,
        root.clone(),
    )));
    let button = Area::with_parent(1.0, 2.0, 10.0, 10.0, panel.clone());

    assert_eq!((panel.borrow().x(), panel.borrow().y()), (110.0, 220.0));
    assert_eq!((button.x(), button.y()), (111.0, 222.0));
    assert_eq!((button.local_x(), button.local_y()), (1.0, 2.0));

    // The parent link is live: moving the root moves the whole chain.
    root.borrow_mut().scale(2.0);
    assert_eq!((button.x(), button.y()), (211.0, 422.0));
}

#[test]
fn over_uses_half_open_bounds() {
    let area = Area::new(10.0, 10.0, 20.0, 20.0);
    assert!(area.over_point(10.0, 10.0));
    assert!(area.over_point(29.999, 29.999));
    assert!(!area.over_point(30.0, 15.0));
    assert!(!area.over_point(15.0, 30.0));
    assert!(!area.over_point(9.999, 15.0));
}

#[test]
fn over_defaults_to_the_pointer_position() {
    let input = Input::new();
    // The neutral pointer sits at (0, 0).
    assert!(Area::new(0.0, 0.0, 5.0, 5.0).over(&input));
    assert!(!Area::new(1.0, 0.0, 5.0, 5.0).over(&input));
}

#[test]
fn extraction_reads_pos_and_dim_with_zero_defaults() {
    let spec: AreaSpec = serde_json::from_str(r#"{"pos": [3, 4], "dim": [5, 6]}"#).unwrap();
    let area = Area::extract(&spec, None);
    assert_eq!((area.x(), area.y(), area.w(), area.h()), (3.0, 4.0, 5.0, 6.0));

    let empty: AreaSpec = serde_json::from_str("{}").unwrap();
    let area = Area::extract(&empty, None);
    assert_eq!((area.x(), area.y(), area.w(), area.h()), (0.0, 0.0, 0.0, 0.0));
}

#[test]
fn scale_and_resize_mutate_in_place() {
    let mut area = Area::new(1.0, 2.0, 3.0, 4.0);
    area.scale(2.0);
    assert_eq!((area.x(), area.y(), area.w(), area.h()), (2.0, 4.0, 6.0, 8.0));
    area.resize(Some(10.0), None);
    assert_eq!((area.w(), area.h()), (10.0, 8.0));
    area.resize(None, Some(12.0));
    assert_eq!((area.w(), area.h()), (10.0, 12.0));
}

#[test]
fn point_rect_matches_area_semantics() {
    let pos = Position::new(10.0, 10.0);
    let dim = Size::new(20.0, 20.0);
    assert!(Collision::point_rect(Position::new(10.0, 10.0), pos, dim));
    assert!(Collision::point_rect(Position::new(29.0, 29.0), pos, dim));
    assert!(!Collision::point_rect(Position::new(30.0, 15.0), pos, dim));
    assert!(!Collision::point_rect(Position::new(15.0, 30.0), pos, dim));
    assert!(!Collision::point_rect(Position::new(9.0, 15.0), pos, dim));
}
