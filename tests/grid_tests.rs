use cadmium_sketch::Grid2D;

#[test]
fn cells_are_initialized_by_the_generator() {
    let grid = Grid2D::new(3, 2, |x, y| x + y);
    assert_eq!(*grid.get_cell(0, 0), 0);
    assert_eq!(*grid.get_cell(2, 1), 3);
    assert_eq!(grid.width(), 3);
    assert_eq!(grid.height(), 2);
}

#[test]
fn set_cell_replaces_a_value() {
    let mut grid = Grid2D::new(2, 2, |_, _| 0);
    grid.set_cell(1, 0, 7);
    assert_eq!(*grid.get_cell(1, 0), 7);
    assert_eq!(*grid.get_cell(0, 0), 0);
}

#[test]
fn in_grid_rejects_out_of_range_coordinates() {
    let grid = Grid2D::new(3, 2, |_, _| 0);
    assert!(grid.in_grid(0, 0));
    assert!(grid.in_grid(2, 1));
    assert!(!grid.in_grid(-1, 0));
    assert!(!grid.in_grid(3, 0));
    assert!(!grid.in_grid(0, 2));
}

#[test]
#[should_panic(expected = "outside grid")]
fn out_of_range_get_panics() {
    let grid = Grid2D::new(3, 2, |_, _| 0);
    grid.get_cell(3, 0);
}

#[test]
#[should_panic(expected = "outside grid")]
fn out_of_range_set_panics() {
    let mut grid = Grid2D::new(3, 2, |_, _| 0);
    grid.set_cell(0, -1, 1);
}

#[test]
fn grids_can_hold_non_copy_values() {
    let mut grid = Grid2D::new(2, 1, |x, y| format!("{x},{y}"));
    assert_eq!(grid.get_cell(1, 0), "1,0");
    grid.set_cell(1, 0, "replaced".to_string());
    assert_eq!(grid.get_cell(1, 0), "replaced");
}
