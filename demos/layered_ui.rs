use std::cell::RefCell;
use std::rc::Rc;

use cadmium_sketch::{AnchorMode, Area, Sketch, SketchContext, SketchSettings};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut ctx = SketchContext::new();
    let mut sketch = Sketch::new(&mut ctx, SketchSettings::default());

    // A parented panel: the button area follows the panel when it moves.
    let panel = Rc::new(RefCell::new(Area::new(200.0, 200.0, 400.0, 240.0)));
    let button = Area::with_parent(20.0, 180.0, 120.0, 40.0, panel.clone());

    let hovered = Rc::new(RefCell::new(false));

    let hover_flag = hovered.clone();
    sketch.on_update(move |frame| {
        *hover_flag.borrow_mut() = button.over(frame.ctx.input());
    });

    let draw_panel = panel.clone();
    let draw_hovered = hovered.clone();
    sketch.on_draw(move |frame| {
        frame.graphics.clear();
        frame.graphics.set_fill([0.12, 0.12, 0.16, 1.0]);
        let panel = draw_panel.borrow();
        frame
            .graphics
            .rect(panel.x(), panel.y(), panel.w(), panel.h());

        frame.graphics_ui.clear();
        frame.graphics_ui.set_rect_mode(AnchorMode::Corner);
        let fill = if *draw_hovered.borrow() {
            [0.5, 0.8, 0.5, 1.0]
        } else {
            [0.3, 0.6, 0.3, 1.0]
        };
        frame.graphics_ui.set_fill(fill);
        frame
            .graphics_ui
            .rect(panel.x() + 20.0, panel.y() + 180.0, 120.0, 40.0);
    });

    sketch.run(ctx)?;
    Ok(())
}
