use std::cell::RefCell;
use std::rc::Rc;

use cadmium_sketch::{Sketch, SketchContext, SketchSettings};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut ctx = SketchContext::new();
    let mut sketch = Sketch::new(
        &mut ctx,
        SketchSettings {
            width: Some(640),
            height: Some(480),
            ..Default::default()
        },
    );

    let pos = Rc::new(RefCell::new((100.0f32, 100.0f32)));
    let vel = Rc::new(RefCell::new((180.0f32, 140.0f32)));

    let update_pos = pos.clone();
    let update_vel = vel.clone();
    sketch.on_update(move |frame| {
        let dt = frame.ctx.clock().delta_time_secs() as f32;
        let mut pos = update_pos.borrow_mut();
        let mut vel = update_vel.borrow_mut();
        pos.0 += vel.0 * dt;
        pos.1 += vel.1 * dt;
        if pos.0 < 0.0 || pos.0 > frame.width as f32 - 40.0 {
            vel.0 = -vel.0;
        }
        if pos.1 < 0.0 || pos.1 > frame.height as f32 - 40.0 {
            vel.1 = -vel.1;
        }
    });

    let draw_pos = pos.clone();
    sketch.on_draw(move |frame| {
        frame.settings.auto_clear_canvas = true;
        frame.graphics.clear();
        let (x, y) = *draw_pos.borrow();
        frame.graphics.set_fill([0.9, 0.4, 0.2, 1.0]);
        frame.graphics.rect(x, y, 40.0, 40.0);
        frame.graphics.set_fill([0.2, 0.5, 0.9, 1.0]);
        frame.graphics.rect(x + 60.0, y, 40.0, 40.0);
    });

    sketch.run(ctx)?;
    Ok(())
}
