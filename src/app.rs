use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, MouseScrollDelta, TouchPhase, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::keyboard::PhysicalKey;
use winit::window::{Window, WindowId};

use crate::context::SketchContext;
use crate::input::{KeyboardEvent, MouseButton, MouseEvent, ResizeEvent, TouchPoint, WheelEvent};
use crate::renderer::Renderer;
use crate::sketch::Sketch;

/// Drives a sketch over the winit event loop: resolves the preload
/// queue, brings up the window and renderer, runs setup, translates
/// window events into input dispatches and ticks the draw loop on every
/// redraw.
struct SketchApp {
    ctx: SketchContext,
    sketch: Sketch,
    renderer: Option<Renderer>,
    window: Option<Arc<Window>>,
    last_frame: Instant,
}

fn map_mouse_button(button: winit::event::MouseButton) -> Option<MouseButton> {
    match button {
        winit::event::MouseButton::Left => Some(MouseButton::Left),
        winit::event::MouseButton::Middle => Some(MouseButton::Center),
        winit::event::MouseButton::Right => Some(MouseButton::Right),
        _ => None,
    }
}

impl SketchApp {
    fn mouse_event(&self) -> MouseEvent {
        let input = self.ctx.input();
        MouseEvent {
            x: input.mouse_x(),
            y: input.mouse_y(),
            button: input.mouse_button(),
        }
    }
}

impl ApplicationHandler for SketchApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        // Preload runs before any window or GPU state exists.
        let outcomes = self.ctx.run_preload();
        let failed = outcomes.iter().filter(|outcome| !outcome.is_ok()).count();
        if failed > 0 {
            log::warn!("{failed} resource load(s) failed during preload.");
        }

        let attributes = Window::default_attributes()
            .with_title("cadmium sketch")
            .with_inner_size(PhysicalSize::new(self.sketch.width(), self.sketch.height()));
        let window = match event_loop.create_window(attributes) {
            Ok(window) => Arc::new(window),
            Err(err) => {
                log::error!("Failed to create window: {err}");
                event_loop.exit();
                return;
            }
        };

        match Renderer::new(window.clone(), self.sketch.width(), self.sketch.height()) {
            Ok(mut renderer) => {
                self.sketch.attach_window(window.clone());
                self.sketch.run_setup(&mut self.ctx, &mut renderer);
                self.renderer = Some(renderer);
            }
            Err(err) => {
                log::error!("Failed to initialize renderer: {err:#}");
                event_loop.exit();
                return;
            }
        }

        self.last_frame = Instant::now();
        window.request_redraw();
        self.window = Some(window);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                let (x, y) = (position.x as f32, position.y as f32);
                let dragging = self.ctx.input().mouse_is_pressed();
                self.ctx.input_mut().note_cursor_moved(x, y, x, y);
                let event = self.mouse_event();
                if dragging {
                    self.ctx.input_mut().dispatch_mouse_dragged(&event);
                } else {
                    self.ctx.input_mut().dispatch_mouse_moved(&event);
                }
            }
            WindowEvent::MouseInput { state, button, .. } => {
                let Some(button) = map_mouse_button(button) else {
                    return;
                };
                let pressed = state == ElementState::Pressed;
                self.ctx.input_mut().note_mouse_input(button, pressed);
                let mut event = self.mouse_event();
                event.button = Some(button);
                if pressed {
                    let frame = self.ctx.clock().frame_count();
                    self.ctx.input_mut().dispatch_mouse_pressed(frame, &event);
                } else {
                    self.ctx.input_mut().dispatch_mouse_released(&event);
                    self.ctx.input_mut().dispatch_mouse_clicked(&event);
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let (delta_x, delta_y) = match delta {
                    MouseScrollDelta::LineDelta(x, y) => (x, y),
                    MouseScrollDelta::PixelDelta(position) => {
                        (position.x as f32, position.y as f32)
                    }
                };
                self.ctx
                    .input_mut()
                    .dispatch_mouse_wheel(&WheelEvent { delta_x, delta_y });
            }
            WindowEvent::KeyboardInput { event, .. } => {
                let key_code = match event.physical_key {
                    PhysicalKey::Code(code) => Some(code),
                    _ => None,
                };
                let payload = KeyboardEvent {
                    key: event.logical_key.clone(),
                    key_code,
                    text: event.text.as_ref().map(|text| text.to_string()),
                };
                if event.state.is_pressed() {
                    self.ctx
                        .input_mut()
                        .note_key_pressed(&event.logical_key, key_code);
                    self.ctx.input_mut().dispatch_key_pressed(&payload);
                    if payload.text.is_some() {
                        self.ctx.input_mut().dispatch_key_typed(&payload);
                    }
                } else {
                    self.ctx
                        .input_mut()
                        .note_key_released(&event.logical_key, key_code);
                    self.ctx.input_mut().dispatch_key_released(&payload);
                }
            }
            WindowEvent::Touch(touch) => {
                let point = TouchPoint {
                    id: touch.id,
                    x: touch.location.x as f32,
                    y: touch.location.y as f32,
                };
                match touch.phase {
                    TouchPhase::Started => {
                        self.ctx.input_mut().note_touch_started(point);
                        self.ctx.input_mut().dispatch_touch_started(&point);
                    }
                    TouchPhase::Moved => {
                        self.ctx.input_mut().note_touch_moved(point);
                        self.ctx.input_mut().dispatch_touch_moved(&point);
                    }
                    TouchPhase::Ended | TouchPhase::Cancelled => {
                        self.ctx.input_mut().note_touch_ended(point);
                        self.ctx.input_mut().dispatch_touch_ended(&point);
                    }
                }
            }
            WindowEvent::Resized(size) => {
                if let Some(renderer) = &mut self.renderer {
                    renderer.resize_surface(size.width, size.height);
                }
                self.ctx.input_mut().dispatch_window_resized(&ResizeEvent {
                    width: size.width,
                    height: size.height,
                });
            }
            WindowEvent::RedrawRequested => {
                if let Some(target) = self.ctx.clock().target_frame_rate() {
                    if target > 0.0 {
                        let budget = Duration::from_secs_f64(1.0 / target);
                        let elapsed = self.last_frame.elapsed();
                        if elapsed < budget {
                            std::thread::sleep(budget - elapsed);
                        }
                    }
                }
                let now = Instant::now();
                let raw_delta_ms = (now - self.last_frame).as_secs_f64() * 1000.0;
                self.last_frame = now;

                if let Some(renderer) = &mut self.renderer {
                    self.sketch.draw_tick(&mut self.ctx, renderer, raw_delta_ms);
                }
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            _ => (),
        }
    }
}

/// Runs a startable sketch to completion on a fresh event loop.
pub fn run_sketch(ctx: SketchContext, sketch: Sketch) -> Result<()> {
    let event_loop = EventLoop::new()?;
    let mut app = SketchApp {
        ctx,
        sketch,
        renderer: None,
        window: None,
        last_frame: Instant::now(),
    };
    event_loop.run_app(&mut app)?;
    Ok(())
}
