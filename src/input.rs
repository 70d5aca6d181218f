use std::collections::{HashMap, HashSet};

use winit::keyboard::{Key, KeyCode};

use crate::time::Clock;

/// Mouse buttons tracked by the input state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Center,
    Right,
}

/// Payload handed to mouse listeners.
#[derive(Debug, Clone, Copy)]
pub struct MouseEvent {
    pub x: f32,
    pub y: f32,
    pub button: Option<MouseButton>,
}

#[derive(Debug, Clone, Copy)]
pub struct WheelEvent {
    pub delta_x: f32,
    pub delta_y: f32,
}

#[derive(Debug, Clone)]
pub struct KeyboardEvent {
    pub key: Key,
    pub key_code: Option<KeyCode>,
    /// Text produced by the key, present on typed dispatches.
    pub text: Option<String>,
}

#[derive(Debug, Clone, Copy)]
pub struct TouchPoint {
    pub id: u64,
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Copy)]
pub struct ResizeEvent {
    pub width: u32,
    pub height: u32,
}

type MouseListener = Box<dyn FnMut(&MouseEvent)>;
type WheelListener = Box<dyn FnMut(&WheelEvent)>;
type KeyListener = Box<dyn FnMut(&KeyboardEvent)>;
type TouchListener = Box<dyn FnMut(&TouchPoint)>;
type ResizeListener = Box<dyn FnMut(&ResizeEvent)>;

/// Listener registries for pointer, keyboard, touch and window events,
/// plus the state snapshot the application keeps current. Listeners are
/// append-only and run in registration order; there is no unsubscribe.
#[derive(Default)]
pub struct Input {
    mouse_dragged: Vec<MouseListener>,
    mouse_moved: Vec<MouseListener>,
    mouse_pressed: Vec<MouseListener>,
    mouse_released: Vec<MouseListener>,
    mouse_clicked: Vec<MouseListener>,
    mouse_wheel: Vec<WheelListener>,
    key_pressed: Vec<KeyListener>,
    key_released: Vec<KeyListener>,
    key_typed: Vec<KeyListener>,
    touch_started: Vec<TouchListener>,
    touch_moved: Vec<TouchListener>,
    touch_ended: Vec<TouchListener>,
    window_resized: Vec<ResizeListener>,

    last_mouse_press_frame: HashMap<MouseButton, u64>,

    mouse_x: f32,
    mouse_y: f32,
    pmouse_x: f32,
    pmouse_y: f32,
    win_mouse_x: f32,
    win_mouse_y: f32,
    mouse_is_pressed: bool,
    mouse_button: Option<MouseButton>,
    touches: Vec<TouchPoint>,
    keys_down: HashSet<KeyCode>,
    chars_down: HashSet<char>,
}

impl Input {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_mouse_dragged_event(&mut self, event: impl FnMut(&MouseEvent) + 'static) {
        self.mouse_dragged.push(Box::new(event));
    }

    pub fn add_mouse_moved_event(&mut self, event: impl FnMut(&MouseEvent) + 'static) {
        self.mouse_moved.push(Box::new(event));
    }

    pub fn add_mouse_pressed_event(&mut self, event: impl FnMut(&MouseEvent) + 'static) {
        self.mouse_pressed.push(Box::new(event));
    }

    pub fn add_mouse_released_event(&mut self, event: impl FnMut(&MouseEvent) + 'static) {
        self.mouse_released.push(Box::new(event));
    }

    pub fn add_mouse_clicked_event(&mut self, event: impl FnMut(&MouseEvent) + 'static) {
        self.mouse_clicked.push(Box::new(event));
    }

    pub fn add_mouse_wheel_event(&mut self, event: impl FnMut(&WheelEvent) + 'static) {
        self.mouse_wheel.push(Box::new(event));
    }

    pub fn add_key_pressed_event(&mut self, event: impl FnMut(&KeyboardEvent) + 'static) {
        self.key_pressed.push(Box::new(event));
    }

    pub fn add_key_released_event(&mut self, event: impl FnMut(&KeyboardEvent) + 'static) {
        self.key_released.push(Box::new(event));
    }

    pub fn add_key_typed_event(&mut self, event: impl FnMut(&KeyboardEvent) + 'static) {
        self.key_typed.push(Box::new(event));
    }

    pub fn add_touch_started_event(&mut self, event: impl FnMut(&TouchPoint) + 'static) {
        self.touch_started.push(Box::new(event));
    }

    pub fn add_touch_moved_event(&mut self, event: impl FnMut(&TouchPoint) + 'static) {
        self.touch_moved.push(Box::new(event));
    }

    pub fn add_touch_ended_event(&mut self, event: impl FnMut(&TouchPoint) + 'static) {
        self.touch_ended.push(Box::new(event));
    }

    pub fn add_window_resized_event(&mut self, event: impl FnMut(&ResizeEvent) + 'static) {
        self.window_resized.push(Box::new(event));
    }

    /* dispatch, driven by the application loop */

    pub fn dispatch_mouse_dragged(&mut self, event: &MouseEvent) {
        for listener in &mut self.mouse_dragged {
            listener(event);
        }
    }

    pub fn dispatch_mouse_moved(&mut self, event: &MouseEvent) {
        for listener in &mut self.mouse_moved {
            listener(event);
        }
    }

    /// Records the pressed button's frame before notifying listeners.
    pub fn dispatch_mouse_pressed(&mut self, frame: u64, event: &MouseEvent) {
        if let Some(button) = event.button {
            self.last_mouse_press_frame.insert(button, frame);
        }
        for listener in &mut self.mouse_pressed {
            listener(event);
        }
    }

    pub fn dispatch_mouse_released(&mut self, event: &MouseEvent) {
        for listener in &mut self.mouse_released {
            listener(event);
        }
    }

    pub fn dispatch_mouse_clicked(&mut self, event: &MouseEvent) {
        for listener in &mut self.mouse_clicked {
            listener(event);
        }
    }

    pub fn dispatch_mouse_wheel(&mut self, event: &WheelEvent) {
        for listener in &mut self.mouse_wheel {
            listener(event);
        }
    }

    pub fn dispatch_key_pressed(&mut self, event: &KeyboardEvent) {
        for listener in &mut self.key_pressed {
            listener(event);
        }
    }

    pub fn dispatch_key_released(&mut self, event: &KeyboardEvent) {
        for listener in &mut self.key_released {
            listener(event);
        }
    }

    pub fn dispatch_key_typed(&mut self, event: &KeyboardEvent) {
        for listener in &mut self.key_typed {
            listener(event);
        }
    }

    pub fn dispatch_touch_started(&mut self, event: &TouchPoint) {
        for listener in &mut self.touch_started {
            listener(event);
        }
    }

    pub fn dispatch_touch_moved(&mut self, event: &TouchPoint) {
        for listener in &mut self.touch_moved {
            listener(event);
        }
    }

    pub fn dispatch_touch_ended(&mut self, event: &TouchPoint) {
        for listener in &mut self.touch_ended {
            listener(event);
        }
    }

    pub fn dispatch_window_resized(&mut self, event: &ResizeEvent) {
        for listener in &mut self.window_resized {
            listener(event);
        }
    }

    /// Frames elapsed since the button was last pressed, or -1 when it
    /// was never pressed.
    pub fn frames_since_last_mouse_press(&self, clock: &Clock, button: MouseButton) -> i64 {
        match self.last_mouse_press_frame.get(&button) {
            Some(frame) => clock.frame_count() as i64 - *frame as i64,
            None => -1,
        }
    }

    /* state snapshot, updated by the application loop */

    pub(crate) fn note_cursor_moved(&mut self, x: f32, y: f32, win_x: f32, win_y: f32) {
        self.mouse_x = x;
        self.mouse_y = y;
        self.win_mouse_x = win_x;
        self.win_mouse_y = win_y;
    }

    pub(crate) fn note_mouse_input(&mut self, button: MouseButton, pressed: bool) {
        self.mouse_is_pressed = pressed;
        if pressed {
            self.mouse_button = Some(button);
        }
    }

    pub(crate) fn note_touch_started(&mut self, touch: TouchPoint) {
        self.touches.retain(|t| t.id != touch.id);
        self.touches.push(touch);
    }

    pub(crate) fn note_touch_moved(&mut self, touch: TouchPoint) {
        match self.touches.iter_mut().find(|t| t.id == touch.id) {
            Some(existing) => *existing = touch,
            None => self.touches.push(touch),
        }
    }

    pub(crate) fn note_touch_ended(&mut self, touch: TouchPoint) {
        self.touches.retain(|t| t.id != touch.id);
    }

    pub(crate) fn note_key_pressed(&mut self, key: &Key, code: Option<KeyCode>) {
        if let Some(code) = code {
            self.keys_down.insert(code);
        }
        if let Key::Character(text) = key {
            if let Some(ch) = text.chars().next() {
                self.chars_down.insert(ch.to_ascii_uppercase());
            }
        }
    }

    pub(crate) fn note_key_released(&mut self, key: &Key, code: Option<KeyCode>) {
        if let Some(code) = code {
            self.keys_down.remove(&code);
        }
        if let Key::Character(text) = key {
            if let Some(ch) = text.chars().next() {
                self.chars_down.remove(&ch.to_ascii_uppercase());
            }
        }
    }

    /// Rolls the previous-frame pointer position; called once per tick.
    pub(crate) fn advance_pointer_frame(&mut self) {
        self.pmouse_x = self.mouse_x;
        self.pmouse_y = self.mouse_y;
    }

    /* getters; all return neutral defaults before any event arrives */

    pub fn mouse_x(&self) -> f32 {
        self.mouse_x
    }

    pub fn mouse_y(&self) -> f32 {
        self.mouse_y
    }

    /// Pointer position of the previous frame.
    pub fn pmouse_x(&self) -> f32 {
        self.pmouse_x
    }

    pub fn pmouse_y(&self) -> f32 {
        self.pmouse_y
    }

    /// Pointer position relative to the window rather than the canvas.
    pub fn win_mouse_x(&self) -> f32 {
        self.win_mouse_x
    }

    pub fn win_mouse_y(&self) -> f32 {
        self.win_mouse_y
    }

    pub fn mouse_is_pressed(&self) -> bool {
        self.mouse_is_pressed
    }

    /// The button pressed most recently, or `None` before any press.
    pub fn mouse_button(&self) -> Option<MouseButton> {
        self.mouse_button
    }

    /// Active touches with their positions and ids.
    pub fn touches(&self) -> &[TouchPoint] {
        &self.touches
    }

    /// Whether the key producing the given character is down.
    pub fn is_key_down(&self, key: char) -> bool {
        self.chars_down.contains(&key.to_ascii_uppercase())
    }

    pub fn is_key_code_down(&self, code: KeyCode) -> bool {
        self.keys_down.contains(&code)
    }
}
