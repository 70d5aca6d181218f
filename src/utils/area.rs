use std::cell::RefCell;
use std::rc::Rc;

use serde::Deserialize;

use crate::input::Input;
use crate::layer::{AnchorMode, Layer};

/// JSON shape an area is extracted from: `{ "pos": [x, y], "dim": [w, h] }`.
/// Missing fields default to zero.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct AreaSpec {
    #[serde(default)]
    pub pos: [f32; 2],
    #[serde(default)]
    pub dim: [f32; 2],
}

/// A rectangle positioned relative to an optional parent area. Absolute
/// coordinates resolve through the parent chain. The parent is fixed at
/// construction, so a chain can never loop back onto itself.
#[derive(Debug, Default)]
pub struct Area {
    x: f32,
    y: f32,
    w: f32,
    h: f32,
    parent: Option<Rc<RefCell<Area>>>,
}

impl Area {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            x,
            y,
            w,
            h,
            parent: None,
        }
    }

    pub fn with_parent(x: f32, y: f32, w: f32, h: f32, parent: Rc<RefCell<Area>>) -> Self {
        Self {
            x,
            y,
            w,
            h,
            parent: Some(parent),
        }
    }

    /// Builds an area from extracted JSON data.
    pub fn extract(spec: &AreaSpec, parent: Option<Rc<RefCell<Area>>>) -> Self {
        Self {
            x: spec.pos[0],
            y: spec.pos[1],
            w: spec.dim[0],
            h: spec.dim[1],
            parent,
        }
    }

    /// Absolute X position, resolved through the parent chain.
    pub fn x(&self) -> f32 {
        self.x + self.parent.as_ref().map_or(0.0, |p| p.borrow().x())
    }

    /// Absolute Y position, resolved through the parent chain.
    pub fn y(&self) -> f32 {
        self.y + self.parent.as_ref().map_or(0.0, |p| p.borrow().y())
    }

    /// X position relative to the parent.
    pub fn local_x(&self) -> f32 {
        self.x
    }

    /// Y position relative to the parent.
    pub fn local_y(&self) -> f32 {
        self.y
    }

    pub fn w(&self) -> f32 {
        self.w
    }

    pub fn h(&self) -> f32 {
        self.h
    }

    /// Scales position and size in place.
    pub fn scale(&mut self, value: f32) -> &mut Self {
        self.x *= value;
        self.y *= value;
        self.w *= value;
        self.h *= value;
        self
    }

    /// Replaces either dimension, keeping the current value for `None`.
    pub fn resize(&mut self, w: Option<f32>, h: Option<f32>) -> &mut Self {
        if let Some(w) = w {
            self.w = w;
        }
        if let Some(h) = h {
            self.h = h;
        }
        self
    }

    /// Half-open containment test against the resolved position: a point
    /// exactly on the right or bottom edge is outside.
    pub fn over_point(&self, px: f32, py: f32) -> bool {
        let (x, y) = (self.x(), self.y());
        px >= x && px < x + self.w && py >= y && py < y + self.h
    }

    /// `over_point` against the current pointer position.
    pub fn over(&self, input: &Input) -> bool {
        self.over_point(input.mouse_x(), input.mouse_y())
    }

    /// Queues this area's rectangle on the given layer.
    pub fn draw(&self, layer: &mut Layer) {
        layer.set_rect_mode(AnchorMode::Corner);
        layer.rect(self.x(), self.y(), self.w, self.h);
    }
}
