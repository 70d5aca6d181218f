use std::cell::RefCell;
use std::rc::Rc;

use uuid::Uuid;

use crate::registry::LoadState;
use crate::utils::geom::{Position, Rectangle};

/// Shared handle to a deferred-loaded raster image.
pub(crate) type SharedImage = Rc<RefCell<LoadState<image::RgbaImage>>>;

/// How a destination rectangle is anchored to its position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorMode {
    Corner,
    Center,
}

/// One queued paint operation, resolved by the renderer when the layer
/// is flushed.
pub(crate) enum PaintCommand {
    Image {
        key: Uuid,
        image: SharedImage,
        dest: Rectangle,
    },
    Rect {
        dest: Rectangle,
        color: [f32; 4],
    },
    Clear,
}

/// CPU side of one render layer: a paint-command queue plus the
/// transform stack popped and re-pushed by the draw tick. The renderer
/// owns the matching GPU target.
pub struct Layer {
    label: &'static str,
    smooth: bool,
    transforms: Vec<Position>,
    queue: Vec<PaintCommand>,
    fill: [f32; 4],
    rect_mode: AnchorMode,
    image_mode: AnchorMode,
}

impl Layer {
    pub(crate) fn new(label: &'static str, smooth: bool) -> Self {
        Self {
            label,
            smooth,
            transforms: vec![Position::default()],
            queue: Vec::new(),
            fill: [1.0, 1.0, 1.0, 1.0],
            rect_mode: AnchorMode::Corner,
            image_mode: AnchorMode::Corner,
        }
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Whether this layer samples with linear filtering. The pixel layer
    /// is created non-smooth for crisp scaling.
    pub fn is_smooth(&self) -> bool {
        self.smooth
    }

    /// Saves the current transform; a matching `pop` restores it.
    pub fn push(&mut self) {
        let top = self.offset();
        self.transforms.push(top);
    }

    /// Discards the transform saved by the matching `push`. The base
    /// transform is never popped.
    pub fn pop(&mut self) {
        if self.transforms.len() > 1 {
            self.transforms.pop();
        }
    }

    pub fn translate(&mut self, dx: f32, dy: f32) {
        if let Some(top) = self.transforms.last_mut() {
            top.x += dx;
            top.y += dy;
        }
    }

    fn offset(&self) -> Position {
        self.transforms.last().copied().unwrap_or_default()
    }

    /// Depth of the transform stack, including the base transform.
    pub fn transform_depth(&self) -> usize {
        self.transforms.len()
    }

    pub(crate) fn reset_transforms(&mut self) {
        self.transforms.clear();
        self.transforms.push(Position::default());
    }

    pub fn set_fill(&mut self, rgba: [f32; 4]) {
        self.fill = rgba;
    }

    pub fn set_rect_mode(&mut self, mode: AnchorMode) {
        self.rect_mode = mode;
    }

    pub fn set_image_mode(&mut self, mode: AnchorMode) {
        self.image_mode = mode;
    }

    /// Queues a clear of the layer's contents.
    pub fn clear(&mut self) {
        self.queue.push(PaintCommand::Clear);
    }

    /// Queues a filled rectangle using the current fill and rect mode.
    pub fn rect(&mut self, x: f32, y: f32, w: f32, h: f32) {
        let dest = self.anchored(x, y, w, h, self.rect_mode);
        self.queue.push(PaintCommand::Rect {
            dest,
            color: self.fill,
        });
    }

    pub(crate) fn queue_image(&mut self, key: Uuid, image: SharedImage, dest: Rectangle) {
        let dest = self.anchored(dest.x, dest.y, dest.width, dest.height, self.image_mode);
        self.queue.push(PaintCommand::Image { key, image, dest });
    }

    fn anchored(&self, x: f32, y: f32, w: f32, h: f32, mode: AnchorMode) -> Rectangle {
        let offset = self.offset();
        let (x, y) = match mode {
            AnchorMode::Corner => (x, y),
            AnchorMode::Center => (x - w * 0.5, y - h * 0.5),
        };
        Rectangle::new(x + offset.x, y + offset.y, w, h)
    }

    pub(crate) fn take_queue(&mut self) -> Vec<PaintCommand> {
        std::mem::take(&mut self.queue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transform_stack_offsets_queued_rects() {
        let mut layer = Layer::new("graphics", true);
        layer.push();
        layer.translate(10.0, 20.0);
        layer.rect(1.0, 2.0, 3.0, 4.0);
        layer.pop();
        layer.rect(1.0, 2.0, 3.0, 4.0);

        let queue = layer.take_queue();
        match &queue[0] {
            PaintCommand::Rect { dest, .. } => {
                assert_eq!((dest.x, dest.y), (11.0, 22.0));
            }
            _ => panic!("expected rect"),
        }
        match &queue[1] {
            PaintCommand::Rect { dest, .. } => {
                assert_eq!((dest.x, dest.y), (1.0, 2.0));
            }
            _ => panic!("expected rect"),
        }
    }

    #[test]
    fn base_transform_survives_extra_pops() {
        let mut layer = Layer::new("pixel", false);
        layer.pop();
        layer.pop();
        assert_eq!(layer.transform_depth(), 1);
        layer.translate(5.0, 0.0);
        layer.rect(0.0, 0.0, 1.0, 1.0);
        match &layer.take_queue()[0] {
            PaintCommand::Rect { dest, .. } => assert_eq!(dest.x, 5.0),
            _ => panic!("expected rect"),
        }
    }

    #[test]
    fn center_mode_recenters_rects() {
        let mut layer = Layer::new("graphics", true);
        layer.set_rect_mode(AnchorMode::Center);
        layer.rect(10.0, 10.0, 4.0, 6.0);
        match &layer.take_queue()[0] {
            PaintCommand::Rect { dest, .. } => {
                assert_eq!((dest.x, dest.y), (8.0, 7.0));
            }
            _ => panic!("expected rect"),
        }
    }
}
