use crate::utils::geom::{Position, Size};

/// Stateless collision tests.
pub struct Collision;

impl Collision {
    /// Point-in-rectangle test over the half-open bounds
    /// `[x, x + w) × [y, y + h)`.
    pub fn point_rect(point: Position, rect_pos: Position, rect_dim: Size) -> bool {
        point.x >= rect_pos.x
            && point.x < rect_pos.x + rect_dim.width
            && point.y >= rect_pos.y
            && point.y < rect_pos.y + rect_dim.height
    }
}
