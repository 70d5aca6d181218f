pub mod app;
pub mod context;
pub mod draw_settings;
pub mod font;
pub mod image_asset;
pub mod input;
pub mod layer;
pub mod registry;
pub mod renderer;
pub mod shader {
    pub mod layer;
    pub mod program;
}
pub mod sketch;
pub mod time;
pub mod utils {
    pub mod area;
    pub mod area_image;
    pub mod collision;
    pub mod geom;
    pub mod grid;
    pub mod json_asset;
    pub mod sprite;
}
pub mod validation;

pub use context::{LifecyclePhase, SketchContext};
pub use draw_settings::DrawSettings;
pub use font::Font;
pub use image_asset::ImageAsset;
pub use input::{Input, MouseButton};
pub use layer::{AnchorMode, Layer};
pub use registry::{LoadOutcome, LoadState, ResourceRegistry};
pub use shader::layer::ShaderLayer;
pub use shader::program::Shader;
pub use sketch::{FrameView, Sketch, SketchSettings};
pub use time::Clock;
pub use utils::area::{Area, AreaSpec};
pub use utils::area_image::{AreaImage, AreaSpriteSheet};
pub use utils::collision::Collision;
pub use utils::geom::{Position, Rectangle, Size};
pub use utils::grid::Grid2D;
pub use utils::json_asset::JsonAsset;
pub use utils::sprite::{Sprite, SpriteMeta};
