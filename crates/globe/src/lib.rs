pub mod animator;
pub mod geometry;
pub mod projection;
pub mod renderer;

pub use animator::*;
pub use geometry::*;
pub use projection::*;
pub use renderer::*;
