pub mod arena;
pub mod bounds;
pub mod easing;
pub mod math;
pub mod time;

// Foundation crate: small, well-tested primitives only.
pub use arena::*;
pub use bounds::*;
pub use easing::*;
pub use time::*;
