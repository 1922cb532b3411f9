pub mod engine;
pub mod star;

pub use engine::*;
pub use star::*;
