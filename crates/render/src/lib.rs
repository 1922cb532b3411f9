pub mod color;
pub mod commands;

pub use color::*;
pub use commands::*;
