pub mod rows;
pub mod source;
pub mod store;

pub use rows::*;
pub use source::*;
pub use store::*;
