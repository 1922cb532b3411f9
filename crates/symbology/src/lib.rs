pub mod domain;
pub mod ramp;

pub use domain::*;
pub use ramp::*;
