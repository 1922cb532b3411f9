pub mod catalog;
pub mod panel;
pub mod scroll;
pub mod sequencer;

pub use catalog::*;
pub use panel::*;
pub use scroll::*;
pub use sequencer::*;
