//! Image selection policy
//!
//! Decides which image the frame shows next. Random mode never repeats an
//! image before every other one has been shown in the current cycle.

pub mod selector;
pub mod shown;

pub use selector::{Selection, SelectionMode, Selector};
pub use shown::ShownSet;
