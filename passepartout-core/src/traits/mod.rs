//! Collaborator traits
//!
//! These traits define the interface between the frame logic and the
//! panel, touch controller and entropy source of a specific board.

pub mod display;
pub mod random;
pub mod touch;

pub use display::{color, DisplayError, FrameDisplay, Rect};
pub use random::{RandomSource, XorShift32};
pub use touch::{RawSample, TouchPanel};
