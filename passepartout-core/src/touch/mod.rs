//! Touch input interpretation
//!
//! Calibrated touches are rate-limited and then mapped onto the menu bands.

pub mod debounce;
pub mod zones;

pub use debounce::Debounce;
pub use zones::{band_rect, Half, TouchZone, BACK_BAND, BAND_COUNT};
