//! Frame configuration
//!
//! Board-agnostic configuration with defaults matching the reference
//! 320x480 frame. Boards may ship their own values serialized with serde.

pub mod types;

pub use types::*;
