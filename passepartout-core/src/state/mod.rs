//! UI state machine
//!
//! The frame's behavior is a function of the current UI state and an
//! event. Transitions are explicit, finite and deterministic; side effects
//! are returned as an [`Action`] for the controller to carry out.

pub mod events;
pub mod machine;

pub use events::{Action, Event, Step};
pub use machine::{Transition, UiState};
