//! Events that trigger state transitions and the actions they request

use crate::selection::SelectionMode;
use crate::touch::TouchZone;

/// Events that can trigger state transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    /// Debounced touch inside the panel
    Touch(TouchZone),
    /// Display duration elapsed, or a redisplay was forced
    DisplayElapsed,
    /// Scheduled turn-off time reached
    TurnOffReached,
    /// Image source reported a storage failure
    StorageFailed,
}

/// Level adjustment direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Step {
    Up,
    Down,
}

/// Side effect requested by a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Action {
    None,
    /// Run the selection policy and load the chosen image
    AdvanceImage,
    /// Change the brightness level (clamped)
    AdjustBrightness(Step),
    /// Change the display-time level (clamped)
    AdjustDisplayTime(Step),
    /// Switch the selection mode
    SelectMode(SelectionMode),
    /// Change the turn-off delay level (wrapping)
    AdjustTurnOff(Step),
    /// Arm the turn-off deadline at now + delay
    ScheduleTurnOff,
    /// Write the settings record
    PersistSettings,
    /// Bring the backlight back up after sleep
    Wake,
    /// Ask the bootstrap layer for a device restart
    Restart,
}
