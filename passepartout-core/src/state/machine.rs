//! State machine definition
//!
//! One handler per state. Storage failures are handled before dispatch
//! because every state routes them to [`UiState::SdError`].

use super::events::{Action, Event, Step};
use crate::selection::SelectionMode;
use crate::touch::{Half, TouchZone, BACK_BAND};

/// UI states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UiState {
    /// Photo on screen, display timer running
    #[default]
    ImageDisplay,
    /// Main menu over the photo
    MenuDisplay,
    /// Brightness level editor
    SetBrightness,
    /// Display-time level editor
    SetDisplayTime,
    /// Selection mode chooser
    SetDisplayMode,
    /// Turn-off delay editor
    SetTurnOff,
    /// Backlight off until touched
    Sleep,
    /// Storage failure; only a restart leaves this state
    SdError,
}

/// Result of processing one event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Transition {
    pub next: UiState,
    pub action: Action,
}

impl Transition {
    pub const fn to(next: UiState) -> Self {
        Self {
            next,
            action: Action::None,
        }
    }

    pub const fn with(next: UiState, action: Action) -> Self {
        Self { next, action }
    }
}

impl UiState {
    /// Check if a menu or editor is on screen
    pub fn is_menu(&self) -> bool {
        matches!(
            self,
            UiState::MenuDisplay
                | UiState::SetBrightness
                | UiState::SetDisplayTime
                | UiState::SetDisplayMode
                | UiState::SetTurnOff
        )
    }

    /// Check if this state edits the persisted settings
    pub fn edits_settings(&self) -> bool {
        matches!(
            self,
            UiState::SetBrightness | UiState::SetDisplayTime | UiState::SetDisplayMode
        )
    }

    /// Process an event and return the next state plus its side effect
    pub fn transition(self, event: Event) -> Transition {
        if event == Event::StorageFailed {
            return Transition::to(UiState::SdError);
        }

        match self {
            UiState::ImageDisplay => image_display(event),
            UiState::MenuDisplay => menu_display(event),
            UiState::SetBrightness => level_editor(self, event, Action::AdjustBrightness),
            UiState::SetDisplayTime => level_editor(self, event, Action::AdjustDisplayTime),
            UiState::SetDisplayMode => set_display_mode(event),
            UiState::SetTurnOff => set_turn_off(event),
            UiState::Sleep => sleep(event),
            UiState::SdError => sd_error(event),
        }
    }
}

fn image_display(event: Event) -> Transition {
    match event {
        Event::Touch(_) => Transition::to(UiState::MenuDisplay),
        Event::DisplayElapsed => Transition::with(UiState::ImageDisplay, Action::AdvanceImage),
        Event::TurnOffReached => Transition::to(UiState::Sleep),
        Event::StorageFailed => Transition::to(UiState::SdError),
    }
}

fn menu_display(event: Event) -> Transition {
    let Event::Touch(zone) = event else {
        return Transition::to(UiState::MenuDisplay);
    };

    let next = match zone.band {
        0 => UiState::SetBrightness,
        1 => UiState::SetDisplayTime,
        2 => UiState::SetDisplayMode,
        3 => UiState::SetTurnOff,
        _ => UiState::ImageDisplay,
    };
    Transition::to(next)
}

/// Upper two bands raise the level, lower two lower it
fn level_step(zone: TouchZone) -> Option<Step> {
    match zone.band {
        0 | 1 => Some(Step::Down),
        2 | 3 => Some(Step::Up),
        _ => None,
    }
}

/// Back to the photo, writing the record if the editor changed it
fn leave_editor(state: UiState) -> Transition {
    if state.edits_settings() {
        Transition::with(UiState::ImageDisplay, Action::PersistSettings)
    } else {
        Transition::to(UiState::ImageDisplay)
    }
}

fn level_editor(state: UiState, event: Event, adjust: fn(Step) -> Action) -> Transition {
    let Event::Touch(zone) = event else {
        return Transition::to(state);
    };

    if zone.is_back() {
        return leave_editor(state);
    }
    match level_step(zone) {
        Some(step) => Transition::with(state, adjust(step)),
        None => Transition::to(state),
    }
}

fn set_display_mode(event: Event) -> Transition {
    let Event::Touch(zone) = event else {
        return Transition::to(UiState::SetDisplayMode);
    };

    let mode = match zone.band {
        0 => SelectionMode::Random,
        1 => SelectionMode::InOrder,
        2 => SelectionMode::OnlyCurrent,
        BACK_BAND => return leave_editor(UiState::SetDisplayMode),
        _ => return Transition::to(UiState::SetDisplayMode),
    };
    Transition::with(UiState::SetDisplayMode, Action::SelectMode(mode))
}

/// Back band: left half discards, right half arms the turn-off
fn set_turn_off(event: Event) -> Transition {
    let Event::Touch(zone) = event else {
        return Transition::to(UiState::SetTurnOff);
    };

    if zone.is_back() {
        return match zone.half {
            Half::Left => leave_editor(UiState::SetTurnOff),
            Half::Right => Transition::with(UiState::ImageDisplay, Action::ScheduleTurnOff),
        };
    }
    match level_step(zone) {
        Some(step) => Transition::with(UiState::SetTurnOff, Action::AdjustTurnOff(step)),
        None => Transition::to(UiState::SetTurnOff),
    }
}

fn sleep(event: Event) -> Transition {
    match event {
        Event::Touch(_) => Transition::with(UiState::ImageDisplay, Action::Wake),
        _ => Transition::to(UiState::Sleep),
    }
}

fn sd_error(event: Event) -> Transition {
    match event {
        Event::Touch(_) => Transition::with(UiState::SdError, Action::Restart),
        _ => Transition::to(UiState::SdError),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(band: u8) -> Event {
        Event::Touch(TouchZone::new(band, Half::Left))
    }

    fn touch_right(band: u8) -> Event {
        Event::Touch(TouchZone::new(band, Half::Right))
    }

    #[test]
    fn test_initial_state() {
        assert_eq!(UiState::default(), UiState::ImageDisplay);
    }

    #[test]
    fn test_any_touch_opens_menu() {
        for band in 0..=BACK_BAND {
            assert_eq!(
                UiState::ImageDisplay.transition(touch(band)),
                Transition::to(UiState::MenuDisplay)
            );
        }
    }

    #[test]
    fn test_display_timer_advances() {
        assert_eq!(
            UiState::ImageDisplay.transition(Event::DisplayElapsed),
            Transition::with(UiState::ImageDisplay, Action::AdvanceImage)
        );
        // Timers do nothing while a menu is open
        assert_eq!(
            UiState::MenuDisplay.transition(Event::DisplayElapsed),
            Transition::to(UiState::MenuDisplay)
        );
    }

    #[test]
    fn test_menu_bands() {
        let menu = UiState::MenuDisplay;
        assert_eq!(menu.transition(touch(0)).next, UiState::SetBrightness);
        assert_eq!(menu.transition(touch(1)).next, UiState::SetDisplayTime);
        assert_eq!(menu.transition(touch(2)).next, UiState::SetDisplayMode);
        assert_eq!(menu.transition(touch(3)).next, UiState::SetTurnOff);
        assert_eq!(menu.transition(touch(4)).next, UiState::ImageDisplay);
    }

    #[test]
    fn test_level_editors() {
        for state in [UiState::SetBrightness, UiState::SetDisplayTime] {
            let up = state.transition(touch(3));
            let down = state.transition(touch(0));
            assert_eq!(up.next, state);
            assert_eq!(down.next, state);
            assert!(matches!(
                up.action,
                Action::AdjustBrightness(Step::Up) | Action::AdjustDisplayTime(Step::Up)
            ));
            assert!(matches!(
                down.action,
                Action::AdjustBrightness(Step::Down) | Action::AdjustDisplayTime(Step::Down)
            ));
        }
    }

    #[test]
    fn test_settings_persisted_on_exit() {
        for state in [
            UiState::SetBrightness,
            UiState::SetDisplayTime,
            UiState::SetDisplayMode,
        ] {
            assert!(state.edits_settings());
            assert_eq!(
                state.transition(touch(BACK_BAND)),
                Transition::with(UiState::ImageDisplay, Action::PersistSettings)
            );
        }
    }

    #[test]
    fn test_turn_off_cancel_does_not_persist() {
        assert!(!UiState::SetTurnOff.edits_settings());
        assert_eq!(
            UiState::SetTurnOff.transition(touch(BACK_BAND)),
            Transition::to(UiState::ImageDisplay)
        );
    }

    #[test]
    fn test_mode_selection() {
        let state = UiState::SetDisplayMode;
        assert_eq!(
            state.transition(touch(0)).action,
            Action::SelectMode(SelectionMode::Random)
        );
        assert_eq!(
            state.transition(touch(1)).action,
            Action::SelectMode(SelectionMode::InOrder)
        );
        assert_eq!(
            state.transition(touch(2)),
            Transition::with(state, Action::SelectMode(SelectionMode::OnlyCurrent))
        );
        assert_eq!(state.transition(touch(3)), Transition::to(state));
    }

    #[test]
    fn test_turn_off_menu() {
        let state = UiState::SetTurnOff;
        assert_eq!(
            state.transition(touch(2)).action,
            Action::AdjustTurnOff(Step::Up)
        );
        assert_eq!(
            state.transition(touch(BACK_BAND)),
            Transition::to(UiState::ImageDisplay)
        );
        assert_eq!(
            state.transition(touch_right(BACK_BAND)),
            Transition::with(UiState::ImageDisplay, Action::ScheduleTurnOff)
        );
    }

    #[test]
    fn test_sleep_flow() {
        let sleeping = UiState::ImageDisplay.transition(Event::TurnOffReached);
        assert_eq!(sleeping, Transition::to(UiState::Sleep));
        assert_eq!(
            UiState::Sleep.transition(touch(2)),
            Transition::with(UiState::ImageDisplay, Action::Wake)
        );
        assert_eq!(
            UiState::Sleep.transition(Event::DisplayElapsed).next,
            UiState::Sleep
        );
    }

    #[test]
    fn test_storage_failure_from_any_state() {
        let states = [
            UiState::ImageDisplay,
            UiState::MenuDisplay,
            UiState::SetBrightness,
            UiState::SetDisplayTime,
            UiState::SetDisplayMode,
            UiState::SetTurnOff,
            UiState::Sleep,
            UiState::SdError,
        ];

        for state in states {
            assert_eq!(
                state.transition(Event::StorageFailed),
                Transition::to(UiState::SdError)
            );
        }
    }

    #[test]
    fn test_sd_error_is_terminal() {
        assert_eq!(
            UiState::SdError.transition(touch(0)),
            Transition::with(UiState::SdError, Action::Restart)
        );
        assert_eq!(
            UiState::SdError.transition(Event::TurnOffReached).next,
            UiState::SdError
        );
    }
}
