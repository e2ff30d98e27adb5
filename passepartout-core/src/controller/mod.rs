//! Frame controller
//!
//! Owns every collaborator and runs one cooperative control loop: each
//! [`FrameController::tick`] checks the medium, then handles at most one
//! pending touch or one image advance. Photo loads are split into pixel
//! portions with a touch check between portions, so a touch during a
//! multi-hundred-millisecond load changes state right away.
//!
//! Menu backgrounds and the intro are loaded in one blocking pass.

pub mod menu;
pub mod stats;

use alloc::vec;
use alloc::vec::Vec;
use core::fmt::Write as _;

use passepartout_hal::{Clock, DelayNs, FileSystem};

use crate::calibration::{load_calibration, CalibrationTransform};
use crate::config::{ConfigError, ConfigPath, FrameConfig};
use crate::image::{ImageSource, StorageError};
use crate::selection::{Selection, SelectionMode, Selector};
use crate::settings::{SettingsRecord, SettingsStore};
use crate::state::{Action, Event, Step, Transition, UiState};
use crate::touch::{Debounce, TouchZone};
use crate::traits::{color, FrameDisplay, RandomSource, Rect, TouchPanel};

pub use stats::{FrameStats, LOAD_HISTORY};

/// Outcome of one loop iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LoopStatus {
    Running,
    /// The user acknowledged a storage failure; reset the device
    RestartRequested,
}

/// Picture frame control core
pub struct FrameController<F, D, T, C, Y, R>
where
    F: FileSystem,
    D: FrameDisplay,
    T: TouchPanel,
    C: Clock,
    Y: DelayNs,
    R: RandomSource,
{
    config: FrameConfig,
    /// `None` when the medium could not be opened at all
    source: Option<ImageSource<F>>,
    display: D,
    touch: T,
    clock: C,
    delay: Y,
    rng: R,
    transform: CalibrationTransform,
    store: SettingsStore,
    settings: SettingsRecord,
    selector: Selector,
    debounce: Debounce,
    state: UiState,
    turn_off_level: u8,
    /// Armed turn-off as (armed at, delay) in ms
    turn_off: Option<(u32, u32)>,
    last_display_ms: u32,
    force_display: bool,
    restart_requested: bool,
    stats: FrameStats,
    buffer: Vec<u16>,
}

impl<F, D, T, C, Y, R> FrameController<F, D, T, C, Y, R>
where
    F: FileSystem,
    D: FrameDisplay,
    T: TouchPanel,
    C: Clock,
    Y: DelayNs,
    R: RandomSource,
{
    /// Build the controller from the board's collaborators
    ///
    /// Loads the touch calibration and the settings record, opens the image
    /// directory and counts its images. A storage failure here does not
    /// fail construction: the controller starts in [`UiState::SdError`].
    pub fn new(
        config: FrameConfig,
        mut fs: F,
        display: D,
        touch: T,
        clock: C,
        delay: Y,
        rng: R,
    ) -> Result<Self, ConfigError> {
        let (width, height) = (display.width(), display.height());
        config.validate(width, height)?;

        let store = SettingsStore::new(&config.settings_file).map_err(|_| ConfigError::PathTooLong)?;
        let transform = resolve_calibration(&mut fs, &config, width, height);

        let stored = match store.load(&mut fs) {
            Ok(record) => record,
            Err(e) => {
                warn!("Settings unavailable ({:?}), using defaults", e);
                SettingsRecord::default()
            }
        };

        let (source, total) = match ImageSource::open(fs, &config.image_dir, width, height) {
            Ok(mut source) => match source.count_images() {
                Ok(total) => (Some(source), total),
                Err(_) => (Some(source), 0),
            },
            Err(e) => {
                error!("Image directory unavailable: {:?}", e);
                (None, 0)
            }
        };

        let state = match &source {
            Some(source) if source.error().is_none() => UiState::ImageDisplay,
            _ => UiState::SdError,
        };

        let settings = stored.clamped(config.brightness_levels, config.display_time_levels(), total);
        info!(
            "Frame: {} images, brightness {}, time level {}, mode {:?}",
            total,
            settings.brightness_level,
            settings.display_time_level,
            settings.mode
        );

        Ok(Self {
            selector: Selector::new(total, settings.mode),
            debounce: Debounce::new(config.touch_delay_ms),
            buffer: vec![0; config.portion_pixels as usize],
            config,
            source,
            display,
            touch,
            clock,
            delay,
            rng,
            transform,
            store,
            settings,
            state,
            turn_off_level: 0,
            turn_off: None,
            last_display_ms: 0,
            force_display: true,
            restart_requested: false,
            stats: FrameStats::default(),
        })
    }

    /// Show the intro screen, then switch to the stored brightness
    ///
    /// Blocks for the configured intro time.
    pub fn start(&mut self) {
        if self.state == UiState::SdError {
            self.enter(UiState::SdError, UiState::SdError);
            return;
        }

        self.display.set_default_backlight(u8::MAX);
        self.display.restore_backlight();

        let intro = self.config.assets.intro.clone();
        self.load_asset(&intro);
        if self.state == UiState::SdError {
            return;
        }
        self.delay.delay_ms(self.config.intro_ms);

        self.apply_brightness();
        self.force_display = true;
        self.last_display_ms = self.clock.now_ms();
    }

    /// Run one loop iteration
    pub fn tick(&mut self) -> LoopStatus {
        if self.state != UiState::SdError {
            let health = match self.source.as_mut() {
                Some(source) => source.check(),
                None => Err(StorageError::Unmounted),
            };
            if let Err(e) = health {
                self.storage_failed(e);
                return self.status();
            }
        }

        if let Some(zone) = self.poll_touch() {
            self.dispatch(Event::Touch(zone));
            return self.status();
        }

        if self.state == UiState::ImageDisplay {
            if self.turn_off_due() {
                self.dispatch(Event::TurnOffReached);
            } else if self.display_due() {
                self.dispatch(Event::DisplayElapsed);
            }
        }

        self.status()
    }

    pub fn state(&self) -> UiState {
        self.state
    }

    pub fn settings(&self) -> &SettingsRecord {
        &self.settings
    }

    pub fn stats(&self) -> &FrameStats {
        &self.stats
    }

    pub fn selector(&self) -> &Selector {
        &self.selector
    }

    pub fn transform(&self) -> &CalibrationTransform {
        &self.transform
    }

    /// Armed turn-off deadline (ms)
    pub fn turn_off_at(&self) -> Option<u32> {
        self.turn_off.map(|(armed_at, delay)| armed_at.wrapping_add(delay))
    }

    /// Logical index of the image on screen
    pub fn current_index(&self) -> Option<u16> {
        self.source.as_ref().map(|s| s.index())
    }

    fn status(&self) -> LoopStatus {
        if self.restart_requested {
            LoopStatus::RestartRequested
        } else {
            LoopStatus::Running
        }
    }

    fn turn_off_due(&self) -> bool {
        match self.turn_off {
            Some((armed_at, delay)) => self.clock.elapsed_since(armed_at) >= delay,
            None => false,
        }
    }

    fn display_due(&self) -> bool {
        if self.force_display {
            return true;
        }
        if self.selector.mode() == SelectionMode::OnlyCurrent {
            return false;
        }
        let duration = self.config.display_time_ms(self.settings.display_time_level);
        self.clock.elapsed_since(self.last_display_ms) >= duration
    }

    /// Read the panel, debounce and classify
    fn poll_touch(&mut self) -> Option<TouchZone> {
        let sample = self.touch.sample()?;
        let now = self.clock.now_ms();
        if !self.debounce.accept(now) {
            trace!("Touch ignored (debounce)");
            return None;
        }

        let point = self.transform.translate(sample.into());
        let zone = TouchZone::classify(point, self.display.width(), self.display.height());
        if zone.is_none() {
            debug!("Touch outside panel: {}, {}", point.x, point.y);
        }
        zone
    }

    fn dispatch(&mut self, event: Event) {
        let from = self.state;
        let Transition { next, action } = from.transition(event);

        if next != from {
            info!("UI: {:?} -> {:?} on {:?}", from, next, event);
        }
        self.state = next;
        self.apply(action);

        // The action may have failed into SdError already
        if next != from && self.state == next {
            self.enter(next, from);
        }
    }

    fn storage_failed(&mut self, e: StorageError) {
        error!("Storage failure: {:?}", e);
        self.dispatch(Event::StorageFailed);
    }

    /// Entry actions
    fn enter(&mut self, state: UiState, from: UiState) {
        match state {
            UiState::ImageDisplay => {
                if from.is_menu() {
                    self.force_display = true;
                }
            }
            UiState::MenuDisplay => {
                let background = self.config.assets.menu.clone();
                if self.load_asset(&background) {
                    let total = self.selector.total();
                    if let Err(e) = menu::render_main(&mut self.display, &self.stats, total) {
                        warn!("Menu render failed: {:?}", e);
                    }
                }
            }
            UiState::SetBrightness => self.render_editor(&self.config.assets.brightness.clone()),
            UiState::SetDisplayTime => self.render_editor(&self.config.assets.display_time.clone()),
            UiState::SetDisplayMode => self.render_editor(&self.config.assets.mode.clone()),
            UiState::SetTurnOff => self.render_editor(&self.config.assets.turn_off.clone()),
            UiState::Sleep => {
                self.turn_off = None;
                let from_level = self.display.default_backlight();
                self.ramp(from_level, 0);
            }
            UiState::SdError => {
                self.display.set_default_backlight(u8::MAX);
                self.display.restore_backlight();
                if let Err(e) = menu::render_error(&mut self.display) {
                    warn!("Error screen render failed: {:?}", e);
                }
            }
        }
    }

    fn apply(&mut self, action: Action) {
        match action {
            Action::None => {}
            Action::AdvanceImage => self.show_next_image(),
            Action::AdjustBrightness(step) => {
                self.settings.brightness_level =
                    step_clamped(self.settings.brightness_level, step, self.config.brightness_levels);
                self.apply_brightness();
                self.render_overlay();
            }
            Action::AdjustDisplayTime(step) => {
                self.settings.display_time_level = step_clamped(
                    self.settings.display_time_level,
                    step,
                    self.config.display_time_levels(),
                );
                self.render_overlay();
            }
            Action::SelectMode(mode) => {
                self.selector.set_mode(mode);
                self.settings.mode = mode;
                if mode == SelectionMode::OnlyCurrent {
                    if let Some(index) = self.current_index() {
                        self.settings.pinned_index = index;
                    }
                }
                self.render_overlay();
            }
            Action::AdjustTurnOff(step) => {
                self.turn_off_level =
                    step_wrapping(self.turn_off_level, step, self.config.turn_off_levels());
                self.render_overlay();
            }
            Action::ScheduleTurnOff => {
                let delay = self.config.turn_off_delay_ms(self.turn_off_level);
                info!("Turn-off scheduled in {} ms", delay);
                self.turn_off = Some((self.clock.now_ms(), delay));
            }
            Action::PersistSettings => self.persist_settings(),
            Action::Wake => {
                let to_level = self.display.default_backlight();
                self.ramp(0, to_level);
                self.display.restore_backlight();
            }
            Action::Restart => {
                warn!("Restart requested");
                self.restart_requested = true;
            }
        }
    }

    fn persist_settings(&mut self) {
        let Some(source) = self.source.as_mut() else {
            return;
        };
        // Storage health is checked every tick; a failed write is only logged
        if let Err(e) = self.store.save(source.file_system(), &self.settings) {
            warn!("Settings save failed: {:?}", e);
        }
    }

    fn apply_brightness(&mut self) {
        let level = self.config.backlight_for(self.settings.brightness_level);
        self.display.set_default_backlight(level);
        self.display.restore_backlight();
    }

    /// Step the backlight between two levels, blocking
    fn ramp(&mut self, from: u8, to: u8) {
        let steps = self.config.ramp_steps.max(1) as i32;
        let (from, to) = (from as i32, to as i32);
        for i in 1..=steps {
            let level = from + (to - from) * i / steps;
            self.display.set_backlight(level as u8);
            self.delay.delay_ms(self.config.ramp_step_ms);
        }
    }

    /// Run the selection policy and load the chosen photo
    fn show_next_image(&mut self) {
        self.force_display = false;
        self.last_display_ms = self.clock.now_ms();

        let pinned = self.settings.pinned_index;
        let selection = self.selector.choose(&mut self.rng, pinned);
        let Some(source) = self.source.as_mut() else {
            return;
        };

        let outcome = match selection {
            Selection::Next => source.next().map(|skipped| {
                self.stats.record_invalid(skipped);
                true
            }),
            Selection::Index(n) => source.to_index(n),
        };

        match outcome {
            Ok(true) => {
                debug!("Showing image {}", source.index());
                self.load_photo();
            }
            Ok(false) => {
                warn!("Selected image {:?} is not valid", selection);
                self.stats.record_invalid(1);
            }
            Err(e) => self.storage_failed(e),
        }
    }

    /// Chunked, interruptible full-frame load
    fn load_photo(&mut self) {
        let started = self.clock.now_ms();
        let (width, height) = (self.display.width(), self.display.height());
        if let Err(e) = self.display.open_window(Rect::new(0, 0, width, height)) {
            warn!("Window open failed: {:?}", e);
        }

        let mut remaining = self.display.size();
        while remaining > 0 {
            let n = remaining.min(self.buffer.len() as u32) as usize;
            if !self.transfer_portion(n) {
                return;
            }
            remaining -= n as u32;

            if remaining > 0 {
                if let Some(zone) = self.poll_touch() {
                    debug!("Load interrupted with {} px left", remaining);
                    self.dispatch(Event::Touch(zone));
                    return;
                }
            }
        }

        let elapsed = self.clock.elapsed_since(started);
        self.stats.record_load(elapsed);
        self.last_display_ms = self.clock.now_ms();
        debug!("Frame loaded in {} ms", elapsed);
    }

    /// Blocking load of a fixed asset
    ///
    /// A missing or invalid asset leaves a black screen and returns
    /// `true` so overlays are still drawn; `false` means storage failed.
    fn load_asset(&mut self, path: &ConfigPath) -> bool {
        let Some(source) = self.source.as_mut() else {
            return false;
        };

        match source.to_name(path) {
            Ok(true) => {}
            Ok(false) => {
                warn!("Asset {} is not a valid image", path.as_str());
                if let Err(e) = self.display.clear(color::BLACK) {
                    warn!("Clear failed: {:?}", e);
                }
                return true;
            }
            Err(e) => {
                self.storage_failed(e);
                return false;
            }
        }

        let (width, height) = (self.display.width(), self.display.height());
        if let Err(e) = self.display.open_window(Rect::new(0, 0, width, height)) {
            warn!("Window open failed: {:?}", e);
        }

        let mut remaining = self.display.size();
        while remaining > 0 {
            let n = remaining.min(self.buffer.len() as u32) as usize;
            if !self.transfer_portion(n) {
                return false;
            }
            remaining -= n as u32;
        }
        true
    }

    /// Move `n` pixels from the source to the panel
    fn transfer_portion(&mut self, n: usize) -> bool {
        let outcome = match self.source.as_mut() {
            Some(source) => source.read_portion(&mut self.buffer[..n]),
            None => Err(StorageError::NotOpen),
        };
        if let Err(e) = outcome {
            self.storage_failed(e);
            return false;
        }

        if let Err(e) = self.display.write_buffer(&self.buffer[..n]) {
            warn!("Portion write failed: {:?}", e);
        }
        true
    }

    fn render_editor(&mut self, background: &ConfigPath) {
        if self.load_asset(background) {
            self.render_overlay();
        }
    }

    /// Redraw the overlay of the current editor
    fn render_overlay(&mut self) {
        let result = match self.state {
            UiState::SetBrightness => {
                let level = self.settings.brightness_level;
                let mut value = heapless::String::<8>::new();
                let _ = write!(value, "{}", level + 1);
                menu::render_level(&mut self.display, level, self.config.brightness_levels, &value)
            }
            UiState::SetDisplayTime => {
                let level = self.settings.display_time_level;
                let seconds = self.config.display_time_ms(level) / 1000;
                let value = menu::format_duration(seconds as u16);
                menu::render_level(&mut self.display, level, self.config.display_time_levels(), &value)
            }
            UiState::SetDisplayMode => menu::render_modes(&mut self.display, self.settings.mode),
            UiState::SetTurnOff => {
                let minutes = self.config.turn_off_delay_ms(self.turn_off_level) / 60_000;
                menu::render_turn_off(
                    &mut self.display,
                    self.turn_off_level,
                    self.config.turn_off_levels(),
                    minutes as u16,
                )
            }
            _ => Ok(()),
        };
        if let Err(e) = result {
            warn!("Overlay render failed: {:?}", e);
        }
    }
}

/// Load the stored sweep result, falling back to the configured constants
fn resolve_calibration<F: FileSystem>(
    fs: &mut F,
    config: &FrameConfig,
    width: u16,
    height: u16,
) -> CalibrationTransform {
    match load_calibration(fs, &config.calibration_file) {
        Ok(transform) => {
            info!("Using stored touch calibration");
            return transform;
        }
        Err(e) => debug!("No stored calibration: {:?}", e),
    }

    match config.touch.transform(width, height) {
        Ok(transform) => transform,
        Err(e) => {
            warn!("Touch constants unusable ({:?}), using identity", e);
            CalibrationTransform::IDENTITY
        }
    }
}

/// Move one level, clamped to `[0, levels - 1]`
fn step_clamped(level: u8, step: Step, levels: u8) -> u8 {
    let top = levels.saturating_sub(1);
    match step {
        Step::Up => level.saturating_add(1).min(top),
        Step::Down => level.saturating_sub(1).min(top),
    }
}

/// Move one level, wrapping around the table
fn step_wrapping(level: u8, step: Step, levels: u8) -> u8 {
    if levels == 0 {
        return 0;
    }
    match step {
        Step::Up => (level + 1) % levels,
        Step::Down => (level + levels - 1) % levels,
    }
}
