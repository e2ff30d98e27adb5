//! Configuration type definitions

use heapless::{String, Vec};
use serde::{Deserialize, Serialize};

use crate::calibration::{CalibrationError, CalibrationTransform};

/// Maximum path length in the configuration
pub const MAX_CONFIG_PATH: usize = 64;

/// Maximum entries in a level table
pub const MAX_LEVELS: usize = 16;

/// Largest supported pixel portion
pub const MAX_PORTION_PIXELS: u16 = 1024;

/// Path stored in the configuration
pub type ConfigPath = String<MAX_CONFIG_PATH>;

/// Configuration validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// A required path is empty
    EmptyPath,
    /// A path does not fit the medium's path buffer
    PathTooLong,
    /// Portion size is zero or above [`MAX_PORTION_PIXELS`]
    PortionSize,
    /// No brightness levels
    NoBrightnessLevels,
    /// Display-time table is empty
    NoDisplayTimes,
    /// Turn-off delay table is empty
    NoTurnOffDelays,
    /// Backlight ramp has no steps
    RampSteps,
    /// Touch constants do not define a transform
    Calibration(CalibrationError),
}

impl From<CalibrationError> for ConfigError {
    fn from(e: CalibrationError) -> Self {
        ConfigError::Calibration(e)
    }
}

/// Fixed asset images
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetPaths {
    pub intro: ConfigPath,
    pub menu: ConfigPath,
    pub brightness: ConfigPath,
    pub display_time: ConfigPath,
    pub mode: ConfigPath,
    pub turn_off: ConfigPath,
}

impl Default for AssetPaths {
    fn default() -> Self {
        Self {
            intro: config_path("/intro.bmp"),
            menu: config_path("/menu.bmp"),
            brightness: config_path("/brightness.bmp"),
            display_time: config_path("/disptime.bmp"),
            mode: config_path("/mode.bmp"),
            turn_off: config_path("/turnoff.bmp"),
        }
    }
}

impl AssetPaths {
    fn all(&self) -> [&ConfigPath; 6] {
        [
            &self.intro,
            &self.menu,
            &self.brightness,
            &self.display_time,
            &self.mode,
            &self.turn_off,
        ]
    }
}

/// Raw touch readings at the panel edges
///
/// Used when no calibration record exists on the card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TouchCalibrationConfig {
    /// Swap raw x/y (panel mounted rotated)
    pub axis_swap: bool,
    /// Raw value at pixel column 0
    pub x_begin: u16,
    /// Raw value at the last pixel column
    pub x_end: u16,
    /// Raw value at pixel row 0
    pub y_begin: u16,
    /// Raw value at the last pixel row
    pub y_end: u16,
}

impl Default for TouchCalibrationConfig {
    fn default() -> Self {
        Self {
            axis_swap: true,
            x_begin: 555,
            x_end: 3551,
            y_begin: 3783,
            y_end: 392,
        }
    }
}

impl TouchCalibrationConfig {
    pub fn transform(&self, width: u16, height: u16) -> Result<CalibrationTransform, CalibrationError> {
        CalibrationTransform::from_ranges(
            self.axis_swap,
            self.x_begin,
            self.x_end,
            self.y_begin,
            self.y_end,
            width,
            height,
        )
    }
}

/// Complete frame configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameConfig {
    /// Directory enumerated for photos
    pub image_dir: ConfigPath,
    pub assets: AssetPaths,
    /// Five-byte settings record
    pub settings_file: ConfigPath,
    /// Stored touch calibration
    pub calibration_file: ConfigPath,
    /// Pixels per load portion
    pub portion_pixels: u16,
    /// Debounce window (ms)
    pub touch_delay_ms: u32,
    /// Intro screen time (ms)
    pub intro_ms: u32,
    /// Number of brightness levels
    pub brightness_levels: u8,
    /// Display duration per level (s)
    pub display_times_s: Vec<u16, MAX_LEVELS>,
    /// Turn-off delay per level (min)
    pub turn_off_delays_min: Vec<u16, MAX_LEVELS>,
    /// Backlight ramp steps for sleep and wake
    pub ramp_steps: u8,
    /// Time per ramp step (ms)
    pub ramp_step_ms: u32,
    pub touch: TouchCalibrationConfig,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            image_dir: config_path("/images"),
            assets: AssetPaths::default(),
            settings_file: config_path("/settings.txt"),
            calibration_file: config_path("/touch.cal"),
            portion_pixels: 40,
            touch_delay_ms: 500,
            intro_ms: 5000,
            brightness_levels: 10,
            display_times_s: level_table(&[5, 10, 30, 60, 300, 900, 1800, 3600]),
            turn_off_delays_min: level_table(&[15, 30, 60, 120, 240, 480]),
            ramp_steps: 10,
            ramp_step_ms: 30,
            touch: TouchCalibrationConfig::default(),
        }
    }
}

impl FrameConfig {
    /// Check the configuration for values the controller cannot run with
    pub fn validate(&self, width: u16, height: u16) -> Result<(), ConfigError> {
        let paths = [&self.image_dir, &self.settings_file, &self.calibration_file];
        if paths
            .into_iter()
            .chain(self.assets.all())
            .any(|p| p.is_empty())
        {
            return Err(ConfigError::EmptyPath);
        }
        if self.portion_pixels == 0 || self.portion_pixels > MAX_PORTION_PIXELS {
            return Err(ConfigError::PortionSize);
        }
        if self.brightness_levels == 0 {
            return Err(ConfigError::NoBrightnessLevels);
        }
        if self.display_times_s.is_empty() {
            return Err(ConfigError::NoDisplayTimes);
        }
        if self.turn_off_delays_min.is_empty() {
            return Err(ConfigError::NoTurnOffDelays);
        }
        if self.ramp_steps == 0 {
            return Err(ConfigError::RampSteps);
        }
        self.touch.transform(width, height)?;
        Ok(())
    }

    pub fn display_time_levels(&self) -> u8 {
        self.display_times_s.len() as u8
    }

    pub fn turn_off_levels(&self) -> u8 {
        self.turn_off_delays_min.len() as u8
    }

    /// Display duration for a level (ms), clamped to the table
    pub fn display_time_ms(&self, level: u8) -> u32 {
        table_entry(&self.display_times_s, level) as u32 * 1000
    }

    /// Turn-off delay for a level (ms), clamped to the table
    pub fn turn_off_delay_ms(&self, level: u8) -> u32 {
        table_entry(&self.turn_off_delays_min, level) as u32 * 60_000
    }

    /// Backlight PWM value for a brightness level
    ///
    /// The top level is full brightness; level 0 stays visible.
    pub fn backlight_for(&self, level: u8) -> u8 {
        let levels = self.brightness_levels.max(1) as u32;
        let level = (level as u32).min(levels - 1);
        ((level + 1) * 255 / levels) as u8
    }
}

fn table_entry(table: &[u16], level: u8) -> u16 {
    let last = table.len().saturating_sub(1);
    table.get((level as usize).min(last)).copied().unwrap_or(0)
}

fn config_path(value: &str) -> ConfigPath {
    let mut path = ConfigPath::new();
    // Defaults are short literals
    let _ = path.push_str(value);
    path
}

fn level_table(values: &[u16]) -> Vec<u16, MAX_LEVELS> {
    values.iter().copied().take(MAX_LEVELS).collect()
}
