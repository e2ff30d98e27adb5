//! Fixed five-byte settings layout
//!
//! ```text
//! byte  field
//!   0   brightness level
//!   1   display-time level
//!   2   selection mode (0 random, 1 in order, 2 only current)
//!   3   pinned image index, high byte
//!   4   pinned image index, low byte
//! ```

use crate::selection::SelectionMode;

/// Encoded record length
pub const SETTINGS_LEN: usize = 5;

/// Runtime settings edited through the menus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SettingsRecord {
    pub brightness_level: u8,
    pub display_time_level: u8,
    pub mode: SelectionMode,
    /// Logical index shown in [`SelectionMode::OnlyCurrent`]
    pub pinned_index: u16,
}

impl Default for SettingsRecord {
    /// Brightest level (after clamping), shortest display time, random order
    fn default() -> Self {
        Self {
            brightness_level: u8::MAX,
            display_time_level: 0,
            mode: SelectionMode::Random,
            pinned_index: 0,
        }
    }
}

impl SettingsRecord {
    pub fn to_bytes(&self) -> [u8; SETTINGS_LEN] {
        let [hi, lo] = self.pinned_index.to_be_bytes();
        [
            self.brightness_level,
            self.display_time_level,
            self.mode as u8,
            hi,
            lo,
        ]
    }

    /// Decode whatever prefix of the record is present
    ///
    /// Missing trailing bytes keep their defaults; an unknown mode byte
    /// falls back to random.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut record = Self::default();
        let byte = |i: usize| bytes.get(i).copied();

        if let Some(b) = byte(0) {
            record.brightness_level = b;
        }
        if let Some(t) = byte(1) {
            record.display_time_level = t;
        }
        if let Some(m) = byte(2) {
            record.mode = SelectionMode::from_u8(m).unwrap_or_else(|| {
                warn!("Settings: unknown mode byte {}", m);
                SelectionMode::Random
            });
        }
        if let (Some(hi), Some(lo)) = (byte(3), byte(4)) {
            record.pinned_index = u16::from_be_bytes([hi, lo]);
        }

        record
    }

    /// Clamp every field into the ranges the frame supports
    ///
    /// `image_count` bounds the pinned index; zero leaves it at 0.
    pub fn clamped(self, brightness_levels: u8, display_time_levels: u8, image_count: u16) -> Self {
        let top = |levels: u8| levels.saturating_sub(1);
        Self {
            brightness_level: self.brightness_level.min(top(brightness_levels)),
            display_time_level: self.display_time_level.min(top(display_time_levels)),
            mode: self.mode,
            pinned_index: if self.pinned_index < image_count {
                self.pinned_index
            } else {
                0
            },
        }
    }
}
