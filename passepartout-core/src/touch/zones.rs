//! Menu touch bands
//!
//! The panel height is split into [`BAND_COUNT`] equal horizontal bands.
//! Band 0 is the bottom band (the y = 0 edge) and carries the first menu
//! entry; the topmost band always means "back".

use crate::calibration::DisplayPoint;
use crate::traits::Rect;

/// Number of horizontal bands
pub const BAND_COUNT: u8 = 5;

/// Topmost band
pub const BACK_BAND: u8 = BAND_COUNT - 1;

/// Left or right half of the panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Half {
    Left,
    Right,
}

/// Where an accepted touch landed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TouchZone {
    /// Band index, 0 (bottom) to [`BACK_BAND`]
    pub band: u8,
    pub half: Half,
}

impl TouchZone {
    pub const fn new(band: u8, half: Half) -> Self {
        Self { band, half }
    }

    /// Map a calibrated point onto a band
    ///
    /// Returns `None` for points outside the panel.
    pub fn classify(point: DisplayPoint, width: u16, height: u16) -> Option<Self> {
        if width == 0 || height == 0 {
            return None;
        }
        if point.x < 0 || point.y < 0 || point.x >= width as i32 || point.y >= height as i32 {
            return None;
        }

        let band = (point.y as u32 * BAND_COUNT as u32 / height as u32) as u8;
        let half = if (point.x as u32) < width as u32 / 2 {
            Half::Left
        } else {
            Half::Right
        };

        Some(Self { band, half })
    }

    pub fn is_back(&self) -> bool {
        self.band == BACK_BAND
    }
}

/// Pixel area covered by a band
pub fn band_rect(band: u8, width: u16, height: u16) -> Rect {
    let top = band as u32 * height as u32 / BAND_COUNT as u32;
    let bottom = (band as u32 + 1) * height as u32 / BAND_COUNT as u32;
    Rect::new(0, top as u16, width, (bottom - top) as u16)
}
