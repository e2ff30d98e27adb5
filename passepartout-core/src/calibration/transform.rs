//! Per-axis affine touch transform

use serde::{Deserialize, Serialize};

use crate::traits::RawSample;

/// Panel axis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Axis {
    X,
    Y,
}

/// Calibration failures
///
/// Both are recoverable: the caller re-prompts for samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CalibrationError {
    /// The two raw samples coincide on this axis, so the scale is undefined
    Degenerate { axis: Axis },
    /// A sweep target was never sampled
    Incomplete,
}

/// Raw touch-controller coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RawPoint {
    pub x: i32,
    pub y: i32,
}

impl RawPoint {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Exchange x and y (panels mounted rotated by 90°)
    pub const fn swapped(self) -> Self {
        Self {
            x: self.y,
            y: self.x,
        }
    }
}

impl From<RawSample> for RawPoint {
    fn from(sample: RawSample) -> Self {
        Self {
            x: sample.x as i32,
            y: sample.y as i32,
        }
    }
}

/// Display pixel coordinates
///
/// Not clamped: values outside the panel mean the touch landed outside
/// the active area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DisplayPoint {
    pub x: i32,
    pub y: i32,
}

impl DisplayPoint {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// `display = raw * scale + offset` for one axis
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AxisMap {
    pub scale: f32,
    pub offset: f32,
}

impl AxisMap {
    pub const IDENTITY: Self = Self {
        scale: 1.0,
        offset: 0.0,
    };

    /// Line through `(raw1, known1)` and `(raw2, known2)`
    pub fn through(
        axis: Axis,
        raw1: f32,
        known1: f32,
        raw2: f32,
        known2: f32,
    ) -> Result<Self, CalibrationError> {
        let span = raw2 - raw1;
        if span == 0.0 {
            return Err(CalibrationError::Degenerate { axis });
        }

        let scale = (known2 - known1) / span;
        Ok(Self {
            scale,
            offset: known1 - scale * raw1,
        })
    }

    pub fn apply(&self, raw: f32) -> f32 {
        raw * self.scale + self.offset
    }
}

/// Immutable raw-to-display transform
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CalibrationTransform {
    /// Swap raw x/y before mapping
    pub axis_swap: bool,
    pub x: AxisMap,
    pub y: AxisMap,
}

impl CalibrationTransform {
    /// Raw units are display pixels already
    pub const IDENTITY: Self = Self {
        axis_swap: false,
        x: AxisMap::IDENTITY,
        y: AxisMap::IDENTITY,
    };

    /// Two-point calibration
    ///
    /// Raw points go through the axis swap first, so the resulting
    /// transform maps `raw1` onto `known1` and `raw2` onto `known2` when
    /// fed to [`CalibrationTransform::translate`].
    pub fn calibrate(
        axis_swap: bool,
        raw1: RawPoint,
        known1: DisplayPoint,
        raw2: RawPoint,
        known2: DisplayPoint,
    ) -> Result<Self, CalibrationError> {
        let (raw1, raw2) = if axis_swap {
            (raw1.swapped(), raw2.swapped())
        } else {
            (raw1, raw2)
        };

        let x = AxisMap::through(
            Axis::X,
            raw1.x as f32,
            known1.x as f32,
            raw2.x as f32,
            known2.x as f32,
        )?;
        let y = AxisMap::through(
            Axis::Y,
            raw1.y as f32,
            known1.y as f32,
            raw2.y as f32,
            known2.y as f32,
        )?;

        Ok(Self::from_axes(axis_swap, x, y))
    }

    /// Transform from previously measured coefficients
    pub const fn from_constants(
        axis_swap: bool,
        x_scale: f32,
        x_offset: f32,
        y_scale: f32,
        y_offset: f32,
    ) -> Self {
        Self {
            axis_swap,
            x: AxisMap {
                scale: x_scale,
                offset: x_offset,
            },
            y: AxisMap {
                scale: y_scale,
                offset: y_offset,
            },
        }
    }

    pub const fn from_axes(axis_swap: bool, x: AxisMap, y: AxisMap) -> Self {
        Self { axis_swap, x, y }
    }

    /// Transform from the raw readings at the panel edges
    ///
    /// `x_begin`/`x_end` are the (post-swap) raw values that land on pixel
    /// column 0 and `width - 1`; likewise for y.
    pub fn from_ranges(
        axis_swap: bool,
        x_begin: u16,
        x_end: u16,
        y_begin: u16,
        y_end: u16,
        width: u16,
        height: u16,
    ) -> Result<Self, CalibrationError> {
        // Edge values are already post-swap, so calibrate unswapped
        let edges = CalibrationTransform::calibrate(
            false,
            RawPoint::new(x_begin as i32, y_begin as i32),
            DisplayPoint::new(0, 0),
            RawPoint::new(x_end as i32, y_end as i32),
            DisplayPoint::new(width.saturating_sub(1) as i32, height.saturating_sub(1) as i32),
        )?;
        Ok(Self::from_axes(axis_swap, edges.x, edges.y))
    }

    /// Map a raw sample onto display pixels
    pub fn translate(&self, raw: RawPoint) -> DisplayPoint {
        let raw = if self.axis_swap { raw.swapped() } else { raw };

        DisplayPoint {
            x: round(self.x.apply(raw.x as f32)),
            y: round(self.y.apply(raw.y as f32)),
        }
    }
}

/// Round half away from zero (no `f32::round` without std)
fn round(value: f32) -> i32 {
    if value >= 0.0 {
        (value + 0.5) as i32
    } else {
        (value - 0.5) as i32
    }
}
