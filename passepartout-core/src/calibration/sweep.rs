//! Four-point averaged calibration sweep
//!
//! A marker is shown near each panel corner and touched several times.
//! Averaging the repeats suppresses the jitter of resistive panels, and
//! averaging the two corners on each edge cancels a slight panel skew.

use passepartout_hal::DelayNs;

use super::transform::{Axis, AxisMap, CalibrationError, CalibrationTransform, DisplayPoint, RawPoint};
use crate::traits::{color, FrameDisplay, Rect, TouchPanel};

/// Distance of the markers from the panel edges (px)
pub const SWEEP_MARGIN: u16 = 40;

/// Marker edge length (px)
pub const MARKER_SIZE: u16 = 20;

/// Touches averaged per marker
pub const SAMPLES_PER_TARGET: u16 = 3;

/// Settle time before each sample (ms)
pub const SETTLE_MS: u32 = 200;

/// Poll interval while waiting for the pen (ms)
const POLL_MS: u32 = 5;

/// Sweep targets, in the order they are shown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Corner {
    LeftBottom = 0,
    RightBottom = 1,
    LeftTop = 2,
    RightTop = 3,
}

impl Corner {
    pub const ALL: [Corner; 4] = [
        Corner::LeftBottom,
        Corner::RightBottom,
        Corner::LeftTop,
        Corner::RightTop,
    ];
}

/// Marker centres in display pixels, indexed by [`Corner`]
///
/// "Bottom" is the y = 0 edge of the panel's native scan order.
pub fn sweep_targets(width: u16, height: u16) -> [DisplayPoint; 4] {
    let left = SWEEP_MARGIN as i32;
    let right = width as i32 - SWEEP_MARGIN as i32;
    let bottom = SWEEP_MARGIN as i32;
    let top = height as i32 - SWEEP_MARGIN as i32;

    [
        DisplayPoint::new(left, bottom),
        DisplayPoint::new(right, bottom),
        DisplayPoint::new(left, top),
        DisplayPoint::new(right, top),
    ]
}

/// Accumulated raw samples per corner
#[derive(Debug, Clone)]
pub struct SweepSamples {
    axis_swap: bool,
    sums: [(i64, i64); 4],
    counts: [u16; 4],
}

impl SweepSamples {
    pub const fn new(axis_swap: bool) -> Self {
        Self {
            axis_swap,
            sums: [(0, 0); 4],
            counts: [0; 4],
        }
    }

    /// Add one raw sample for a corner
    pub fn record(&mut self, corner: Corner, sample: RawPoint) {
        let slot = corner as usize;
        self.sums[slot].0 += sample.x as i64;
        self.sums[slot].1 += sample.y as i64;
        self.counts[slot] = self.counts[slot].saturating_add(1);
    }

    /// Averaged sample for a corner, after the axis swap
    pub fn average(&self, corner: Corner) -> Option<(f32, f32)> {
        let slot = corner as usize;
        let count = self.counts[slot];
        if count == 0 {
            return None;
        }

        let x = self.sums[slot].0 as f32 / count as f32;
        let y = self.sums[slot].1 as f32 / count as f32;
        Some(if self.axis_swap { (y, x) } else { (x, y) })
    }

    /// Derive the transform from the averaged corners
    pub fn transform(&self, width: u16, height: u16) -> Result<CalibrationTransform, CalibrationError> {
        let avg = |corner| self.average(corner).ok_or(CalibrationError::Incomplete);
        let lb = avg(Corner::LeftBottom)?;
        let rb = avg(Corner::RightBottom)?;
        let lt = avg(Corner::LeftTop)?;
        let rt = avg(Corner::RightTop)?;

        // Raw value on each edge is the mean of the two corners on it
        let x_left = (lb.0 + lt.0) / 2.0;
        let x_right = (rb.0 + rt.0) / 2.0;
        let y_bottom = (lb.1 + rb.1) / 2.0;
        let y_top = (lt.1 + rt.1) / 2.0;

        let targets = sweep_targets(width, height);
        let near = targets[Corner::LeftBottom as usize];
        let far = targets[Corner::RightTop as usize];

        let x = AxisMap::through(Axis::X, x_left, near.x as f32, x_right, far.x as f32)?;
        let y = AxisMap::through(Axis::Y, y_bottom, near.y as f32, y_top, far.y as f32)?;

        Ok(CalibrationTransform::from_axes(self.axis_swap, x, y))
    }
}

/// Run the interactive sweep on the panel
///
/// Blocks until every marker has been touched [`SAMPLES_PER_TARGET`]
/// times. A degenerate result is returned to the caller, which should
/// run the sweep again.
pub fn run_sweep<D, T, Y>(
    display: &mut D,
    touch: &mut T,
    delay: &mut Y,
    axis_swap: bool,
) -> Result<CalibrationTransform, CalibrationError>
where
    D: FrameDisplay,
    T: TouchPanel,
    Y: DelayNs,
{
    let (width, height) = (display.width(), display.height());
    let targets = sweep_targets(width, height);
    let mut samples = SweepSamples::new(axis_swap);

    if let Err(e) = display.clear(color::BLACK) {
        warn!("Calibration: clear failed: {:?}", e);
    }

    for corner in Corner::ALL {
        let marker = marker_rect(targets[corner as usize]);
        if let Err(e) = display.fill_rect(marker, color::WHITE) {
            warn!("Calibration: marker draw failed: {:?}", e);
        }

        for _ in 0..SAMPLES_PER_TARGET {
            delay.delay_ms(SETTLE_MS);
            let sample = wait_for_touch(touch, delay);
            samples.record(corner, sample.into());
        }

        if let Err(e) = display.fill_rect(marker, color::BLACK) {
            warn!("Calibration: marker erase failed: {:?}", e);
        }
        debug!("Calibration: {:?} sampled", corner);
    }

    if let Err(e) = display.clear(color::BLACK) {
        warn!("Calibration: clear failed: {:?}", e);
    }

    let transform = samples.transform(width, height)?;
    info!(
        "Calibration: swap={} x={}*raw+{} y={}*raw+{}",
        transform.axis_swap,
        transform.x.scale,
        transform.x.offset,
        transform.y.scale,
        transform.y.offset
    );
    Ok(transform)
}

fn wait_for_touch<T: TouchPanel, Y: DelayNs>(touch: &mut T, delay: &mut Y) -> crate::traits::RawSample {
    loop {
        if let Some(sample) = touch.sample() {
            return sample;
        }
        delay.delay_ms(POLL_MS);
    }
}

fn marker_rect(centre: DisplayPoint) -> Rect {
    let half = (MARKER_SIZE / 2) as i32;
    Rect::new(
        (centre.x - half).max(0) as u16,
        (centre.y - half).max(0) as u16,
        MARKER_SIZE,
        MARKER_SIZE,
    )
}
