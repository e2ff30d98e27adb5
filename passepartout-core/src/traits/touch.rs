//! Touch controller collaborator

/// Raw sample from a resistive touch controller
///
/// Coordinates are in controller units (e.g. 0-4095 for a 12-bit ADC),
/// not display pixels. Only `x` and `y` feed the calibration transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RawSample {
    pub x: u16,
    pub y: u16,
    /// Pressure (0 = no touch, higher = more pressure)
    pub pressure: u16,
}

impl RawSample {
    pub const fn at(x: u16, y: u16) -> Self {
        Self { x, y, pressure: 1 }
    }
}

/// Touch controller trait
pub trait TouchPanel {
    /// Read a sample if the panel is currently pressed
    ///
    /// Implementations check the pen-down interrupt line first and only
    /// then run the (slow) ADC conversion.
    fn sample(&mut self) -> Option<RawSample>;
}
