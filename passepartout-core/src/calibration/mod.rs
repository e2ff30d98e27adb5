//! Touch calibration
//!
//! Converts raw resistive-panel samples into display pixels with one
//! affine map per axis. The map comes from a two-point calibration, an
//! averaged four-point sweep, or constants measured once for a panel.

pub mod record;
pub mod sweep;
pub mod transform;

pub use record::{load_calibration, save_calibration, CalibrationRecord, CalibrationStoreError};
pub use sweep::{run_sweep, sweep_targets, Corner, SweepSamples};
pub use transform::{
    Axis, AxisMap, CalibrationError, CalibrationTransform, DisplayPoint, RawPoint,
};
