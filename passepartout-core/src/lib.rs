//! Board-agnostic control core for the picture frame
//!
//! This crate contains all application logic that does not depend on a
//! specific panel, touch controller or SD card driver:
//!
//! - Touch calibration (two-point and averaged four-point sweeps)
//! - Image source over the removable medium (BMP validation, streaming)
//! - No-repeat image selection policy
//! - Persisted settings record
//! - UI state machine and the frame controller loop
//! - Collaborator traits for display, touch and randomness

#![no_std]
#![deny(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod fmt;

pub mod calibration;
pub mod config;
pub mod controller;
pub mod image;
pub mod selection;
pub mod settings;
pub mod state;
pub mod touch;
pub mod traits;

#[cfg(test)]
mod testing;
