//! Passepartout Hardware Abstraction Layer
//!
//! This crate defines the storage and timing traits that the picture frame
//! core is written against. Board support crates implement them on top of
//! their SD card stack and system timer, and host tests implement them in
//! memory.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  passepartout-core (controller, source) │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  passepartout-hal (this crate - traits) │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │  SD / FAT     │       │  system timer │
//! │  board crate  │       │  board crate  │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`fs::FileSystem`], [`fs::Directory`], [`fs::File`] - Removable storage
//! - [`clock::Clock`] - Monotonic milliseconds
//!
//! Blocking waits use [`embedded_hal::delay::DelayNs`], re-exported here.

#![no_std]
#![deny(unsafe_code)]

pub mod clock;
pub mod fs;

// Re-export key traits at crate root for convenience
pub use clock::Clock;
pub use embedded_hal::delay::DelayNs;
pub use fs::{DirEntry, Directory, File, FileName, FileSystem, FsError, PathBuf};
