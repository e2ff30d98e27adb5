//! Persisted runtime settings
//!
//! Five raw bytes in a well-known file on the card. There is no header or
//! checksum, so anything read back is range-clamped before use.

pub mod record;
pub mod store;

pub use record::{SettingsRecord, SETTINGS_LEN};
pub use store::SettingsStore;
