//! Image source over the removable medium
//!
//! Photos are uncompressed 24-bit BMP files whose dimensions match the
//! panel. They are enumerated from one directory, validated header-first,
//! and streamed to the panel in caller-sized portions.

pub mod bmp;
pub mod source;

pub use bmp::{rgb565, BmpHeader, FormatError, HEADER_LEN};
pub use source::{ImageSource, StorageError};
