//! Calibration persistence
//!
//! Stores a sweep result on the card so the frame does not ask for a
//! calibration on every boot. The record is postcard-encoded and guarded by
//! a magic number, a format version and a CRC32.

use crc::{Crc, CRC_32_ISO_HDLC};
use embedded_io::{Read, Seek, SeekFrom, Write};
use passepartout_hal::{FileSystem, FsError};
use serde::{Deserialize, Serialize};

use super::transform::CalibrationTransform;

/// Magic number to identify valid calibration data
pub const CALIBRATION_MAGIC: u32 = 0x54434150; // "PACT"

/// Current calibration record version
pub const CALIBRATION_VERSION: u8 = 1;

/// Maximum serialized record size
const MAX_RECORD_SIZE: usize = 64;

/// IEEE 802.3 CRC32
const CRC32: Crc<u32> = Crc::<u32>::new(&CRC_32_ISO_HDLC);

/// Calibration persistence errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CalibrationStoreError {
    /// File system operation failed
    Fs(FsError),
    /// Serialization failed
    Serialize,
    /// Deserialization failed
    Deserialize,
    /// Invalid magic or version
    InvalidFormat,
    /// CRC check failed
    CrcMismatch,
}

impl From<FsError> for CalibrationStoreError {
    fn from(e: FsError) -> Self {
        CalibrationStoreError::Fs(e)
    }
}

/// Calibration record as stored on the card
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationRecord {
    /// Magic number for validation
    pub magic: u32,
    /// Record format version
    pub version: u8,
    /// Stored transform
    pub transform: CalibrationTransform,
    /// CRC32 over magic..transform
    pub crc: u32,
}

impl CalibrationRecord {
    /// Wrap a transform with a fresh header and CRC
    pub fn new(transform: CalibrationTransform) -> Self {
        let mut record = Self {
            magic: CALIBRATION_MAGIC,
            version: CALIBRATION_VERSION,
            transform,
            crc: 0,
        };
        record.crc = record.calculate_crc();
        record
    }

    /// Check if the header matches this firmware
    pub fn is_valid(&self) -> bool {
        self.magic == CALIBRATION_MAGIC && self.version == CALIBRATION_VERSION
    }

    /// Calculate CRC32 over every field except the CRC itself
    pub fn calculate_crc(&self) -> u32 {
        let t = &self.transform;
        let mut digest = CRC32.digest();

        digest.update(&self.magic.to_le_bytes());
        digest.update(&[self.version, t.axis_swap as u8]);
        for value in [t.x.scale, t.x.offset, t.y.scale, t.y.offset] {
            digest.update(&value.to_bits().to_le_bytes());
        }

        digest.finalize()
    }

    /// Check header and CRC
    pub fn verify(&self) -> Result<(), CalibrationStoreError> {
        if !self.is_valid() {
            return Err(CalibrationStoreError::InvalidFormat);
        }
        if self.crc != self.calculate_crc() {
            return Err(CalibrationStoreError::CrcMismatch);
        }
        Ok(())
    }
}

/// Load a stored transform
pub fn load_calibration<F: FileSystem>(
    fs: &mut F,
    path: &str,
) -> Result<CalibrationTransform, CalibrationStoreError> {
    let mut file = fs.open_file(path)?;

    let mut buffer = [0u8; MAX_RECORD_SIZE];
    let mut len = 0;
    while len < buffer.len() {
        let n = file.read(&mut buffer[len..])?;
        if n == 0 {
            break;
        }
        len += n;
    }

    debug!("Read {} bytes of calibration from {}", len, path);

    let record: CalibrationRecord =
        postcard::from_bytes(&buffer[..len]).map_err(|_| CalibrationStoreError::Deserialize)?;
    record.verify()?;

    Ok(record.transform)
}

/// Store a transform, replacing any previous record
pub fn save_calibration<F: FileSystem>(
    fs: &mut F,
    path: &str,
    transform: &CalibrationTransform,
) -> Result<(), CalibrationStoreError> {
    let record = CalibrationRecord::new(*transform);

    let mut buffer = [0u8; MAX_RECORD_SIZE];
    let bytes =
        postcard::to_slice(&record, &mut buffer).map_err(|_| CalibrationStoreError::Serialize)?;

    let mut file = fs.open_or_create(path)?;
    file.seek(SeekFrom::Start(0))?;
    file.write_all(bytes)?;
    file.flush()?;

    info!("Saved touch calibration ({} bytes)", bytes.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemFs;

    fn sample_transform() -> CalibrationTransform {
        CalibrationTransform::from_constants(true, 0.1065, -59.1, -0.1412, 534.2)
    }

    #[test]
    fn test_crc_detects_modification() {
        let mut record = CalibrationRecord::new(sample_transform());
        assert!(record.verify().is_ok());

        record.transform.x.offset = 0.0;
        assert_eq!(record.verify(), Err(CalibrationStoreError::CrcMismatch));
    }

    #[test]
    fn test_crc_covers_header_and_coefficients() {
        let record = CalibrationRecord::new(CalibrationTransform::from_constants(false, 1.0, 0.0, 1.0, 0.0));

        let mut bytes = std::vec::Vec::new();
        bytes.extend_from_slice(&CALIBRATION_MAGIC.to_le_bytes());
        bytes.extend_from_slice(&[CALIBRATION_VERSION, 0]);
        for value in [1.0f32, 0.0, 1.0, 0.0] {
            bytes.extend_from_slice(&value.to_bits().to_le_bytes());
        }
        assert_eq!(record.crc, CRC32.checksum(&bytes));
        assert_eq!(CRC32.checksum(b"123456789"), 0xCBF4_3926);
    }

    #[test]
    fn test_wrong_version_rejected() {
        let mut record = CalibrationRecord::new(sample_transform());
        record.version = 9;
        assert_eq!(record.verify(), Err(CalibrationStoreError::InvalidFormat));
    }

    #[test]
    fn test_save_then_load() {
        let mut fs = MemFs::new();
        save_calibration(&mut fs, "/touch.cal", &sample_transform()).unwrap();

        let loaded = load_calibration(&mut fs, "/touch.cal").unwrap();
        assert_eq!(loaded, sample_transform());
    }

    #[test]
    fn test_missing_file() {
        let mut fs = MemFs::new();
        assert_eq!(
            load_calibration(&mut fs, "/touch.cal"),
            Err(CalibrationStoreError::Fs(FsError::NotFound))
        );
    }

    #[test]
    fn test_garbage_file() {
        let mut fs = MemFs::new();
        fs.add_file("/touch.cal", alloc::vec![0xAA; 7]);
        assert!(load_calibration(&mut fs, "/touch.cal").is_err());
    }
}
