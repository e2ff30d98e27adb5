//! Settings file access

use embedded_io::{Read, Seek, SeekFrom, Write};
use passepartout_hal::fs::path;
use passepartout_hal::{FileSystem, FsError, PathBuf};

use super::record::{SettingsRecord, SETTINGS_LEN};

/// Reads and writes the settings record at a fixed path
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(file: &str) -> Result<Self, FsError> {
        Ok(Self { path: path(file)? })
    }

    /// Read the stored record
    ///
    /// A short file yields defaults for the missing fields. Values are not
    /// range-checked here; see [`SettingsRecord::clamped`].
    pub fn load<F: FileSystem>(&self, fs: &mut F) -> Result<SettingsRecord, FsError> {
        let mut file = fs.open_file(&self.path)?;

        let mut bytes = [0u8; SETTINGS_LEN];
        let mut len = 0;
        while len < SETTINGS_LEN {
            let n = file.read(&mut bytes[len..])?;
            if n == 0 {
                break;
            }
            len += n;
        }

        if len < SETTINGS_LEN {
            warn!("Settings: short record ({} bytes)", len);
        }

        let record = SettingsRecord::from_bytes(&bytes[..len]);
        debug!("Settings loaded: {:?}", record);
        Ok(record)
    }

    /// Overwrite the record at the start of the file
    pub fn save<F: FileSystem>(&self, fs: &mut F, record: &SettingsRecord) -> Result<(), FsError> {
        let mut file = fs.open_or_create(&self.path)?;
        file.seek(SeekFrom::Start(0))?;
        file.write_all(&record.to_bytes())?;
        file.flush()?;

        debug!("Settings saved: {:?}", record);
        Ok(())
    }
}
