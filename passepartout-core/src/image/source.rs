//! Directory-backed image source
//!
//! Owns the open directory cursor and the current image stream. After any
//! successful advance or jump the current entry is a validated image whose
//! stream sits at the first pixel; otherwise there is no current entry.
//!
//! Storage failures are sticky: once one is recorded every later call
//! returns it again, and only a device restart clears it.

use core::fmt::Write as _;

use embedded_io::{Read, ReadExactError, Seek, SeekFrom};
use heapless::String;
use passepartout_hal::fs::{join, path};
use passepartout_hal::{Directory, File, FileSystem, FsError, PathBuf};

use super::bmp::{rgb565, BmpHeader, FormatError, HEADER_LEN};

/// Pixels converted per underlying read
const READ_CHUNK_PIXELS: usize = 32;

/// Fatal storage conditions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StorageError {
    /// Medium missing or removed
    Unmounted,
    /// Image directory could not be opened or listed
    Directory(FsError),
    /// A named image could not be opened
    Open(FsError),
    /// Underlying read or seek failed
    Read(FsError),
    /// Pixel stream ended early
    ShortRead,
    /// Pixel read requested with no current image
    NotOpen,
    /// Directory holds no valid image
    NoImages,
}

/// Image source over one directory of the medium
pub struct ImageSource<F: FileSystem> {
    fs: F,
    dir: F::Directory,
    dir_path: PathBuf,
    panel_width: u16,
    panel_height: u16,
    current: Option<F::File>,
    current_path: PathBuf,
    /// Current entry came from the directory listing
    current_in_dir: bool,
    index: u16,
    error: Option<StorageError>,
}

impl<F: FileSystem> ImageSource<F> {
    /// Open the image directory and select its first valid image
    pub fn open(
        mut fs: F,
        dir_path: &str,
        panel_width: u16,
        panel_height: u16,
    ) -> Result<Self, StorageError> {
        if !fs.is_mounted() {
            error!("Storage: medium not mounted");
            return Err(StorageError::Unmounted);
        }

        let dir = fs.open_dir(dir_path).map_err(StorageError::Directory)?;
        let dir_path = path(dir_path).map_err(StorageError::Directory)?;

        let mut source = Self {
            fs,
            dir,
            dir_path,
            panel_width,
            panel_height,
            current: None,
            current_path: PathBuf::new(),
            current_in_dir: false,
            index: 0,
            error: None,
        };

        let skipped = source.advance()?;
        source.index = 0;
        debug!("Storage: opened {}, skipped {}", source.dir_path.as_str(), skipped);

        Ok(source)
    }

    /// Advance to the next valid image, wrapping at the end of the listing
    ///
    /// Returns the number of invalid entries skipped on the way.
    pub fn next(&mut self) -> Result<u16, StorageError> {
        self.ensure_ok()?;

        let before = self.index;
        let skipped = self.advance_tracking_wrap()?;
        trace!("Storage: next {} -> {}", before, self.index);
        Ok(skipped)
    }

    /// Jump to `<dir>/<n>.bmp`
    ///
    /// Sets the logical index to `n` either way. Returns `Ok(false)` when the
    /// file exists but is not a valid image; a missing file is a storage
    /// failure.
    pub fn to_index(&mut self, n: u16) -> Result<bool, StorageError> {
        self.ensure_ok()?;

        let mut name: String<16> = String::new();
        if write!(name, "{}.bmp", n).is_err() {
            return Err(self.fail(StorageError::Open(FsError::PathTooLong)));
        }
        let target = match join(&self.dir_path, &name) {
            Ok(p) => p,
            Err(e) => return Err(self.fail(StorageError::Open(e))),
        };

        self.index = n;
        let valid = self.open_validated(&target)?;
        self.current_in_dir = valid;
        Ok(valid)
    }

    /// Open an arbitrary image path (menu backgrounds, intro)
    ///
    /// Leaves the logical index untouched.
    pub fn to_name(&mut self, image_path: &str) -> Result<bool, StorageError> {
        self.ensure_ok()?;

        let target = match path(image_path) {
            Ok(p) => p,
            Err(e) => return Err(self.fail(StorageError::Open(e))),
        };

        self.current_in_dir = false;
        self.open_validated(&target)
    }

    /// Fill `buffer` with the next pixels of the current image as RGB565
    ///
    /// Reads `3 * buffer.len()` bytes from wherever the stream sits. The
    /// caller decides how many portions make up a frame.
    pub fn read_portion(&mut self, buffer: &mut [u16]) -> Result<(), StorageError> {
        self.ensure_ok()?;

        let outcome = match self.current.as_mut() {
            Some(file) => read_pixels(file, buffer),
            None => Err(StorageError::NotOpen),
        };
        outcome.map_err(|e| self.fail(e))
    }

    /// Count the valid images in the directory
    ///
    /// Walks the listing with [`ImageSource::next`] until the starting entry
    /// comes round again, which leaves the source where it started.
    pub fn count_images(&mut self) -> Result<u16, StorageError> {
        self.ensure_ok()?;

        if !self.current_in_dir {
            self.next()?;
        }

        let start = self.current_path.clone();
        let mut count: u16 = 0;
        loop {
            count = count.saturating_add(1);
            self.next()?;
            if self.current_path == start || count == u16::MAX {
                break;
            }
        }

        info!("Storage: {} images in {}", count, self.dir_path.as_str());
        Ok(count)
    }

    /// Poll the medium; card removal becomes a sticky failure
    pub fn check(&mut self) -> Result<(), StorageError> {
        self.ensure_ok()?;
        if !self.fs.is_mounted() {
            return Err(self.fail(StorageError::Unmounted));
        }
        Ok(())
    }

    /// Recorded storage failure, if any
    pub fn error(&self) -> Option<StorageError> {
        self.error
    }

    /// Logical index of the current image
    pub fn index(&self) -> u16 {
        self.index
    }

    /// Full path of the current entry
    pub fn current_name(&self) -> &str {
        &self.current_path
    }

    /// Borrow the underlying file system (settings, calibration files)
    pub fn file_system(&mut self) -> &mut F {
        &mut self.fs
    }

    fn ensure_ok(&self) -> Result<(), StorageError> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn fail(&mut self, e: StorageError) -> StorageError {
        if self.error.is_none() {
            error!("Storage failure: {:?}", e);
            self.error = Some(e);
        }
        e
    }

    fn advance_tracking_wrap(&mut self) -> Result<u16, StorageError> {
        let (skipped, wrapped) = self.scan()?;
        self.index = if wrapped { 0 } else { self.index.wrapping_add(1) };
        Ok(skipped)
    }

    fn advance(&mut self) -> Result<u16, StorageError> {
        self.scan().map(|(skipped, _)| skipped)
    }

    /// Move the directory cursor to the next valid image
    ///
    /// Returns `(skipped, wrapped)`. Gives up with `NoImages` after a full
    /// pass over the listing without a valid entry.
    fn scan(&mut self) -> Result<(u16, bool), StorageError> {
        let mut skipped: u16 = 0;
        let mut wrapped = false;

        loop {
            self.current = None;

            let entry = match self.dir.next_entry() {
                Ok(Some(entry)) => entry,
                Ok(None) => {
                    if wrapped {
                        return Err(self.fail(StorageError::NoImages));
                    }
                    if let Err(e) = self.dir.rewind() {
                        return Err(self.fail(StorageError::Directory(e)));
                    }
                    wrapped = true;
                    continue;
                }
                Err(e) => return Err(self.fail(StorageError::Directory(e))),
            };

            if entry.is_dir {
                continue;
            }

            let target = match join(&self.dir_path, &entry.name) {
                Ok(p) => p,
                Err(_) => {
                    warn!("Storage: skipping {}, path too long", entry.name.as_str());
                    skipped = skipped.saturating_add(1);
                    continue;
                }
            };

            if self.open_validated(&target)? {
                self.current_in_dir = true;
                return Ok((skipped, wrapped));
            }
            skipped = skipped.saturating_add(1);
        }
    }

    /// Open `target`, validate its header and seek to the pixel data
    fn open_validated(&mut self, target: &PathBuf) -> Result<bool, StorageError> {
        self.current = None;
        self.current_path = target.clone();

        let mut file = match self.fs.open_file(target) {
            Ok(file) => file,
            Err(FsError::NotMounted) => return Err(self.fail(StorageError::Unmounted)),
            Err(e) => return Err(self.fail(StorageError::Open(e))),
        };

        match validate(&mut file, self.panel_width, self.panel_height) {
            Ok(Ok(())) => {
                self.current = Some(file);
                Ok(true)
            }
            Ok(Err(reason)) => {
                debug!("Storage: {} skipped: {:?}", target.as_str(), reason);
                Ok(false)
            }
            Err(e) => Err(self.fail(e)),
        }
    }
}

/// Read and check the header, leaving the stream at the pixel data
///
/// The outer error is a storage failure, the inner one a format rejection.
fn validate<R: File>(
    file: &mut R,
    panel_width: u16,
    panel_height: u16,
) -> Result<Result<(), FormatError>, StorageError> {
    let mut bytes = [0u8; HEADER_LEN];
    match file.read_exact(&mut bytes) {
        Ok(()) => {}
        Err(ReadExactError::UnexpectedEof) => return Ok(Err(FormatError::Truncated)),
        Err(ReadExactError::Other(e)) => return Err(StorageError::Read(e)),
    }

    let header = BmpHeader::parse(&bytes);
    if let Err(reason) = header.validate(panel_width, panel_height) {
        return Ok(Err(reason));
    }

    file.seek(SeekFrom::Start(header.data_offset as u64))
        .map_err(StorageError::Read)?;
    Ok(Ok(()))
}

/// Convert stored B, G, R triples into RGB565
fn read_pixels<R: File>(file: &mut R, buffer: &mut [u16]) -> Result<(), StorageError> {
    let mut raw = [0u8; 3 * READ_CHUNK_PIXELS];

    for chunk in buffer.chunks_mut(READ_CHUNK_PIXELS) {
        let bytes = &mut raw[..chunk.len() * 3];
        match file.read_exact(bytes) {
            Ok(()) => {}
            Err(ReadExactError::UnexpectedEof) => return Err(StorageError::ShortRead),
            Err(ReadExactError::Other(e)) => return Err(StorageError::Read(e)),
        }

        for (pixel, bgr) in chunk.iter_mut().zip(bytes.chunks_exact(3)) {
            *pixel = rgb565(bgr[2], bgr[1], bgr[0]);
        }
    }

    Ok(())
}
