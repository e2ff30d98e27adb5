//! Removable storage abstractions
//!
//! Provides traits for the FAT-style file system on the frame's SD card.
//! Board crates implement them on top of their block device and FAT
//! driver; the core only ever sees directories, named entries and
//! byte streams.

use embedded_io::{ErrorKind, ErrorType, Read, Seek, Write};
use heapless::String;

/// Maximum length of a single directory entry name
pub const MAX_NAME_LEN: usize = 32;

/// Maximum length of a full path
pub const MAX_PATH_LEN: usize = 64;

/// Directory entry name
pub type FileName = String<MAX_NAME_LEN>;

/// Absolute path on the medium
pub type PathBuf = String<MAX_PATH_LEN>;

/// Errors from file system operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FsError {
    /// Medium could not be mounted or was removed
    NotMounted,
    /// Path does not exist
    NotFound,
    /// Underlying block read/write failed
    Io,
    /// Path does not fit into [`PathBuf`]
    PathTooLong,
    /// Medium is full
    Full,
}

impl embedded_io::Error for FsError {
    fn kind(&self) -> ErrorKind {
        match self {
            FsError::NotFound => ErrorKind::NotFound,
            FsError::PathTooLong => ErrorKind::InvalidInput,
            FsError::Full => ErrorKind::OutOfMemory,
            FsError::NotMounted | FsError::Io => ErrorKind::Other,
        }
    }
}

/// One entry returned while enumerating a directory
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DirEntry {
    /// Entry name without the directory prefix
    pub name: FileName,
    /// Entry is a sub-directory
    pub is_dir: bool,
    /// Size in bytes (0 for directories)
    pub size: u32,
}

/// An open file: a seekable byte stream
///
/// Dropping the handle closes the file.
pub trait File: Read + Write + Seek + ErrorType<Error = FsError> {}

// Blanket implementation for any stream using our error type
impl<T: Read + Write + Seek + ErrorType<Error = FsError>> File for T {}

/// An open directory cursor
pub trait Directory {
    /// Advance to the next entry
    ///
    /// Returns `Ok(None)` once the listing is exhausted. The cursor stays
    /// exhausted until [`Directory::rewind`] is called.
    fn next_entry(&mut self) -> Result<Option<DirEntry>, FsError>;

    /// Move the cursor back to the first entry
    fn rewind(&mut self) -> Result<(), FsError>;
}

/// File system on the removable medium
pub trait FileSystem {
    /// File handle type
    type File: File;
    /// Directory cursor type
    type Directory: Directory;

    /// Check whether the medium is still present and mounted
    fn is_mounted(&self) -> bool;

    /// Open a directory for enumeration
    fn open_dir(&mut self, path: &str) -> Result<Self::Directory, FsError>;

    /// Open an existing file for reading
    fn open_file(&mut self, path: &str) -> Result<Self::File, FsError>;

    /// Open a file for reading and writing, creating it if missing
    ///
    /// Existing content is kept; the cursor starts at offset 0.
    fn open_or_create(&mut self, path: &str) -> Result<Self::File, FsError>;
}

/// Join a directory and an entry name into one path
pub fn join(dir: &str, name: &str) -> Result<PathBuf, FsError> {
    let mut path = PathBuf::new();
    path.push_str(dir).map_err(|_| FsError::PathTooLong)?;
    if !dir.ends_with('/') {
        path.push('/').map_err(|_| FsError::PathTooLong)?;
    }
    path.push_str(name).map_err(|_| FsError::PathTooLong)?;
    Ok(path)
}

/// Copy a `&str` into a [`PathBuf`]
pub fn path(value: &str) -> Result<PathBuf, FsError> {
    let mut path = PathBuf::new();
    path.push_str(value).map_err(|_| FsError::PathTooLong)?;
    Ok(path)
}
