//! File-backed option support.
//!
//! A file option opens its path at bind time through a [`FileOpener`]. The
//! mode and permission bits are configuration of the option and are handed
//! to the opener untouched.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// How a file option opens its path.
///
/// # Examples
///
/// ```
/// use argbind_core::FileMode;
///
/// let mode = FileMode::read_only();
/// assert!(mode.read && !mode.write);
///
/// let log = FileMode::append().with_permissions(0o600);
/// assert!(log.append && log.create);
/// assert_eq!(log.permissions, 0o600);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileMode {
    pub read: bool,
    pub write: bool,
    pub append: bool,
    pub create: bool,
    pub truncate: bool,
    /// Unix permission bits applied when the file is created.
    pub permissions: u32,
}

impl Default for FileMode {
    fn default() -> Self {
        Self::read_only()
    }
}

impl FileMode {
    /// Opens an existing file for reading.
    pub fn read_only() -> Self {
        Self {
            read: true,
            write: false,
            append: false,
            create: false,
            truncate: false,
            permissions: 0o644,
        }
    }

    /// Creates or truncates a file for writing.
    pub fn write_truncate() -> Self {
        Self {
            read: false,
            write: true,
            append: false,
            create: true,
            truncate: true,
            permissions: 0o644,
        }
    }

    /// Creates a file if needed and appends to it.
    pub fn append() -> Self {
        Self {
            read: false,
            write: true,
            append: true,
            create: true,
            truncate: false,
            permissions: 0o644,
        }
    }

    /// Sets the permission bits used on creation.
    pub fn with_permissions(mut self, permissions: u32) -> Self {
        self.permissions = permissions;
        self
    }
}

/// Opens the resource behind a file option.
///
/// The default [`SystemOpener`] goes to the file system. Tests and embedders
/// can supply their own to redirect or refuse paths.
pub trait FileOpener {
    /// Opens `path` according to `mode`.
    fn open(&self, path: &Path, mode: &FileMode) -> io::Result<File>;
}

/// [`FileOpener`] backed by [`std::fs::OpenOptions`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemOpener;

impl FileOpener for SystemOpener {
    fn open(&self, path: &Path, mode: &FileMode) -> io::Result<File> {
        let mut options = OpenOptions::new();
        options
            .read(mode.read)
            .write(mode.write)
            .append(mode.append)
            .create(mode.create)
            .truncate(mode.truncate);

        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(mode.permissions);
        }

        options.open(path)
    }
}
