//! Drive-letter filesystem abstraction.
//!
//! Paths look like `"A:assets/logo.bin"`: a drive letter, a colon, then a
//! relative path. [`register_drive`] maps a letter onto a host directory;
//! everything else is plain `std::fs` behind arena-keyed handles.

use std::fs::{File, OpenOptions, ReadDir};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use bitflags::bitflags;
use slotmap::new_key_type;
use thiserror::Error;
use tracing::debug;

use crate::context::with_ui;

new_key_type! {
    /// An open file handle.
    pub struct FileKey;

    /// An open directory iterator.
    pub struct DirKey;
}

/// Why a filesystem operation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FsStatus {
    #[error("object not found")]
    NotFound,
    #[error("access denied")]
    AccessDenied,
    #[error("no drive registered under that letter")]
    InvalidDrive,
    #[error("malformed path, expected \"X:relative/path\"")]
    InvalidPath,
    #[error("handle is closed or was never opened")]
    InvalidHandle,
    #[error("argument out of range for the operation")]
    InvalidParameter,
    #[error("out of space")]
    OutOfSpace,
    #[error("hardware or I/O failure")]
    HardwareError,
}

impl From<io::Error> for FsStatus {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => FsStatus::NotFound,
            io::ErrorKind::PermissionDenied => FsStatus::AccessDenied,
            _ => FsStatus::HardwareError,
        }
    }
}

bitflags! {
    /// Open mode for [`file_open`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct FsMode: u8 {
        const READ  = 1 << 0;
        /// Write access; creates the file if missing.
        const WRITE = 1 << 1;
    }
}

/// Seek origin for [`file_seek`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Whence {
    Set,
    Cur,
    End,
}

/// One entry yielded by [`dir_read`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub is_dir: bool,
}

/// Map `letter` onto a host directory. Replaces any previous mapping for
/// the same letter.
pub fn register_drive(letter: char, root: impl Into<PathBuf>) {
    let root = root.into();
    debug!(%letter, root = %root.display(), "drive registered");
    with_ui(|ui| {
        ui.drives.insert(letter.to_ascii_uppercase(), root);
    });
}

/// Translate `"A:relative/path"` into a host path.
fn resolve(path: &str) -> Result<PathBuf, FsStatus> {
    let mut chars = path.chars();
    let letter = chars.next().ok_or(FsStatus::InvalidPath)?;
    if chars.next() != Some(':') || !letter.is_ascii_alphabetic() {
        return Err(FsStatus::InvalidPath);
    }
    let rest = &path[2..];
    if Path::new(rest).is_absolute() {
        return Err(FsStatus::InvalidPath);
    }
    with_ui(|ui| {
        ui.drives
            .get(&letter.to_ascii_uppercase())
            .map(|root| root.join(rest))
            .ok_or(FsStatus::InvalidDrive)
    })
}

// =============================================================================
// Files
// =============================================================================

/// Open a file under a registered drive.
pub fn file_open(path: &str, mode: FsMode) -> Result<FileKey, FsStatus> {
    let host = resolve(path)?;
    let file = OpenOptions::new()
        .read(mode.contains(FsMode::READ))
        .write(mode.contains(FsMode::WRITE))
        .create(mode.contains(FsMode::WRITE))
        .open(&host)?;
    Ok(with_ui(|ui| ui.files.insert(file)))
}

/// Read into `buf`, returning how many bytes arrived (0 at end of file).
pub fn file_read(key: FileKey, buf: &mut [u8]) -> Result<usize, FsStatus> {
    with_ui(|ui| {
        let file = ui.files.get_mut(key).ok_or(FsStatus::InvalidHandle)?;
        Ok(file.read(buf)?)
    })
}

/// Write `buf`, returning how many bytes were accepted.
pub fn file_write(key: FileKey, buf: &[u8]) -> Result<usize, FsStatus> {
    with_ui(|ui| {
        let file = ui.files.get_mut(key).ok_or(FsStatus::InvalidHandle)?;
        Ok(file.write(buf)?)
    })
}

/// Move the cursor; returns the new absolute position. An absolute seek to
/// a negative offset is rejected with [`FsStatus::InvalidParameter`].
pub fn file_seek(key: FileKey, offset: i64, whence: Whence) -> Result<u64, FsStatus> {
    let from = match whence {
        Whence::Set => {
            let offset = u64::try_from(offset).map_err(|_| FsStatus::InvalidParameter)?;
            SeekFrom::Start(offset)
        }
        Whence::Cur => SeekFrom::Current(offset),
        Whence::End => SeekFrom::End(offset),
    };
    with_ui(|ui| {
        let file = ui.files.get_mut(key).ok_or(FsStatus::InvalidHandle)?;
        Ok(file.seek(from)?)
    })
}

/// Current cursor position.
pub fn file_tell(key: FileKey) -> Result<u64, FsStatus> {
    with_ui(|ui| {
        let file = ui.files.get_mut(key).ok_or(FsStatus::InvalidHandle)?;
        Ok(file.stream_position()?)
    })
}

/// Close a file handle. Returns whether it was open.
pub fn file_close(key: FileKey) -> bool {
    with_ui(|ui| ui.files.remove(key).is_some())
}

/// Read a whole file into memory. Convenience used by the font loader.
pub(crate) fn read_all(path: &str) -> Result<Vec<u8>, FsStatus> {
    let host = resolve(path)?;
    Ok(std::fs::read(host)?)
}

// =============================================================================
// Directories
// =============================================================================

/// Open a directory under a registered drive for iteration.
pub fn dir_open(path: &str) -> Result<DirKey, FsStatus> {
    let host = resolve(path)?;
    let iter: ReadDir = std::fs::read_dir(host)?;
    Ok(with_ui(|ui| ui.dirs.insert(iter)))
}

/// Next entry, or `None` when the directory is exhausted.
pub fn dir_read(key: DirKey) -> Result<Option<DirEntry>, FsStatus> {
    with_ui(|ui| {
        let iter = ui.dirs.get_mut(key).ok_or(FsStatus::InvalidHandle)?;
        match iter.next() {
            None => Ok(None),
            Some(entry) => {
                let entry = entry?;
                let is_dir = entry.file_type()?.is_dir();
                Ok(Some(DirEntry {
                    name: entry.file_name().to_string_lossy().into_owned(),
                    is_dir,
                }))
            }
        }
    })
}

/// Close a directory handle. Returns whether it was open.
pub fn dir_close(key: DirKey) -> bool {
    with_ui(|ui| ui.dirs.remove(key).is_some())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context;

    fn temp_root(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("lume_fs_{tag}_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn path_resolution_errors() {
        context::init();
        assert_eq!(file_open("", FsMode::READ), Err(FsStatus::InvalidPath));
        assert_eq!(file_open("no-colon", FsMode::READ), Err(FsStatus::InvalidPath));
        assert_eq!(file_open("Z:x", FsMode::READ), Err(FsStatus::InvalidDrive));
    }

    #[test]
    fn write_seek_read_roundtrip() {
        context::init();
        let root = temp_root("rw");
        register_drive('A', root);

        let f = file_open("A:note.txt", FsMode::READ | FsMode::WRITE).unwrap();
        assert_eq!(file_write(f, b"hello world").unwrap(), 11);
        assert_eq!(file_seek(f, 6, Whence::Set).unwrap(), 6);
        assert_eq!(file_tell(f).unwrap(), 6);

        let mut buf = [0u8; 5];
        assert_eq!(file_read(f, &mut buf).unwrap(), 5);
        assert_eq!(&buf, b"world");

        assert!(file_close(f));
        assert!(!file_close(f));
        assert_eq!(file_read(f, &mut buf), Err(FsStatus::InvalidHandle));
    }

    #[test]
    fn negative_absolute_seek_is_rejected() {
        context::init();
        let root = temp_root("seek");
        register_drive('A', root);

        let f = file_open("A:seek.bin", FsMode::READ | FsMode::WRITE).unwrap();
        assert_eq!(file_write(f, b"abcdef").unwrap(), 6);
        assert_eq!(
            file_seek(f, -1, Whence::Set),
            Err(FsStatus::InvalidParameter)
        );
        // The cursor did not move.
        assert_eq!(file_tell(f).unwrap(), 6);

        // Relative and end-anchored seeks still take negative offsets.
        assert_eq!(file_seek(f, -2, Whence::End).unwrap(), 4);
        assert_eq!(file_seek(f, -1, Whence::Cur).unwrap(), 3);
        assert!(file_close(f));
    }

    #[test]
    fn missing_file_reports_not_found() {
        context::init();
        register_drive('A', temp_root("missing"));
        assert_eq!(file_open("A:nope.bin", FsMode::READ), Err(FsStatus::NotFound));
    }

    #[test]
    fn directory_listing() {
        context::init();
        let root = temp_root("dir");
        register_drive('D', &root);
        std::fs::write(root.join("one.txt"), b"1").unwrap();
        std::fs::create_dir_all(root.join("sub")).unwrap();

        let d = dir_open("D:").unwrap();
        let mut names = Vec::new();
        while let Some(entry) = dir_read(d).unwrap() {
            names.push((entry.name, entry.is_dir));
        }
        assert!(names.contains(&("one.txt".to_string(), false)));
        assert!(names.contains(&("sub".to_string(), true)));
        assert!(dir_close(d));
    }
}
