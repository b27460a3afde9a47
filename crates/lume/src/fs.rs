//! Owned file and directory handles.

use lume_core::fs::{self, DirEntry, DirKey, FileKey, FsMode, FsStatus, Whence};

/// Re-export of the engine's drive registration.
pub use lume_core::fs::register_drive;

/// Move-only owner of an open file. One key wide; drop closes.
#[derive(Debug)]
pub struct File {
    key: FileKey,
}

impl File {
    /// Open a drive-letter path (`"A:data/logo.bin"`).
    pub fn open(path: &str, mode: FsMode) -> Result<Self, FsStatus> {
        Ok(Self {
            key: fs::file_open(path, mode)?,
        })
    }

    pub fn read(&mut self, buf: &mut [u8]) -> Result<usize, FsStatus> {
        fs::file_read(self.key, buf)
    }

    pub fn write(&mut self, buf: &[u8]) -> Result<usize, FsStatus> {
        fs::file_write(self.key, buf)
    }

    pub fn seek(&mut self, offset: i64, whence: Whence) -> Result<u64, FsStatus> {
        fs::file_seek(self.key, offset, whence)
    }

    pub fn tell(&mut self) -> Result<u64, FsStatus> {
        fs::file_tell(self.key)
    }

    pub fn raw(&self) -> FileKey {
        self.key
    }

    /// Give up ownership without closing.
    pub fn release(self) -> FileKey {
        let key = self.key;
        std::mem::forget(self);
        key
    }
}

impl Drop for File {
    fn drop(&mut self) {
        if lume_core::is_initialized() {
            fs::file_close(self.key);
        }
    }
}

/// Move-only owner of an open directory iterator. Drop closes.
#[derive(Debug)]
pub struct Dir {
    key: DirKey,
}

impl Dir {
    pub fn open(path: &str) -> Result<Self, FsStatus> {
        Ok(Self {
            key: fs::dir_open(path)?,
        })
    }

    /// Next entry, `None` when exhausted.
    pub fn read(&mut self) -> Result<Option<DirEntry>, FsStatus> {
        fs::dir_read(self.key)
    }

    pub fn raw(&self) -> DirKey {
        self.key
    }

    pub fn release(self) -> DirKey {
        let key = self.key;
        std::mem::forget(self);
        key
    }
}

impl Drop for Dir {
    fn drop(&mut self) {
        if lume_core::is_initialized() {
            fs::dir_close(self.key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app;

    fn temp_drive(tag: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("lume_file_{tag}_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn drop_closes_the_handle() {
        app::init();
        register_drive('A', temp_drive("close"));
        let key = {
            let f = File::open("A:scratch.bin", FsMode::READ | FsMode::WRITE).unwrap();
            f.raw()
        };
        assert_eq!(fs::file_read(key, &mut [0u8; 1]), Err(FsStatus::InvalidHandle));
    }

    #[test]
    fn status_codes_surface() {
        app::init();
        register_drive('A', temp_drive("status"));
        assert_eq!(
            File::open("A:not-there.txt", FsMode::READ).err(),
            Some(FsStatus::NotFound)
        );
        assert_eq!(Dir::open("Q:x").err(), Some(FsStatus::InvalidDrive));
    }
}
