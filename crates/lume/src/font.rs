//! Owned font handles and a deduplicating manager.

use rustc_hash::FxHashMap;

use lume_core::font::{self, FontKey};
use lume_core::FsStatus;

/// Move-only reference to a loaded font face. Drop releases the reference;
/// the engine frees the face when the last reference goes.
#[derive(Debug)]
pub struct DynFont {
    key: FontKey,
}

impl DynFont {
    /// Load a face at a pixel size from a drive-letter path. Loading the
    /// same `(path, size)` twice shares the underlying data.
    pub fn load(path: &str, size_px: u16) -> Result<Self, FsStatus> {
        Ok(Self {
            key: font::load(path, size_px)?,
        })
    }

    pub fn raw(&self) -> FontKey {
        self.key
    }

    pub fn line_height(&self) -> Option<u16> {
        font::line_height(self.key)
    }

    /// Give up ownership without releasing the reference.
    pub fn release(self) -> FontKey {
        let key = self.key;
        std::mem::forget(self);
        key
    }
}

impl Drop for DynFont {
    fn drop(&mut self) {
        if lume_core::is_initialized() {
            font::release(self.key);
        }
    }
}

/// Keeps fonts alive for the duration of a screen or an app.
///
/// `get` loads on first use and returns the cached key afterwards; dropping
/// the manager releases everything it held.
#[derive(Default)]
pub struct FontManager {
    fonts: FxHashMap<(String, u16), DynFont>,
}

impl FontManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&mut self, path: &str, size_px: u16) -> Result<FontKey, FsStatus> {
        if let Some(font) = self.fonts.get(&(path.to_owned(), size_px)) {
            return Ok(font.raw());
        }
        let font = DynFont::load(path, size_px)?;
        let key = font.raw();
        self.fonts.insert((path.to_owned(), size_px), font);
        Ok(key)
    }

    pub fn len(&self) -> usize {
        self.fonts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }
}
