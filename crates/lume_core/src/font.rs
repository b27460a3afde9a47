//! Reference-counted font loading.
//!
//! Fonts load through the [`crate::fs`] drive abstraction and are cached by
//! `(path, size)`: a second load of the same face bumps a reference count
//! instead of re-reading the file. [`release`] drops a reference and frees
//! the font when the last one goes.

use slotmap::new_key_type;
use tracing::debug;

use crate::context::with_ui;
use crate::fs::{self, FsStatus};

new_key_type! {
    /// Identity of a loaded font.
    pub struct FontKey;
}

pub(crate) struct FontNode {
    /// Raw face data as read from the filesystem.
    #[allow(dead_code)]
    pub data: Vec<u8>,
    pub line_height: u16,
    /// Cache key, used to drop the cache entry on final release.
    pub cache_key: String,
    pub refs: u32,
}

fn cache_key(path: &str, size_px: u16) -> String {
    format!("{path}#{size_px}")
}

/// Load a font face at a pixel size, or take a new reference to an already
/// loaded one.
pub fn load(path: &str, size_px: u16) -> Result<FontKey, FsStatus> {
    let key = cache_key(path, size_px);
    let cached = with_ui(|ui| {
        ui.font_cache.get(&key).copied().map(|font| {
            if let Some(node) = ui.fonts.get_mut(font) {
                node.refs += 1;
            }
            font
        })
    });
    if let Some(font) = cached {
        return Ok(font);
    }

    let data = fs::read_all(path)?;
    debug!(path, size_px, bytes = data.len(), "font loaded");
    Ok(with_ui(|ui| {
        let font = ui.fonts.insert(FontNode {
            data,
            line_height: size_px,
            cache_key: key.clone(),
            refs: 1,
        });
        ui.font_cache.insert(key, font);
        font
    }))
}

/// Drop one reference; frees the font when the last reference goes.
/// Returns whether the key was alive.
pub fn release(key: FontKey) -> bool {
    with_ui(|ui| {
        let Some(node) = ui.fonts.get_mut(key) else {
            return false;
        };
        node.refs -= 1;
        if node.refs == 0 {
            let cache_key = node.cache_key.clone();
            ui.fonts.remove(key);
            ui.font_cache.remove(&cache_key);
        }
        true
    })
}

pub fn exists(key: FontKey) -> bool {
    with_ui(|ui| ui.fonts.contains_key(key))
}

/// Number of distinct loaded fonts.
pub fn count() -> usize {
    with_ui(|ui| ui.fonts.len())
}

/// Line height of a loaded font, in pixels.
pub fn line_height(key: FontKey) -> Option<u16> {
    with_ui(|ui| ui.fonts.get(key).map(|n| n.line_height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context;
    use crate::fs::register_drive;

    fn seed_font(tag: &str) -> &'static str {
        let dir = std::env::temp_dir().join(format!("lume_font_{tag}_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("face.bin"), b"not a real font").unwrap();
        register_drive('F', dir);
        "F:face.bin"
    }

    #[test]
    fn load_caches_and_refcounts() {
        context::init();
        let path = seed_font("cache");

        let a = load(path, 14).unwrap();
        let b = load(path, 14).unwrap();
        assert_eq!(a, b);
        assert_eq!(count(), 1);

        // Different size is a different face instance.
        let c = load(path, 20).unwrap();
        assert_ne!(a, c);
        assert_eq!(count(), 2);

        assert!(release(a));
        assert!(exists(b));
        assert!(release(b));
        assert!(!exists(b));
        assert_eq!(count(), 1);
    }

    #[test]
    fn line_height_follows_size() {
        context::init();
        let path = seed_font("height");
        let f = load(path, 18).unwrap();
        assert_eq!(line_height(f), Some(18));
    }

    #[test]
    fn missing_face_reports_not_found() {
        context::init();
        register_drive('F', std::env::temp_dir());
        assert_eq!(load("F:absent.bin", 12), Err(FsStatus::NotFound));
    }
}
