use std::path::Path;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::text::{rasterize_font, FontAsset};

use super::hash::{fnv1_64, path_key};
use super::table::HandleTable;
use super::{FontHandle, ResourceError};

/// Registry key: the same file at two sizes is two fonts.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct FontKey {
    pub path: u64,
    pub size: u32,
}

/// Fonts rasterized to glyph atlases, keyed by `(path, pixel size)`.
#[derive(Debug)]
pub struct FontRegistry {
    table: RwLock<HandleTable<FontKey, FontAsset>>,
}

impl FontRegistry {
    pub fn new() -> Self {
        Self { table: RwLock::new(HandleTable::new()) }
    }

    pub fn len(&self) -> usize {
        self.table.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Loads a TrueType/OpenType file and rasterizes it at `size` pixels.
    pub fn try_load(&self, path: impl AsRef<Path>, size: u32) -> Result<FontHandle, ResourceError> {
        let path = path.as_ref();
        let key = FontKey { path: path_key(path), size };
        let existing = self.table.read().lookup(&key);
        if let Some(index) = existing {
            return Ok(FontHandle(index));
        }

        if size == 0 {
            return Err(ResourceError::decode(path, "font size must be positive"));
        }

        let bytes = std::fs::read(path).map_err(|e| ResourceError::io(path, e))?;
        let settings = fontdue::FontSettings {
            scale: size as f32,
            ..fontdue::FontSettings::default()
        };
        let font = fontdue::Font::from_bytes(bytes, settings)
            .map_err(|e| ResourceError::decode(path, e))?;

        let asset = rasterize_font(&font, size);
        log::debug!("loaded font {} at {size}px", path.display());

        self.table.write().insert(key, asset).map(FontHandle)
    }

    /// Like [`try_load`](Self::try_load), but logs failures and returns
    /// [`FontHandle::INVALID`].
    pub fn load(&self, path: impl AsRef<Path>, size: u32) -> FontHandle {
        self.try_load(path, size).unwrap_or_else(|e| {
            log::warn!("font load failed: {e}");
            FontHandle::INVALID
        })
    }

    /// Registers prepared metrics and atlas under `name`.
    pub fn insert(&self, name: &str, asset: FontAsset) -> Result<FontHandle, ResourceError> {
        let key = FontKey { path: fnv1_64(name.as_bytes()), size: asset.size };
        self.table.write().insert(key, asset).map(FontHandle)
    }

    pub fn get(&self, handle: FontHandle) -> Option<Arc<FontAsset>> {
        if !handle.is_valid() {
            return None;
        }
        self.table.read().get(handle.index())
    }

    /// Unscaled advance width of `text`; zero for unknown handles.
    pub fn measure_text(&self, handle: FontHandle, text: &str) -> f32 {
        self.get(handle).map_or(0.0, |font| font.metrics.measure(text))
    }
}

impl Default for FontRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::{FontMetrics, GlyphAtlas, GlyphInfo};

    fn synthetic(size: u32) -> FontAsset {
        let mut metrics = FontMetrics::new(size as f32, size as f32 * 0.8);
        metrics.insert('x', GlyphInfo::blank(4.0));
        FontAsset { metrics, atlas: GlyphAtlas::default(), size }
    }

    #[test]
    fn same_name_different_size_are_distinct() {
        let fonts = FontRegistry::new();
        let a = fonts.insert("mono", synthetic(12)).unwrap();
        let b = fonts.insert("mono", synthetic(24)).unwrap();
        let c = fonts.insert("mono", synthetic(12)).unwrap();
        assert_ne!(a, b);
        assert_eq!(a, c);
        assert_eq!(fonts.len(), 2);
    }

    #[test]
    fn measure_text_uses_advances() {
        let fonts = FontRegistry::new();
        let h = fonts.insert("mono", synthetic(12)).unwrap();
        assert_eq!(fonts.measure_text(h, "xxx"), 12.0);
        assert_eq!(fonts.measure_text(FontHandle::INVALID, "xxx"), 0.0);
    }

    #[test]
    fn missing_font_file_is_invalid() {
        let fonts = FontRegistry::new();
        assert_eq!(fonts.load("/no/such/font.ttf", 16), FontHandle::INVALID);
        assert!(fonts.is_empty());
    }

    #[test]
    fn non_font_bytes_fail_to_decode() {
        let path = std::env::temp_dir().join(format!("kiln-{}-bad.ttf", std::process::id()));
        std::fs::write(&path, b"definitely not a font").unwrap();
        let err = FontRegistry::new().try_load(&path, 16).unwrap_err();
        assert!(matches!(err, ResourceError::Decode { .. }));
        std::fs::remove_file(path).ok();
    }
}
