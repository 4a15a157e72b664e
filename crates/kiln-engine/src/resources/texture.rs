use std::path::Path;
use std::sync::Arc;

use parking_lot::RwLock;

use super::hash::{fnv1_64, path_key};
use super::table::HandleTable;
use super::{ResourceError, TextureHandle};

/// Decoded RGBA8 image.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureData {
    pub width: u32,
    pub height: u32,
    /// Row-major, tightly packed RGBA8.
    pub pixels: Vec<u8>,
    /// True when any texel has alpha strictly between 0 and 255.
    pub semitransparent: bool,
    /// Bumped each time the registry replaces this texture's pixels.
    pub generation: u32,
}

impl TextureData {
    pub fn from_rgba8(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, ResourceError> {
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(4));
        if width == 0 || height == 0 || expected != Some(pixels.len()) {
            return Err(ResourceError::Dimensions { width, height, len: pixels.len() });
        }

        let semitransparent = has_semitransparent_texel(&pixels);
        Ok(Self { width, height, pixels, semitransparent, generation: 0 })
    }

    /// Decodes PNG or BMP bytes. `path` is only used for error reporting.
    pub fn decode(path: &Path, bytes: &[u8]) -> Result<Self, ResourceError> {
        let image = image::load_from_memory(bytes).map_err(|e| ResourceError::decode(path, e))?;
        let rgba = image.to_rgba8();
        let (width, height) = rgba.dimensions();
        Self::from_rgba8(width, height, rgba.into_raw())
    }
}

fn has_semitransparent_texel(pixels: &[u8]) -> bool {
    pixels.chunks_exact(4).any(|px| px[3] != 0 && px[3] != 255)
}

/// Textures keyed by path hash.
///
/// Loading the same path twice returns the same handle without touching the
/// file system again. Decoding happens outside the lock.
#[derive(Debug)]
pub struct TextureRegistry {
    table: RwLock<HandleTable<u64, TextureData>>,
}

impl TextureRegistry {
    pub fn new() -> Self {
        Self { table: RwLock::new(HandleTable::new()) }
    }

    pub fn len(&self) -> usize {
        self.table.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn try_load(&self, path: impl AsRef<Path>) -> Result<TextureHandle, ResourceError> {
        let path = path.as_ref();
        let key = path_key(path);
        let existing = self.table.read().lookup(&key);
        if let Some(index) = existing {
            return Ok(TextureHandle(index));
        }

        let bytes = std::fs::read(path).map_err(|e| ResourceError::io(path, e))?;
        let data = TextureData::decode(path, &bytes)?;
        log::debug!("loaded texture {} ({}x{})", path.display(), data.width, data.height);

        self.table.write().insert(key, data).map(TextureHandle)
    }

    /// Like [`try_load`](Self::try_load), but logs failures and returns
    /// [`TextureHandle::INVALID`].
    pub fn load(&self, path: impl AsRef<Path>) -> TextureHandle {
        let path = path.as_ref();
        self.try_load(path).unwrap_or_else(|e| {
            log::warn!("texture load failed: {e}");
            TextureHandle::INVALID
        })
    }

    /// Registers already-decoded pixels under `name`.
    pub fn insert_rgba8(
        &self,
        name: &str,
        width: u32,
        height: u32,
        pixels: Vec<u8>,
    ) -> Result<TextureHandle, ResourceError> {
        let data = TextureData::from_rgba8(width, height, pixels)?;
        self.table.write().insert(fnv1_64(name.as_bytes()), data).map(TextureHandle)
    }

    /// Re-reads `path` and replaces the pixels behind its existing handle.
    ///
    /// Unknown paths are loaded as new textures.
    pub fn reload(&self, path: impl AsRef<Path>) -> Result<TextureHandle, ResourceError> {
        let path = path.as_ref();
        let existing = self.table.read().lookup(&path_key(path));
        let Some(index) = existing else {
            return self.try_load(path);
        };

        let bytes = std::fs::read(path).map_err(|e| ResourceError::io(path, e))?;
        let mut data = TextureData::decode(path, &bytes)?;

        let mut table = self.table.write();
        data.generation = table
            .get(index as usize)
            .map_or(0, |old| old.generation.wrapping_add(1));
        table.replace(index as usize, data);
        log::info!("reloaded texture {}", path.display());
        Ok(TextureHandle(index))
    }

    pub fn get(&self, handle: TextureHandle) -> Option<Arc<TextureData>> {
        if !handle.is_valid() {
            return None;
        }
        self.table.read().get(handle.index())
    }

    pub fn is_semitransparent(&self, handle: TextureHandle) -> bool {
        self.get(handle).is_some_and(|t| t.semitransparent)
    }
}

impl Default for TextureRegistry {
    fn default() -> Self {
        Self::new()
    }
}
