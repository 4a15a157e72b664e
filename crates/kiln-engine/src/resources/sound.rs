use std::path::Path;
use std::sync::Arc;

use parking_lot::RwLock;

use super::hash::path_key;
use super::table::HandleTable;
use super::{ResourceError, SoundHandle};

/// Uncompressed PCM sound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoundData {
    pub channels: u16,
    pub sample_rate: u32,
    pub bits_per_sample: u16,
    pub block_align: u16,
    /// Interleaved little-endian samples.
    pub samples: Vec<u8>,
}

impl SoundData {
    pub fn frame_count(&self) -> usize {
        if self.block_align == 0 {
            0
        } else {
            self.samples.len() / self.block_align as usize
        }
    }

    pub fn duration_secs(&self) -> f32 {
        if self.sample_rate == 0 {
            0.0
        } else {
            self.frame_count() as f32 / self.sample_rate as f32
        }
    }
}

const WAVE_FORMAT_PCM: u16 = 1;

/// Parses a RIFF/WAVE file holding PCM data.
pub fn parse_wav(bytes: &[u8]) -> Result<SoundData, &'static str> {
    let header = bytes.get(..12).ok_or("file shorter than RIFF header")?;
    if &header[..4] != b"RIFF" || &header[8..12] != b"WAVE" {
        return Err("not a RIFF/WAVE file");
    }

    let mut format = None;
    let mut rest = &bytes[12..];
    while rest.len() >= 8 {
        let id = &rest[..4];
        let len = u32::from_le_bytes([rest[4], rest[5], rest[6], rest[7]]) as usize;
        let body = rest.get(8..8 + len).ok_or("chunk extends past end of file")?;

        match id {
            b"fmt " => {
                if body.len() < 16 {
                    return Err("fmt chunk too short");
                }
                let u16_at = |i: usize| u16::from_le_bytes([body[i], body[i + 1]]);
                let u32_at = |i: usize| u32::from_le_bytes([body[i], body[i + 1], body[i + 2], body[i + 3]]);
                if u16_at(0) != WAVE_FORMAT_PCM {
                    return Err("only PCM wave data is supported");
                }
                format = Some((u16_at(2), u32_at(4), u16_at(12), u16_at(14)));
            }
            b"data" => {
                let (channels, sample_rate, block_align, bits_per_sample) =
                    format.ok_or("data chunk before fmt chunk")?;
                return Ok(SoundData {
                    channels,
                    sample_rate,
                    bits_per_sample,
                    block_align,
                    samples: body.to_vec(),
                });
            }
            _ => {}
        }

        // Chunks are padded to even sizes.
        let advance = (8 + len + (len & 1)).min(rest.len());
        rest = &rest[advance..];
    }

    Err("missing data chunk")
}

/// Sounds keyed by path hash.
#[derive(Debug)]
pub struct SoundRegistry {
    table: RwLock<HandleTable<u64, SoundData>>,
}

impl SoundRegistry {
    pub fn new() -> Self {
        Self { table: RwLock::new(HandleTable::new()) }
    }

    pub fn len(&self) -> usize {
        self.table.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn try_load(&self, path: impl AsRef<Path>) -> Result<SoundHandle, ResourceError> {
        let path = path.as_ref();
        let key = path_key(path);
        let existing = self.table.read().lookup(&key);
        if let Some(index) = existing {
            return Ok(SoundHandle(index));
        }

        let bytes = std::fs::read(path).map_err(|e| ResourceError::io(path, e))?;
        let sound = parse_wav(&bytes)
            .map_err(|reason| ResourceError::Malformed { path: path.to_path_buf(), reason })?;
        log::debug!(
            "loaded sound {} ({} ch, {} Hz, {:.2}s)",
            path.display(),
            sound.channels,
            sound.sample_rate,
            sound.duration_secs()
        );

        self.table.write().insert(key, sound).map(SoundHandle)
    }

    /// Like [`try_load`](Self::try_load), but logs failures and returns
    /// [`SoundHandle::INVALID`].
    pub fn load(&self, path: impl AsRef<Path>) -> SoundHandle {
        self.try_load(path).unwrap_or_else(|e| {
            log::error!("sound load failed: {e}");
            SoundHandle::INVALID
        })
    }

    pub fn get(&self, handle: SoundHandle) -> Option<Arc<SoundData>> {
        if !handle.is_valid() {
            return None;
        }
        self.table.read().get(handle.index())
    }
}

impl Default for SoundRegistry {
    fn default() -> Self {
        Self::new()
    }
}
