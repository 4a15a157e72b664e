//! Process-lifetime resource registries.
//!
//! Every registry maps a 64-bit content key to a dense `u32` handle. Loads are
//! idempotent by key, failed loads are not cached, and entries are never
//! evicted. Registries are internally locked, so a `Resources` can be shared
//! between the game thread and the render thread behind an `Arc`.

mod effect;
mod error;
mod font;
mod handle;
mod hash;
mod sound;
mod table;
mod texture;

use std::path::Path;

pub use effect::{EffectDesc, EffectRegistry, ParticleSet, MAX_PARTICLES};
pub use error::ResourceError;
pub use font::{FontKey, FontRegistry};
pub use handle::{EffectHandle, FontHandle, SoundHandle, TextureHandle};
pub use hash::{fnv1_64, path_key};
pub use sound::{parse_wav, SoundData, SoundRegistry};
pub use texture::{TextureData, TextureRegistry};

/// All registries the engine knows about.
#[derive(Debug, Default)]
pub struct Resources {
    textures: TextureRegistry,
    fonts: FontRegistry,
    sounds: SoundRegistry,
    effects: EffectRegistry,
}

impl Resources {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn textures(&self) -> &TextureRegistry {
        &self.textures
    }

    pub fn fonts(&self) -> &FontRegistry {
        &self.fonts
    }

    pub fn sounds(&self) -> &SoundRegistry {
        &self.sounds
    }

    pub fn effects(&self) -> &EffectRegistry {
        &self.effects
    }

    pub fn load_texture(&self, path: impl AsRef<Path>) -> TextureHandle {
        self.textures.load(path)
    }

    pub fn load_font(&self, path: impl AsRef<Path>, size: u32) -> FontHandle {
        self.fonts.load(path, size)
    }

    pub fn load_sound(&self, path: impl AsRef<Path>) -> SoundHandle {
        self.sounds.load(path)
    }

    pub fn load_effect(&self, path: impl AsRef<Path>) -> EffectHandle {
        self.effects.load(path)
    }
}
