use bytemuck::{Pod, Zeroable};

macro_rules! resource_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[repr(transparent)]
        #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Pod, Zeroable)]
        pub struct $name(pub u32);

        impl $name {
            /// Sentinel returned by failed loads; never resolves.
            pub const INVALID: Self = Self(u32::MAX);

            #[inline]
            pub const fn is_valid(self) -> bool {
                self.0 != u32::MAX
            }

            #[inline]
            pub(crate) const fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::INVALID
            }
        }
    };
}

resource_handle!(
    /// Handle to a texture in the [`TextureRegistry`](super::TextureRegistry).
    TextureHandle
);
resource_handle!(
    /// Handle to a rasterized font in the [`FontRegistry`](super::FontRegistry).
    FontHandle
);
resource_handle!(
    /// Handle to a decoded sound in the [`SoundRegistry`](super::SoundRegistry).
    SoundHandle
);
resource_handle!(
    /// Handle to an effect definition in the [`EffectRegistry`](super::EffectRegistry).
    EffectHandle
);
