use bytemuck::{Pod, Zeroable};

/// 32-bit RGBA colour, one byte per channel.
///
/// Layout (least significant byte first): `r | g << 8 | b << 16 | a << 24`.
/// Channels are straight (not premultiplied) alpha.
#[repr(transparent)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Pod, Zeroable)]
pub struct PackedColor(pub u32);

impl PackedColor {
    pub const WHITE: Self = Self(0xffff_ffff);
    pub const BLACK: Self = Self(0xff00_0000);
    pub const TRANSPARENT: Self = Self(0);

    #[inline]
    pub const fn from_rgba_u8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self(r as u32 | (g as u32) << 8 | (b as u32) << 16 | (a as u32) << 24)
    }

    /// Packs float channels in `[0, 1]`.
    ///
    /// Out-of-range inputs are clamped; conversion truncates (`0.999` maps to
    /// 254, not 255).
    #[inline]
    pub fn from_rgba_f32(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self::from_rgba_u8(to_byte(r), to_byte(g), to_byte(b), to_byte(a))
    }

    #[inline]
    pub const fn to_rgba_u8(self) -> [u8; 4] {
        self.0.to_le_bytes()
    }

    /// Unpacks to `[r, g, b, a]`, each channel divided by 255.
    #[inline]
    pub fn to_rgba_f32(self) -> [f32; 4] {
        let [r, g, b, a] = self.to_rgba_u8();
        [
            r as f32 / 255.0,
            g as f32 / 255.0,
            b as f32 / 255.0,
            a as f32 / 255.0,
        ]
    }

    #[inline]
    pub const fn alpha(self) -> u8 {
        (self.0 >> 24) as u8
    }

    /// True when alpha is neither fully transparent nor fully opaque.
    ///
    /// Renderers switch to the transparent blend state for these colours.
    /// Fully transparent (`a == 0`) colours keep the opaque state.
    #[inline]
    pub const fn is_partially_transparent(self) -> bool {
        let a = self.alpha();
        a > 0 && a < 255
    }
}

impl Default for PackedColor {
    fn default() -> Self {
        Self::WHITE
    }
}

impl From<[u8; 4]> for PackedColor {
    fn from([r, g, b, a]: [u8; 4]) -> Self {
        Self::from_rgba_u8(r, g, b, a)
    }
}

#[inline]
fn to_byte(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0) as u8
}
