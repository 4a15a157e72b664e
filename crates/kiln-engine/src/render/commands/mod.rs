//! [`RenderCommand`](crate::command::RenderCommand) impls of the built-in payloads.

mod draw;
mod text;

use crate::paint::PackedColor;

use super::BlendState;

/// Blend state for a draw: transparent when the colour is partially
/// transparent or the bound texture has a semitransparent texel.
pub fn blend_for(color: PackedColor, semitransparent_texture: bool) -> BlendState {
    if color.is_partially_transparent() || semitransparent_texture {
        BlendState::Transparent
    } else {
        BlendState::Opaque
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blend_rule() {
        assert_eq!(blend_for(PackedColor::WHITE, false), BlendState::Opaque);
        assert_eq!(blend_for(PackedColor::from_rgba_u8(0, 0, 0, 0), false), BlendState::Opaque);
        assert_eq!(blend_for(PackedColor::from_rgba_u8(0, 0, 0, 1), false), BlendState::Transparent);
        assert_eq!(blend_for(PackedColor::from_rgba_u8(0, 0, 0, 254), false), BlendState::Transparent);
        assert_eq!(blend_for(PackedColor::WHITE, true), BlendState::Transparent);
    }
}
