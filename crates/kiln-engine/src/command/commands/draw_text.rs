use bytemuck::{Pod, Zeroable};

use crate::command::ArenaSlice;
use crate::paint::PackedColor;
use crate::resources::FontHandle;
use crate::text::TextLayoutParams;
use crate::coords::Vec2;

/// Text draw: UTF-8 bytes in the arena, laid out at execution time.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct DrawTextCommand {
    pub text: ArenaSlice,
    pub font: FontHandle,
    pub color: PackedColor,
    pub x: f32,
    pub y: f32,
    /// Wrap width in pixels.
    pub width: f32,
    pub scale: f32,
    /// Multiplier on the font's line height.
    pub line_spacing: f32,
    /// First visible character.
    pub range_start: u32,
    /// One past the last visible character.
    pub range_end: u32,
}

impl Default for DrawTextCommand {
    fn default() -> Self {
        Self {
            text: ArenaSlice::EMPTY,
            font: FontHandle::INVALID,
            color: PackedColor::WHITE,
            x: 0.0,
            y: 0.0,
            width: f32::MAX,
            scale: 1.0,
            line_spacing: 1.0,
            range_start: 0,
            range_end: u32::MAX,
        }
    }
}

impl DrawTextCommand {
    pub fn layout_params(&self) -> TextLayoutParams {
        TextLayoutParams {
            origin: Vec2::new(self.x, self.y),
            width: self.width,
            scale: self.scale,
            line_spacing: self.line_spacing,
            range_start: self.range_start,
            range_end: self.range_end,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_params_match_layout_defaults() {
        assert_eq!(DrawTextCommand::default().layout_params(), TextLayoutParams::default());
    }
}
