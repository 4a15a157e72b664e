use std::collections::HashMap;

use crate::coords::Vec2;

/// Placement and atlas coordinates of one rasterized glyph, in font pixels.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct GlyphInfo {
    pub uv_min: Vec2,
    pub uv_max: Vec2,
    /// Bitmap size.
    pub size: Vec2,
    /// `x`: offset from the pen to the bitmap's left edge.
    /// `y`: distance from the baseline up to the bitmap's top edge.
    pub bearing: Vec2,
    /// Horizontal pen advance.
    pub advance: f32,
    /// Whitespace and empty glyphs advance the pen but have no quad.
    pub has_bitmap: bool,
}

impl GlyphInfo {
    /// Glyph that only moves the pen.
    pub fn blank(advance: f32) -> Self {
        Self { advance, ..Self::default() }
    }
}

/// Per-font glyph table and vertical metrics.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FontMetrics {
    glyphs: HashMap<char, GlyphInfo>,
    /// Baseline-to-baseline distance.
    pub line_height: f32,
    /// Line top to baseline.
    pub ascent: f32,
}

impl FontMetrics {
    pub fn new(line_height: f32, ascent: f32) -> Self {
        Self { glyphs: HashMap::new(), line_height, ascent }
    }

    pub fn insert(&mut self, ch: char, glyph: GlyphInfo) {
        self.glyphs.insert(ch, glyph);
    }

    /// Characters without an entry read as a zero-advance blank.
    #[inline]
    pub fn glyph(&self, ch: char) -> GlyphInfo {
        self.glyphs.get(&ch).copied().unwrap_or_default()
    }

    pub fn glyph_count(&self) -> usize {
        self.glyphs.len()
    }

    /// Sum of advances of `text`, unscaled. Newlines are not special.
    pub fn measure(&self, text: &str) -> f32 {
        text.chars().map(|c| self.glyph(c).advance).sum()
    }
}

/// Single-channel coverage atlas for a font.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GlyphAtlas {
    pub width: u32,
    pub height: u32,
    /// Row-major R8 coverage.
    pub pixels: Vec<u8>,
}

/// Everything the font registry stores per loaded font.
#[derive(Debug, Clone, PartialEq)]
pub struct FontAsset {
    pub metrics: FontMetrics,
    pub atlas: GlyphAtlas,
    /// Pixel size the font was rasterized at.
    pub size: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn measure_sums_advances_and_ignores_unknown() {
        let mut m = FontMetrics::new(12.0, 9.0);
        m.insert('a', GlyphInfo::blank(5.0));
        m.insert('b', GlyphInfo::blank(7.5));
        assert_eq!(m.measure("abba"), 25.0);
        assert_eq!(m.measure("a\u{2603}"), 5.0);
    }
}
