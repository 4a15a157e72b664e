use crate::coords::Vec2;

use super::{FontAsset, FontMetrics, GlyphAtlas, GlyphInfo};

/// Largest atlas edge produced before falling back to the Latin subset.
const MAX_ATLAS_SIDE: u32 = 4096;

/// Last character kept by the Latin fallback (end of Latin Extended-B).
const LATIN_LAST: char = '\u{024F}';

/// Empty texels between neighbouring glyph cells.
const CELL_PADDING: u32 = 1;

/// Rasterizes every mapped character of `font` at `px` into a grid atlas.
///
/// Cells are sized to the largest glyph bitmap; the grid is as square as
/// possible. Fonts whose grid would exceed [`MAX_ATLAS_SIDE`] keep only
/// Basic Latin through Latin Extended-B.
pub fn rasterize_font(font: &fontdue::Font, px: u32) -> FontAsset {
    let size = px as f32;

    let mut chars: Vec<char> = font
        .chars()
        .keys()
        .copied()
        .filter(|c| !c.is_control())
        .collect();
    chars.sort_unstable();

    let rasterized: Vec<_> = chars.iter().map(|&c| (c, font.rasterize(c, size))).collect();
    let mut grid = GridLayout::for_glyphs(&rasterized);

    let rasterized = if grid.width > MAX_ATLAS_SIDE || grid.height > MAX_ATLAS_SIDE {
        log::warn!(
            "font atlas {}x{} exceeds {MAX_ATLAS_SIDE}; keeping Latin glyphs only",
            grid.width,
            grid.height
        );
        let latin: Vec<_> = rasterized.into_iter().filter(|(c, _)| *c <= LATIN_LAST).collect();
        grid = GridLayout::for_glyphs(&latin);
        latin
    } else {
        rasterized
    };

    let (line_height, ascent) = match font.horizontal_line_metrics(size) {
        Some(lm) => (lm.new_line_size, lm.ascent),
        None => (size * 1.2, size),
    };

    let mut metrics = FontMetrics::new(line_height, ascent);
    let mut atlas = GlyphAtlas {
        width: grid.width,
        height: grid.height,
        pixels: vec![0; grid.width as usize * grid.height as usize],
    };

    let (aw, ah) = (grid.width as f32, grid.height as f32);
    for (slot, (ch, (m, bitmap))) in rasterized.iter().enumerate() {
        let has_bitmap = m.width > 0 && m.height > 0;
        let mut glyph = GlyphInfo::blank(m.advance_width);

        if has_bitmap {
            let (x0, y0) = grid.cell_origin(slot as u32);
            blit(&mut atlas, bitmap, m.width, (x0, y0));

            glyph.has_bitmap = true;
            glyph.size = Vec2::new(m.width as f32, m.height as f32);
            glyph.bearing = Vec2::new(m.xmin as f32, (m.ymin + m.height as i32) as f32);
            glyph.uv_min = Vec2::new(x0 as f32 / aw, y0 as f32 / ah);
            glyph.uv_max = Vec2::new(
                (x0 + m.width as u32) as f32 / aw,
                (y0 + m.height as u32) as f32 / ah,
            );
        }
        metrics.insert(*ch, glyph);
    }

    log::debug!(
        "rasterized {} glyphs at {px}px into a {}x{} atlas",
        metrics.glyph_count(),
        atlas.width,
        atlas.height
    );

    FontAsset { metrics, atlas, size: px }
}

fn blit(atlas: &mut GlyphAtlas, bitmap: &[u8], width: usize, (x0, y0): (u32, u32)) {
    let stride = atlas.width as usize;
    for (row, src) in bitmap.chunks_exact(width).enumerate() {
        let start = (y0 as usize + row) * stride + x0 as usize;
        atlas.pixels[start..start + width].copy_from_slice(src);
    }
}

/// Square-ish grid of equal cells.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
struct GridLayout {
    columns: u32,
    cell_w: u32,
    cell_h: u32,
    width: u32,
    height: u32,
}

impl GridLayout {
    fn for_glyphs(glyphs: &[(char, (fontdue::Metrics, Vec<u8>))]) -> Self {
        let max_w = glyphs.iter().map(|(_, (m, _))| m.width as u32).max().unwrap_or(0);
        let max_h = glyphs.iter().map(|(_, (m, _))| m.height as u32).max().unwrap_or(0);
        Self::new(glyphs.len() as u32, max_w, max_h)
    }

    fn new(count: u32, max_w: u32, max_h: u32) -> Self {
        let count = count.max(1);
        let columns = (count as f32).sqrt().ceil() as u32;
        let rows = count.div_ceil(columns);
        let cell_w = max_w + CELL_PADDING;
        let cell_h = max_h + CELL_PADDING;
        Self {
            columns,
            cell_w,
            cell_h,
            width: (columns * cell_w).max(1),
            height: (rows * cell_h).max(1),
        }
    }

    fn cell_origin(&self, slot: u32) -> (u32, u32) {
        ((slot % self.columns) * self.cell_w, (slot / self.columns) * self.cell_h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_is_square_ish() {
        let g = GridLayout::new(10, 7, 9);
        assert_eq!(g.columns, 4);
        assert_eq!((g.cell_w, g.cell_h), (8, 10));
        assert_eq!((g.width, g.height), (32, 30));
        assert_eq!(g.cell_origin(5), (8, 10));
    }

    #[test]
    fn empty_grid_is_one_texel() {
        let g = GridLayout::new(0, 0, 0);
        assert_eq!((g.width, g.height), (1, 1));
    }

    #[test]
    fn blit_copies_rows_at_cell() {
        let mut atlas = GlyphAtlas { width: 4, height: 3, pixels: vec![0; 12] };
        blit(&mut atlas, &[1, 2, 3, 4], 2, (1, 1));
        assert_eq!(atlas.pixels, vec![0, 0, 0, 0, 0, 1, 2, 0, 0, 3, 4, 0]);
    }
}
