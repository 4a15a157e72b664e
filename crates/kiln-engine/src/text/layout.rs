use crate::coords::Vec2;

use super::FontMetrics;

/// Index value that restarts a triangle strip.
pub const STRIP_RESTART: u16 = 0xFFFF;

/// Vertices emitted per visible glyph.
pub const VERTICES_PER_GLYPH: usize = 4;

/// Indices emitted per visible glyph (a 4-index strip plus a restart).
pub const INDICES_PER_GLYPH: usize = 5;

/// Most glyphs one mesh can hold with u16 indices that never hit the restart value.
pub const MAX_GLYPHS_PER_MESH: usize = (STRIP_RESTART as usize) / VERTICES_PER_GLYPH;

/// Inputs of [`layout_text`].
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TextLayoutParams {
    /// Top-left of the first line.
    pub origin: Vec2,
    /// Wrap width measured from `origin.x`.
    pub width: f32,
    pub scale: f32,
    /// Multiplier applied to the font's line height.
    pub line_spacing: f32,
    /// Half-open range of character indices that produce quads.
    pub range_start: u32,
    pub range_end: u32,
}

impl Default for TextLayoutParams {
    fn default() -> Self {
        Self {
            origin: Vec2::zero(),
            width: f32::MAX,
            scale: 1.0,
            line_spacing: 1.0,
            range_start: 0,
            range_end: u32::MAX,
        }
    }
}

/// Reusable output buffers for text layout.
#[derive(Debug, Clone, Default)]
pub struct TextMesh {
    pub positions: Vec<Vec2>,
    pub texcoords: Vec<Vec2>,
    pub indices: Vec<u16>,
}

impl TextMesh {
    pub fn clear(&mut self) {
        self.positions.clear();
        self.texcoords.clear();
        self.indices.clear();
    }

    pub fn glyph_count(&self) -> usize {
        self.positions.len() / VERTICES_PER_GLYPH
    }
}

/// Summary of a layout pass.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TextLayout {
    /// Quads written to the mesh.
    pub glyphs: u32,
    /// Lines started, including the first.
    pub lines: u32,
    /// Top-left of where the next character would go.
    pub cursor: Vec2,
}

/// Lays out `text` into `mesh` (cleared first).
///
/// Rules:
/// - words are whitespace-delimited; before each word its scaled width is
///   measured and the line breaks if `pen + word > origin.x + width`
///   (a word that exactly fits stays); a word never breaks at a line start
/// - `\n` always starts a new line
/// - lines advance by `line_height * scale * line_spacing`
/// - only characters whose index is in `[range_start, range_end)` emit quads,
///   but every character advances the pen
///
/// Each quad is four vertices (top-left, top-right, bottom-left, bottom-right)
/// drawn as a triangle strip followed by [`STRIP_RESTART`].
pub fn layout_text(
    metrics: &FontMetrics,
    text: &str,
    params: &TextLayoutParams,
    mesh: &mut TextMesh,
) -> TextLayout {
    mesh.clear();

    let scale = params.scale;
    let line_advance = metrics.line_height * scale * params.line_spacing;
    let left = params.origin.x;
    let right = left + params.width;

    let mut pen = params.origin;
    let mut lines = 1;
    let mut at_word_start = true;
    let mut truncated = false;

    for (index, (byte, ch)) in text.char_indices().enumerate() {
        if ch == '\n' {
            pen = Vec2::new(left, pen.y + line_advance);
            lines += 1;
            at_word_start = true;
            continue;
        }

        if ch.is_whitespace() {
            at_word_start = true;
        } else if at_word_start {
            at_word_start = false;
            let word_width = measure_word(metrics, &text[byte..]) * scale;
            if pen.x > left && pen.x + word_width > right {
                pen = Vec2::new(left, pen.y + line_advance);
                lines += 1;
            }
        }

        let glyph = metrics.glyph(ch);
        let index = index as u32;
        let visible = glyph.has_bitmap && index >= params.range_start && index < params.range_end;

        if visible {
            if mesh.glyph_count() < MAX_GLYPHS_PER_MESH {
                let baseline = pen.y + metrics.ascent * scale;
                let x0 = pen.x + glyph.bearing.x * scale;
                let y0 = baseline - glyph.bearing.y * scale;
                let x1 = x0 + glyph.size.x * scale;
                let y1 = y0 + glyph.size.y * scale;
                push_quad(mesh, [x0, y0, x1, y1], glyph.uv_min, glyph.uv_max);
            } else if !truncated {
                truncated = true;
                log::warn!("text layout: more than {MAX_GLYPHS_PER_MESH} glyphs, rest not drawn");
            }
        }

        pen.x += glyph.advance * scale;
    }

    TextLayout {
        glyphs: mesh.glyph_count() as u32,
        lines,
        cursor: pen,
    }
}

/// Unscaled advance width of the word at the start of `text`.
fn measure_word(metrics: &FontMetrics, text: &str) -> f32 {
    text.chars()
        .take_while(|c| !c.is_whitespace())
        .map(|c| metrics.glyph(c).advance)
        .sum()
}

fn push_quad(mesh: &mut TextMesh, [x0, y0, x1, y1]: [f32; 4], uv_min: Vec2, uv_max: Vec2) {
    let base = mesh.positions.len() as u16;

    mesh.positions.extend_from_slice(&[
        Vec2::new(x0, y0),
        Vec2::new(x1, y0),
        Vec2::new(x0, y1),
        Vec2::new(x1, y1),
    ]);
    mesh.texcoords.extend_from_slice(&[
        Vec2::new(uv_min.x, uv_min.y),
        Vec2::new(uv_max.x, uv_min.y),
        Vec2::new(uv_min.x, uv_max.y),
        Vec2::new(uv_max.x, uv_max.y),
    ]);
    mesh.indices
        .extend_from_slice(&[base, base + 1, base + 2, base + 3, STRIP_RESTART]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::GlyphInfo;

    /// Monospace-ish metrics: every letter is a 10px-wide, 10px-advance box;
    /// '.' advances 1px; ' ' advances 0.
    fn metrics() -> FontMetrics {
        let mut m = FontMetrics::new(20.0, 16.0);
        let boxed = |advance: f32| GlyphInfo {
            uv_min: Vec2::new(0.0, 0.0),
            uv_max: Vec2::new(0.5, 0.5),
            size: Vec2::new(advance, 12.0),
            bearing: Vec2::new(0.0, 12.0),
            advance,
            has_bitmap: true,
        };
        for c in 'a'..='z' {
            m.insert(c, boxed(10.0));
        }
        m.insert('.', boxed(1.0));
        m.insert(' ', GlyphInfo::blank(0.0));
        m
    }

    fn params(width: f32) -> TextLayoutParams {
        TextLayoutParams { width, ..TextLayoutParams::default() }
    }

    fn first_x_of_line(mesh: &TextMesh, glyph: usize) -> (f32, f32) {
        let p = mesh.positions[glyph * VERTICES_PER_GLYPH];
        (p.x, p.y)
    }

    // ── wrap boundary ─────────────────────────────────────────────────────

    #[test]
    fn word_exactly_filling_the_line_does_not_wrap() {
        // 9 letters put the pen at 90; the next word is 10 wide.
        let mut mesh = TextMesh::default();
        let out = layout_text(&metrics(), "aaaaaaaaa b", &params(100.0), &mut mesh);
        assert_eq!(out.lines, 1);
        assert_eq!(first_x_of_line(&mesh, 9), (90.0, 4.0));
    }

    #[test]
    fn word_one_pixel_too_wide_wraps() {
        // Pen at 90; "b." is 11 wide.
        let mut mesh = TextMesh::default();
        let out = layout_text(&metrics(), "aaaaaaaaa b.", &params(100.0), &mut mesh);
        assert_eq!(out.lines, 2);
        assert_eq!(first_x_of_line(&mesh, 9), (0.0, 24.0));
    }

    #[test]
    fn long_word_at_line_start_is_not_pushed_down() {
        let mut mesh = TextMesh::default();
        let out = layout_text(&metrics(), "aaaaaaaaaaaa", &params(50.0), &mut mesh);
        assert_eq!(out.lines, 1);
        assert_eq!(out.glyphs, 12);
    }

    // ── newlines / spacing ────────────────────────────────────────────────

    #[test]
    fn newline_uses_scaled_line_spacing() {
        let mut mesh = TextMesh::default();
        let p = TextLayoutParams {
            origin: Vec2::new(5.0, 7.0),
            scale: 2.0,
            line_spacing: 1.5,
            ..TextLayoutParams::default()
        };
        let out = layout_text(&metrics(), "a\nb", &p, &mut mesh);
        assert_eq!(out.lines, 2);
        // line advance = 20 * 2 * 1.5
        let (x, y) = first_x_of_line(&mesh, 1);
        assert_eq!(x, 5.0);
        assert_eq!(y, 7.0 + 60.0 + (16.0 - 12.0) * 2.0);
    }

    // ── range reveal ──────────────────────────────────────────────────────

    #[test]
    fn range_limits_quads_but_not_pen() {
        let mut mesh = TextMesh::default();
        let p = TextLayoutParams { range_start: 2, range_end: 5, ..TextLayoutParams::default() };
        let out = layout_text(&metrics(), "abcdefghij", &p, &mut mesh);

        assert_eq!(out.glyphs, 3);
        assert_eq!(mesh.positions.len(), 12);
        assert_eq!(mesh.indices.len(), 15);
        let xs: Vec<f32> = (0..3).map(|g| first_x_of_line(&mesh, g).0).collect();
        assert_eq!(xs, vec![20.0, 30.0, 40.0]);
        assert_eq!(out.cursor.x, 100.0);
    }

    // ── mesh shape ────────────────────────────────────────────────────────

    #[test]
    fn strip_indices_restart_after_each_glyph() {
        let mut mesh = TextMesh::default();
        layout_text(&metrics(), "ab", &TextLayoutParams::default(), &mut mesh);
        assert_eq!(mesh.indices, vec![0, 1, 2, 3, STRIP_RESTART, 4, 5, 6, 7, STRIP_RESTART]);
        assert_eq!(mesh.texcoords[3], Vec2::new(0.5, 0.5));
    }

    #[test]
    fn whitespace_emits_no_quads() {
        let mut mesh = TextMesh::default();
        let out = layout_text(&metrics(), "a b", &TextLayoutParams::default(), &mut mesh);
        assert_eq!(out.glyphs, 2);
    }

    #[test]
    fn layout_is_deterministic() {
        let m = metrics();
        let p = params(64.0);
        let text = "the quick brown fox\njumps over the lazy dog";
        let (mut a, mut b) = (TextMesh::default(), TextMesh::default());
        let la = layout_text(&m, text, &p, &mut a);
        let lb = layout_text(&m, text, &p, &mut b);
        assert_eq!(la, lb);
        assert_eq!(a.positions, b.positions);
        assert_eq!(a.indices, b.indices);
    }

    #[test]
    fn mesh_is_cleared_between_runs() {
        let mut mesh = TextMesh::default();
        layout_text(&metrics(), "abc", &TextLayoutParams::default(), &mut mesh);
        layout_text(&metrics(), "a", &TextLayoutParams::default(), &mut mesh);
        assert_eq!(mesh.glyph_count(), 1);
    }
}
