//! Text support: font metrics, glyph atlases and layout.
//!
//! Layout is a pure function of metrics, string and parameters; the text
//! dispatcher calls it every frame into a reused [`TextMesh`].

mod font;
mod layout;
mod raster;

pub use font::{FontAsset, FontMetrics, GlyphAtlas, GlyphInfo};
pub use layout::{
    layout_text, TextLayout, TextLayoutParams, TextMesh, INDICES_PER_GLYPH, MAX_GLYPHS_PER_MESH,
    STRIP_RESTART, VERTICES_PER_GLYPH,
};
pub use raster::rasterize_font;
