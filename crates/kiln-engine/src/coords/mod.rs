//! Coordinate and geometry types used by commands and renderers.
//!
//! Canonical CPU space:
//! - drawable pixels
//! - origin top-left
//! - +X right, +Y down
//!
//! Renderers map this space to clip space with a view matrix derived from the
//! drawable size; per-draw transforms are applied before it.

mod transform;
mod vec2;

pub use transform::Transform;
pub use vec2::Vec2;
