//! Colour representation shared by producers and renderers.
//!
//! Commands carry colours as a single packed `u32` so payloads stay plain
//! old data; dispatchers unpack to four floats right before binding instance
//! constants.

mod color;

pub use color::PackedColor;
