//! Built-in command payloads.
//!
//! Payloads only describe *what* to draw; their [`RenderCommand`](super::RenderCommand)
//! impls live next to the back-end contract in `render::commands`.

mod draw;
mod draw_text;

pub use draw::DrawCommand;
pub use draw_text::DrawTextCommand;
