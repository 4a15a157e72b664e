//! Engine-facing game contract.
//!
//! Defines the interface between the frame loop and game code and the
//! per-callback contexts handed to it, so games never see runtime internals.

mod app;
mod ctx;

pub use app::{Game, GameControl};
pub use ctx::{DrawCtx, TickCtx};
