//! Input translation
//!
//! Turns raw host input (virtual keys, key names, pointer moves) into the
//! events the orientation controller consumes.

pub mod keyboard;
pub mod pointer;

pub use keyboard::KeyEvent;
pub use pointer::{PointerEvent, PointerTracker};
