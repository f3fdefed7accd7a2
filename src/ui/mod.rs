//! Presentation layer
//!
//! The CSS style string is the widget's primary output; the tween and the
//! tiny-skia renderer turn the same orientation into pixels for native hosts.

pub mod renderer;
pub mod style;
pub mod tween;

pub use renderer::{CubeLayout, CubeRenderer, RendererError};
pub use style::CubeStyle;
pub use tween::OrientationTween;
