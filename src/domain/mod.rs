//! Domain logic and core data structures
//!
//! Pure math for the cube: geometry, orientation, the tilt wobble and the
//! easing curve. Nothing in here knows about time sources, windows or pixels
//! on screen.

pub mod core;
pub mod easing;
pub mod orientation;
pub mod wobble;
