//! wobble-cube
//!
//! A 3D cube widget that spins on its own, tilts back and forth on a slow
//! wobble, and hands control to the user on arrow keys or hover.

pub mod app;
pub mod config;
pub mod domain;
pub mod input;
pub mod ui;

#[cfg(windows)]
pub mod platform;
