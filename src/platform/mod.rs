//! Platform-specific Windows implementations
//!
//! This module encapsulates all Win32 API interactions: the host window that
//! clocks the controller, forwards keyboard and mouse input, and blits the
//! rendered cube.

pub mod window;
