//! Configuration module for wobble-cube
//!
//! Holds the controller tunables (speeds, durations, tilt mode) and the
//! loading path: built-in defaults, an optional TOML file, then environment
//! overrides.

pub mod cube;

pub use cube::{load_config, ConfigError, CubeConfig, TransitionConfig, DEFAULT_CONFIG_FILE};
