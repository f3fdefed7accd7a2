//! Application orchestration layer
//!
//! This module coordinates between input, domain, UI, and platform layers.
//! It owns the cube controller, its timers and the headless demo driver.

pub mod controller;
pub mod headless;
pub mod scheduler;
pub mod state;

use crate::config::ConfigError;
use crate::ui::RendererError;

/// Top-level application errors
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Rendering failed: {0}")]
    Renderer(#[from] RendererError),
}
