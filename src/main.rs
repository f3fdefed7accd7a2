use std::path::PathBuf;
use std::time::Duration;

use tracing::info;
use tracing_subscriber::EnvFilter;

use wobble_cube::app::headless::{demo_script, HeadlessDriver};
use wobble_cube::config::{load_config, CubeConfig};
use wobble_cube::domain::core::Rect;
use wobble_cube::ui::CubeRenderer;

/// Length of the scripted headless demo
const DEMO_LENGTH: Duration = Duration::from_secs(8);

/// Canvas used for headless snapshots
const SNAPSHOT_SIZE: (i32, i32) = (480, 480);

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = load_config(None)?;
    info!(
        spin_speed = config.spin_speed,
        step_degrees = config.step_degrees,
        resume_delay_ms = config.resume_delay.as_millis() as u64,
        "configuration loaded"
    );

    let snapshot = std::env::args().nth(1).map(PathBuf::from);
    run(config, snapshot)
}

#[cfg(windows)]
fn run(config: CubeConfig, snapshot: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    // A snapshot path asks for the headless run even where a window is available
    if let Some(path) = snapshot {
        return run_headless(config, Some(path));
    }
    wobble_cube::platform::window::run(config)?;
    Ok(())
}

#[cfg(not(windows))]
fn run(config: CubeConfig, snapshot: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    run_headless(config, snapshot)
}

/// Plays the demo script against a synthetic clock
fn run_headless(config: CubeConfig, snapshot: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    info!("running headless demo");

    let mut driver = HeadlessDriver::new(config, HeadlessDriver::FRAME_INTERVAL)?;
    let records = driver.run(&demo_script(), DEMO_LENGTH);

    // One line per mode change plus a sample every second
    let mut last_manual = false;
    let mut next_sample = Duration::ZERO;
    for record in &records {
        if record.manual != last_manual || record.at >= next_sample {
            info!(
                at_ms = record.at.as_millis() as u64,
                manual = record.manual,
                style = %record.style.inline_style(),
                "frame"
            );
            last_manual = record.manual;
            while next_sample <= record.at {
                next_sample += Duration::from_secs(1);
            }
        }
    }

    if let Some(path) = snapshot {
        let renderer = CubeRenderer::with_system_font();
        if !renderer.has_font() {
            info!("no label font available, snapshot faces are unlabelled");
        }
        let canvas = Rect::new(0, 0, SNAPSHOT_SIZE.0, SNAPSHOT_SIZE.1);
        let pixmap = driver.snapshot(&renderer, canvas)?;
        renderer.save_snapshot(&pixmap, &path)?;
        info!(path = %path.display(), "snapshot written");
    }

    Ok(())
}
