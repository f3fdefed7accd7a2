//! Headless driver
//!
//! Steps the controller with a synthetic frame clock and a script of timed
//! inputs. Used by the demo binary on hosts without a window and by tests
//! that need whole interaction sequences.

use std::time::Duration;

use tiny_skia::Pixmap;
use tracing::{debug, info};

use crate::app::controller::CubeController;
use crate::app::AppError;
use crate::config::CubeConfig;
use crate::domain::core::Rect;
use crate::domain::orientation::Orientation;
use crate::input::{KeyEvent, PointerEvent};
use crate::ui::{CubeLayout, CubeRenderer, CubeStyle, OrientationTween};

/// Input injected by a script
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScriptedInput {
    Key(KeyEvent),
    Pointer(PointerEvent),
}

/// An input at a point in time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScriptStep {
    pub at: Duration,
    pub input: ScriptedInput,
}

impl ScriptStep {
    /// Key press by DOM key name, e.g. `ArrowLeft`
    pub fn key(at_ms: u64, name: &str) -> Self {
        Self {
            at: Duration::from_millis(at_ms),
            input: ScriptedInput::Key(KeyEvent::from_key_name(name)),
        }
    }

    pub fn pointer(at_ms: u64, event: PointerEvent) -> Self {
        Self {
            at: Duration::from_millis(at_ms),
            input: ScriptedInput::Pointer(event),
        }
    }
}

/// What one frame looked like
#[derive(Debug, Clone, PartialEq)]
pub struct FrameRecord {
    pub at: Duration,
    pub style: CubeStyle,
    /// Orientation after the transition tween
    pub displayed: Orientation,
    pub manual: bool,
}

/// A short tour: hover, two right steps, a key the cube ignores, one left step
pub fn demo_script() -> Vec<ScriptStep> {
    vec![
        ScriptStep::pointer(1_500, PointerEvent::Enter),
        ScriptStep::pointer(1_700, PointerEvent::Leave),
        ScriptStep::key(3_000, "ArrowRight"),
        ScriptStep::key(3_200, "ArrowRight"),
        ScriptStep::key(4_000, "Enter"),
        ScriptStep::key(6_000, "ArrowLeft"),
    ]
}

/// Drives a controller without a window
#[derive(Debug)]
pub struct HeadlessDriver {
    controller: CubeController,
    tween: OrientationTween,
    frame_interval: Duration,
    now: Duration,
}

impl HeadlessDriver {
    /// Default frame interval, roughly 60 Hz
    pub const FRAME_INTERVAL: Duration = Duration::from_millis(16);

    pub fn new(config: CubeConfig, frame_interval: Duration) -> Result<Self, AppError> {
        let controller = CubeController::mount(config, Duration::ZERO)?;
        let tween = OrientationTween::new(controller.orientation());
        Ok(Self {
            controller,
            tween,
            frame_interval: frame_interval.max(Duration::from_millis(1)),
            now: Duration::ZERO,
        })
    }

    /// Runs frames until `until`, applying script inputs at their exact times
    ///
    /// Inputs that share a time with a frame are applied before the frame.
    /// Steps before the current time are applied immediately.
    pub fn run(&mut self, script: &[ScriptStep], until: Duration) -> Vec<FrameRecord> {
        let mut steps: Vec<ScriptStep> = script.to_vec();
        steps.sort_by_key(|step| step.at);
        let mut steps = steps.into_iter().peekable();

        let mut records = Vec::new();
        let mut next_frame = self.now;

        while next_frame <= until {
            while let Some(step) = steps.next_if(|step| step.at <= next_frame) {
                self.apply(step);
            }

            self.now = next_frame;
            self.controller.advance(self.now);
            let style = self.controller.render();
            let displayed = self.tween.update(&style, self.now);
            records.push(FrameRecord {
                at: self.now,
                style,
                displayed,
                manual: self.controller.mode().is_manual(),
            });

            next_frame += self.frame_interval;
        }

        // Inputs after the last frame but inside the window still land
        for step in steps.take_while(|step| step.at <= until) {
            self.apply(step);
        }

        info!(
            frames = records.len(),
            spin = self.controller.orientation().normalized_spin(),
            "headless run finished"
        );
        records
    }

    fn apply(&mut self, step: ScriptStep) {
        let at = step.at.max(self.now);
        let handled = match step.input {
            ScriptedInput::Key(key) => self.controller.handle_key(key, at),
            ScriptedInput::Pointer(event) => self.controller.handle_pointer(event, at),
        };
        debug!(?step.input, at_ms = at.as_millis() as u64, handled, "scripted input");
    }

    /// Renders what is currently on screen
    pub fn snapshot(&self, renderer: &CubeRenderer, canvas: Rect) -> Result<Pixmap, AppError> {
        let layout = CubeLayout::from_orientation(self.tween.displayed(), canvas, 1.0);
        Ok(renderer.render_layout(&layout)?)
    }

    pub fn controller(&self) -> &CubeController {
        &self.controller
    }
}
