//! Orientation controller
//!
//! Owns the cube orientation, the animation mode and every timer that moves
//! the cube between modes. Hosts feed it the current time and input events;
//! it never reads a clock on its own.

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::app::scheduler::{Scheduler, TaskId};
use crate::app::state::{Mode, StateEvent, StateMachine};
use crate::config::{ConfigError, CubeConfig};
use crate::domain::orientation::Orientation;
use crate::input::{KeyEvent, PointerEvent};
use crate::ui::style::CubeStyle;

/// One-shot timers the controller schedules
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerTask {
    /// Hand control back to the animation
    ResumeAuto,
    /// Drop the eased transition after a manual step
    ClearTransition,
}

/// Milliseconds as used by the wobble math
fn millis(time: Duration) -> f64 {
    time.as_nanos() as f64 / 1_000_000.0
}

/// The cube's orientation controller
#[derive(Debug)]
pub struct CubeController {
    config: CubeConfig,
    orientation: Orientation,
    mode: Mode,
    /// Wobble time origin in milliseconds
    phase_offset_ms: f64,
    /// True while the eased transition style is applied
    manual_transition: bool,
    scheduler: Scheduler<TimerTask>,
    resume_timer: Option<TaskId>,
    transition_timer: Option<TaskId>,
    mounted: bool,
}

impl CubeController {
    /// Creates the controller in auto mode and subscribes to animation frames
    ///
    /// # Arguments
    /// * `config` - Tunables; validated before anything is set up
    /// * `now` - Host time at mount
    pub fn mount(config: CubeConfig, now: Duration) -> Result<Self, ConfigError> {
        config.validate()?;

        let phase_offset_ms = 0.0;
        let orientation = Orientation::new(
            config.tilt.tilt_at(millis(now), phase_offset_ms),
            config.initial_spin,
        );

        let mut scheduler = Scheduler::new();
        scheduler.subscribe_frames();

        info!(
            tilt = orientation.x,
            spin = orientation.y,
            "cube controller mounted in auto mode"
        );

        Ok(Self {
            config,
            orientation,
            mode: Mode::default(),
            phase_offset_ms,
            manual_transition: false,
            scheduler,
            resume_timer: None,
            transition_timer: None,
            mounted: true,
        })
    }

    /// Runs due timers, then one animation frame if subscribed
    pub fn advance(&mut self, now: Duration) {
        if !self.mounted {
            return;
        }

        self.fire_due(now);
        if self.scheduler.frames_active() {
            self.animate(now);
        }
    }

    /// Handles a key press; returns false for keys the cube ignores
    pub fn handle_key(&mut self, key: KeyEvent, now: Duration) -> bool {
        let KeyEvent::Spin(direction) = key else {
            return false;
        };
        if !self.mounted {
            return false;
        }

        self.fire_due(now);
        if self.interact(now) {
            // Keydown freezes also move the wobble origin to the freeze time
            self.phase_offset_ms = millis(now);
        }

        self.orientation.spin_by(direction.sign() * self.config.step_degrees);
        self.manual_transition = true;
        if let Some(id) = self.transition_timer.take() {
            self.scheduler.cancel(id);
        }
        self.transition_timer = Some(self.scheduler.schedule_after(
            now,
            self.config.transition.duration,
            TimerTask::ClearTransition,
        ));

        debug!(?direction, spin = self.orientation.y, "manual spin step");
        true
    }

    /// Handles pointer hover changes; only entering the cube interacts
    pub fn handle_pointer(&mut self, event: PointerEvent, now: Duration) -> bool {
        match event {
            PointerEvent::Enter if self.mounted => {
                self.fire_due(now);
                self.interact(now);
                debug!("pointer entered cube");
                true
            }
            _ => false,
        }
    }

    /// Current style snapshot
    pub fn render(&self) -> CubeStyle {
        CubeStyle {
            orientation: self.orientation,
            transition: self.manual_transition.then_some(self.config.transition),
        }
    }

    /// Cancels every timer and the frame subscription
    pub fn unmount(&mut self) {
        if !self.mounted {
            return;
        }
        self.scheduler.clear();
        self.resume_timer = None;
        self.transition_timer = None;
        self.mounted = false;
        info!(spin = self.orientation.y, "cube controller unmounted");
    }

    /// Current orientation in degrees
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Current animation mode
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Whether the eased transition style is applied right now
    pub fn is_manual_transition(&self) -> bool {
        self.manual_transition
    }

    /// Wobble time origin in milliseconds since mount
    pub fn phase_offset_ms(&self) -> f64 {
        self.phase_offset_ms
    }

    /// False once [`CubeController::unmount`] has run
    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Whether the animation frame subscription is live
    pub fn frames_active(&self) -> bool {
        self.scheduler.frames_active()
    }

    /// Number of timers waiting to fire
    pub fn pending_timers(&self) -> usize {
        self.scheduler.pending_timers()
    }

    /// Earliest pending timer deadline
    pub fn next_deadline(&self) -> Option<Duration> {
        self.scheduler.next_deadline()
    }

    /// Fires every timer due at `now`, each at its own deadline
    ///
    /// Input handlers run this before interpreting the input.
    fn fire_due(&mut self, now: Duration) {
        for due in self.scheduler.take_due(now) {
            match due.task {
                TimerTask::ResumeAuto => {
                    if self.resume_timer != Some(due.id) {
                        continue;
                    }
                    self.resume_timer = None;
                    self.resume(due.deadline);
                }
                TimerTask::ClearTransition => {
                    if self.transition_timer != Some(due.id) {
                        continue;
                    }
                    self.transition_timer = None;
                    self.manual_transition = false;
                    debug!("manual transition cleared");
                }
            }
        }
    }

    /// Freezes auto mode (if running) and restarts the resume timer
    ///
    /// Returns true if this call stopped the animation.
    fn interact(&mut self, now: Duration) -> bool {
        let froze = self.mode.is_auto();
        let tilt = match self.mode {
            Mode::Auto(_) => {
                // Recomputed from the phase offset rather than the last frame's value
                let tilt = self.config.tilt.tilt_at(millis(now), self.phase_offset_ms);
                self.orientation.x = tilt;
                if let Some(subscription) = self.scheduler.frame_subscription() {
                    self.scheduler.cancel_frames(subscription);
                }
                tilt
            }
            Mode::Manual(manual) => manual.frozen_tilt,
        };

        self.mode = StateMachine::process_event(
            self.mode,
            StateEvent::Interaction { at: now, tilt },
            self.config.resume_delay,
        );
        if froze {
            debug!(tilt, "auto mode paused");
        }

        if let Some(id) = self.resume_timer.take() {
            self.scheduler.cancel(id);
        }
        self.resume_timer = Some(self.scheduler.schedule_after(
            now,
            self.config.resume_delay,
            TimerTask::ResumeAuto,
        ));

        froze
    }

    /// Hands control back to the animation as of `at`
    fn resume(&mut self, at: Duration) {
        let Mode::Manual(manual) = self.mode else {
            return;
        };

        let next = StateMachine::process_event(
            self.mode,
            StateEvent::ResumeDue { at },
            self.config.resume_delay,
        );
        if next.is_manual() {
            let remaining = self.config.resume_delay.saturating_sub(manual.idle_for(at));
            self.resume_timer =
                Some(self.scheduler.schedule_after(at, remaining, TimerTask::ResumeAuto));
            return;
        }

        let at_ms = millis(at);
        match self
            .config
            .tilt
            .resume_offset(manual.frozen_tilt, at_ms, self.phase_offset_ms)
        {
            Ok(offset) => self.phase_offset_ms = offset,
            Err(error) => {
                warn!(%error, tilt = manual.frozen_tilt, "phase recovery failed, wobble restarts from its peak");
                self.phase_offset_ms = at_ms;
            }
        }

        self.manual_transition = false;
        if let Some(id) = self.transition_timer.take() {
            self.scheduler.cancel(id);
        }

        self.mode = next;
        self.scheduler.subscribe_frames();
        debug!(
            phase_offset_ms = self.phase_offset_ms,
            held_ms = at.saturating_sub(manual.frozen_at).as_millis() as u64,
            "auto mode resumed"
        );
    }

    fn animate(&mut self, now: Duration) {
        let Mode::Auto(auto) = self.mode else {
            return;
        };

        let delta = auto
            .last_frame
            .map(|previous| now.saturating_sub(previous))
            .unwrap_or(Duration::ZERO);

        self.orientation.spin_by(self.config.spin_speed * millis(delta));
        self.orientation.x = self.config.tilt.tilt_at(millis(now), self.phase_offset_ms);

        self.mode = StateMachine::process_event(
            self.mode,
            StateEvent::Frame { at: now },
            self.config.resume_delay,
        );
    }
}

impl Drop for CubeController {
    fn drop(&mut self) {
        self.unmount();
    }
}
