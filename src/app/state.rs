//! Animation mode state machine
//!
//! The cube is either animating on its own or held by the user. The manual
//! state carries everything needed to resume: the frozen tilt and the time of
//! the most recent interaction.

use std::time::Duration;

/// Controller mode
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Mode {
    /// Driven by animation frames
    Auto(AutoState),
    /// Driven by the user, waiting to resume
    Manual(ManualState),
}

/// State while animating
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AutoState {
    /// Time of the previous frame; `None` until the first frame after (re)start
    pub last_frame: Option<Duration>,
}

/// State while the user holds the cube
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ManualState {
    /// Tilt captured when auto mode stopped
    pub frozen_tilt: f64,
    /// When auto mode stopped
    pub frozen_at: Duration,
    /// Most recent key press or pointer entry
    pub last_interaction: Duration,
}

impl ManualState {
    pub fn new(frozen_tilt: f64, at: Duration) -> Self {
        Self {
            frozen_tilt,
            frozen_at: at,
            last_interaction: at,
        }
    }

    /// Idle time since the last interaction
    pub fn idle_for(&self, now: Duration) -> Duration {
        now.saturating_sub(self.last_interaction)
    }
}

impl Mode {
    pub fn is_auto(&self) -> bool {
        matches!(self, Mode::Auto(_))
    }

    pub fn is_manual(&self) -> bool {
        matches!(self, Mode::Manual(_))
    }
}

impl Default for Mode {
    fn default() -> Self {
        Mode::Auto(AutoState::default())
    }
}

/// Inputs to the mode state machine
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StateEvent {
    /// An animation frame ran at the given time
    Frame { at: Duration },
    /// Arrow key or pointer entry; `tilt` is the tilt to freeze if still animating
    Interaction { at: Duration, tilt: f64 },
    /// The resume timer fired
    ResumeDue { at: Duration },
}

/// State machine for mode transitions
pub struct StateMachine;

impl StateMachine {
    /// Processes an event and returns the new mode
    ///
    /// # Arguments
    /// * `current` - Current mode
    /// * `event` - Event to process
    /// * `resume_delay` - Idle time required before manual mode hands back to auto
    pub fn process_event(current: Mode, event: StateEvent, resume_delay: Duration) -> Mode {
        match (current, event) {
            (Mode::Auto(_), StateEvent::Frame { at }) => {
                Mode::Auto(AutoState {
                    last_frame: Some(at),
                })
            }

            (Mode::Auto(_), StateEvent::Interaction { at, tilt }) => {
                Mode::Manual(ManualState::new(tilt, at))
            }

            (Mode::Manual(mut manual), StateEvent::Interaction { at, .. }) => {
                // The tilt stays frozen at its first value
                manual.last_interaction = at;
                Mode::Manual(manual)
            }

            (Mode::Manual(manual), StateEvent::ResumeDue { at }) => {
                if manual.idle_for(at) >= resume_delay {
                    // Fresh delta baseline for the first frame after resuming
                    Mode::Auto(AutoState::default())
                } else {
                    Mode::Manual(manual)
                }
            }

            // Frames while manual and stray resume timers while auto are ignored
            (mode, _) => mode,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESUME: Duration = Duration::from_millis(1000);

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn default_mode_is_auto_without_baseline() {
        let mode = Mode::default();
        assert_eq!(mode, Mode::Auto(AutoState { last_frame: None }));
        assert!(mode.is_auto());
    }

    #[test]
    fn frames_record_baseline() {
        let mode = StateMachine::process_event(Mode::default(), StateEvent::Frame { at: ms(16) }, RESUME);
        assert_eq!(
            mode,
            Mode::Auto(AutoState {
                last_frame: Some(ms(16))
            })
        );
    }

    #[test]
    fn interaction_freezes_tilt() {
        let mode = StateMachine::process_event(
            Mode::default(),
            StateEvent::Interaction { at: ms(500), tilt: 12.5 },
            RESUME,
        );

        match mode {
            Mode::Manual(manual) => {
                assert_eq!(manual.frozen_tilt, 12.5);
                assert_eq!(manual.frozen_at, ms(500));
                assert_eq!(manual.last_interaction, ms(500));
            }
            other => panic!("Expected manual mode, got {other:?}"),
        }
    }

    #[test]
    fn repeated_interaction_refreshes_timestamp_only() {
        let manual = Mode::Manual(ManualState::new(12.5, ms(500)));
        let mode = StateMachine::process_event(
            manual,
            StateEvent::Interaction { at: ms(900), tilt: -3.0 },
            RESUME,
        );

        match mode {
            Mode::Manual(manual) => {
                assert_eq!(manual.frozen_tilt, 12.5);
                assert_eq!(manual.frozen_at, ms(500));
                assert_eq!(manual.last_interaction, ms(900));
            }
            other => panic!("Expected manual mode, got {other:?}"),
        }
    }

    #[test]
    fn resume_requires_full_idle_delay() {
        let manual = Mode::Manual(ManualState::new(0.0, ms(500)));

        let early = StateMachine::process_event(manual, StateEvent::ResumeDue { at: ms(1499) }, RESUME);
        assert!(early.is_manual());

        let resumed = StateMachine::process_event(manual, StateEvent::ResumeDue { at: ms(1500) }, RESUME);
        assert_eq!(resumed, Mode::Auto(AutoState { last_frame: None }));
    }

    #[test]
    fn frames_ignored_while_manual() {
        let manual = Mode::Manual(ManualState::new(0.0, ms(500)));
        let mode = StateMachine::process_event(manual, StateEvent::Frame { at: ms(600) }, RESUME);
        assert_eq!(mode, manual);
    }

    #[test]
    fn stray_resume_ignored_while_auto() {
        let auto = Mode::Auto(AutoState {
            last_frame: Some(ms(100)),
        });
        let mode = StateMachine::process_event(auto, StateEvent::ResumeDue { at: ms(5000) }, RESUME);
        assert_eq!(mode, auto);
    }
}
