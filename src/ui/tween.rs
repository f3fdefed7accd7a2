//! Eased orientation tween for native rendering
//!
//! Browsers animate the `transition` property themselves. Native hosts get
//! the same motion from this tween: while the style carries a transition, a
//! changed target is approached over the transition duration along its
//! easing curve, starting from whatever is currently on screen.

use std::time::Duration;

use crate::config::TransitionConfig;
use crate::domain::orientation::Orientation;
use crate::ui::style::CubeStyle;

#[derive(Debug, Clone, Copy, PartialEq)]
struct ActiveTween {
    from: Orientation,
    to: Orientation,
    started: Duration,
    transition: TransitionConfig,
}

impl ActiveTween {
    fn progress(&self, now: Duration) -> f64 {
        let elapsed = now.saturating_sub(self.started).as_secs_f64();
        (elapsed / self.transition.duration.as_secs_f64()).clamp(0.0, 1.0)
    }

    fn sample(&self, now: Duration) -> Orientation {
        let eased = self.transition.easing.value(self.progress(now));
        self.from.lerp(self.to, eased)
    }
}

/// Orientation currently on screen
#[derive(Debug, Clone)]
pub struct OrientationTween {
    displayed: Orientation,
    active: Option<ActiveTween>,
}

impl OrientationTween {
    pub fn new(initial: Orientation) -> Self {
        Self {
            displayed: initial,
            active: None,
        }
    }

    /// Advances to `now` for the given style and returns what should be drawn
    pub fn update(&mut self, style: &CubeStyle, now: Duration) -> Orientation {
        let target = style.orientation;

        match style.transition {
            Some(transition) => {
                let current_target = self.active.map(|tween| tween.to).unwrap_or(self.displayed);
                if current_target != target {
                    // Retarget from the on-screen value, like a CSS transition does
                    let from = match &self.active {
                        Some(tween) => tween.sample(now),
                        None => self.displayed,
                    };
                    self.active = Some(ActiveTween {
                        from,
                        to: target,
                        started: now,
                        transition,
                    });
                }
            }
            None => {
                self.active = None;
                self.displayed = target;
            }
        }

        if let Some(tween) = self.active {
            self.displayed = tween.sample(now);
            if tween.progress(now) >= 1.0 {
                self.displayed = tween.to;
                self.active = None;
            }
        }

        self.displayed
    }

    pub fn displayed(&self) -> Orientation {
        self.displayed
    }

    pub fn is_animating(&self) -> bool {
        self.active.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    fn style(y: f64, transition: bool) -> CubeStyle {
        CubeStyle {
            orientation: Orientation::new(10.0, y),
            transition: transition.then(TransitionConfig::default),
        }
    }

    #[test]
    fn without_transition_tracks_target() {
        let mut tween = OrientationTween::new(Orientation::new(10.0, 0.0));
        assert_eq!(tween.update(&style(3.5, false), ms(16)), Orientation::new(10.0, 3.5));
        assert!(!tween.is_animating());
    }

    #[test]
    fn eases_toward_new_target() {
        let mut tween = OrientationTween::new(Orientation::new(10.0, 0.0));

        let start = tween.update(&style(45.0, true), ms(1000));
        assert_eq!(start.y, 0.0);
        assert!(tween.is_animating());

        let mid = tween.update(&style(45.0, true), ms(1300));
        assert!(mid.y > 0.0 && mid.y < 45.0);

        let done = tween.update(&style(45.0, true), ms(1600));
        assert_eq!(done.y, 45.0);
        assert!(!tween.is_animating());
    }

    #[test]
    fn retarget_starts_from_displayed_value() {
        let mut tween = OrientationTween::new(Orientation::new(10.0, 0.0));
        tween.update(&style(45.0, true), ms(0));
        let midway = tween.update(&style(45.0, true), ms(150));

        let restarted = tween.update(&style(90.0, true), ms(150));
        assert!((restarted.y - midway.y).abs() < 1e-9);

        // Full duration measured from the retarget
        let before_end = tween.update(&style(90.0, true), ms(700));
        assert!(before_end.y < 90.0);
        assert_eq!(tween.update(&style(90.0, true), ms(750)).y, 90.0);
    }

    #[test]
    fn dropping_transition_snaps() {
        let mut tween = OrientationTween::new(Orientation::new(10.0, 0.0));
        tween.update(&style(45.0, true), ms(0));
        tween.update(&style(45.0, true), ms(100));

        let snapped = tween.update(&style(46.0, false), ms(120));
        assert_eq!(snapped.y, 46.0);
        assert!(!tween.is_animating());
    }
}
