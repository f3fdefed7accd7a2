//! Pointer enter/leave detection over the cube
//!
//! Hosts only report raw moves, so enter and leave are derived here from the
//! previous hover state and the cube's on-screen bounds.

use crate::domain::core::{Point, Rect};

/// Hover transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerEvent {
    Enter,
    Leave,
}

/// Tracks whether the pointer is over the widget
#[derive(Debug, Clone, Default)]
pub struct PointerTracker {
    inside: bool,
}

impl PointerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds a pointer move; returns the transition it caused, if any
    pub fn moved(&mut self, position: Point, bounds: Rect) -> Option<PointerEvent> {
        let inside = bounds.contains_point(position);
        self.update(inside)
    }

    /// The pointer left the host window entirely
    pub fn left_window(&mut self) -> Option<PointerEvent> {
        self.update(false)
    }

    fn update(&mut self, inside: bool) -> Option<PointerEvent> {
        let event = match (self.inside, inside) {
            (false, true) => Some(PointerEvent::Enter),
            (true, false) => Some(PointerEvent::Leave),
            _ => None,
        };
        self.inside = inside;
        event
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds() -> Rect {
        Rect::new(100, 100, 200, 200)
    }

    #[test]
    fn enter_fires_once() {
        let mut tracker = PointerTracker::new();
        assert_eq!(tracker.moved(Point::new(10, 10), bounds()), None);
        assert_eq!(tracker.moved(Point::new(150, 150), bounds()), Some(PointerEvent::Enter));
        assert_eq!(tracker.moved(Point::new(160, 170), bounds()), None);
    }

    #[test]
    fn leave_then_reenter() {
        let mut tracker = PointerTracker::new();
        tracker.moved(Point::new(150, 150), bounds());
        assert_eq!(tracker.moved(Point::new(400, 150), bounds()), Some(PointerEvent::Leave));
        assert_eq!(tracker.moved(Point::new(150, 150), bounds()), Some(PointerEvent::Enter));
    }

    #[test]
    fn leaving_window_counts_as_leave() {
        let mut tracker = PointerTracker::new();
        tracker.moved(Point::new(150, 150), bounds());
        assert_eq!(tracker.left_window(), Some(PointerEvent::Leave));
        assert_eq!(tracker.left_window(), None);
    }
}
