//! Cooperative scheduler for one-shot timers and the animation frame loop
//!
//! Time is supplied by the host as a `Duration` since mount. The scheduler
//! never reads a clock itself, which keeps the controller fully deterministic
//! under test.

use std::time::Duration;

/// Handle to a scheduled one-shot timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(u64);

/// Handle to the animation frame subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameSubscription(u64);

/// A timer handed back by [`Scheduler::take_due`]
#[derive(Debug, Clone, PartialEq)]
pub struct DueTimer<T> {
    pub id: TaskId,
    /// When the timer was meant to fire; never later than the `now` it was taken at
    pub deadline: Duration,
    pub task: T,
}

#[derive(Debug, Clone)]
struct Timer<T> {
    id: TaskId,
    deadline: Duration,
    task: T,
}

/// Timer queue plus a single frame subscription slot
#[derive(Debug, Clone)]
pub struct Scheduler<T> {
    timers: Vec<Timer<T>>,
    frame: Option<FrameSubscription>,
    next_id: u64,
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self {
            timers: Vec::new(),
            frame: None,
            next_id: 1,
        }
    }

    fn allocate_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Schedules `task` to fire once `delay` after `now`
    pub fn schedule_after(&mut self, now: Duration, delay: Duration, task: T) -> TaskId {
        let id = TaskId(self.allocate_id());
        self.timers.push(Timer {
            id,
            deadline: now + delay,
            task,
        });
        id
    }

    /// Cancels a pending timer; returns false if it already fired or was cancelled
    pub fn cancel(&mut self, id: TaskId) -> bool {
        let before = self.timers.len();
        self.timers.retain(|timer| timer.id != id);
        self.timers.len() != before
    }

    /// Removes and returns every timer due at `now`, earliest deadline first
    ///
    /// Timers sharing a deadline come out in the order they were scheduled.
    pub fn take_due(&mut self, now: Duration) -> Vec<DueTimer<T>> {
        let (mut due, pending): (Vec<_>, Vec<_>) = std::mem::take(&mut self.timers)
            .into_iter()
            .partition(|timer| timer.deadline <= now);
        self.timers = pending;

        due.sort_by_key(|timer| (timer.deadline, timer.id.0));
        due.into_iter()
            .map(|timer| DueTimer {
                id: timer.id,
                deadline: timer.deadline,
                task: timer.task,
            })
            .collect()
    }

    /// Number of timers still pending
    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Earliest pending deadline, if any
    pub fn next_deadline(&self) -> Option<Duration> {
        self.timers.iter().map(|timer| timer.deadline).min()
    }

    /// Starts receiving animation frames, replacing any existing subscription
    pub fn subscribe_frames(&mut self) -> FrameSubscription {
        let subscription = FrameSubscription(self.allocate_id());
        self.frame = Some(subscription);
        subscription
    }

    /// Stops the given frame subscription; stale handles are ignored
    pub fn cancel_frames(&mut self, subscription: FrameSubscription) -> bool {
        if self.frame == Some(subscription) {
            self.frame = None;
            true
        } else {
            false
        }
    }

    /// The active frame subscription
    pub fn frame_subscription(&self) -> Option<FrameSubscription> {
        self.frame
    }

    pub fn frames_active(&self) -> bool {
        self.frame.is_some()
    }

    /// Drops every timer and the frame subscription
    pub fn clear(&mut self) {
        self.timers.clear();
        self.frame = None;
    }
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn timers_fire_in_deadline_order() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule_after(ms(0), ms(300), "late");
        scheduler.schedule_after(ms(0), ms(100), "early");
        scheduler.schedule_after(ms(50), ms(150), "tie");

        assert!(scheduler.take_due(ms(99)).is_empty());

        let fired = scheduler.take_due(ms(250));
        let tasks: Vec<_> = fired.iter().map(|due| due.task).collect();
        assert_eq!(tasks, vec!["early", "tie"]);
        // Deadlines are reported as scheduled, not as the time they were taken
        assert_eq!(fired[0].deadline, ms(100));
        assert_eq!(fired[1].deadline, ms(200));
        assert_eq!(scheduler.pending_timers(), 1);
        assert_eq!(scheduler.next_deadline(), Some(ms(300)));
    }

    #[test]
    fn equal_deadlines_keep_scheduling_order() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule_after(ms(0), ms(100), 1);
        scheduler.schedule_after(ms(0), ms(100), 2);
        scheduler.schedule_after(ms(0), ms(100), 3);

        let fired: Vec<_> = scheduler.take_due(ms(100)).into_iter().map(|due| due.task).collect();
        assert_eq!(fired, vec![1, 2, 3]);
    }

    #[test]
    fn cancelled_timers_never_fire() {
        let mut scheduler = Scheduler::new();
        let id = scheduler.schedule_after(ms(0), ms(100), "resume");
        assert_eq!(scheduler.next_deadline(), Some(ms(100)));

        assert!(scheduler.cancel(id));
        assert!(!scheduler.cancel(id));
        assert_eq!(scheduler.next_deadline(), None);
        assert!(scheduler.take_due(ms(1000)).is_empty());
    }

    #[test]
    fn fired_timer_cannot_be_cancelled() {
        let mut scheduler = Scheduler::new();
        let id = scheduler.schedule_after(ms(0), ms(10), ());
        assert_eq!(scheduler.take_due(ms(10)).len(), 1);
        assert!(!scheduler.cancel(id));
    }

    #[test]
    fn single_frame_subscription() {
        let mut scheduler: Scheduler<()> = Scheduler::new();
        let first = scheduler.subscribe_frames();
        let second = scheduler.subscribe_frames();

        assert_ne!(first, second);
        assert_eq!(scheduler.frame_subscription(), Some(second));

        // The replaced handle is stale
        assert!(!scheduler.cancel_frames(first));
        assert!(scheduler.frames_active());

        assert!(scheduler.cancel_frames(second));
        assert!(!scheduler.frames_active());
    }

    #[test]
    fn clear_drops_everything() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule_after(ms(0), ms(10), ());
        scheduler.subscribe_frames();
        scheduler.clear();

        assert_eq!(scheduler.pending_timers(), 0);
        assert!(!scheduler.frames_active());
    }
}
