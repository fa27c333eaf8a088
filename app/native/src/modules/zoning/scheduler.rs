//! Cancellable deferred tasks.
//!
//! The engine never sleeps. It asks a [`Scheduler`] to deliver a
//! [`TimerTask`] later and gets a [`TimerId`] back; when the timer fires the
//! host feeds `(id, task)` back into [`WindowManager::timer_fired`].
//! Cancelling an id that already fired is a no-op, and the engine ignores
//! deliveries for ids it no longer tracks.
//!
//! [`WindowManager::timer_fired`]: super::manager::WindowManager::timer_fired

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use tokio::task::JoinHandle;

use super::actor::{EngineHandle, EngineMessage};
use super::compositor::WindowId;

/// Handle of a scheduled task.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(pub u64);

/// Work to run when a timer fires.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TimerTask {
    /// Attempt to tile a newly created window.
    SettleWindow(WindowId),
    /// Run one hover-highlight poll.
    HighlightTick,
}

/// Schedules one-shot tasks.
pub trait Scheduler {
    /// Deliver `task` after `delay`.
    fn schedule(&mut self, delay: Duration, task: TimerTask) -> TimerId;

    /// Cancel a pending task. Unknown or already-fired ids are ignored.
    fn cancel(&mut self, id: TimerId);
}

// ============================================================================
// Manual Scheduler
// ============================================================================

/// Virtual-clock scheduler driven explicitly by the caller.
///
/// Used by the simulator and by tests: nothing fires until the caller pops
/// due timers with [`ManualScheduler::pop_due`].
#[derive(Debug, Default)]
pub struct ManualScheduler {
    now: Duration,
    next_id: u64,
    /// Pending timers keyed by `(deadline, id)` so equal deadlines fire in
    /// scheduling order.
    pending: BTreeMap<(Duration, TimerId), TimerTask>,
}

impl ManualScheduler {
    /// Create a scheduler at virtual time zero.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Current virtual time.
    #[must_use]
    pub const fn now(&self) -> Duration { self.now }

    /// Number of pending timers.
    #[must_use]
    pub fn pending_count(&self) -> usize { self.pending.len() }

    /// Whether a task equal to `task` is pending.
    #[must_use]
    pub fn is_pending(&self, task: TimerTask) -> bool { self.pending.values().any(|t| *t == task) }

    /// Remove and return the earliest timer due at or before `until`.
    ///
    /// The virtual clock moves to that timer's deadline. Returns `None` and
    /// moves the clock to `until` once nothing else is due.
    pub fn pop_due(&mut self, until: Duration) -> Option<(TimerId, TimerTask)> {
        let next = self.pending.first_key_value().map(|(key, _)| *key);

        match next {
            Some((deadline, id)) if deadline <= until => {
                let task = self.pending.remove(&(deadline, id))?;
                self.now = self.now.max(deadline);
                Some((id, task))
            }
            _ => {
                self.now = self.now.max(until);
                None
            }
        }
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&mut self, delay: Duration, task: TimerTask) -> TimerId {
        self.next_id += 1;
        let id = TimerId(self.next_id);
        self.pending.insert((self.now + delay, id), task);
        id
    }

    fn cancel(&mut self, id: TimerId) { self.pending.retain(|(_, pending), _| *pending != id); }
}

// ============================================================================
// Tokio Scheduler
// ============================================================================

/// Scheduler backed by tokio timers.
///
/// Each timer is a task that sleeps and then posts
/// [`EngineMessage::TimerFired`] to the engine actor. Must be used from within
/// a tokio runtime.
#[derive(Debug)]
pub struct TokioScheduler {
    handle: EngineHandle,
    next_id: u64,
    tasks: HashMap<TimerId, JoinHandle<()>>,
}

impl TokioScheduler {
    /// Create a scheduler that reports to `handle`.
    #[must_use]
    pub fn new(handle: EngineHandle) -> Self {
        Self {
            handle,
            next_id: 0,
            tasks: HashMap::new(),
        }
    }

    /// Number of timers that have not fired yet.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.tasks.values().filter(|task| !task.is_finished()).count()
    }
}

impl Scheduler for TokioScheduler {
    fn schedule(&mut self, delay: Duration, task: TimerTask) -> TimerId {
        self.tasks.retain(|_, join| !join.is_finished());

        self.next_id += 1;
        let id = TimerId(self.next_id);
        let handle = self.handle.clone();

        let join = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Err(err) = handle.send_async(EngineMessage::TimerFired { id, task }).await {
                tracing::debug!(timer = id.0, error = %err, "timer fired after engine stopped");
            }
        });

        self.tasks.insert(id, join);
        id
    }

    fn cancel(&mut self, id: TimerId) {
        if let Some(join) = self.tasks.remove(&id) {
            join.abort();
        }
    }
}

impl Drop for TokioScheduler {
    fn drop(&mut self) {
        for (_, join) in self.tasks.drain() {
            join.abort();
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::zoning::actor;

    #[test]
    fn test_manual_timers_fire_in_deadline_order() {
        let mut scheduler = ManualScheduler::new();
        let late = scheduler.schedule(Duration::from_millis(100), TimerTask::SettleWindow(1));
        let early = scheduler.schedule(Duration::from_millis(50), TimerTask::HighlightTick);

        let until = Duration::from_millis(200);
        assert_eq!(scheduler.pop_due(until), Some((early, TimerTask::HighlightTick)));
        assert_eq!(scheduler.now(), Duration::from_millis(50));
        assert_eq!(scheduler.pop_due(until), Some((late, TimerTask::SettleWindow(1))));
        assert_eq!(scheduler.pop_due(until), None);
        assert_eq!(scheduler.now(), until);
    }

    #[test]
    fn test_manual_timer_not_due_yet() {
        let mut scheduler = ManualScheduler::new();
        scheduler.schedule(Duration::from_millis(100), TimerTask::HighlightTick);

        assert_eq!(scheduler.pop_due(Duration::from_millis(99)), None);
        assert_eq!(scheduler.pending_count(), 1);
    }

    #[test]
    fn test_manual_cancel_is_idempotent() {
        let mut scheduler = ManualScheduler::new();
        let id = scheduler.schedule(Duration::ZERO, TimerTask::SettleWindow(7));

        scheduler.cancel(id);
        scheduler.cancel(id);
        assert_eq!(scheduler.pop_due(Duration::from_secs(1)), None);
    }

    #[test]
    fn test_manual_cancel_after_fire_is_noop() {
        let mut scheduler = ManualScheduler::new();
        let fired = scheduler.schedule(Duration::ZERO, TimerTask::HighlightTick);
        let other = scheduler.schedule(Duration::from_millis(10), TimerTask::HighlightTick);

        assert_eq!(scheduler.pop_due(Duration::ZERO).map(|(id, _)| id), Some(fired));
        scheduler.cancel(fired);
        assert_eq!(scheduler.pop_due(Duration::from_millis(10)).map(|(id, _)| id), Some(other));
    }

    #[test]
    fn test_delays_are_relative_to_virtual_now() {
        let mut scheduler = ManualScheduler::new();
        scheduler.pop_due(Duration::from_millis(500));
        scheduler.schedule(Duration::from_millis(100), TimerTask::HighlightTick);

        assert_eq!(scheduler.pop_due(Duration::from_millis(599)), None);
        assert!(scheduler.pop_due(Duration::from_millis(600)).is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_tokio_timer_posts_message() {
        let (handle, mut receiver) = actor::channel();
        let mut scheduler = TokioScheduler::new(handle);

        let id = scheduler.schedule(Duration::from_millis(100), TimerTask::SettleWindow(3));
        let message = receiver.recv().await.unwrap();

        assert!(matches!(
            message,
            EngineMessage::TimerFired { id: fired, task: TimerTask::SettleWindow(3) } if fired == id
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_tokio_cancel_prevents_delivery() {
        let (handle, mut receiver) = actor::channel();
        let mut scheduler = TokioScheduler::new(handle);

        let cancelled = scheduler.schedule(Duration::from_millis(50), TimerTask::HighlightTick);
        let kept = scheduler.schedule(Duration::from_millis(100), TimerTask::HighlightTick);
        assert_eq!(scheduler.active_count(), 2);
        scheduler.cancel(cancelled);
        assert_eq!(scheduler.active_count(), 1);

        let message = receiver.recv().await.unwrap();
        assert!(matches!(message, EngineMessage::TimerFired { id, .. } if id == kept));
    }
}
