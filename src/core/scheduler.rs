//! Cancellable delayed messages
//!
//! Views never own timer callbacks. They ask a [`Scheduler`] to deliver a
//! message after a delay and keep the returned [`TaskHandle`] in a
//! [`TimerSlot`]. Starting a slot cancels whatever it held before, so each
//! purpose (auto-advance, debounce) has at most one pending task. A message
//! that still arrives from a cancelled task carries a handle the slot no
//! longer holds and is dropped by [`TimerSlot::accept`].
//!
//! [`TokioScheduler`] runs on the tokio runtime. [`ManualScheduler`] keeps a
//! virtual clock that tests move with [`ManualScheduler::advance`].

use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::AbortHandle;

/// Identifies one scheduled task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskHandle(u64);

/// A message whose delay has elapsed
#[derive(Debug, Clone, PartialEq)]
pub struct Fired<M> {
    pub handle: TaskHandle,
    pub message: M,
}

pub trait Scheduler<M> {
    /// Delivers `message` once `delay` has elapsed.
    fn schedule(&mut self, delay: Duration, message: M) -> TaskHandle;

    /// Cancels a pending task. Returns false if it already fired or is unknown.
    fn cancel(&mut self, handle: TaskHandle) -> bool;
}

/// Holds at most one pending task for a single purpose
#[derive(Debug, Clone, Default)]
pub struct TimerSlot {
    pending: Option<TaskHandle>,
}

impl TimerSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancels the held task, then schedules a new one.
    pub fn start<M, S>(&mut self, scheduler: &mut S, delay: Duration, message: M) -> TaskHandle
    where
        S: Scheduler<M> + ?Sized,
    {
        self.cancel::<M, S>(scheduler);
        let handle = scheduler.schedule(delay, message);
        self.pending = Some(handle);
        handle
    }

    /// Cancels the held task, if any.
    pub fn cancel<M, S>(&mut self, scheduler: &mut S) -> bool
    where
        S: Scheduler<M> + ?Sized,
    {
        match self.pending.take() {
            Some(handle) => scheduler.cancel(handle),
            None => false,
        }
    }

    /// Consumes a fired task. Returns false for stale handles.
    pub fn accept(&mut self, handle: TaskHandle) -> bool {
        if self.pending == Some(handle) {
            self.pending = None;
            true
        } else {
            tracing::debug!("Ignoring stale timer {handle:?}");
            false
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn handle(&self) -> Option<TaskHandle> {
        self.pending
    }
}

/// Scheduler backed by `tokio::time::sleep`
///
/// Fired messages arrive on the receiver returned by [`TokioScheduler::new`].
pub struct TokioScheduler<M> {
    next_id: u64,
    tasks: HashMap<TaskHandle, AbortHandle>,
    tx: mpsc::UnboundedSender<Fired<M>>,
}

impl<M: Send + 'static> TokioScheduler<M> {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Fired<M>>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                next_id: 0,
                tasks: HashMap::new(),
                tx,
            },
            rx,
        )
    }

    /// Number of tasks that have neither fired nor been cancelled
    pub fn pending(&self) -> usize {
        self.tasks.values().filter(|t| !t.is_finished()).count()
    }
}

impl<M: Send + 'static> Scheduler<M> for TokioScheduler<M> {
    fn schedule(&mut self, delay: Duration, message: M) -> TaskHandle {
        self.tasks.retain(|_, task| !task.is_finished());

        self.next_id += 1;
        let handle = TaskHandle(self.next_id);
        let tx = self.tx.clone();
        let join = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // Receiver dropped means the view is gone
            let _ = tx.send(Fired { handle, message });
        });
        self.tasks.insert(handle, join.abort_handle());
        tracing::debug!("Scheduled {handle:?} in {delay:?}");
        handle
    }

    fn cancel(&mut self, handle: TaskHandle) -> bool {
        match self.tasks.remove(&handle) {
            Some(task) if !task.is_finished() => {
                task.abort();
                tracing::debug!("Cancelled {handle:?}");
                true
            }
            _ => false,
        }
    }
}

impl<M> Drop for TokioScheduler<M> {
    fn drop(&mut self) {
        for task in self.tasks.values() {
            task.abort();
        }
    }
}

struct ManualTask<M> {
    due: Duration,
    handle: TaskHandle,
    message: M,
}

/// Scheduler driven by a virtual clock
pub struct ManualScheduler<M> {
    now: Duration,
    next_id: u64,
    queue: Vec<ManualTask<M>>,
}

impl<M> Default for ManualScheduler<M> {
    fn default() -> Self {
        Self {
            now: Duration::ZERO,
            next_id: 0,
            queue: Vec::new(),
        }
    }
}

impl<M> ManualScheduler<M> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Moves the clock forward and returns every task now due, earliest
    /// first. Tasks due at the same instant fire in scheduling order.
    pub fn advance(&mut self, by: Duration) -> Vec<Fired<M>> {
        self.now += by;
        let now = self.now;
        let (mut due, waiting): (Vec<_>, Vec<_>) =
            std::mem::take(&mut self.queue).into_iter().partition(|t| t.due <= now);
        self.queue = waiting;
        due.sort_by_key(|t| (t.due, t.handle));
        due.into_iter()
            .map(|t| Fired {
                handle: t.handle,
                message: t.message,
            })
            .collect()
    }
}

impl<M> Scheduler<M> for ManualScheduler<M> {
    fn schedule(&mut self, delay: Duration, message: M) -> TaskHandle {
        self.next_id += 1;
        let handle = TaskHandle(self.next_id);
        self.queue.push(ManualTask {
            due: self.now + delay,
            handle,
            message,
        });
        handle
    }

    fn cancel(&mut self, handle: TaskHandle) -> bool {
        let before = self.queue.len();
        self.queue.retain(|t| t.handle != handle);
        self.queue.len() != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: Duration = Duration::from_millis(1);

    #[test]
    fn test_manual_fires_when_due() {
        let mut sched = ManualScheduler::new();
        let h = sched.schedule(300 * MS, "reveal");
        assert!(sched.advance(299 * MS).is_empty());
        let fired = sched.advance(MS);
        assert_eq!(fired, vec![Fired { handle: h, message: "reveal" }]);
        assert_eq!(sched.pending(), 0);
    }

    #[test]
    fn test_manual_order_and_cancel() {
        let mut sched = ManualScheduler::new();
        let a = sched.schedule(20 * MS, 'a');
        let b = sched.schedule(10 * MS, 'b');
        let c = sched.schedule(10 * MS, 'c');
        assert!(sched.cancel(c));
        assert!(!sched.cancel(c));
        let fired: Vec<_> = sched.advance(50 * MS).into_iter().map(|f| f.handle).collect();
        assert_eq!(fired, vec![b, a]);
    }

    #[test]
    fn test_slot_keeps_one_pending() {
        let mut sched = ManualScheduler::new();
        let mut slot = TimerSlot::new();
        let first = slot.start(&mut sched, 300 * MS, 1);
        let second = slot.start(&mut sched, 300 * MS, 2);
        assert_ne!(first, second);
        assert_eq!(sched.pending(), 1);

        let fired = sched.advance(300 * MS);
        assert_eq!(fired.len(), 1);
        assert!(slot.accept(fired[0].handle));
        assert_eq!(fired[0].message, 2);
        assert!(!slot.is_pending());
    }

    #[test]
    fn test_slot_rejects_stale_handle() {
        let mut sched = ManualScheduler::new();
        let mut slot = TimerSlot::new();
        let old = slot.start(&mut sched, 10 * MS, ());
        slot.start(&mut sched, 10 * MS, ());
        assert!(!slot.accept(old));
        assert!(slot.is_pending());
    }

    #[tokio::test]
    async fn test_tokio_scheduler_delivers() {
        let (mut sched, mut rx) = TokioScheduler::new();
        let h = sched.schedule(5 * MS, 42u32);
        let fired = tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(fired, Fired { handle: h, message: 42 });
    }

    #[tokio::test]
    async fn test_tokio_cancel_suppresses_delivery() {
        let (mut sched, mut rx) = TokioScheduler::new();
        let cancelled = sched.schedule(20 * MS, "old");
        assert!(sched.cancel(cancelled));
        let kept = sched.schedule(40 * MS, "new");

        let fired = tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(fired.handle, kept);
        assert_eq!(fired.message, "new");
    }
}
