use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimerId(pub u64);

type TimerCallback = Box<dyn FnMut()>;

#[derive(Default)]
struct SchedulerState {
    now_ms: u64,
    next_id: u64,
    /// Pending firings ordered by due time, then registration order.
    queue: BTreeSet<(u64, TimerId)>,
    callbacks: HashMap<TimerId, TimerCallback>,
    periods: HashMap<TimerId, u64>,
    due: HashMap<TimerId, u64>,
}

/// Single-threaded timer loop with a manual clock.
///
/// Stands in for the host event loop: pages advance it from their frame or
/// timer source, tests advance it directly. Callbacks may schedule or clear
/// timers, including their own.
#[derive(Clone, Default)]
pub struct Scheduler {
    state: Rc<RefCell<SchedulerState>>,
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("Scheduler")
            .field("now_ms", &state.now_ms)
            .field("pending", &state.due.len())
            .finish()
    }
}

impl Scheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn now_ms(&self) -> u64 {
        self.state.borrow().now_ms
    }

    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.state.borrow().due.len()
    }

    #[must_use]
    pub fn is_pending(&self, id: TimerId) -> bool {
        self.state.borrow().due.contains_key(&id)
    }

    pub fn set_timeout(&self, delay_ms: u64, callback: impl FnMut() + 'static) -> TimerId {
        self.register(delay_ms, None, Box::new(callback))
    }

    /// Fires every `period_ms` (minimum 1 ms) until cleared.
    pub fn set_interval(&self, period_ms: u64, callback: impl FnMut() + 'static) -> TimerId {
        let period_ms = period_ms.max(1);
        self.register(period_ms, Some(period_ms), Box::new(callback))
    }

    fn register(&self, delay_ms: u64, period_ms: Option<u64>, callback: TimerCallback) -> TimerId {
        let mut state = self.state.borrow_mut();
        state.next_id += 1;
        let id = TimerId(state.next_id);
        let due = state.now_ms.saturating_add(delay_ms);
        state.queue.insert((due, id));
        state.due.insert(id, due);
        state.callbacks.insert(id, callback);
        if let Some(period) = period_ms {
            state.periods.insert(id, period);
        }
        trace!(timer = id.0, due, "timer registered");
        id
    }

    /// Cancels `id`; returns `false` if it already fired or was cleared.
    pub fn clear(&self, id: TimerId) -> bool {
        let mut state = self.state.borrow_mut();
        let Some(due) = state.due.remove(&id) else {
            return false;
        };
        state.queue.remove(&(due, id));
        state.callbacks.remove(&id);
        state.periods.remove(&id);
        true
    }

    /// Advances the clock by `delta_ms`, firing due timers in order.
    ///
    /// Returns the number of callbacks invoked.
    pub fn advance_by(&self, delta_ms: u64) -> usize {
        let target = self.now_ms().saturating_add(delta_ms);
        let mut fired = 0;
        loop {
            let next = {
                let mut state = self.state.borrow_mut();
                match state.queue.first().copied() {
                    Some((due, id)) if due <= target => {
                        state.queue.remove(&(due, id));
                        state.now_ms = due;
                        let callback = state.callbacks.remove(&id);
                        if !state.periods.contains_key(&id) {
                            state.due.remove(&id);
                        }
                        callback.map(|callback| (id, callback))
                    }
                    _ => {
                        state.now_ms = target;
                        break;
                    }
                }
            };
            let Some((id, mut callback)) = next else {
                continue;
            };

            callback();
            fired += 1;

            let mut state = self.state.borrow_mut();
            if let Some(period) = state.periods.get(&id).copied() {
                // Cleared from inside its own callback: drop it for good.
                if state.due.contains_key(&id) {
                    let due = state.now_ms.saturating_add(period);
                    state.queue.insert((due, id));
                    state.due.insert(id, due);
                    state.callbacks.insert(id, callback);
                }
            }
        }
        fired
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn interval_fires_each_period_until_cleared() {
        let scheduler = Scheduler::new();
        let count = Rc::new(Cell::new(0));
        let seen = Rc::clone(&count);
        let id = scheduler.set_interval(100, move || seen.set(seen.get() + 1));

        assert_eq!(scheduler.advance_by(350), 3);
        assert_eq!(count.get(), 3);
        assert!(scheduler.clear(id));
        assert_eq!(scheduler.advance_by(1_000), 0);
        assert!(!scheduler.clear(id));
    }

    #[test]
    fn timeout_scheduled_from_callback_fires_later() {
        let scheduler = Scheduler::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        let inner_scheduler = scheduler.clone();
        let outer_log = Rc::clone(&log);
        scheduler.set_timeout(10, move || {
            outer_log.borrow_mut().push("outer");
            let inner_log = Rc::clone(&outer_log);
            inner_scheduler.set_timeout(5, move || inner_log.borrow_mut().push("inner"));
        });

        scheduler.advance_by(12);
        assert_eq!(*log.borrow(), vec!["outer"]);
        scheduler.advance_by(3);
        assert_eq!(*log.borrow(), vec!["outer", "inner"]);
        assert_eq!(scheduler.pending_count(), 0);
    }

    #[test]
    fn interval_cleared_inside_callback_stops() {
        let scheduler = Scheduler::new();
        let handle = scheduler.clone();
        let own_id = Rc::new(Cell::new(None));
        let own = Rc::clone(&own_id);
        let id = scheduler.set_interval(10, move || {
            if let Some(id) = own.get() {
                handle.clear(id);
            }
        });
        own_id.set(Some(id));

        assert_eq!(scheduler.advance_by(100), 1);
        assert!(!scheduler.is_pending(id));
    }
}
