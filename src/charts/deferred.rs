use std::cell::RefCell;
use std::rc::Rc;

use tracing::{debug, trace};

use crate::interaction::{Scheduler, TimerId};

use super::handle::ChartHandle;

/// Delay that lets the host finish mount-time layout before the first render.
pub const DEFAULT_MOUNT_DELAY_MS: u64 = 16;

#[derive(Debug, Default)]
struct MountState {
    timer: Option<TimerId>,
    handle: Option<ChartHandle>,
    cancelled: bool,
}

/// Render scheduled to run after a short delay.
///
/// `cancel` works in both phases: before the timer fires it drops the pending
/// render, afterwards it cleans up the chart that was produced.
#[derive(Debug, Clone)]
pub struct DeferredMount {
    scheduler: Scheduler,
    state: Rc<RefCell<MountState>>,
}

impl DeferredMount {
    /// `true` once the render ran and produced a chart that is still active.
    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.state
            .borrow()
            .handle
            .as_ref()
            .is_some_and(ChartHandle::is_active)
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.state.borrow().timer.is_some_and(|timer| self.scheduler.is_pending(timer))
    }

    #[must_use]
    pub fn handle(&self) -> Option<ChartHandle> {
        self.state.borrow().handle.clone()
    }

    /// Idempotent; returns `true` if something was cancelled or cleaned up.
    pub fn cancel(&self) -> bool {
        let (timer, handle) = {
            let mut state = self.state.borrow_mut();
            if state.cancelled {
                return false;
            }
            state.cancelled = true;
            (state.timer.take(), state.handle.take())
        };
        let cleared = timer.is_some_and(|timer| self.scheduler.clear(timer));
        let cleaned = handle.is_some_and(|handle| handle.cleanup());
        debug!(cleared, cleaned, "deferred mount cancelled");
        cleared || cleaned
    }
}

/// Runs `render` once after `delay_ms` on `scheduler`.
pub fn mount_deferred<F>(scheduler: &Scheduler, delay_ms: u64, render: F) -> DeferredMount
where
    F: FnOnce() -> Option<ChartHandle> + 'static,
{
    let state = Rc::new(RefCell::new(MountState::default()));
    let mut render = Some(render);
    let callback_state = Rc::downgrade(&state);
    let timer = scheduler.set_timeout(delay_ms, move || {
        let Some(render) = render.take() else {
            return;
        };
        let Some(state) = callback_state.upgrade() else {
            trace!("deferred mount dropped before firing");
            return;
        };
        if state.borrow().cancelled {
            return;
        }
        let handle = render();
        let mut state = state.borrow_mut();
        state.timer = None;
        state.handle = handle;
    });
    state.borrow_mut().timer = Some(timer);
    DeferredMount {
        scheduler: scheduler.clone(),
        state,
    }
}
