//! ICE gathering deadline
//!
//! When candidate trickling stalls, call setup would wait for the browser's
//! own gathering timeout. A watched session arms a one-shot timer on its
//! first candidate; if no local SDP showed up when it fires, gathering is
//! forced to complete with the candidates collected so far.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use crate::agent::SessionHandle;

/// Pending timer, cancelled when dropped
pub struct TimerGuard {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl TimerGuard {
    pub fn new(cancel: impl FnOnce() + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }
}

impl Drop for TimerGuard {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

/// One-shot timers
pub trait DeadlineTimer {
    /// Run `on_expire` once after `after`, unless the guard is dropped first
    fn arm(&self, after: Duration, on_expire: Box<dyn FnOnce()>) -> TimerGuard;
}

/// Timer running as a task on the Dioxus runtime
pub struct TaskTimer;

impl DeadlineTimer for TaskTimer {
    fn arm(&self, after: Duration, on_expire: Box<dyn FnOnce()>) -> TimerGuard {
        let task = dioxus::prelude::spawn(async move {
            #[cfg(target_arch = "wasm32")]
            {
                gloo_timers::future::TimeoutFuture::new(after.as_millis() as u32).await;
            }
            #[cfg(not(target_arch = "wasm32"))]
            {
                tokio::time::sleep(after).await;
            }
            on_expire();
        });

        TimerGuard::new(move || task.cancel())
    }
}

/// Gathering watch for one session
pub struct IceWatch {
    session: SessionHandle,
    local_sdp: Rc<Cell<bool>>,
    armed: bool,
    timer: Option<TimerGuard>,
}

impl IceWatch {
    pub fn new(session: SessionHandle) -> Self {
        Self {
            session,
            local_sdp: Rc::new(Cell::new(false)),
            armed: false,
            timer: None,
        }
    }

    /// A candidate was gathered; the first one arms the deadline
    pub fn on_candidate(&mut self, deadline: Duration, timer: &dyn DeadlineTimer) {
        if self.armed || self.local_sdp.get() {
            return;
        }
        self.armed = true;

        tracing::debug!(
            "starting icecandidate gather timer expiring in {} ms",
            deadline.as_millis()
        );

        let session = Rc::clone(&self.session);
        let local_sdp = Rc::clone(&self.local_sdp);
        self.timer = Some(timer.arm(
            deadline,
            Box::new(move || {
                if !local_sdp.get() {
                    tracing::debug!("icecandidate gather timeout for {}", session.id());
                    session.finish_ice_gathering();
                }
            }),
        ));
    }

    /// The local description is final, the deadline is no longer needed
    pub fn on_local_sdp(&mut self) {
        self.local_sdp.set(true);
        self.timer = None;
    }
}
