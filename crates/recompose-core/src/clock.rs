//! Frame clock shared by the scheduler and every cooperative task.
//!
//! Time only moves when the scheduler produces a frame, so animations are
//! deterministic: a test that advances three 16ms frames sees exactly three
//! animation steps.

use std::cell::{Cell, RefCell};
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll, Waker};

use web_time::Duration;

thread_local! {
    static FRAME_CLOCK: RefCell<Option<Rc<FrameClock>>> = const { RefCell::new(None) };
}

#[derive(Default)]
pub struct FrameClock {
    frame: Cell<u64>,
    time_nanos: Cell<u64>,
    waiters: RefCell<Vec<Waker>>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frame(&self) -> u64 {
        self.frame.get()
    }

    pub fn now_nanos(&self) -> u64 {
        self.time_nanos.get()
    }

    /// Start a new frame `dt` after the previous one and wake every task
    /// waiting for it.
    pub fn advance(&self, dt: Duration) {
        self.frame.set(self.frame.get() + 1);
        let dt = u64::try_from(dt.as_nanos()).unwrap_or(u64::MAX);
        self.time_nanos.set(self.time_nanos.get().saturating_add(dt));
        let waiters = std::mem::take(&mut *self.waiters.borrow_mut());
        for w in waiters {
            w.wake();
        }
    }

    pub fn has_waiters(&self) -> bool {
        !self.waiters.borrow().is_empty()
    }

    fn register(&self, waker: &Waker) {
        let mut waiters = self.waiters.borrow_mut();
        if !waiters.iter().any(|w| w.will_wake(waker)) {
            waiters.push(waker.clone());
        }
    }
}

pub(crate) fn install_clock(clock: Rc<FrameClock>) {
    FRAME_CLOCK.with(|c| *c.borrow_mut() = Some(clock));
}

pub(crate) fn uninstall_clock(clock: &Rc<FrameClock>) {
    let _ = FRAME_CLOCK.try_with(|c| {
        let mut c = c.borrow_mut();
        if c.as_ref().is_some_and(|cur| Rc::ptr_eq(cur, clock)) {
            *c = None;
        }
    });
}

pub fn frame_clock() -> Option<Rc<FrameClock>> {
    FRAME_CLOCK.with(|c| c.borrow().clone())
}

/// Current frame time, or 0 when no scheduler is running.
pub fn now_nanos() -> u64 {
    frame_clock().map_or(0, |c| c.now_nanos())
}

/// Suspends until the next frame and yields its time in nanoseconds.
///
/// Without an installed clock the future never resolves.
pub fn with_frame_nanos() -> NextFrame {
    NextFrame {
        clock: frame_clock(),
        target: None,
    }
}

pub struct NextFrame {
    clock: Option<Rc<FrameClock>>,
    target: Option<u64>,
}

impl Future for NextFrame {
    type Output = u64;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<u64> {
        let this = self.get_mut();
        let Some(clock) = &this.clock else {
            return Poll::Pending;
        };
        let target = *this.target.get_or_insert(clock.frame() + 1);
        if clock.frame() >= target {
            Poll::Ready(clock.now_nanos())
        } else {
            clock.register(cx.waker());
            Poll::Pending
        }
    }
}

/// Suspends the calling task for at least `duration` of frame time.
pub async fn delay(duration: Duration) {
    let start = now_nanos();
    let wait = u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX);
    loop {
        let t = with_frame_nanos().await;
        if t.saturating_sub(start) >= wait {
            break;
        }
    }
}
