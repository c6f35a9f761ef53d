//! Side effects bound to the lifetime of a render scope.

use std::cell::RefCell;
use std::future::Future;
use std::rc::Rc;

use crate::runtime::remember;
use crate::scope::{current_scope, scoped_effect};
use crate::task::{Job, launch};

#[derive(Clone)]
pub struct Dispose(Rc<RefCell<Option<Box<dyn FnOnce()>>>>);

impl Dispose {
    pub fn new(f: impl FnOnce() + 'static) -> Self {
        Self(Rc::new(RefCell::new(Some(Box::new(f)))))
    }

    /// Runs at most once.
    pub fn run(&self) {
        let f = self.0.borrow_mut().take();
        if let Some(f) = f {
            f()
        }
    }
}

/// Runs `f()` now; its `Dispose` runs when the current scope is torn down.
pub fn effect<F>(f: F) -> Dispose
where
    F: FnOnce() -> Dispose + 'static,
{
    let d = f();
    if let Some(scope) = current_scope() {
        let d2 = d.clone();
        scope.add_disposer(move || d2.run());
    }
    d
}

/// Cleanup to return from an effect.
pub fn on_unmount(f: impl FnOnce() + 'static) -> Dispose {
    Dispose::new(f)
}

struct DisposableSlot<K> {
    key: RefCell<Option<K>>,
    cleanup: RefCell<Option<Dispose>>,
}

/// Runs `effect` on first render and whenever `key` changes; the previous
/// cleanup runs first. The last cleanup runs on unmount.
pub fn disposable_effect<K: PartialEq + Clone + 'static>(
    key: K,
    effect: impl FnOnce() -> Dispose + 'static,
) {
    let mut first = false;
    let slot = remember(|| {
        first = true;
        DisposableSlot::<K> {
            key: RefCell::new(None),
            cleanup: RefCell::new(None),
        }
    });
    if first {
        let slot = slot.clone();
        scoped_effect(move || {
            Box::new(move || {
                let d = slot.cleanup.borrow_mut().take();
                if let Some(d) = d {
                    d.run();
                }
            })
        });
    }

    if slot.key.borrow().as_ref() == Some(&key) {
        return;
    }
    *slot.key.borrow_mut() = Some(key);
    let previous = slot.cleanup.borrow_mut().take();
    if let Some(d) = previous {
        d.run();
    }
    let d = effect();
    *slot.cleanup.borrow_mut() = Some(d);
}

/// Runs on every render of the calling scope.
pub fn side_effect(effect: impl Fn()) {
    effect();
}

struct LaunchedSlot<K> {
    key: RefCell<Option<K>>,
    job: RefCell<Option<Job>>,
}

impl<K> Drop for LaunchedSlot<K> {
    fn drop(&mut self) {
        if let Some(job) = self.job.get_mut().take() {
            job.cancel();
        }
    }
}

/// Starts the task built by `effect` on first render and whenever `key`
/// changes, cancelling the task of the previous key. The task is cancelled
/// when the scope unmounts.
pub fn launched_effect<K, F, Fut>(key: K, effect: F)
where
    K: PartialEq + Clone + 'static,
    F: FnOnce() -> Fut,
    Fut: Future<Output = ()> + 'static,
{
    let slot = remember(|| LaunchedSlot::<K> {
        key: RefCell::new(None),
        job: RefCell::new(None),
    });
    if slot.key.borrow().as_ref() == Some(&key) {
        return;
    }
    *slot.key.borrow_mut() = Some(key);
    if let Some(job) = slot.job.borrow_mut().take() {
        job.cancel();
    }
    match launch(effect()) {
        Ok(job) => *slot.job.borrow_mut() = Some(job),
        Err(e) => log::warn!("launched_effect: {e}"),
    }
}
