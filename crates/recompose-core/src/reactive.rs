//! Dependency graph between state cells and the observers that read them.
//!
//! Writes never run observers inline: `signal_changed` only queues the
//! observers that read the signal during their last run, and `flush_pending`
//! drains that queue. The scheduler calls `flush_pending` once per frame, so
//! a burst of writes costs one re-run per observer.

use std::cell::{Cell, RefCell};
use std::collections::{HashSet, VecDeque};
use std::rc::Rc;

use slotmap::{SecondaryMap, SlotMap, new_key_type};

new_key_type! {
    pub struct SignalId;
    pub struct ObserverId;
}

/// Upper bound on observer runs in a single flush. Hitting it means two
/// observers keep invalidating each other.
const MAX_FLUSH_RUNS: usize = 10_000;

thread_local! {
    static CURRENT_OBSERVER: Cell<Option<ObserverId>> = const { Cell::new(None) };
    static GRAPH: RefCell<DepGraph> = RefCell::new(DepGraph::default());
}

#[derive(Default)]
struct DepGraph {
    signals: SlotMap<SignalId, ()>,
    // recompute closures
    observers: SlotMap<ObserverId, Rc<dyn Fn()>>,
    // signal_id -> observers that depend on it
    edges: SecondaryMap<SignalId, HashSet<ObserverId>>,
    // observer_id -> signals it depends on
    back: SecondaryMap<ObserverId, HashSet<SignalId>>,
    pending: VecDeque<ObserverId>,
    queued: HashSet<ObserverId>,
    running: HashSet<ObserverId>,
}

impl DepGraph {
    fn remove_all_edges_for(&mut self, obs: ObserverId) {
        if let Some(signals) = self.back.remove(obs) {
            for s in signals {
                if let Some(set) = self.edges.get_mut(s) {
                    set.remove(&obs);
                }
            }
        }
    }
}

pub fn new_signal_id() -> SignalId {
    GRAPH.with(|g| g.borrow_mut().signals.insert(()))
}

/// Forget a signal. Tolerates being called while the graph is busy or being
/// torn down (signals are often dropped from inside observer closures).
pub fn drop_signal(sig: SignalId) {
    let _ = GRAPH.try_with(|g| {
        if let Ok(mut g) = g.try_borrow_mut() {
            g.signals.remove(sig);
            if let Some(observers) = g.edges.remove(sig) {
                for obs in observers {
                    if let Some(set) = g.back.get_mut(obs) {
                        set.remove(&sig);
                    }
                }
            }
        }
    });
}

pub fn register_signal_read(sig: SignalId) {
    if let Some(obs) = CURRENT_OBSERVER.with(|co| co.get()) {
        GRAPH.with(|g| {
            let mut g = g.borrow_mut();
            if !g.observers.contains_key(obs) || !g.signals.contains_key(sig) {
                return;
            }
            if let Some(set) = g.edges.entry(sig) {
                set.or_default().insert(obs);
            }
            if let Some(set) = g.back.entry(obs) {
                set.or_default().insert(sig);
            }
        });
    }
}

/// Queue every observer that read `sig`. Returns immediately.
pub fn signal_changed(sig: SignalId) {
    let _ = GRAPH.try_with(|g| {
        let mut g = g.borrow_mut();
        let Some(observers) = g.edges.get(sig).cloned() else {
            return;
        };
        for obs in observers {
            if g.queued.insert(obs) {
                g.pending.push_back(obs);
            }
        }
    });
}

pub fn has_pending() -> bool {
    GRAPH.with(|g| !g.borrow().pending.is_empty())
}

/// Run queued observers until the queue is empty. Returns how many ran.
pub fn flush_pending() -> usize {
    let mut runs = 0;
    loop {
        let next = GRAPH.with(|gcell| {
            let mut g = gcell.borrow_mut();
            while let Some(obs) = g.pending.pop_front() {
                g.queued.remove(&obs);
                if g.running.contains(&obs) {
                    continue;
                }
                let Some(f) = g.observers.get(obs).cloned() else {
                    continue;
                };
                g.running.insert(obs);
                // clear previous deps before recompute
                g.remove_all_edges_for(obs);
                return Some((obs, f));
            }
            None
        });
        let Some((obs, f)) = next else {
            break;
        };
        with_observer(Some(obs), || f());
        GRAPH.with(|g| g.borrow_mut().running.remove(&obs));

        runs += 1;
        if runs >= MAX_FLUSH_RUNS {
            log::warn!(
                "flush_pending: stopped after {runs} observer runs; state is being written in a cycle"
            );
            break;
        }
    }
    runs
}

pub fn new_observer(f: impl Fn() + 'static) -> ObserverId {
    GRAPH.with(|g| g.borrow_mut().observers.insert(Rc::new(f)))
}

/// Remove an observer and all of its dependency edges.
pub fn remove_observer(id: ObserverId) {
    let removed = GRAPH.try_with(|g| {
        let Ok(mut g) = g.try_borrow_mut() else {
            return None;
        };
        g.remove_all_edges_for(id);
        g.running.remove(&id);
        if g.queued.remove(&id) {
            g.pending.retain(|o| *o != id);
        }
        g.observers.remove(id)
    });
    // Dropped outside the borrow: the closure may own signals.
    drop(removed);
}

pub fn run_observer_now(id: ObserverId) {
    let f = GRAPH.with(|gcell| {
        let mut g = gcell.borrow_mut();
        g.remove_all_edges_for(id);
        g.observers.get(id).cloned()
    });
    if let Some(f) = f {
        with_observer(Some(id), || f());
    }
}

/// Run `f` as observer `id`: its previous edges are dropped and every signal
/// read inside `f` becomes a new edge.
pub fn track<R>(id: ObserverId, f: impl FnOnce() -> R) -> R {
    GRAPH.with(|g| g.borrow_mut().remove_all_edges_for(id));
    with_observer(Some(id), f)
}

/// Run `f` without recording any reads.
pub fn untracked<R>(f: impl FnOnce() -> R) -> R {
    with_observer(None, f)
}

fn with_observer<R>(obs: Option<ObserverId>, f: impl FnOnce() -> R) -> R {
    struct Restore(Option<ObserverId>);
    impl Drop for Restore {
        fn drop(&mut self) {
            let prev = self.0;
            let _ = CURRENT_OBSERVER.try_with(|co| co.set(prev));
        }
    }
    let prev = CURRENT_OBSERVER.with(|co| co.replace(obs));
    let _restore = Restore(prev);
    f()
}

pub fn dependencies_of(id: ObserverId) -> usize {
    GRAPH.with(|g| g.borrow().back.get(id).map_or(0, |s| s.len()))
}
