//! Render scopes and the frame scheduler.
//!
//! A render scope is a content function plus the storage it remembers
//! between runs. The scheduler renders the root scope once on `mount`; after
//! that a scope only runs again when a signal it read during its last run
//! changes. `restartable` carves a subtree into its own scope so a change
//! deep in the tree does not re-run its ancestors.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::rc::{Rc, Weak};

use futures::executor::LocalPool;
use web_time::Duration;

use crate::clock::{self, FrameClock};
use crate::reactive::{self, ObserverId};
use crate::scope::{Scope, current_scope};
use crate::task;
use crate::view::Handler;
use crate::{Rect, Scene, View, ViewKind};

/// Passes of flush + re-render per frame before giving up on a state cycle.
const MAX_RECOMPOSE_PASSES: usize = 64;

#[derive(Default)]
pub struct SlotTable {
    slots: Vec<Box<dyn Any>>,
    cursor: usize,
    keyed: HashMap<String, Box<dyn Any>>,
    groups: HashMap<String, Scope>,
    visited_groups: HashSet<String>,
}

impl SlotTable {
    fn begin(&mut self) {
        self.cursor = 0;
        self.visited_groups.clear();
    }

    /// Removes the groups the run that just ended did not enter.
    fn end(&mut self) -> Vec<Scope> {
        let visited = &self.visited_groups;
        let stale: Vec<String> = self
            .groups
            .keys()
            .filter(|k| !visited.contains(*k))
            .cloned()
            .collect();
        stale.into_iter().filter_map(|k| self.groups.remove(&k)).collect()
    }

    pub(crate) fn take_groups(&mut self) -> Vec<Scope> {
        self.visited_groups.clear();
        self.groups.drain().map(|(_, g)| g).collect()
    }

    pub fn len(&self) -> usize {
        self.slots.len() + self.keyed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn take_all(&mut self) -> Vec<Box<dyn Any>> {
        self.cursor = 0;
        let mut all = std::mem::take(&mut self.slots);
        all.extend(self.keyed.drain().map(|(_, v)| v));
        all
    }
}

/// Slot-based remember: the Nth call during a render always returns the Nth
/// stored value. Outside a composition `init` runs every time.
pub fn remember<T: 'static>(init: impl FnOnce() -> T) -> Rc<T> {
    let Some(scope) = current_scope() else {
        log::warn!("remember called outside of a composition; value will not persist");
        return Rc::new(init());
    };
    let index = scope.with_slots(|s| {
        let index = s.cursor;
        s.cursor += 1;
        if index == s.slots.len() {
            // reserve the slot so nested remembers inside `init` land after it
            s.slots.push(Box::new(()));
        }
        index
    });
    let existing = scope.with_slots(|s| s.slots.get(index).and_then(|b| b.downcast_ref::<Rc<T>>().cloned()));
    if let Some(rc) = existing {
        return rc;
    }

    let rc = Rc::new(init());
    let replaced = scope.with_slots(|s| {
        s.slots
            .get_mut(index)
            .map(|slot| std::mem::replace(slot, Box::new(rc.clone())))
    });
    if let Some(old) = replaced
        && !old.is::<()>()
    {
        log::warn!(
            "remember: slot {index} changed type; replacing. \
             Conditional calls should use remember_with_key."
        );
    }
    rc
}

/// Key-based remember, stable across conditional branches.
pub fn remember_with_key<T: 'static>(key: impl Into<String>, init: impl FnOnce() -> T) -> Rc<T> {
    let key = key.into();
    let Some(scope) = current_scope() else {
        log::warn!("remember_with_key('{key}') called outside of a composition");
        return Rc::new(init());
    };
    let existing = scope.with_slots(|s| s.keyed.get(&key).map(|b| b.downcast_ref::<Rc<T>>().cloned()));
    match existing {
        Some(Some(rc)) => return rc,
        Some(None) => log::warn!("remember_with_key: key '{key}' reused with a different type; replacing"),
        None => {}
    }
    let rc = Rc::new(init());
    let old = scope.with_slots(|s| s.keyed.insert(key, Box::new(rc.clone())));
    drop(old);
    rc
}

pub fn remember_state<T: 'static>(init: impl FnOnce() -> T) -> Rc<RefCell<T>> {
    remember(|| RefCell::new(init()))
}

pub fn remember_state_with_key<T: 'static>(
    key: impl Into<String>,
    init: impl FnOnce() -> T,
) -> Rc<RefCell<T>> {
    remember_with_key(key, || RefCell::new(init()))
}

type Content = Rc<dyn Fn() -> View>;

struct RenderScope {
    id: u64,
    key: String,
    depth: usize,
    scope: Scope,
    observer: ObserverId,
    content: RefCell<Content>,
    view: RefCell<Option<View>>,
    children: RefCell<HashMap<String, Rc<RenderScope>>>,
    visited: RefCell<HashSet<String>>,
    renders: Cell<u64>,
    disposed: Cell<bool>,
}

#[derive(Default)]
struct Composition {
    next_id: u64,
    invalid: BTreeSet<(usize, u64)>,
    scopes: HashMap<u64, Weak<RenderScope>>,
    stack: Vec<Rc<RenderScope>>,
    rendered: HashSet<u64>,
}

thread_local! {
    static COMPOSITION: RefCell<Composition> = RefCell::new(Composition::default());
}

fn invalidate(depth: usize, id: u64) {
    let _ = COMPOSITION.try_with(|c| {
        if let Ok(mut c) = c.try_borrow_mut() {
            log::trace!("scope #{id} invalidated");
            c.invalid.insert((depth, id));
        }
    });
}

impl RenderScope {
    fn new(key: String, depth: usize, scope: Scope, content: Content) -> Rc<Self> {
        let id = COMPOSITION.with(|c| {
            let mut c = c.borrow_mut();
            c.next_id += 1;
            c.next_id
        });
        let observer = reactive::new_observer(move || invalidate(depth, id));
        let rs = Rc::new(RenderScope {
            id,
            key,
            depth,
            scope,
            observer,
            content: RefCell::new(content),
            view: RefCell::new(None),
            children: RefCell::new(HashMap::new()),
            visited: RefCell::new(HashSet::new()),
            renders: Cell::new(0),
            disposed: Cell::new(false),
        });
        COMPOSITION.with(|c| c.borrow_mut().scopes.insert(id, Rc::downgrade(&rs)));
        log::debug!("mounted scope #{id} '{}' at depth {depth}", rs.key);
        rs
    }

    fn render(self: &Rc<Self>) {
        struct Pop;
        impl Drop for Pop {
            fn drop(&mut self) {
                let _ = COMPOSITION.try_with(|c| c.borrow_mut().stack.pop());
            }
        }

        COMPOSITION.with(|c| {
            let mut c = c.borrow_mut();
            c.invalid.remove(&(self.depth, self.id));
            c.rendered.insert(self.id);
            c.stack.push(self.clone());
        });
        let view = {
            let _pop = Pop;
            self.visited.borrow_mut().clear();
            self.scope.with_slots(SlotTable::begin);
            let content = self.content.borrow().clone();
            self.scope.run(|| reactive::track(self.observer, || content()))
        };
        for group in self.scope.with_slots(SlotTable::end) {
            group.dispose();
        }

        let stale: Vec<Rc<RenderScope>> = {
            let visited = self.visited.borrow();
            let mut children = self.children.borrow_mut();
            let keys: Vec<String> = children
                .keys()
                .filter(|k| !visited.contains(*k))
                .cloned()
                .collect();
            keys.into_iter().filter_map(|k| children.remove(&k)).collect()
        };
        for child in stale {
            child.dispose();
        }

        *self.view.borrow_mut() = Some(view);
        self.renders.set(self.renders.get() + 1);
        log::trace!("rendered scope #{} ({} times)", self.id, self.renders.get());
    }

    /// This scope's last output with every group placeholder replaced by the
    /// child scope it stands for.
    fn materialize(&self) -> Option<View> {
        let view = self.view.borrow().clone()?;
        Some(self.expand(view))
    }

    fn expand(&self, mut view: View) -> View {
        if let ViewKind::Group { scope } = view.kind {
            let child = self
                .children
                .borrow()
                .values()
                .find(|c| c.id == scope)
                .cloned();
            return match child.and_then(|c| c.materialize()) {
                Some(v) => v,
                None => {
                    log::warn!("group for unknown scope #{scope}; rendering nothing");
                    View::new(0, ViewKind::Box)
                }
            };
        }
        view.children = std::mem::take(&mut view.children)
            .into_iter()
            .map(|c| self.expand(c))
            .collect();
        view
    }

    fn dispose(&self) {
        if self.disposed.replace(true) {
            return;
        }
        let children: Vec<_> = self.children.borrow_mut().drain().map(|(_, c)| c).collect();
        for child in children {
            child.dispose();
        }
        reactive::remove_observer(self.observer);
        let _ = COMPOSITION.try_with(|c| {
            if let Ok(mut c) = c.try_borrow_mut() {
                c.scopes.remove(&self.id);
                c.invalid.remove(&(self.depth, self.id));
            }
        });
        self.view.borrow_mut().take();
        self.scope.clone().dispose();
        log::debug!("unmounted scope #{} '{}'", self.id, self.key);
    }
}

fn current_render_scope() -> Option<Rc<RenderScope>> {
    COMPOSITION.with(|c| c.borrow().stack.last().cloned())
}

/// Renders `content` in its own scope, keyed by `key` within the calling
/// scope.
///
/// The child re-renders on its own when a signal it reads changes, and along
/// with its parent. Children a parent render does not revisit are unmounted.
pub fn restartable(key: impl Into<String>, content: impl Fn() -> View + 'static) -> View {
    let Some(parent) = current_render_scope() else {
        log::warn!("restartable called outside of a composition; rendering inline");
        return content();
    };
    let key = key.into();
    if !parent.visited.borrow_mut().insert(key.clone()) {
        log::warn!("restartable key '{key}' used twice in one render; the scope is shared");
    }
    let content: Content = Rc::new(content);
    let existing = parent.children.borrow().get(&key).cloned();
    let child = match existing {
        Some(child) => {
            *child.content.borrow_mut() = content;
            child
        }
        None => {
            let child = RenderScope::new(key.clone(), parent.depth + 1, parent.scope.child(), content);
            parent.children.borrow_mut().insert(key, child.clone());
            child
        }
    };
    child.render();
    View::group(child.id)
}

/// Runs `content` with slot storage of its own, found again by `key` among
/// the groups of the calling scope. Unlike [`restartable`] the group renders
/// only as part of its caller. A group the caller's next run does not enter
/// is disposed with everything it remembered.
pub fn keyed<R>(key: impl Into<String>, content: impl FnOnce() -> R) -> R {
    let Some(parent) = current_scope() else {
        log::warn!("keyed called outside of a composition; running inline");
        return content();
    };
    let key = key.into();
    let group = parent.with_slots(|s| {
        if !s.visited_groups.insert(key.clone()) {
            log::warn!("keyed group '{key}' entered twice in one run; the slots are shared");
        }
        s.groups
            .entry(key.clone())
            .or_insert_with(|| {
                log::debug!("keyed group '{key}' created");
                Scope::new()
            })
            .clone()
    });
    group.with_slots(SlotTable::begin);
    let out = group.run(content);
    for stale in group.with_slots(SlotTable::end) {
        stale.dispose();
    }
    out
}

/// Frame: output of one scheduler tick, the materialized tree plus what was
/// painted from it.
pub struct Frame {
    pub scene: Scene,
    pub hit_regions: Vec<HitRegion>,
    pub root: View,
}

#[derive(Clone, Debug)]
pub struct HitRegion {
    pub id: u64,
    pub rect: Rect,
    pub on_click: Option<Handler>,
    /// Text inside the clickable element, if any.
    pub label: Option<String>,
}

/// Owns the root scope, the frame clock and the cooperative executor.
///
/// One scheduler per thread: creating it installs the clock and the task
/// spawner that `with_frame_nanos`, `delay` and `launch` use.
pub struct Scheduler {
    root: Option<Rc<RenderScope>>,
    pool: LocalPool,
    clock: Rc<FrameClock>,
    pub size: (u32, u32),
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler {
    pub fn new() -> Self {
        if clock::frame_clock().is_some() {
            log::warn!("a scheduler is already installed on this thread; replacing it");
        }
        let pool = LocalPool::new();
        task::install_spawner(pool.spawner());
        let clock = Rc::new(FrameClock::new());
        clock::install_clock(clock.clone());
        Self {
            root: None,
            pool,
            clock,
            size: (1280, 800),
        }
    }

    pub fn clock(&self) -> Rc<FrameClock> {
        self.clock.clone()
    }

    /// Attaches `content` as the root scope (replacing any previous one) and
    /// renders it.
    pub fn mount(&mut self, content: impl Fn() -> View + 'static) {
        self.unmount();
        let root = RenderScope::new("root".into(), 0, Scope::new(), Rc::new(content));
        root.render();
        self.root = Some(root);
        self.run_tasks();
        self.recompose();
    }

    /// Disposes every scope: remembered values dropped, disposers run,
    /// launched tasks cancelled.
    pub fn unmount(&mut self) {
        if let Some(root) = self.root.take() {
            root.dispose();
            // lets cancelled tasks observe the abort and release their captures
            self.pool.run_until_stalled();
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.root.is_some()
    }

    /// The current tree with every child scope expanded.
    pub fn render(&self) -> Option<View> {
        self.root.as_ref().and_then(|r| r.materialize())
    }

    /// Polls every task until none can make progress without a new frame.
    pub fn run_tasks(&mut self) {
        self.pool.run_until_stalled();
    }

    /// Flushes pending observers and re-renders invalid scopes, parents first.
    /// Returns how many scopes rendered.
    pub fn recompose(&mut self) -> usize {
        let mut rendered = 0;
        for _ in 0..MAX_RECOMPOSE_PASSES {
            reactive::flush_pending();
            let invalid = COMPOSITION.with(|c| {
                let mut c = c.borrow_mut();
                c.rendered.clear();
                std::mem::take(&mut c.invalid)
            });
            if invalid.is_empty() {
                return rendered;
            }
            for (_, id) in invalid {
                let (done, scope) = COMPOSITION.with(|c| {
                    let c = c.borrow();
                    (c.rendered.contains(&id), c.scopes.get(&id).and_then(Weak::upgrade))
                });
                // already rendered as part of its parent this pass
                if done {
                    continue;
                }
                if let Some(scope) = scope
                    && !scope.disposed.get()
                {
                    scope.render();
                    rendered += 1;
                }
            }
        }
        log::warn!("recompose: still invalid after {MAX_RECOMPOSE_PASSES} passes; a render is writing state it reads");
        rendered
    }

    /// True while a task waits for a frame or some scope is out of date.
    pub fn has_pending_work(&self) -> bool {
        self.clock.has_waiters()
            || reactive::has_pending()
            || COMPOSITION.with(|c| !c.borrow().invalid.is_empty())
    }

    /// Produces one frame `dt` after the previous one.
    pub fn repose(
        &mut self,
        dt: Duration,
        layout_paint: impl FnOnce(&View, (u32, u32)) -> (Scene, Vec<HitRegion>),
    ) -> Frame {
        // tasks launched since the last frame start at that frame's time
        self.run_tasks();
        self.clock.advance(dt);
        log::trace!("frame {} at {}ns", self.clock.frame(), self.clock.now_nanos());
        self.run_tasks();
        self.recompose();
        // effects launched by this recomposition get their first poll now
        self.run_tasks();
        self.recompose();

        let root = self
            .render()
            .unwrap_or_else(|| View::new(0, ViewKind::Box));
        let (scene, hit_regions) = layout_paint(&root, self.size);
        Frame {
            scene,
            hit_regions,
            root,
        }
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.unmount();
        task::uninstall_spawner();
        clock::uninstall_clock(&self.clock);
        let _ = COMPOSITION.try_with(|c| {
            if let Ok(mut c) = c.try_borrow_mut() {
                c.invalid.clear();
                c.scopes.retain(|_, w| w.strong_count() > 0);
            }
        });
    }
}

/// Number of times each live scope has rendered, keyed by scope key. Roots
/// and children share one namespace; use distinct keys when asserting.
pub fn render_counts() -> HashMap<String, u64> {
    COMPOSITION.with(|c| {
        c.borrow()
            .scopes
            .values()
            .filter_map(Weak::upgrade)
            .map(|s| (s.key.clone(), s.renders.get()))
            .collect()
    })
}
