use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use recompose_core::*;

/// Items composed on the first frame, before the viewport is known.
const INITIAL_BATCH: usize = 20;

thread_local! {
    static NEXT_LIST_ID: Cell<u64> = const { Cell::new(1) };
}

/// Scroll position of a lazy list: the first visible item plus how far (px)
/// it is scrolled out of view.
pub struct LazyListState {
    id: u64,
    first_index: Signal<usize>,
    first_offset: Signal<f32>,
    /// Main-axis viewport (px) from the last layout; 0 until measured.
    viewport: Signal<f32>,
    extents: RefCell<HashMap<usize, f32>>,
    item_count: Cell<usize>,
    fling: RefCell<Option<Job>>,
}

impl Default for LazyListState {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for LazyListState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LazyListState")
            .field("first_index", &self.first_index.get_untracked())
            .field("first_offset", &self.first_offset.get_untracked())
            .field("viewport", &self.viewport.get_untracked())
            .finish()
    }
}

impl LazyListState {
    pub fn new() -> Self {
        let id = NEXT_LIST_ID.with(|n| {
            let id = n.get();
            n.set(id + 1);
            id
        });
        Self {
            id,
            first_index: signal(0),
            first_offset: signal(0.0),
            viewport: signal(0.0),
            extents: RefCell::new(HashMap::new()),
            item_count: Cell::new(0),
            fling: RefCell::new(None),
        }
    }

    pub fn first_visible_item_index(&self) -> usize {
        self.first_index.get()
    }

    pub fn first_visible_item_offset(&self) -> f32 {
        self.first_offset.get()
    }

    pub fn is_scroll_in_progress(&self) -> bool {
        self.fling.borrow().as_ref().is_some_and(Job::is_active)
    }

    fn extent_of(&self, index: usize) -> f32 {
        let extents = self.extents.borrow();
        if let Some(e) = extents.get(&index) {
            return *e;
        }
        if extents.is_empty() {
            0.0
        } else {
            extents.values().sum::<f32>() / extents.len() as f32
        }
    }

    fn absolute(&self, index: usize, offset: f32) -> f32 {
        (0..index).map(|i| self.extent_of(i)).sum::<f32>() + offset
    }

    fn max_scroll(&self) -> f32 {
        let total: f32 = (0..self.item_count.get()).map(|i| self.extent_of(i)).sum();
        (total - self.viewport.get_untracked()).max(0.0)
    }

    fn set_absolute(&self, mut position: f32) {
        let count = self.item_count.get();
        let mut index = 0;
        while index + 1 < count {
            let extent = self.extent_of(index);
            if extent <= 0.0 || position < extent {
                break;
            }
            position -= extent;
            index += 1;
        }
        self.first_index.set_if_changed(index);
        self.first_offset.set_if_changed(position.max(0.0));
    }

    /// Moves the list by `delta` px (positive scrolls towards the end).
    /// Returns how much was consumed before hitting either end.
    pub fn scroll_by(&self, delta: f32) -> f32 {
        if self.item_count.get() == 0 || self.extents.borrow().is_empty() {
            return 0.0;
        }
        let before = self.absolute(
            self.first_index.get_untracked(),
            self.first_offset.get_untracked(),
        );
        let after = (before + delta).clamp(0.0, self.max_scroll().max(before));
        self.set_absolute(after);
        log::trace!("lazy list {}: scrolled {} of {delta}", self.id, after - before);
        after - before
    }

    /// Puts `index` at the start of the viewport, scrolled in by `offset` px.
    pub fn scroll_to_item(&self, index: usize, offset: f32) {
        self.cancel_fling();
        let index = index.min(self.item_count.get().saturating_sub(1));
        self.first_index.set_if_changed(index);
        self.first_offset.set_if_changed(offset.max(0.0));
    }

    /// Scrolls with a spline decay from `velocity` px/s until the list rests
    /// or reaches an end.
    pub fn fling(self: &Rc<Self>, velocity: f32) -> Result<Job, ComposeError> {
        self.cancel_fling();
        let spec = DecayAnimationSpec::spline_based(density().scale);
        let this = Rc::downgrade(self);
        let id = self.id;
        let job = launch(async move {
            let distance = Animatable::new(0.0f32);
            let mut last = 0.0f32;
            let result = distance
                .animate_decay_with(velocity, spec, |a| {
                    let Some(this) = this.upgrade() else {
                        a.stop();
                        return;
                    };
                    let v = a.value_untracked();
                    let delta = v - last;
                    last = v;
                    let consumed = this.scroll_by(delta);
                    if (consumed - delta).abs() > 0.5 {
                        a.stop();
                    }
                })
                .await;
            log::debug!(
                "lazy list {id}: fling ended ({:?}) after {}px",
                result.end_reason,
                result.end_state
            );
        })?;
        *self.fling.borrow_mut() = Some(job.clone());
        Ok(job)
    }

    fn cancel_fling(&self) {
        if let Some(job) = self.fling.borrow_mut().take() {
            job.cancel();
        }
    }

    fn on_measure(&self, first: usize, viewport: f32, extents: &[f32]) {
        {
            let mut known = self.extents.borrow_mut();
            for (i, e) in extents.iter().enumerate() {
                known.insert(first + i, *e);
            }
        }
        // the next frame composes the items this viewport needs
        self.viewport.set_if_changed(viewport);
    }
}

impl Drop for LazyListState {
    fn drop(&mut self) {
        self.cancel_fling();
    }
}

pub fn remember_lazy_list_state() -> Rc<LazyListState> {
    remember(LazyListState::new)
}

type ItemFn = Rc<dyn Fn(usize) -> View>;

/// Collects item builders; nothing is built until the list knows which items
/// are visible.
#[derive(Default)]
pub struct LazyListScope {
    entries: Vec<(usize, ItemFn)>,
}

impl LazyListScope {
    pub fn item(&mut self, content: impl Fn() -> View + 'static) {
        self.entries.push((1, Rc::new(move |_: usize| content())));
    }

    pub fn items<T: 'static>(&mut self, items: Vec<T>, content: impl Fn(&T) -> View + 'static) {
        let n = items.len();
        self.entries
            .push((n, Rc::new(move |i: usize| content(&items[i]))));
    }

    pub fn items_indexed<T: 'static>(
        &mut self,
        items: Vec<T>,
        content: impl Fn(usize, &T) -> View + 'static,
    ) {
        let n = items.len();
        self.entries
            .push((n, Rc::new(move |i: usize| content(i, &items[i]))));
    }

    pub fn len(&self) -> usize {
        self.entries.iter().map(|(n, _)| n).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn builder(&self, mut index: usize) -> Option<(ItemFn, usize)> {
        for (n, f) in &self.entries {
            if index < *n {
                return Some((f.clone(), index));
            }
            index -= n;
        }
        None
    }
}

fn lazy_list(
    orientation: Orientation,
    modifier: Modifier,
    state: Rc<LazyListState>,
    content: impl FnOnce(&mut LazyListScope),
) -> View {
    let mut scope = LazyListScope::default();
    content(&mut scope);
    let count = scope.len();
    state.item_count.set(count);

    let first = state.first_index.get().min(count.saturating_sub(1));
    let first_offset = state.first_offset.get();
    let viewport = state.viewport.get();

    let mut children = Vec::new();
    let mut covered = -first_offset;
    let mut index = first;
    while index < count {
        if viewport <= 0.0 {
            if index >= first + INITIAL_BATCH {
                break;
            }
        } else if covered >= viewport {
            break;
        }
        if let Some((build, local)) = scope.builder(index) {
            children.push(restartable(format!("lazy{}#{index}", state.id), move || {
                build(local)
            }));
        }
        covered += state.extent_of(index);
        index += 1;
    }
    log::trace!(
        "lazy list {}: composing items {first}..{index} of {count}",
        state.id
    );

    let on_measure = {
        let state = Rc::downgrade(&state);
        MeasureHandler(Rc::new(move |viewport: f32, extents: &[f32]| {
            if let Some(state) = state.upgrade() {
                state.on_measure(first, viewport, extents);
            }
        }))
    };
    View::new(
        0,
        ViewKind::LazyList {
            orientation,
            first_offset,
            on_measure: Some(on_measure),
        },
    )
    .modifier(modifier)
    .with_children(children)
}

/// Vertical list that only builds the items intersecting its viewport.
pub fn LazyColumn(
    modifier: Modifier,
    state: Rc<LazyListState>,
    content: impl FnOnce(&mut LazyListScope),
) -> View {
    lazy_list(Orientation::Vertical, modifier, state, content)
}

pub fn LazyRow(
    modifier: Modifier,
    state: Rc<LazyListState>,
    content: impl FnOnce(&mut LazyListScope),
) -> View {
    lazy_list(Orientation::Horizontal, modifier, state, content)
}
