//! Content that animates in and out: [`AnimatedVisibility`],
//! [`AnimatedContent`] and [`Crossfade`].
//!
//! Enter and exit effects combine with `+`; the left operand wins when both
//! sides configure the same effect.
//!
//! ```rust
//! use recompose_ui::*;
//!
//! let enter = fade_in() + expand_horizontally();
//! let exit = scale_out() + fade_out();
//! let _transform = enter.together_with(exit);
//! ```

use std::cell::{Cell, RefCell};
use std::ops::Add;
use std::rc::Rc;

use bitflags::bitflags;
use recompose_core::*;

use crate::transition::Segment;

bitflags! {
    /// Axes an expand or shrink effect acts on.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct Axes: u8 {
        const HORIZONTAL = 0b01;
        const VERTICAL = 0b10;
    }
}

fn visibility_spring() -> AnimationSpec {
    AnimationSpec::spring_with(
        spring::DAMPING_RATIO_NO_BOUNCY,
        spring::STIFFNESS_MEDIUM_LOW,
    )
}

/// Size fractions settle to within a fraction of a pixel.
fn size_spring() -> AnimationSpec {
    visibility_spring().with_visibility_threshold(0.001)
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Fade {
    spec: AnimationSpec,
    alpha: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Scale {
    spec: AnimationSpec,
    scale: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Expand {
    spec: AnimationSpec,
    axes: Axes,
}

/// How content appears. Each effect names the value it starts from.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EnterTransition {
    fade: Option<Fade>,
    scale: Option<Scale>,
    expand: Option<Expand>,
}

/// How content disappears. Each effect names the value it ends at.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ExitTransition {
    fade: Option<Fade>,
    scale: Option<Scale>,
    shrink: Option<Expand>,
}

impl EnterTransition {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn together_with(self, exit: ExitTransition) -> ContentTransform {
        ContentTransform { enter: self, exit }
    }
}

impl ExitTransition {
    pub fn none() -> Self {
        Self::default()
    }
}

impl Add for EnterTransition {
    type Output = EnterTransition;
    fn add(self, rhs: EnterTransition) -> EnterTransition {
        EnterTransition {
            fade: self.fade.or(rhs.fade),
            scale: self.scale.or(rhs.scale),
            expand: self.expand.or(rhs.expand),
        }
    }
}

impl Add for ExitTransition {
    type Output = ExitTransition;
    fn add(self, rhs: ExitTransition) -> ExitTransition {
        ExitTransition {
            fade: self.fade.or(rhs.fade),
            scale: self.scale.or(rhs.scale),
            shrink: self.shrink.or(rhs.shrink),
        }
    }
}

pub fn fade_in() -> EnterTransition {
    fade_in_with(visibility_spring(), 0.0)
}

pub fn fade_in_with(spec: AnimationSpec, initial_alpha: f32) -> EnterTransition {
    EnterTransition {
        fade: Some(Fade {
            spec,
            alpha: initial_alpha,
        }),
        ..Default::default()
    }
}

pub fn scale_in() -> EnterTransition {
    scale_in_with(visibility_spring(), 0.0)
}

pub fn scale_in_with(spec: AnimationSpec, initial_scale: f32) -> EnterTransition {
    EnterTransition {
        scale: Some(Scale {
            spec,
            scale: initial_scale,
        }),
        ..Default::default()
    }
}

pub fn expand_in_with(spec: AnimationSpec, axes: Axes) -> EnterTransition {
    EnterTransition {
        expand: Some(Expand { spec, axes }),
        ..Default::default()
    }
}

pub fn expand_in() -> EnterTransition {
    expand_in_with(size_spring(), Axes::all())
}

pub fn expand_horizontally() -> EnterTransition {
    expand_in_with(size_spring(), Axes::HORIZONTAL)
}

pub fn expand_vertically() -> EnterTransition {
    expand_in_with(size_spring(), Axes::VERTICAL)
}

pub fn fade_out() -> ExitTransition {
    fade_out_with(visibility_spring(), 0.0)
}

pub fn fade_out_with(spec: AnimationSpec, target_alpha: f32) -> ExitTransition {
    ExitTransition {
        fade: Some(Fade {
            spec,
            alpha: target_alpha,
        }),
        ..Default::default()
    }
}

pub fn scale_out() -> ExitTransition {
    scale_out_with(visibility_spring(), 0.0)
}

pub fn scale_out_with(spec: AnimationSpec, target_scale: f32) -> ExitTransition {
    ExitTransition {
        scale: Some(Scale {
            spec,
            scale: target_scale,
        }),
        ..Default::default()
    }
}

pub fn shrink_out_with(spec: AnimationSpec, axes: Axes) -> ExitTransition {
    ExitTransition {
        shrink: Some(Expand { spec, axes }),
        ..Default::default()
    }
}

pub fn shrink_out() -> ExitTransition {
    shrink_out_with(size_spring(), Axes::all())
}

pub fn shrink_horizontally() -> ExitTransition {
    shrink_out_with(size_spring(), Axes::HORIZONTAL)
}

pub fn shrink_vertically() -> ExitTransition {
    shrink_out_with(size_spring(), Axes::VERTICAL)
}

/// Enter for the incoming content, exit for the outgoing one.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ContentTransform {
    pub enter: EnterTransition,
    pub exit: ExitTransition,
}

/// The four values an enter or exit effect drives.
struct Channels {
    alpha: Animatable<f32>,
    scale: Animatable<f32>,
    width: Animatable<f32>,
    height: Animatable<f32>,
}

async fn drive(anim: &Animatable<f32>, target: f32, spec: Option<AnimationSpec>) {
    match spec {
        None => anim.snap_to(target),
        Some(_) if anim.value_untracked() == target && !anim.is_running() => {}
        Some(spec) => {
            anim.animate_to(target, spec).await;
        }
    }
}

impl Channels {
    fn shown() -> Self {
        Self {
            alpha: Animatable::new(1.0),
            scale: Animatable::new(1.0),
            width: Animatable::new(1.0),
            height: Animatable::new(1.0),
        }
    }

    fn entering(enter: &EnterTransition) -> Self {
        let c = Self::shown();
        c.reset_to_enter_start(enter);
        c
    }

    fn reset_to_enter_start(&self, enter: &EnterTransition) {
        self.alpha.snap_to(enter.fade.map_or(1.0, |f| f.alpha));
        self.scale.snap_to(enter.scale.map_or(1.0, |s| s.scale));
        let axes = enter.expand.map_or(Axes::empty(), |e| e.axes);
        self.width
            .snap_to(if axes.contains(Axes::HORIZONTAL) { 0.0 } else { 1.0 });
        self.height
            .snap_to(if axes.contains(Axes::VERTICAL) { 0.0 } else { 1.0 });
    }

    /// Animates every channel back to fully shown, from wherever it is.
    async fn enter(&self, enter: EnterTransition) {
        let size_spec = enter.expand.map(|e| e.spec);
        futures::join!(
            drive(&self.alpha, 1.0, enter.fade.map(|f| f.spec)),
            drive(&self.scale, 1.0, enter.scale.map(|s| s.spec)),
            drive(&self.width, 1.0, size_spec),
            drive(&self.height, 1.0, size_spec),
        );
    }

    async fn exit(&self, exit: ExitTransition) {
        let keep = |anim: &Animatable<f32>| anim.value_untracked();
        let axes = exit.shrink.map_or(Axes::empty(), |s| s.axes);
        let size_spec = exit.shrink.map(|s| s.spec);
        futures::join!(
            drive(
                &self.alpha,
                exit.fade.map_or(keep(&self.alpha), |f| f.alpha),
                exit.fade.map(|f| f.spec),
            ),
            drive(
                &self.scale,
                exit.scale.map_or(keep(&self.scale), |s| s.scale),
                exit.scale.map(|s| s.spec),
            ),
            drive(
                &self.width,
                if axes.contains(Axes::HORIZONTAL) { 0.0 } else { keep(&self.width) },
                size_spec,
            ),
            drive(
                &self.height,
                if axes.contains(Axes::VERTICAL) { 0.0 } else { keep(&self.height) },
                size_spec,
            ),
        );
    }

    /// Reads every channel, so the calling scope follows the animation.
    /// Channels at rest add nothing to the chain.
    fn modifier(&self) -> Modifier {
        let (alpha, scale) = (self.alpha.value(), self.scale.value());
        let (width, height) = (self.width.value(), self.height.value());
        let mut m = Modifier::new();
        if width < 1.0 || height < 1.0 {
            m = m.layout_fraction(width, height);
        }
        if alpha < 1.0 {
            m = m.alpha(alpha);
        }
        if scale != 1.0 {
            m = m.scale(scale);
        }
        m
    }
}

thread_local! {
    static NEXT_CONTENT_ID: Cell<u64> = const { Cell::new(1) };
}

/// Names the keyed group that holds one piece of animated content.
fn next_content_id() -> u64 {
    NEXT_CONTENT_ID.with(|n| {
        let id = n.get();
        n.set(id + 1);
        id
    })
}

struct VisibilityState {
    id: u64,
    channels: Channels,
    /// True once the exit has finished and the content is gone.
    exited: Signal<bool>,
}

/// Shows `content` while `visible`, running `enter` when it turns true and
/// `exit` before removing the content when it turns false. Content that is
/// visible on the first render does not animate.
///
/// The content keeps its own slots: what it remembers is dropped once the
/// exit finishes and starts fresh on the next enter.
pub fn AnimatedVisibility(
    visible: bool,
    enter: EnterTransition,
    exit: ExitTransition,
    content: impl FnOnce() -> View,
) -> View {
    let state = remember(|| VisibilityState {
        id: next_content_id(),
        channels: Channels::shown(),
        exited: signal(!visible),
    });
    launched_effect(visible, || {
        let state = Rc::clone(&state);
        async move {
            if visible {
                if state.exited.get_untracked() {
                    state.channels.reset_to_enter_start(&enter);
                    state.exited.set(false);
                }
                state.channels.enter(enter).await;
            } else if !state.exited.get_untracked() {
                state.channels.exit(exit).await;
                log::debug!("AnimatedVisibility: exit finished");
                state.exited.set(true);
            }
        }
    });

    if state.exited.get() {
        return crate::Box(Modifier::new());
    }
    let modifier = state.channels.modifier();
    let child = keyed(format!("visibility#{}", state.id), content);
    crate::Box(modifier).with_children(vec![child])
}

struct ContentItem<T> {
    id: u64,
    key: T,
    channels: Rc<Channels>,
    job: RefCell<Option<Job>>,
}

impl<T> ContentItem<T> {
    fn new(key: T, channels: Channels) -> Self {
        Self {
            id: next_content_id(),
            key,
            channels: Rc::new(channels),
            job: RefCell::new(None),
        }
    }

    fn run(&self, fut: impl Future<Output = ()> + 'static) {
        if let Some(prev) = self.job.borrow_mut().take() {
            prev.cancel();
        }
        match launch(fut) {
            Ok(job) => *self.job.borrow_mut() = Some(job),
            Err(e) => log::warn!("AnimatedContent: {e}"),
        }
    }
}

impl<T> Drop for ContentItem<T> {
    fn drop(&mut self) {
        if let Some(job) = self.job.get_mut().take() {
            job.cancel();
        }
    }
}

struct ContentState<T> {
    current: RefCell<T>,
    items: RefCell<Vec<ContentItem<T>>>,
    /// Bumped when a finished exit removes an item.
    removed: Signal<u64>,
    transitions: Cell<u64>,
}

impl<T> ContentState<T> {
    fn remove(&self, id: u64) {
        let item = {
            let mut items = self.items.borrow_mut();
            let Some(i) = items.iter().position(|i| i.id == id) else {
                return;
            };
            items.remove(i)
        };
        drop(item);
        self.removed.update(|n| *n += 1);
    }
}

/// Swaps content when `target` changes: the outgoing content runs its exit
/// while the incoming runs its enter, both chosen by `transition_spec` for the
/// segment being crossed.
///
/// Each target's content renders in its own keyed group, so state it
/// remembers stays with that target and is dropped when its exit finishes.
pub fn AnimatedContent<T: Clone + PartialEq + 'static>(
    target: T,
    transition_spec: impl FnOnce(&Segment<T>) -> ContentTransform,
    content: impl Fn(&T) -> View,
) -> View {
    let state = remember(|| ContentState {
        current: RefCell::new(target.clone()),
        items: RefCell::new(vec![ContentItem::new(target.clone(), Channels::shown())]),
        removed: signal(0),
        transitions: Cell::new(0),
    });

    if *state.current.borrow() != target {
        let segment = Segment {
            initial: state.current.replace(target.clone()),
            target: target.clone(),
        };
        let transform = transition_spec(&segment);
        state.transitions.set(state.transitions.get() + 1);
        log::debug!(
            "AnimatedContent: transition #{}",
            state.transitions.get()
        );

        let mut items = state.items.borrow_mut();
        for item in items.iter().filter(|i| i.key != target) {
            let channels = Rc::clone(&item.channels);
            let owner = Rc::downgrade(&state);
            let (id, exit) = (item.id, transform.exit);
            item.run(async move {
                channels.exit(exit).await;
                if let Some(state) = owner.upgrade() {
                    state.remove(id);
                }
            });
        }
        let enter = transform.enter;
        let index = match items.iter().position(|i| i.key == target) {
            Some(i) => i,
            None => {
                items.push(ContentItem::new(target.clone(), Channels::entering(&enter)));
                items.len() - 1
            }
        };
        let channels = Rc::clone(&items[index].channels);
        items[index].run(async move { channels.enter(enter).await });
    }

    state.removed.get();
    let children = state
        .items
        .borrow()
        .iter()
        .map(|i| {
            let child = keyed(format!("content#{}", i.id), || content(&i.key));
            crate::Box(i.channels.modifier()).with_children(vec![child])
        })
        .collect();
    crate::Box(Modifier::new()).with_children(children)
}

/// Fades between the content for the old and the new `target`.
pub fn Crossfade<T: Clone + PartialEq + 'static>(
    target: T,
    spec: AnimationSpec,
    content: impl Fn(&T) -> View,
) -> View {
    AnimatedContent(
        target,
        |_| fade_in_with(spec, 0.0).together_with(fade_out_with(spec, 0.0)),
        content,
    )
}
