//! Values that animate over frames.
//!
//! An [`Animatable`] owns a signal and drives it along an animation curve,
//! one write per frame. Starting a new animation interrupts the running one;
//! the new trajectory begins at the current value and velocity, so motion
//! stays continuous.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use crate::animation::{
    AnimVector, AnimationSpec, DecayAnimation, DecayAnimationSpec, TargetBasedAnimation,
    VectorConverter,
};
use crate::clock::{now_nanos, with_frame_nanos};
use crate::error::ComposeError;
use crate::reactive::SignalId;
use crate::signal::Signal;
use crate::task::{Job, launch};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnimationEndReason {
    /// Reached its target (or came to rest, for decay).
    Finished,
    /// Clamped by a bound set with [`Animatable::update_bounds`].
    BoundReached,
    /// Superseded by another animation, `snap_to` or `stop`.
    Interrupted,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AnimationResult<T> {
    pub end_reason: AnimationEndReason,
    pub end_state: T,
}

struct Inner<T> {
    value: Signal<T>,
    velocity: RefCell<AnimVector>,
    target: RefCell<T>,
    running: Signal<bool>,
    generation: Cell<u64>,
    lower: RefCell<Option<AnimVector>>,
    upper: RefCell<Option<AnimVector>>,
    job: RefCell<Option<Job>>,
}

pub struct Animatable<T: VectorConverter>(Rc<Inner<T>>);

impl<T: VectorConverter> Clone for Animatable<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T: VectorConverter + std::fmt::Debug> std::fmt::Debug for Animatable<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Animatable")
            .field("value", &self.value_untracked())
            .field("running", &self.0.running.get_untracked())
            .finish()
    }
}

/// Clears `running` when the animation that set it ends, however it ends.
struct RunGuard<'a, T> {
    inner: &'a Inner<T>,
    generation: u64,
}

impl<T> Drop for RunGuard<'_, T> {
    fn drop(&mut self) {
        if self.inner.generation.get() == self.generation {
            self.inner.running.set_if_changed(false);
        }
    }
}

fn zeros(n: usize) -> AnimVector {
    std::iter::repeat_n(0.0, n).collect()
}

impl<T: VectorConverter> Animatable<T> {
    pub fn new(initial: T) -> Self {
        Self::from_signal(Signal::new(initial))
    }

    /// Animates an existing cell in place.
    pub fn from_signal(value: Signal<T>) -> Self {
        let current = value.get_untracked();
        let dims = current.to_vector().len();
        Self(Rc::new(Inner {
            value,
            velocity: RefCell::new(zeros(dims)),
            target: RefCell::new(current),
            running: Signal::new(false),
            generation: Cell::new(0),
            lower: RefCell::new(None),
            upper: RefCell::new(None),
            job: RefCell::new(None),
        }))
    }

    /// Current value; tracked like any signal read.
    pub fn value(&self) -> T {
        self.0.value.get()
    }

    pub fn value_untracked(&self) -> T {
        self.0.value.get_untracked()
    }

    pub fn signal(&self) -> Signal<T> {
        self.0.value.clone()
    }

    /// Target of the latest `animate_to`, or the value after `snap_to`.
    pub fn target_value(&self) -> T {
        self.0.target.borrow().clone()
    }

    pub fn velocity_vector(&self) -> AnimVector {
        self.0.velocity.borrow().clone()
    }

    pub fn velocity(&self) -> T {
        T::from_vector(&self.0.velocity.borrow())
    }

    pub fn is_running(&self) -> bool {
        self.0.running.get()
    }

    /// Interrupts whatever is running and hands out the new generation.
    fn begin(&self) -> u64 {
        let generation = self.0.generation.get() + 1;
        self.0.generation.set(generation);
        self.0.running.set_if_changed(true);
        generation
    }

    fn interrupt(&self) {
        self.0.generation.set(self.0.generation.get() + 1);
        if let Some(job) = self.0.job.borrow_mut().take() {
            job.cancel();
        }
        self.0.running.set_if_changed(false);
    }

    fn result(&self, end_reason: AnimationEndReason) -> AnimationResult<T> {
        AnimationResult {
            end_reason,
            end_state: self.value_untracked(),
        }
    }

    /// Clamps `v` into the bounds. Returns whether a bound was hit.
    fn clamp(&self, v: &mut AnimVector) -> bool {
        let mut hit = false;
        if let Some(lower) = self.0.lower.borrow().as_ref() {
            for (c, l) in v.iter_mut().zip(lower.iter()) {
                if *c < *l {
                    *c = *l;
                    hit = true;
                }
            }
        }
        if let Some(upper) = self.0.upper.borrow().as_ref() {
            for (c, u) in v.iter_mut().zip(upper.iter()) {
                if *c > *u {
                    *c = *u;
                    hit = true;
                }
            }
        }
        hit
    }

    pub async fn animate_to(&self, target: T, spec: AnimationSpec) -> AnimationResult<T> {
        let velocity = self.velocity_vector();
        self.animate_to_with_velocity(target, spec, velocity).await
    }

    /// Runs until the value reaches `target`, writing the cell once per frame.
    pub async fn animate_to_with_velocity(
        &self,
        target: T,
        spec: AnimationSpec,
        initial_velocity: AnimVector,
    ) -> AnimationResult<T> {
        let generation = self.begin();
        let _guard = RunGuard {
            inner: &self.0,
            generation,
        };
        *self.0.target.borrow_mut() = target.clone();
        let anim = TargetBasedAnimation::new(
            spec,
            self.value_untracked().to_vector(),
            target.to_vector(),
            initial_velocity,
            T::VISIBILITY_THRESHOLD,
        );
        let start = now_nanos();
        log::debug!(
            "animate_to: {spec:?} over {}ms",
            anim.duration_nanos() / 1_000_000
        );

        loop {
            let now = with_frame_nanos().await;
            if self.0.generation.get() != generation {
                return self.result(AnimationEndReason::Interrupted);
            }
            let play = now.saturating_sub(start);
            let mut value = anim.value_at(play);
            let hit = self.clamp(&mut value);
            *self.0.velocity.borrow_mut() = if hit {
                zeros(value.len())
            } else {
                anim.velocity_at(play)
            };
            self.0.value.set_if_changed(T::from_vector(&value));
            if hit {
                return self.result(AnimationEndReason::BoundReached);
            }
            if anim.is_finished_at(play) {
                return self.result(AnimationEndReason::Finished);
            }
        }
    }

    pub async fn animate_decay(
        &self,
        initial_velocity: T,
        spec: DecayAnimationSpec,
    ) -> AnimationResult<T> {
        self.animate_decay_with(initial_velocity, spec, |_| {}).await
    }

    /// Decay animation that calls `on_frame` after every write. Calling
    /// [`stop`](Self::stop) from `on_frame` ends the animation.
    pub async fn animate_decay_with(
        &self,
        initial_velocity: T,
        spec: DecayAnimationSpec,
        mut on_frame: impl FnMut(&Self),
    ) -> AnimationResult<T> {
        let generation = self.begin();
        let _guard = RunGuard {
            inner: &self.0,
            generation,
        };
        let anim = DecayAnimation::new(
            spec,
            self.value_untracked().to_vector(),
            initial_velocity.to_vector(),
        );
        *self.0.target.borrow_mut() = T::from_vector(anim.target());
        let start = now_nanos();
        log::debug!(
            "animate_decay: {spec:?} resting after {}ms",
            anim.duration_nanos() / 1_000_000
        );

        loop {
            let now = with_frame_nanos().await;
            if self.0.generation.get() != generation {
                return self.result(AnimationEndReason::Interrupted);
            }
            let play = now.saturating_sub(start);
            let mut value = anim.value_at(play);
            let hit = self.clamp(&mut value);
            *self.0.velocity.borrow_mut() = if hit {
                zeros(value.len())
            } else {
                anim.velocity_at(play)
            };
            self.0.value.set_if_changed(T::from_vector(&value));
            on_frame(self);
            if self.0.generation.get() != generation {
                return self.result(AnimationEndReason::Interrupted);
            }
            if hit {
                return self.result(AnimationEndReason::BoundReached);
            }
            if anim.is_finished_at(play) {
                return self.result(AnimationEndReason::Finished);
            }
        }
    }

    /// Launches [`animate_to`](Self::animate_to) on the scheduler, cancelling
    /// the task started by the previous call.
    pub fn animate(&self, target: T, spec: AnimationSpec) -> Result<Job, ComposeError> {
        let this = self.clone();
        let job = launch(async move {
            this.animate_to(target, spec).await;
        })?;
        self.replace_job(job.clone());
        Ok(job)
    }

    pub fn fling(&self, initial_velocity: T, spec: DecayAnimationSpec) -> Result<Job, ComposeError> {
        let this = self.clone();
        let job = launch(async move {
            this.animate_decay(initial_velocity, spec).await;
        })?;
        self.replace_job(job.clone());
        Ok(job)
    }

    fn replace_job(&self, job: Job) {
        if let Some(prev) = self.0.job.borrow_mut().replace(job) {
            prev.cancel();
        }
    }

    /// Jumps to `value` (clamped into the bounds), ending any animation.
    pub fn snap_to(&self, value: T) {
        self.interrupt();
        let mut v = value.to_vector();
        self.clamp(&mut v);
        let value = T::from_vector(&v);
        *self.0.velocity.borrow_mut() = zeros(v.len());
        *self.0.target.borrow_mut() = value.clone();
        self.0.value.set_if_changed(value);
    }

    /// Ends the running animation where it is.
    pub fn stop(&self) {
        self.interrupt();
        let dims = self.0.velocity.borrow().len();
        *self.0.velocity.borrow_mut() = zeros(dims);
        *self.0.target.borrow_mut() = self.value_untracked();
    }

    /// Sets the bounds the value is clamped into; `None` removes a bound. The
    /// current value is clamped immediately.
    pub fn update_bounds(&self, lower: Option<T>, upper: Option<T>) {
        *self.0.lower.borrow_mut() = lower.map(|l| l.to_vector());
        *self.0.upper.borrow_mut() = upper.map(|u| u.to_vector());
        let mut v = self.value_untracked().to_vector();
        if self.clamp(&mut v) {
            self.0.value.set_if_changed(T::from_vector(&v));
        }
    }
}

thread_local! {
    static CELL_ANIMATIONS: RefCell<HashMap<SignalId, Box<dyn Any>>> = RefCell::new(HashMap::new());
}

/// Animates `cell` towards `target` on the scheduler.
///
/// Calling it again for the same cell while an animation runs interrupts it
/// and starts from the current value and velocity.
pub fn animate<T: VectorConverter>(
    cell: &Signal<T>,
    target: T,
    spec: AnimationSpec,
) -> Result<Job, ComposeError> {
    let running = CELL_ANIMATIONS.with(|m| {
        let mut m = m.borrow_mut();
        m.retain(|_, w| {
            w.downcast_ref::<Weak<Inner<T>>>()
                .is_none_or(|w| w.strong_count() > 0)
        });
        m.get(&cell.id())
            .and_then(|w| w.downcast_ref::<Weak<Inner<T>>>())
            .and_then(Weak::upgrade)
    });
    let anim = match running {
        Some(inner) => Animatable(inner),
        None => {
            let anim = Animatable::from_signal(cell.clone());
            CELL_ANIMATIONS.with(|m| {
                m.borrow_mut()
                    .insert(cell.id(), Box::new(Rc::downgrade(&anim.0)))
            });
            anim
        }
    };
    anim.animate(target, spec)
}
