//! Several properties animating together between the states of one value.
//!
//! ```rust,no_run
//! use recompose_core::*;
//! use recompose_ui::*;
//!
//! fn expander(open: bool) -> View {
//!     let t = update_transition(open, "open");
//!     let size = t.animate_dp(
//!         |s| {
//!             if s.is_transitioning_to(&false, &true) {
//!                 AnimationSpec::tween_default()
//!             } else {
//!                 AnimationSpec::spring()
//!             }
//!         },
//!         |open| if *open { Dp(300.0) } else { Dp(100.0) },
//!     );
//!     Box(Modifier::new().size(size.get()))
//! }
//! ```

use std::cell::RefCell;
use std::fmt::Debug;
use std::rc::Rc;

use recompose_core::*;

/// The pair of states a transition is moving between.
#[derive(Clone, Debug, PartialEq)]
pub struct Segment<S> {
    pub initial: S,
    pub target: S,
}

impl<S: PartialEq> Segment<S> {
    pub fn is_transitioning_to(&self, initial: &S, target: &S) -> bool {
        self.initial == *initial && self.target == *target
    }
}

pub struct Transition<S: 'static> {
    label: String,
    /// Last state every property settled in.
    current: Signal<S>,
    target: RefCell<S>,
    props: RefCell<Vec<Rc<dyn Fn() -> bool>>>,
}

impl<S: Clone + PartialEq + Debug + 'static> Transition<S> {
    fn new(initial: S, label: String) -> Self {
        Self {
            label,
            current: signal(initial.clone()),
            target: RefCell::new(initial),
            props: RefCell::new(Vec::new()),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn current_state(&self) -> S {
        self.current.get()
    }

    pub fn target_state(&self) -> S {
        self.target.borrow().clone()
    }

    /// True while any property is still animating.
    pub fn is_running(&self) -> bool {
        self.props.borrow().iter().any(|running| running())
    }

    fn segment(&self) -> Segment<S> {
        Segment {
            initial: self.current.get_untracked(),
            target: self.target_state(),
        }
    }

    fn settle_if_idle(&self) {
        if !self.is_running() {
            let target = self.target_state();
            log::debug!("transition '{}': settled at {target:?}", self.label);
            self.current.set_if_changed(target);
        }
    }

    /// A property following the transition: `target_value` maps each state to
    /// the property's value there, `spec` picks the curve per segment.
    pub fn animate_value<T: VectorConverter>(
        self: &Rc<Self>,
        spec: impl FnOnce(&Segment<S>) -> AnimationSpec,
        target_value: impl Fn(&S) -> T,
    ) -> Signal<T> {
        struct Prop<T: VectorConverter> {
            anim: Animatable<T>,
            target: RefCell<T>,
            job: RefCell<Option<Job>>,
        }

        impl<T: VectorConverter> Drop for Prop<T> {
            fn drop(&mut self) {
                if let Some(job) = self.job.get_mut().take() {
                    job.cancel();
                }
            }
        }

        let value = target_value(&self.target.borrow());
        let prop = remember(|| {
            let anim = Animatable::new(value.clone());
            let running = anim.clone();
            self.props
                .borrow_mut()
                .push(Rc::new(move || running.is_running()));
            Prop {
                anim,
                target: RefCell::new(value.clone()),
                job: RefCell::new(None),
            }
        });
        if *prop.target.borrow() == value {
            return prop.anim.signal();
        }
        *prop.target.borrow_mut() = value.clone();

        let spec = spec(&self.segment());
        let anim = prop.anim.clone();
        let this = Rc::clone(self);
        let launched = launch(async move {
            let result = anim.animate_to(value, spec).await;
            if result.end_reason != AnimationEndReason::Interrupted {
                this.settle_if_idle();
            }
        });
        match launched {
            Ok(job) => {
                if let Some(prev) = prop.job.borrow_mut().replace(job) {
                    prev.cancel();
                }
            }
            Err(e) => {
                log::warn!("transition '{}': {e}; snapping", self.label);
                prop.anim.snap_to(prop.target.borrow().clone());
                self.settle_if_idle();
            }
        }
        prop.anim.signal()
    }

    pub fn animate_float(
        self: &Rc<Self>,
        spec: impl FnOnce(&Segment<S>) -> AnimationSpec,
        target_value: impl Fn(&S) -> f32,
    ) -> Signal<f32> {
        self.animate_value(spec, target_value)
    }

    pub fn animate_dp(
        self: &Rc<Self>,
        spec: impl FnOnce(&Segment<S>) -> AnimationSpec,
        target_value: impl Fn(&S) -> Dp,
    ) -> Signal<Dp> {
        self.animate_value(spec, target_value)
    }

    pub fn animate_color(
        self: &Rc<Self>,
        spec: impl FnOnce(&Segment<S>) -> AnimationSpec,
        target_value: impl Fn(&S) -> Color,
    ) -> Signal<Color> {
        self.animate_value(spec, target_value)
    }
}

/// Remembers a transition and moves its target to `target_state`. Properties
/// animated through it start once the new target is seen.
pub fn update_transition<S: Clone + PartialEq + Debug + 'static>(
    target_state: S,
    label: impl Into<String>,
) -> Rc<Transition<S>> {
    let label = label.into();
    let transition = remember(|| Transition::new(target_state.clone(), label.clone()));
    if *transition.target.borrow() != target_state {
        log::debug!(
            "transition '{label}': {:?} -> {target_state:?}",
            transition.target.borrow()
        );
        *transition.target.borrow_mut() = target_state;
    }
    transition
}
