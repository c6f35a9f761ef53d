//! Fire-and-forget animations: pass a target on every render and read back a
//! signal that follows it.

use std::cell::RefCell;

use recompose_core::*;

struct AsState<T: VectorConverter> {
    anim: Animatable<T>,
    target: RefCell<T>,
}

impl<T: VectorConverter> Drop for AsState<T> {
    fn drop(&mut self) {
        self.anim.stop();
    }
}

/// Animates towards `target` whenever it differs from the last render's
/// target. A change mid-flight continues from the current value and velocity.
pub fn animate_value_as_state<T: VectorConverter>(target: T, spec: AnimationSpec) -> Signal<T> {
    let state = remember(|| AsState {
        anim: Animatable::new(target.clone()),
        target: RefCell::new(target.clone()),
    });
    if *state.target.borrow() != target {
        *state.target.borrow_mut() = target.clone();
        if let Err(e) = state.anim.animate(target.clone(), spec) {
            log::warn!("animate_value_as_state: {e}; snapping");
            state.anim.snap_to(target);
        }
    }
    state.anim.signal()
}

pub fn animate_float_as_state(target: f32, spec: AnimationSpec) -> Signal<f32> {
    animate_value_as_state(target, spec)
}

pub fn animate_dp_as_state(target: Dp, spec: AnimationSpec) -> Signal<Dp> {
    animate_value_as_state(target, spec)
}

pub fn animate_color_as_state(target: Color, spec: AnimationSpec) -> Signal<Color> {
    animate_value_as_state(target, spec)
}
