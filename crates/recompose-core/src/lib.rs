//! # State, scopes and frames
//!
//! Recompose describes a UI as a function from state to an immutable `View`
//! tree and re-runs that function when the state it read changes. There are
//! four main pieces:
//!
//! - `Signal<T>`: observable, reactive value.
//! - `remember*`: storage bound to the render scope that created it.
//! - `Scheduler`: renders scopes, advances the frame clock and runs tasks.
//! - `Animatable<T>`: a value driven along an animation curve, one write per
//!   frame.
//!
//! ## Signals
//!
//! `Signal<T>` is a cloneable handle to a piece of state:
//!
//! ```rust
//! use recompose_core::*;
//!
//! let count = signal(0);
//! count.set(1);
//! count.update(|v| *v += 1);
//! assert_eq!(count.get(), 2);
//! ```
//!
//! Reads made while a scope renders are recorded. A write never re-renders
//! anything by itself; it marks the scopes that read the signal, and the
//! scheduler renders exactly those on the next frame.
//!
//! ## Rendering
//!
//! ```rust
//! use std::time::Duration;
//! use recompose_core::*;
//!
//! let mut scheduler = Scheduler::new();
//! let count = signal(0);
//! scheduler.mount({
//!     let count = count.clone();
//!     move || {
//!         View::new(
//!             1,
//!             ViewKind::Text {
//!                 text: format!("count = {}", count.get()),
//!                 color: None,
//!                 font_size: 16.0,
//!             },
//!         )
//!     }
//! });
//!
//! count.set(1);
//! let frame = scheduler.repose(Duration::from_millis(16), |_, _| (Scene::default(), vec![]));
//! assert!(frame.root.find_text("count = 1").is_some());
//! ```
//!
//! - `remember` and `remember_state` are order based: the Nth call in a
//!   render always refers to the Nth stored value.
//! - `remember_with_key` and `remember_state_with_key` are key based and
//!   stable across conditional branches.
//! - `restartable(key, f)` gives a subtree its own scope, so it re-renders
//!   without its ancestors.
//! - `keyed(key, f)` gives content its own slots inside the caller, so its
//!   state follows the key rather than the call position.
//!
//! ## Effects and tasks
//!
//! `launched_effect(key, || async { .. })` starts a task on the scheduler's
//! executor and cancels it when the key changes or the scope unmounts.
//! Tasks wait for frames with `with_frame_nanos` or `delay`; time only moves
//! when the scheduler produces a frame.
//!
//! ```rust
//! use std::time::Duration;
//! use recompose_core::*;
//!
//! let mut scheduler = Scheduler::new();
//! let offset = Animatable::new(0.0f32);
//! offset
//!     .animate(100.0, AnimationSpec::tween(Duration::from_millis(32), Easing::Linear))
//!     .unwrap();
//! for _ in 0..2 {
//!     scheduler.repose(Duration::from_millis(16), |_, _| (Scene::default(), vec![]));
//! }
//! assert_eq!(offset.value_untracked(), 100.0);
//! ```

pub mod animatable;
pub mod animation;
pub mod clock;
pub mod color;
pub mod effects;
pub mod error;
pub mod geometry;
pub mod locals;
pub mod modifier;
pub mod prelude;
pub mod reactive;
pub mod resources;
pub mod runtime;
pub mod scope;
pub mod signal;
pub mod state;
pub mod task;
pub mod view;

#[cfg(test)]
mod tests;

pub use animatable::*;
pub use animation::*;
pub use clock::{FrameClock, NextFrame, delay, frame_clock, now_nanos, with_frame_nanos};
pub use color::*;
pub use effects::*;
pub use error::ComposeError;
pub use geometry::*;
pub use locals::*;
pub use modifier::*;
pub use prelude::*;
pub use reactive::{SignalId, flush_pending, untracked};
pub use resources::*;
pub use runtime::*;
pub use scope::*;
pub use signal::*;
pub use state::*;
pub use task::{Job, launch};
pub use view::*;
