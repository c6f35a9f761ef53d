use crate::reactive;
use crate::signal::{Signal, signal};

/// A signal computed from other signals.
///
/// The value is recomputed when any signal read by `compute` changes (during
/// the next flush), and readers of the derived signal are only invalidated
/// when the recomputed value differs from the previous one.
///
/// ```rust
/// use recompose_core::*;
///
/// let first = signal("Jane".to_string());
/// let last = signal("Doe".to_string());
///
/// let full = derived_state_of({
///     let first = first.clone();
///     let last = last.clone();
///     move || format!("{} {}", first.get(), last.get())
/// });
/// assert_eq!(full.get(), "Jane Doe");
///
/// last.set("Roe".into());
/// reactive::flush_pending();
/// assert_eq!(full.get(), "Jane Roe");
/// ```
pub fn derived_state_of<T>(compute: impl Fn() -> T + 'static) -> Signal<T>
where
    T: Clone + PartialEq + 'static,
{
    let out = reactive::untracked(|| signal(compute()));
    let weak = out.downgrade();
    let obs = reactive::new_observer(move || {
        let v = compute();
        if let Some(out) = weak.upgrade() {
            out.set_if_changed(v);
        }
    });
    // Initial compute under tracking to establish dependencies
    reactive::run_observer_now(obs);
    out.set_owner(obs);
    out
}
