use std::cell::{Cell, RefCell};
use std::rc::Rc;

use web_time::Duration;

use crate::animatable::*;
use crate::animation::*;
use crate::scope::*;
use crate::signal::*;
use crate::{
    Color, Rect, Scene, Scheduler, Vec2, View, ViewKind, derived_state_of, keyed,
    launched_effect, remember, remember_with_key, render_counts, restartable, with_frame_nanos,
};

const FRAME: Duration = Duration::from_millis(16);

fn frame(s: &mut Scheduler) -> View {
    s.repose(FRAME, |_, _| (Scene::default(), Vec::new())).root
}

fn text(id: u64, s: impl Into<String>) -> View {
    View::new(
        id,
        ViewKind::Text {
            text: s.into(),
            color: None,
            font_size: 14.0,
        },
    )
}

fn labels(root: &View) -> Vec<String> {
    root.children
        .iter()
        .filter_map(|c| match &c.kind {
            ViewKind::Text { text, .. } => Some(text.clone()),
            _ => None,
        })
        .collect()
}

fn linear(ms: u64) -> AnimationSpec {
    AnimationSpec::tween(Duration::from_millis(ms), Easing::Linear)
}

#[test]
fn test_signal_basic() {
    let sig = signal(42);
    assert_eq!(sig.get(), 42);

    sig.set(100);
    assert_eq!(sig.get(), 100);

    sig.update(|v| *v += 1);
    assert_eq!(sig.get(), 101);
}

#[test]
fn test_signal_subscription() {
    let sig = signal(0);
    let called = Rc::new(RefCell::new(false));

    let called_clone = called.clone();
    sig.subscribe(move |_| {
        *called_clone.borrow_mut() = true;
    });

    sig.set(42);
    assert!(*called.borrow());
}

#[test]
fn test_scope_drop_disposes() {
    let cleaned_up = Rc::new(Cell::new(false));
    {
        let scope = Scope::new();
        let c = cleaned_up.clone();
        scope.add_disposer(move || c.set(true));
        assert!(!cleaned_up.get());
    }
    assert!(cleaned_up.get());
}

#[test]
fn test_scope_explicit_dispose() {
    let order = Rc::new(RefCell::new(Vec::new()));

    let scope = Scope::new();
    let child = scope.child();
    let o = order.clone();
    child.add_disposer(move || o.borrow_mut().push("child"));
    let o = order.clone();
    scope.add_disposer(move || o.borrow_mut().push("parent"));

    scope.dispose();
    assert_eq!(*order.borrow(), vec!["child", "parent"]);
    assert!(child.is_disposed());
}

#[test]
fn test_key_based_remember() {
    let scope = Scope::new();
    let (val1, val2) = scope.run(|| {
        let val1 = remember_with_key("test", || 42);
        let val2 = remember_with_key("test", || 100);
        (val1, val2)
    });

    // Should return the same instance
    assert_eq!(*val1, 42);
    assert_eq!(*val2, 42); // Not 100, because key exists
}

#[test]
fn test_remember_outside_composition_is_fresh() {
    let a = remember(|| 1);
    let b = remember(|| 2);
    assert_eq!((*a, *b), (1, 2));
}

#[test]
fn test_color_from_hex() {
    let c = Color::from_hex("#FF5733");
    assert_eq!(c, Color(255, 87, 51, 255));

    let c_alpha = Color::from_hex("#FF5733AA");
    assert_eq!(c_alpha, Color(255, 87, 51, 170));
}

#[test]
fn test_rect_contains() {
    let rect = Rect {
        x: 10.0,
        y: 10.0,
        w: 100.0,
        h: 50.0,
    };

    assert!(rect.contains(Vec2 { x: 50.0, y: 30.0 }));
    assert!(!rect.contains(Vec2 { x: 5.0, y: 30.0 }));
    assert!(!rect.contains(Vec2 { x: 50.0, y: 70.0 }));
}

#[test]
fn test_animation_deterministic() {
    let anim = TargetBasedAnimation::new(
        linear(1000),
        smallvec::smallvec![0.0],
        smallvec::smallvec![10.0],
        smallvec::smallvec![0.0],
        f32::VISIBILITY_THRESHOLD,
    );
    assert_eq!(anim.duration_nanos(), 1_000_000_000);
    assert!((anim.value_at(250_000_000)[0] - 2.5).abs() < 0.01);
    assert!(!anim.is_finished_at(999_000_000));
    assert_eq!(anim.value_at(1_000_000_000)[0], 10.0);
}

#[test]
fn test_default_tween_uses_fast_out_slow_in() {
    let spec = AnimationSpec::tween_default();
    assert_eq!(spec.duration_nanos(0.0, 1.0, 0.0, 0.01), 300_000_000);
    // fast-out-slow-in runs ahead of linear at the midpoint
    assert!(spec.value_at(150_000_000, 0.0, 1.0, 0.0, 0.01) > 0.5);
    assert_eq!(Easing::FAST_OUT_SLOW_IN.interpolate(0.0), 0.0);
    assert_eq!(Easing::FAST_OUT_SLOW_IN.interpolate(1.0), 1.0);
}

#[test]
fn test_tween_settles_monotonically() {
    let mut s = Scheduler::new();
    let anim = Animatable::new(0.0f32);
    let job = anim.animate(100.0, linear(160)).unwrap();

    let mut last = 0.0;
    for i in 1..=10 {
        frame(&mut s);
        let v = anim.value_untracked();
        assert!(v >= last, "frame {i}: {v} < {last}");
        assert!((v - 10.0 * i as f32).abs() < 0.01, "frame {i}: {v}");
        last = v;
    }
    assert_eq!(anim.value_untracked(), 100.0);
    assert!(job.is_completed());
    assert!(!anim.is_running());
}

#[test]
fn test_critically_damped_spring_never_overshoots() {
    let mut s = Scheduler::new();
    let anim = Animatable::new(0.0f32);
    anim.animate(100.0, AnimationSpec::spring()).unwrap();

    let mut last = 0.0;
    for _ in 0..60 {
        frame(&mut s);
        let v = anim.value_untracked();
        assert!(v >= last && v <= 100.0, "{v}");
        last = v;
    }
    assert_eq!(anim.value_untracked(), 100.0);
}

#[test]
fn test_bouncy_spring_overshoots_then_settles() {
    let spec = AnimationSpec::spring_with(spring::DAMPING_RATIO_HIGH_BOUNCY, spring::STIFFNESS_LOW);
    let duration = spec.duration_nanos(0.0, 1.0, 0.0, 0.01);
    let peak = (0..duration / 1_000_000)
        .map(|ms| spec.value_at(ms * 1_000_000, 0.0, 1.0, 0.0, 0.01))
        .fold(f32::MIN, f32::max);
    assert!(peak > 1.0);
    assert!((spec.value_at(duration, 0.0, 1.0, 0.0, 0.01) - 1.0).abs() < 0.01);
}

#[test]
fn test_interrupted_animation_starts_from_current_value() {
    let mut s = Scheduler::new();
    let anim = Animatable::new(0.0f32);
    let first = anim.animate(100.0, linear(160)).unwrap();
    for _ in 0..5 {
        frame(&mut s);
    }
    assert!((anim.value_untracked() - 50.0).abs() < 0.01);

    anim.animate(0.0, linear(160)).unwrap();
    frame(&mut s);
    assert!(!first.is_active());
    assert!((anim.value_untracked() - 45.0).abs() < 0.01);

    for _ in 0..10 {
        frame(&mut s);
    }
    assert_eq!(anim.value_untracked(), 0.0);
}

#[test]
fn test_animate_cell_in_place() {
    let mut s = Scheduler::new();
    let cell = signal(Color::BLACK);
    animate(&cell, Color::WHITE, AnimationSpec::snap()).unwrap();
    frame(&mut s);
    assert_eq!(cell.get(), Color::WHITE);
}

#[test]
fn test_exponential_decay_rests_at_target() {
    let mut s = Scheduler::new();
    let anim = Animatable::new(0.0f32);
    let spec = DecayAnimationSpec::exponential();
    let target = spec.target(0.0, 1000.0);
    assert!((target - 1000.0 / 4.2).abs() < 0.01);

    anim.fling(1000.0, spec).unwrap();
    for _ in 0..200 {
        frame(&mut s);
    }
    assert_eq!(anim.value_untracked(), target);
    assert!(!anim.is_running());
}

#[test]
fn test_spline_decay_is_monotonic() {
    let spec = DecayAnimationSpec::spline_based(2.75);
    let duration = spec.duration_nanos(0.0, 4000.0);
    assert!(duration > 0);
    let mut last = 0.0;
    for step in 0..=20 {
        let v = spec.value_at(duration * step / 20, 0.0, 4000.0);
        assert!(v >= last);
        last = v;
    }
    assert!((last - spec.target(0.0, 4000.0)).abs() < 1.0);
    assert!(spec.target(0.0, -4000.0) < 0.0);
}

#[test]
fn test_decay_stops_at_bound() {
    let mut s = Scheduler::new();
    let anim = Animatable::new(0.0f32);
    anim.update_bounds(None, Some(100.0));
    let result = Rc::new(RefCell::new(None));

    let r = result.clone();
    let a = anim.clone();
    crate::launch(async move {
        let out = a.animate_decay(1000.0, DecayAnimationSpec::exponential()).await;
        *r.borrow_mut() = Some(out);
    })
    .unwrap();
    for _ in 0..60 {
        frame(&mut s);
    }
    assert_eq!(
        *result.borrow(),
        Some(AnimationResult {
            end_reason: AnimationEndReason::BoundReached,
            end_state: 100.0,
        })
    );
}

#[test]
fn test_snap_to_interrupts() {
    let mut s = Scheduler::new();
    let anim = Animatable::new(0.0f32);
    anim.animate(100.0, linear(160)).unwrap();
    frame(&mut s);
    anim.snap_to(-5.0);
    frame(&mut s);
    frame(&mut s);
    assert_eq!(anim.value_untracked(), -5.0);
    assert!(!anim.is_running());
}

#[test]
fn test_only_reading_scopes_rerender() {
    let mut s = Scheduler::new();
    let a = signal(0);
    let b = signal(0);
    s.mount({
        let (a, b) = (a.clone(), b.clone());
        move || {
            let (a, b) = (a.clone(), b.clone());
            View::new(1, ViewKind::Column).with_children(vec![
                restartable("a", move || text(2, format!("a={}", a.get()))),
                restartable("b", move || text(3, format!("b={}", b.get()))),
            ])
        }
    });
    let counts = render_counts();
    assert_eq!((counts["root"], counts["a"], counts["b"]), (1, 1, 1));

    a.set(1);
    a.set(2);
    let root = frame(&mut s);
    assert!(root.find_text("a=2").is_some());
    let counts = render_counts();
    assert_eq!((counts["root"], counts["a"], counts["b"]), (1, 2, 1));
}

#[test]
fn test_parent_and_child_invalid_render_child_once() {
    let mut s = Scheduler::new();
    let shared = signal(0);
    s.mount({
        let shared = shared.clone();
        move || {
            let label = format!("parent {}", shared.get());
            let inner = shared.clone();
            View::new(1, ViewKind::Column).with_children(vec![
                text(2, label),
                restartable("child", move || text(3, format!("child {}", inner.get()))),
            ])
        }
    });
    shared.set(1);
    frame(&mut s);
    let counts = render_counts();
    assert_eq!((counts["root"], counts["child"]), (2, 2));
}

#[test]
fn test_toggle_back_yields_identical_tree() {
    let mut s = Scheduler::new();
    let on = signal(false);
    s.mount({
        let on = on.clone();
        move || {
            let label = if on.get() { "ON" } else { "OFF" };
            View::new(1, ViewKind::Box).with_children(vec![text(2, label)])
        }
    });
    let before = format!("{:?}", s.render());
    on.set(true);
    let toggled = format!("{:?}", Some(frame(&mut s)));
    on.set(false);
    frame(&mut s);
    let after = format!("{:?}", s.render());
    assert_ne!(before, toggled);
    assert_eq!(before, after);
}

#[test]
fn test_remembered_state_survives_rerender() {
    let mut s = Scheduler::new();
    let tick = signal(0);
    let created = Rc::new(Cell::new(0));
    s.mount({
        let (tick, created) = (tick.clone(), created.clone());
        move || {
            let created = created.clone();
            let counter = remember(move || {
                created.set(created.get() + 1);
                Cell::new(0)
            });
            counter.set(counter.get() + 1);
            text(1, format!("{} {}", tick.get(), counter.get()))
        }
    });
    tick.set(1);
    let root = frame(&mut s);
    assert!(root.find_text("1 2").is_some());
    assert_eq!(created.get(), 1);
}

#[test]
fn test_unmount_drops_state_and_cancels_tasks() {
    struct Flag(Rc<Cell<bool>>);
    impl Drop for Flag {
        fn drop(&mut self) {
            self.0.set(true);
        }
    }

    let mut s = Scheduler::new();
    let dropped = Rc::new(Cell::new(false));
    let ticks = Rc::new(Cell::new(0));
    s.mount({
        let (dropped, ticks) = (dropped.clone(), ticks.clone());
        move || {
            let dropped = dropped.clone();
            remember(move || Flag(dropped));
            let ticks = ticks.clone();
            launched_effect((), move || async move {
                for _ in 0..1_000 {
                    with_frame_nanos().await;
                    ticks.set(ticks.get() + 1);
                }
            });
            text(1, "mounted")
        }
    });
    frame(&mut s);
    frame(&mut s);
    assert_eq!(ticks.get(), 2);

    s.unmount();
    assert!(dropped.get());
    frame(&mut s);
    assert_eq!(ticks.get(), 2);
}

#[test]
fn test_unvisited_child_scope_is_unmounted() {
    let mut s = Scheduler::new();
    let show = signal(true);
    let disposed = Rc::new(Cell::new(false));
    s.mount({
        let (show, disposed) = (show.clone(), disposed.clone());
        move || {
            let mut children = vec![text(1, "always")];
            if show.get() {
                let disposed = disposed.clone();
                children.push(restartable("optional", move || {
                    let d = disposed.clone();
                    scoped_effect(move || Box::new(move || d.set(true)));
                    text(2, "optional")
                }));
            }
            View::new(3, ViewKind::Column).with_children(children)
        }
    });
    show.set(false);
    let root = frame(&mut s);
    assert!(root.find_text("optional").is_none());
    assert!(disposed.get());
    assert!(!render_counts().contains_key("optional"));
}

#[test]
fn test_launched_effect_restarts_on_key_change() {
    let mut s = Scheduler::new();
    let key = signal(0);
    let log = Rc::new(RefCell::new(Vec::<String>::new()));
    s.mount({
        let (key, log) = (key.clone(), log.clone());
        move || {
            let k = key.get();
            let log = log.clone();
            launched_effect(k, move || async move {
                log.borrow_mut().push(format!("start {k}"));
                for _ in 0..1_000 {
                    with_frame_nanos().await;
                    log.borrow_mut().push(format!("tick {k}"));
                }
            });
            text(1, format!("key {k}"))
        }
    });
    frame(&mut s);
    key.set(1);
    frame(&mut s);
    frame(&mut s);

    let log = log.borrow();
    let restart = log.iter().position(|l| l == "start 1").unwrap();
    assert_eq!(log[0], "start 0");
    assert!(log[restart..].iter().all(|l| !l.ends_with(" 0")));
    assert!(log.iter().any(|l| l == "tick 1"));
}

#[test]
fn test_disposable_effect_cleans_up_on_key_change_and_unmount() {
    let mut s = Scheduler::new();
    let key = signal(0);
    let log = Rc::new(RefCell::new(Vec::<String>::new()));
    s.mount({
        let (key, log) = (key.clone(), log.clone());
        move || {
            let k = key.get();
            let log = log.clone();
            crate::disposable_effect(k, move || {
                log.borrow_mut().push(format!("enter {k}"));
                crate::on_unmount(move || log.borrow_mut().push(format!("leave {k}")))
            });
            text(1, format!("key {k}"))
        }
    });
    frame(&mut s);
    key.set(1);
    frame(&mut s);
    frame(&mut s);
    s.unmount();

    assert_eq!(*log.borrow(), ["enter 0", "leave 0", "enter 1", "leave 1"]);
}

#[test]
fn test_unknown_resource_is_an_error() {
    use crate::{ComposeError, R, painter_resource, try_painter_resource};

    let launcher = try_painter_resource(R::drawable::IC_LAUNCHER_FOREGROUND).unwrap();
    assert_eq!(launcher.intrinsic_width.0, 108.0);
    assert!(matches!(
        try_painter_resource(0xdead),
        Err(ComposeError::ResourceNotFound(0xdead))
    ));
    assert_eq!(painter_resource(0xdead).intrinsic_width.0, 0.0);
}

#[test]
fn test_spring_lands_on_target_at_its_duration() {
    let spec = AnimationSpec::spring();
    let duration = spec.duration_nanos(0.0, 100.0, 0.0, 0.01);
    assert_eq!(spec.value_at(duration, 0.0, 100.0, 0.0, 0.01), 100.0);
    assert_ne!(spec.value_at(duration / 4, 0.0, 100.0, 0.0, 0.01), 100.0);

    let coarse = spec.with_visibility_threshold(1.0);
    let short = coarse.duration_nanos(0.0, 100.0, 0.0, 0.01);
    assert!(short < duration);
    assert_eq!(coarse.value_at(short, 0.0, 100.0, 0.0, 0.01), 100.0);
}

#[test]
fn test_derived_state_rerenders_only_on_change() {
    let mut s = Scheduler::new();
    let n = signal(1);
    let parity = derived_state_of({
        let n = n.clone();
        move || n.get() % 2
    });
    s.mount({
        let parity = parity.clone();
        move || text(1, format!("parity {}", parity.get()))
    });
    assert_eq!(render_counts()["root"], 1);

    n.set(3);
    frame(&mut s);
    assert_eq!(render_counts()["root"], 1);

    n.set(4);
    let root = frame(&mut s);
    assert_eq!(render_counts()["root"], 2);
    assert!(root.find_text("parity 0").is_some());
}

#[test]
fn test_keyed_group_follows_its_key_and_drops_when_skipped() {
    struct Flag(Rc<Cell<bool>>);
    impl Drop for Flag {
        fn drop(&mut self) {
            self.0.set(true);
        }
    }

    let mut s = Scheduler::new();
    let order = signal(vec!["a", "b"]);
    let dropped = Rc::new(Cell::new(false));
    let created = Rc::new(RefCell::new(Vec::new()));
    s.mount({
        let (order, dropped, created) = (order.clone(), dropped.clone(), created.clone());
        move || {
            let mut children: Vec<View> = order
                .get()
                .into_iter()
                .enumerate()
                .map(|(i, key)| {
                    keyed(key, || {
                        let created = created.clone();
                        let name = remember(move || {
                            created.borrow_mut().push(key);
                            key.to_uppercase()
                        });
                        if key == "b" {
                            let dropped = dropped.clone();
                            remember(move || Flag(dropped));
                        }
                        text(i as u64 + 2, name.as_str())
                    })
                })
                .collect();
            let sibling = remember(|| "sibling");
            children.push(text(9, *sibling));
            View::new(1, ViewKind::Column).with_children(children)
        }
    });

    order.set(vec!["b", "a"]);
    let root = frame(&mut s);
    assert_eq!(labels(&root), ["B", "A", "sibling"]);
    assert_eq!(*created.borrow(), ["a", "b"]);
    assert!(!dropped.get());

    order.set(vec!["a"]);
    let root = frame(&mut s);
    assert_eq!(labels(&root), ["A", "sibling"]);
    assert!(dropped.get());

    order.set(vec!["a", "b"]);
    frame(&mut s);
    assert_eq!(*created.borrow(), ["a", "b", "b"]);
}
