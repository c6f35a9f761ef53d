use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use recompose_core::*;

use crate::*;

fn host(w: u32, h: u32) -> HeadlessHost {
    HeadlessHost::new(HostConfig {
        size: (w, h),
        density: 1.0,
        ..Default::default()
    })
}

fn layout_json(host: &HeadlessHost) -> serde_json::Value {
    serde_json::to_value(host.layout().expect("laid out")).expect("serializable")
}

#[test]
fn modifier_order_changes_layout() {
    let inset = Text("x").modifier(Modifier::new().background(Color::GREEN).size(150).padding(50));
    let inset = layout(&inset, (1000, 1000));
    assert_eq!(inset.rect, Rect::new(0.0, 0.0, 150.0, 150.0));
    assert_eq!(inset.background_rect(), Some(Rect::new(0.0, 0.0, 150.0, 150.0)));
    assert_eq!(inset.content, Rect::new(50.0, 50.0, 50.0, 50.0));

    let outset = Text("x").modifier(Modifier::new().padding(50).background(Color::GREEN).size(150));
    let outset = layout(&outset, (1000, 1000));
    assert_eq!(outset.rect, Rect::new(0.0, 0.0, 250.0, 250.0));
    assert_eq!(outset.background_rect(), Some(Rect::new(50.0, 50.0, 150.0, 150.0)));
}

#[test]
fn column_and_row_place_children_in_sequence() {
    let tree = Column(Modifier::new()).child((
        Text("ab").size(10.0),
        Row(Modifier::new()).child((Text("c").size(10.0), Text("de").size(10.0))),
    ));
    let node = layout(&tree, (400, 400));
    insta::assert_snapshot!(node.dump().trim_end(), @r#"
    Column 0,0 18x24
      Text "ab" 0,0 12x12
      Row 0,12 18x12
        Text "c" 0,12 6x12
        Text "de" 6,12 12x12
    "#);
}

#[test]
fn text_wraps_at_the_available_width() {
    let node = layout(&Text("abcdef").size(10.0).modifier(Modifier::new().width(20)), (400, 400));
    let TextLayout { lines, .. } = measure_text("abcdef", 10.0, 20.0);
    assert_eq!(lines, ["abc", "def"]);
    assert!(node.rect.h > 20.0);
}

#[test]
fn fill_max_size_takes_the_window() {
    let node = layout(&Box(Modifier::new().fill_max_size()), (300, 200));
    assert_eq!(node.rect, Rect::new(0.0, 0.0, 300.0, 200.0));
}

#[test]
fn button_centers_content_and_reports_hit_region() {
    let clicks = Rc::new(Cell::new(0));
    let tree = {
        let clicks = clicks.clone();
        Button(Modifier::new(), move || clicks.set(clicks.get() + 1), Text("ok"))
    };
    let node = layout(&tree, (500, 500));
    assert_eq!(node.rect, Rect::new(0.0, 0.0, 64.0, 36.0));
    let text = node.find_text("ok").expect("label");
    let center = text.rect.center();
    assert!((center.x - 32.0).abs() < 0.01 && (center.y - 18.0).abs() < 0.01);

    let (scene, hits) = paint(&node);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].rect, Rect::new(0.0, 0.0, 64.0, 36.0));
    assert_eq!(hits[0].label.as_deref(), Some("ok"));
    let label_color = scene.nodes.iter().find_map(|n| match n {
        SceneNode::Text { color, .. } => Some(*color),
        _ => None,
    });
    assert_eq!(label_color, Some(theme().on_primary));

    hits[0].on_click.as_ref().expect("handler").call();
    assert_eq!(clicks.get(), 1);
}

#[test]
fn clip_alpha_and_scale_are_balanced_in_the_scene() {
    let tree = Box(
        Modifier::new()
            .size(100)
            .clip_rounded(20)
            .alpha(0.5)
            .scale(0.5)
            .background(Color::RED),
    );
    let (scene, _) = layout_and_paint(&tree, (400, 400));
    let pushes = scene
        .nodes
        .iter()
        .filter(|n| {
            matches!(
                n,
                SceneNode::PushClip { .. } | SceneNode::PushAlpha(_) | SceneNode::PushTransform { .. }
            )
        })
        .count();
    let pops = scene
        .nodes
        .iter()
        .filter(|n| matches!(n, SceneNode::PopClip | SceneNode::PopAlpha | SceneNode::PopTransform))
        .count();
    assert_eq!((pushes, pops), (3, 3));
    assert!(matches!(scene.nodes.last(), Some(SceneNode::PopClip)));
}

#[test]
fn scaled_clickable_hit_region_shrinks() {
    let tree = Box(Modifier::new().size(100).scale(0.5).clickable(|| {}));
    let (_, hits) = layout_and_paint(&tree, (400, 400));
    assert_eq!(hits[0].rect, Rect::new(25.0, 25.0, 50.0, 50.0));
}

#[test]
fn image_uses_intrinsic_size_in_dp() {
    let painter = painter_resource(R::drawable::IC_LAUNCHER_FOREGROUND);
    let tree = Image(Modifier::new(), painter).content_description("launcher");
    let node = with_density(Density { scale: 2.0 }, || layout(&tree, (1000, 1000)));
    assert_eq!(node.rect.size(), Size::new(216.0, 216.0));
    assert_eq!(node.label.as_deref(), Some("launcher"));
}

#[test]
fn clicking_text_updates_state_on_the_next_frame() {
    let mut host = host(400, 400);
    let count = signal(0);
    host.mount({
        let count = count.clone();
        move || {
            let on_click = {
                let count = count.clone();
                move || count.update(|c| *c += 1)
            };
            Column(Modifier::new()).child((
                Text(format!("count {}", count.get())),
                Button(Modifier::new(), on_click, Text("+")),
            ))
        }
    });
    assert_eq!(host.texts(), ["count 0", "+"]);

    host.click_text("+").expect("button");
    host.frame();
    assert_eq!(host.texts(), ["count 1", "+"]);
    assert!(host.click_text("missing").is_err());
    assert!(!host.click_at(390.0, 390.0));
}

#[test]
fn toggling_back_restores_the_layout() {
    let mut host = host(400, 400);
    let flag = signal(false);
    host.mount({
        let flag = flag.clone();
        move || {
            let on = flag.get();
            let color = if on { Color::GREEN } else { Color::RED };
            Column(Modifier::new().background(color)).child((
                Text(if on { "on" } else { "off" }),
                on.then(|| Box(Modifier::new().size(40))),
            ))
        }
    });
    let before = layout_json(&host);

    flag.set(true);
    host.frame();
    assert_ne!(layout_json(&host), before);

    flag.set(false);
    host.frame();
    assert_eq!(layout_json(&host), before);
}

fn numbered_list(state: Rc<LazyListState>) -> impl Fn() -> View {
    move || {
        LazyColumn(Modifier::new().fill_max_size(), state.clone(), |list| {
            list.item(|| Text("header").modifier(Modifier::new().height(20)));
            list.items((1..100).collect::<Vec<i32>>(), |i| {
                Text(format!("item {i}")).modifier(Modifier::new().height(20))
            });
        })
    }
}

#[test]
fn lazy_column_builds_only_visible_items() {
    let mut host = host(200, 100);
    let state = Rc::new(LazyListState::new());
    host.mount(numbered_list(state.clone()));
    host.run_until_idle(10);
    assert_eq!(
        host.texts(),
        ["header", "item 1", "item 2", "item 3", "item 4"]
    );

    assert_eq!(state.scroll_by(50.0), 50.0);
    host.frame();
    assert_eq!(state.first_visible_item_index(), 2);
    assert_eq!(state.first_visible_item_offset(), 10.0);
    let first = host.layout().and_then(|l| l.find_text("item 2")).expect("visible");
    assert_eq!(first.rect.y, -10.0);
    assert_eq!(host.texts().len(), 6);
}

#[test]
fn lazy_column_scroll_is_clamped_at_both_ends() {
    let mut host = host(200, 100);
    let state = Rc::new(LazyListState::new());
    host.mount(numbered_list(state.clone()));
    host.run_until_idle(10);

    assert_eq!(state.scroll_by(-30.0), 0.0);
    let consumed = state.scroll_by(10_000.0);
    assert_eq!(consumed, 100.0 * 20.0 - 100.0);
    host.frame();
    assert_eq!(host.texts().last().map(String::as_str), Some("item 99"));

    state.scroll_to_item(0, 0.0);
    host.frame();
    assert_eq!(host.texts().first().map(String::as_str), Some("header"));
}

#[test]
fn lazy_column_fling_decays_to_rest() {
    let mut host = host(200, 100);
    let state = Rc::new(LazyListState::new());
    host.mount(numbered_list(state.clone()));
    host.run_until_idle(10);

    state.fling(800.0).expect("scheduler installed");
    assert!(state.is_scroll_in_progress());
    host.run_until_idle(600);
    assert!(!state.is_scroll_in_progress());
    assert!(state.first_visible_item_index() > 0);
}

#[test]
fn animate_dp_as_state_follows_the_target() {
    let mut host = host(400, 400);
    let big = signal(false);
    host.mount({
        let big = big.clone();
        move || {
            let target = if big.get() { Dp(200.0) } else { Dp(100.0) };
            let size = animate_dp_as_state(
                target,
                AnimationSpec::tween(Duration::from_millis(160), Easing::Linear),
            );
            Box(Modifier::new().size(size.get()).background(Color::GREEN))
        }
    });
    let width = |host: &HeadlessHost| host.layout().map(|l| l.rect.w).unwrap_or_default();
    assert_eq!(width(&host), 100.0);

    big.set(true);
    let mut widths = Vec::new();
    for _ in 0..12 {
        host.frame();
        widths.push(width(&host));
    }
    assert!(widths.windows(2).all(|w| w[0] <= w[1]), "{widths:?}");
    assert!(widths[1] > 100.0 && widths[1] < 200.0, "{widths:?}");
    assert_eq!(widths.last().copied(), Some(200.0));
}

#[test]
fn transition_properties_settle_together() {
    let mut host = host(400, 400);
    let shown = signal(false);
    let current = Rc::new(RefCell::new(None));
    host.mount({
        let shown = shown.clone();
        let current = current.clone();
        move || {
            let t = update_transition(shown.get(), "shown");
            let padding = t.animate_dp(
                |s| {
                    if s.is_transitioning_to(&false, &true) {
                        AnimationSpec::tween_default()
                    } else {
                        AnimationSpec::spring()
                    }
                },
                |shown| if *shown { Dp(50.0) } else { Dp(0.0) },
            );
            let size = t.animate_dp(|_| AnimationSpec::spring(), |shown| {
                if *shown { Dp(300.0) } else { Dp(100.0) }
            });
            *current.borrow_mut() = Some(t.current_state());
            Box(Modifier::new().padding_each(padding.get(), 0, 0, 0).size(size.get()))
        }
    });

    shown.set(true);
    host.frame();
    host.frame();
    assert_eq!(*current.borrow(), Some(false));
    host.run_until_idle(200);
    assert_eq!(*current.borrow(), Some(true));
    let node = host.layout().expect("laid out");
    assert_eq!(node.rect.size(), Size::new(350.0, 300.0));
}

#[test]
fn animated_visibility_exits_then_reenters_to_the_same_tree() {
    let mut host = host(400, 400);
    let visible = signal(true);
    host.mount({
        let visible = visible.clone();
        move || {
            Column(Modifier::new()).child(AnimatedVisibility(
                visible.get(),
                fade_in() + expand_horizontally(),
                fade_out() + shrink_horizontally(),
                || Text("peekaboo").modifier(Modifier::new().size(100)),
            ))
        }
    });
    host.run_until_idle(10);
    let before = layout_json(&host);

    visible.set(false);
    host.frame();
    host.frame();
    assert!(host.texts().iter().any(|t| t == "peekaboo"), "still exiting");
    host.run_until_idle(300);
    assert!(host.texts().is_empty());

    visible.set(true);
    host.frame();
    host.frame();
    let partial = host.layout().and_then(|l| l.find_text("peekaboo")).map(|n| n.rect.w);
    assert!(partial.is_some());
    host.run_until_idle(300);
    assert_eq!(layout_json(&host), before);
}

#[test]
fn animated_content_overlaps_old_and_new_then_drops_the_old() {
    let mut host = host(400, 400);
    let page = signal(0);
    host.mount({
        let page = page.clone();
        move || {
            AnimatedContent(
                page.get(),
                |_| {
                    scale_in_with(AnimationSpec::tween_millis(220, 90), 0.0)
                        .together_with(scale_out_with(AnimationSpec::tween_millis(220, 90), 0.1))
                },
                |p| Text(format!("page {p}")),
            )
        }
    });
    assert_eq!(host.texts(), ["page 0"]);

    page.set(1);
    host.frame();
    host.frame();
    assert_eq!(host.texts(), ["page 0", "page 1"]);
    host.run_until_idle(100);
    assert_eq!(host.texts(), ["page 1"]);
}

#[test]
fn crossfade_settles_on_the_new_content() {
    let mut host = host(400, 400);
    let dark = signal(false);
    host.mount({
        let dark = dark.clone();
        move || {
            Crossfade(dark.get(), AnimationSpec::tween_default(), |dark| {
                Text(if *dark { "dark" } else { "light" })
            })
        }
    });
    dark.set(true);
    host.run_until_idle(100);
    assert_eq!(host.texts(), ["dark"]);
}

#[test]
fn legacy_view_is_created_once_and_updated_every_render() {
    let mut host = host(400, 400);
    let name = signal(String::from("tan"));
    let created = Rc::new(Cell::new(0));
    host.mount({
        let name = name.clone();
        let created = created.clone();
        move || {
            let text = name.get();
            let created = created.clone();
            LegacyView(
                Modifier::new().padding(4),
                move || {
                    created.set(created.get() + 1);
                    TextWidget::new("")
                },
                move |w| w.set_text(&text),
            )
        }
    });
    assert_eq!(host.texts(), ["tan"]);

    name.set("tan~".into());
    host.frame();
    name.set("tan~~".into());
    host.frame();
    assert_eq!(host.texts(), ["tan~~"]);
    assert_eq!(created.get(), 1);
    let node = host.layout().expect("laid out");
    assert_eq!(node.label.as_deref(), Some("tan~~"));
}

#[test]
fn unmount_cancels_running_animations() {
    let mut host = host(400, 400);
    let big = signal(false);
    host.mount({
        let big = big.clone();
        move || {
            let size = animate_float_as_state(
                if big.get() { 300.0 } else { 0.0 },
                AnimationSpec::tween_default(),
            );
            Box(Modifier::new().size(size.get()))
        }
    });
    big.set(true);
    host.frame();
    host.frame();
    assert!(host.scheduler().has_pending_work());
    host.scheduler().unmount();
    host.frame();
    assert!(!host.scheduler().has_pending_work());
}

#[test]
fn animated_content_keeps_widget_state_with_its_target() {
    let mut host = host(400, 400);
    let page = signal(0);
    let created = Rc::new(RefCell::new(Vec::new()));
    host.mount({
        let (page, created) = (page.clone(), created.clone());
        move || {
            let created = created.clone();
            Crossfade(page.get(), AnimationSpec::tween_millis(100, 0), move |p| {
                let (p, created) = (*p, created.clone());
                LegacyView(
                    Modifier::new(),
                    move || {
                        created.borrow_mut().push(p);
                        TextWidget::new(format!("page {p}"))
                    },
                    |_| {},
                )
            })
        }
    });
    assert_eq!(host.texts(), ["page 0"]);

    page.set(1);
    host.frame();
    host.frame();
    assert_eq!(host.texts(), ["page 0", "page 1"]);
    host.run_until_idle(100);
    assert_eq!(host.texts(), ["page 1"]);
    assert_eq!(*created.borrow(), [0, 1]);

    page.set(0);
    host.run_until_idle(100);
    assert_eq!(host.texts(), ["page 0"]);
    assert_eq!(*created.borrow(), [0, 1, 0]);
}

#[test]
fn animated_visibility_drops_content_state_without_shifting_siblings() {
    let mut host = host(400, 400);
    let visible = signal(true);
    let created = Rc::new(Cell::new(0));
    let sibling_inits = Rc::new(Cell::new(0));
    host.mount({
        let (visible, created, sibling_inits) =
            (visible.clone(), created.clone(), sibling_inits.clone());
        move || {
            let created = created.clone();
            let shown = AnimatedVisibility(visible.get(), fade_in(), fade_out(), move || {
                LegacyView(
                    Modifier::new(),
                    move || {
                        created.set(created.get() + 1);
                        TextWidget::new("inner")
                    },
                    |_| {},
                )
            });
            let sibling_inits = sibling_inits.clone();
            let label = remember(move || {
                sibling_inits.set(sibling_inits.get() + 1);
                "sibling"
            });
            Column(Modifier::new()).child((shown, Text(*label)))
        }
    });
    host.run_until_idle(10);
    assert_eq!(host.texts(), ["inner", "sibling"]);

    visible.set(false);
    host.run_until_idle(300);
    assert_eq!(host.texts(), ["sibling"]);

    visible.set(true);
    host.run_until_idle(300);
    assert_eq!(host.texts(), ["inner", "sibling"]);
    assert_eq!(created.get(), 2);
    assert_eq!(sibling_inits.get(), 1);
}
