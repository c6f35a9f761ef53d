use std::time::Duration;

use compose_test::*;
use recompose_core::*;
use recompose_ui::*;

fn mount(name: &str) -> HeadlessHost {
    let content = demo(name).expect("known demo");
    let mut host = HeadlessHost::new(HostConfig {
        size: (400, 800),
        density: 1.0,
        ..Default::default()
    });
    host.mount(screen(content));
    host
}

fn settled(name: &str) -> HeadlessHost {
    let mut host = mount(name);
    host.run_until_idle(600);
    host
}

fn dump(host: &HeadlessHost) -> String {
    host.layout().expect("laid out").dump()
}

fn find_box(host: &HeadlessHost) -> LayoutNode {
    host.layout()
        .and_then(|l| l.find(&|n: &LayoutNode| n.kind == "Box"))
        .cloned()
        .expect("box")
}

fn rects_of_width(host: &HeadlessHost, w: f32) -> Vec<Color> {
    host.scene()
        .map(|s| {
            s.nodes
                .iter()
                .filter_map(|n| match n {
                    SceneNode::Rect { rect, color, .. } if rect.w == w => Some(*color),
                    _ => None,
                })
                .collect()
        })
        .unwrap_or_default()
}

#[test]
fn every_demo_is_reachable_by_name() {
    assert_eq!(names().count(), 12);
    assert!(demo("animate_decay_demo").is_some());
    assert!(demo("no_such_demo").is_none());
}

#[test]
fn every_demo_mounts_and_goes_idle() {
    for name in names() {
        let mut host = mount(name);
        host.run_until_idle(2000);
        assert!(host.layout().is_some(), "{name} produced no layout");
        assert!(!host.scheduler().has_pending_work(), "{name} never settled");
    }
}

#[test]
fn modifier_test_insets_text_in_a_fixed_square() {
    let host = settled("modifier_test");
    insta::assert_snapshot!(dump(&host).trim_end(), @r#"
    Column 0,0 400x800
      Column 0,0 400x800
        Text "测试" 0,0 150x150
    "#);
    let text = host.layout().and_then(|l| l.find_text("测试")).expect("text");
    assert_eq!(text.background_rect(), Some(Rect::new(0.0, 0.0, 150.0, 150.0)));
    assert_eq!(text.content, Rect::new(50.0, 50.0, 50.0, 50.0));

    assert_eq!(dump(&settled("modifier_detail_test")), dump(&host));
}

#[test]
fn group_view_test_stacks_three_labels_above_the_image() {
    let host = settled("group_view_test");
    let layout = host.layout().expect("laid out");
    let group = &layout.children[0];
    assert_eq!(group.rect.size(), Size::new(200.0, 400.0));
    let kinds: Vec<_> = group.children.iter().map(|n| n.kind).collect();
    assert_eq!(kinds, ["Text", "Text", "Text", "Image"]);
    for pair in group.children.windows(2) {
        assert_eq!(pair[1].rect.y, pair[0].rect.y + pair[0].rect.h);
    }
    let insets: Vec<_> = group.children[..3]
        .iter()
        .map(|n| n.content.x - n.rect.x)
        .collect();
    assert_eq!(insets, [50.0, 40.0, 30.0]);

    let backgrounds: Vec<_> = group.children[..3]
        .iter()
        .filter_map(LayoutNode::background_rect)
        .collect();
    let fills: Vec<_> = host
        .scene()
        .expect("painted")
        .nodes
        .iter()
        .filter_map(|n| match n {
            SceneNode::Rect { rect, color, .. } if backgrounds.contains(rect) => Some(*color),
            _ => None,
        })
        .collect();
    assert_eq!(fills, [Color::GREEN, Color::RED, Color::BLUE]);
}

#[test]
fn list_test_builds_every_item() {
    let host = settled("list_test");
    assert_eq!(host.texts(), ["探探", "陌陌", "soul"]);
    let layout = host.layout().expect("laid out");
    let image = layout
        .find(&|n: &LayoutNode| n.kind == "Image")
        .expect("header image");
    let first = layout.find_text("探探").expect("first item");
    assert_eq!(first.rect.y, image.rect.y + image.rect.h);
}

#[test]
fn android_view_test_appends_on_click() {
    let mut host = settled("android_view_test");
    assert_eq!(host.texts(), ["探探", "按钮"]);

    host.click_text("按钮").expect("clickable label");
    host.frame();
    assert_eq!(host.texts(), ["探探~", "按钮"]);

    host.click_text("按钮").expect("clickable label");
    host.frame();
    assert_eq!(host.texts(), ["探探~~", "按钮"]);
}

#[test]
fn toggle_color_round_trips_to_the_same_scene() {
    let mut host = settled("toggle_color");
    let before = host.scene().expect("painted").nodes.clone();
    assert_eq!(rects_of_width(&host, 200.0), [Color::RED]);

    host.click_text("按钮").expect("button");
    host.frame();
    assert_eq!(rects_of_width(&host, 200.0), [Color::GREEN]);

    host.click_text("按钮").expect("button");
    host.frame();
    assert_eq!(host.scene().expect("painted").nodes, before);
}

#[test]
fn animate_xxx_as_state_demo_grows_then_shrinks() {
    let mut host = settled("animate_xxx_as_state_demo");
    assert_eq!(find_box(&host).rect.w, 100.0);

    host.click_text("按钮").expect("button");
    host.advance(Duration::from_millis(100));
    let mid = find_box(&host).rect.w;
    assert!(mid > 100.0 && mid < 200.0, "mid-flight width {mid}");

    host.run_until_idle(600);
    assert_eq!(find_box(&host).rect.w, 200.0);

    host.click_text("按钮").expect("button");
    host.run_until_idle(600);
    assert_eq!(find_box(&host).rect.w, 100.0);
}

#[test]
fn animatable_demo_snaps_then_settles() {
    let mut host = settled("animatable_demo");
    assert_eq!(find_box(&host).rect.w, 100.0);

    host.click_text("按钮").expect("button");
    host.frame();
    assert!(find_box(&host).rect.w > 200.0);

    host.run_until_idle(600);
    assert_eq!(find_box(&host).rect.w, 200.0);
}

#[test]
fn animate_decay_demo_waits_then_slides_down_and_stops() {
    let mut host = mount("animate_decay_demo");
    let top = |host: &HeadlessHost| find_box(host).rect.y;
    assert_eq!(top(&host), 0.0);

    host.advance(Duration::from_millis(900));
    assert_eq!(top(&host), 0.0);

    host.advance(Duration::from_millis(300));
    let mut last = top(&host);
    assert!(last > 0.0);
    for _ in 0..600 {
        if !host.scheduler().has_pending_work() {
            break;
        }
        host.frame();
        let y = top(&host);
        assert!(y >= last, "padding went back from {last} to {y}");
        last = y;
    }
    assert!(!host.scheduler().has_pending_work());
}

#[test]
fn transition_demo_moves_size_and_padding_together() {
    let mut host = settled("transition_demo");
    let button = |host: &HeadlessHost| {
        host.layout()
            .and_then(|l| l.find(&|n: &LayoutNode| n.kind == "Button"))
            .map(|n| n.rect)
            .expect("button")
    };
    assert_eq!(find_box(&host).rect.w, 100.0);
    assert_eq!(button(&host).x, 10.0);

    host.click_text("按钮").expect("button");
    host.run_until_idle(600);
    assert_eq!(find_box(&host).rect.w, 300.0);
    assert_eq!(button(&host).x, 60.0);

    host.click_text("按钮").expect("button");
    host.run_until_idle(600);
    assert_eq!(find_box(&host).rect.w, 100.0);
    assert_eq!(button(&host).x, 10.0);
}

#[test]
fn animated_visibility_demo_shows_and_hides_both_boxes() {
    let mut host = settled("animated_visibility_demo");
    let before = dump(&host);
    assert!(rects_of_width(&host, 100.0).is_empty());
    assert!(rects_of_width(&host, 80.0).is_empty());

    host.click_text("按钮").expect("button");
    host.run_until_idle(600);
    // crossfaded box paints before its padding, the visibility box after
    assert_eq!(rects_of_width(&host, 100.0), [Color::GREEN]);
    assert_eq!(rects_of_width(&host, 80.0), [Color::GREEN]);

    host.click_text("按钮").expect("button");
    host.run_until_idle(600);
    assert!(rects_of_width(&host, 100.0).is_empty());
    assert!(rects_of_width(&host, 80.0).is_empty());
    assert_eq!(dump(&host), before);
}

#[test]
fn animated_content_demo_overlaps_then_swaps_color() {
    let mut host = settled("animated_content_demo");
    assert_eq!(rects_of_width(&host, 90.0), [Color::RED]);

    assert!(host.click_at(45.0, 45.0));
    host.frame();
    assert_eq!(rects_of_width(&host, 90.0).len(), 2);

    host.run_until_idle(600);
    assert_eq!(rects_of_width(&host, 90.0), [Color::GRAY]);
}

#[test]
fn animation_demos_sit_in_a_full_window_column() {
    for name in ["animate_xxx_as_state_demo", "animatable_demo", "transition_demo"] {
        let host = settled(name);
        let layout = host.layout().expect("laid out");
        let wrapper = &layout.children[0];
        assert_eq!(wrapper.kind, "Column", "{name}");
        assert_eq!(wrapper.rect, Rect::new(0.0, 0.0, 400.0, 800.0), "{name}");
        assert_eq!(wrapper.children[0].kind, "Box", "{name}");
    }
}
