//! Demo screens, one per toolkit feature. Each is a plain `fn() -> View`
//! that keeps its own state in remembered signals, so any of them can be
//! mounted on a `HeadlessHost` by name.

use std::rc::Rc;
use std::time::Duration;

use recompose_core::*;
use recompose_ui::*;

pub type Demo = fn() -> View;

/// Every demo, in the order the binary lists them.
pub const DEMOS: &[(&str, Demo)] = &[
    ("group_view_test", group_view_test),
    ("list_test", list_test),
    ("modifier_test", modifier_test),
    ("modifier_detail_test", modifier_detail_test),
    ("android_view_test", android_view_test),
    ("toggle_color", toggle_color),
    ("animate_xxx_as_state_demo", animate_xxx_as_state_demo),
    ("animatable_demo", animatable_demo),
    ("animate_decay_demo", animate_decay_demo),
    ("transition_demo", transition_demo),
    ("animated_visibility_demo", animated_visibility_demo),
    ("animated_content_demo", animated_content_demo),
];

pub fn names() -> impl Iterator<Item = &'static str> {
    DEMOS.iter().map(|(name, _)| *name)
}

pub fn demo(name: &str) -> Option<Demo> {
    DEMOS.iter().find(|(n, _)| *n == name).map(|(_, f)| *f)
}

/// Full-window gray backdrop every demo is mounted into.
pub fn screen(content: Demo) -> impl Fn() -> View + 'static {
    move || Column(Modifier::new().fill_max_size().background(Color::GRAY)).child(content())
}

fn toggle(flag: &Rc<Signal<bool>>) -> impl Fn() + 'static {
    let flag = Rc::clone(flag);
    move || flag.update(|v| *v = !*v)
}

fn label_button(on_click: impl Fn() + 'static) -> View {
    Button(Modifier::new(), on_click, Text("按钮"))
}

/// Three labels, each with its own background and inset, above an image.
pub fn group_view_test() -> View {
    let label = |color: Color, inset: i32| {
        Text("测试").modifier(Modifier::new().background(color).padding(inset))
    };
    Column(Modifier::new().size_wh(200, 400).background(Color::GRAY)).child((
        label(Color::GREEN, 50),
        label(Color::RED, 40),
        label(Color::BLUE, 30),
        Image(Modifier::new(), painter_resource(R::drawable::IC_LAUNCHER_FOREGROUND))
            .content_description("launcher foreground"),
    ))
}

pub fn list_test() -> View {
    let state = remember_lazy_list_state();
    Box(Modifier::new().fill_max_size().background(Color::GRAY)).child(LazyColumn(
        Modifier::new().fill_max_size(),
        state,
        |list| {
            list.item(|| {
                Image(Modifier::new(), painter_resource(R::drawable::IC_LAUNCHER_BACKGROUND))
            });
            list.items(vec!["探探", "陌陌", "soul"], |name: &&str| {
                Text(*name).modifier(Modifier::new().background(Color::GREEN).padding(30))
            });
        },
    ))
}

/// `size` after `background` but before `padding`: the green square is
/// 150dp and the text sits 50dp inside it.
pub fn modifier_test() -> View {
    Column(Modifier::new().fill_max_size().background(Color::GRAY)).child(
        Text("测试").modifier(
            Modifier::new()
                .background(Color::GREEN)
                .size(150)
                .padding(50),
        ),
    )
}

pub fn modifier_detail_test() -> View {
    modifier_test()
}

/// A legacy text widget kept in sync with a signal; clicking the label
/// appends to the text.
pub fn android_view_test() -> View {
    let name = remember_with_key("name", || signal(String::from("探探")));
    let current = name.get();
    let append = {
        let name = Rc::clone(&name);
        move || name.update(|n| n.push('~'))
    };
    Column(Modifier::new().fill_max_size().background(Color::GRAY)).child((
        LegacyView(
            Modifier::new(),
            || TextWidget::new("测试"),
            |widget| widget.set_text(&current),
        ),
        Text("按钮").modifier(Modifier::new().clickable(append)),
    ))
}

pub fn toggle_color() -> View {
    let is_black = remember_with_key("is_black", || signal(true));
    let color = if is_black.get() {
        Color::RED
    } else {
        Color::GREEN
    };
    Column(Modifier::new().fill_max_size().background(Color::GRAY)).child((
        Text("测试"),
        Box(Modifier::new().size(200).background(color)).child(label_button(toggle(&is_black))),
    ))
}

pub fn animate_xxx_as_state_demo() -> View {
    let is_change_size = remember_with_key("is_change_size", || signal(false));
    let target = if is_change_size.get() { Dp(200.0) } else { Dp(100.0) };
    let size = animate_dp_as_state(target, AnimationSpec::tween_default());
    Column(Modifier::new().fill_max_size().background(Color::GRAY)).child(
        Box(Modifier::new().size(size.get()).background(Color::GREEN).padding(10))
            .child(label_button(toggle(&is_change_size))),
    )
}

/// Every toggle jumps to a far value, then animates back to the resting
/// size for the new state.
pub fn animatable_demo() -> View {
    let is_change_size = remember_with_key("is_change_size", || signal(false));
    let anim = remember_with_key("size", || Animatable::new(Dp(100.0)));
    let changed = is_change_size.get();
    launched_effect(changed, || {
        let anim = (*anim).clone();
        async move {
            let (from, to) = if changed {
                (Dp(400.0), Dp(200.0))
            } else {
                (Dp(0.0), Dp(100.0))
            };
            anim.snap_to(from);
            let result = anim.animate_to(to, AnimationSpec::spring()).await;
            log::debug!("animatable_demo: {:?} at {:?}", result.end_reason, result.end_state);
        }
    });
    Column(Modifier::new().fill_max_size()).child(
        Box(Modifier::new().size(anim.value()).background(Color::GREEN).padding(10))
            .child(label_button(toggle(&is_change_size))),
    )
}

/// After a second, flings the top padding of a column with a spline decay.
pub fn animate_decay_demo() -> View {
    let anim = remember_with_key("padding_top", || Animatable::new(Dp::ZERO));
    let scale = density().scale;
    launched_effect((), || {
        let anim = (*anim).clone();
        async move {
            delay(Duration::from_secs(1)).await;
            let result = anim
                .animate_decay_with(Dp(2000.0), DecayAnimationSpec::spline_based(scale), |a| {
                    log::info!("decay: {:?}", a.value_untracked());
                })
                .await;
            log::debug!("animate_decay_demo: {:?}", result.end_reason);
        }
    });
    Column(
        Modifier::new()
            .fill_max_size()
            .background(Color::GRAY)
            .padding_each(Dp::ZERO, anim.value(), Dp::ZERO, Dp::ZERO),
    )
    .child(Box(Modifier::new().size(100).background(Color::GREEN).padding(10)))
}

pub fn transition_demo() -> View {
    let is_show = remember_with_key("is_show", || signal(false));
    let transition = update_transition(is_show.get(), "isShow");
    let spec = |s: &Segment<bool>| {
        if s.is_transitioning_to(&false, &true) {
            AnimationSpec::tween_default()
        } else {
            AnimationSpec::spring()
        }
    };
    let padding_start = transition.animate_dp(spec, |shown| if *shown { Dp(50.0) } else { Dp::ZERO });
    let size = transition.animate_dp(spec, |shown| if *shown { Dp(300.0) } else { Dp(100.0) });
    Column(Modifier::new().fill_max_size()).child(
        Box(
            Modifier::new()
                .size(size.get())
                .background(Color::GREEN)
                .padding_each(padding_start.get(), Dp::ZERO, Dp::ZERO, Dp::ZERO)
                .padding(10),
        )
        .child(label_button(toggle(&is_show))),
    )
}

pub fn animated_visibility_demo() -> View {
    let visible = remember_with_key("is_change_size", || signal(false));
    let shown = visible.get();
    Column(
        Modifier::new()
            .fill_max_size()
            .background(Color::GRAY)
            .padding(10),
    )
    .child((
        label_button(toggle(&visible)),
        Crossfade(shown, AnimationSpec::tween_default(), |on| {
            if *on {
                Box(Modifier::new().size(100).background(Color::GREEN).padding(10))
            } else {
                Box(Modifier::new())
            }
        }),
        AnimatedVisibility(
            shown,
            fade_in() + expand_horizontally(),
            fade_out() + shrink_out(),
            || Box(Modifier::new().size(100).padding(10).background(Color::GREEN)),
        ),
    ))
}

/// A rounded square that scales out and back in as a new square whenever it
/// is clicked.
pub fn animated_content_demo() -> View {
    let is_show = remember_with_key("is_show", || signal(true));
    let spec = AnimationSpec::tween_millis(220, 90);
    AnimatedContent(
        is_show.get(),
        |_| scale_in_with(spec, 0.0).together_with(scale_out_with(spec, 0.1)),
        |show| {
            let color = if *show { Color::RED } else { Color::GRAY };
            Box(
                Modifier::new()
                    .size(90)
                    .clip_rounded(20)
                    .background(color)
                    .clickable(toggle(&is_show)),
            )
        },
    )
}
