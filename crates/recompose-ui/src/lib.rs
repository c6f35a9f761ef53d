#![allow(non_snake_case)]
//! Widgets, lists, animation helpers, and the headless host that lays them
//! out and paints them.
//!
//! Widgets are plain functions returning a [`View`]; children are attached
//! with [`ViewExt::child`]:
//!
//! ```rust
//! use recompose_core::*;
//! use recompose_ui::*;
//!
//! let v = Column(Modifier::new().padding(8)).child((
//!     Text("title").size(20.0),
//!     Row(Modifier::new()).child((Text("a"), Spacer(Modifier::new().width(4)), Text("b"))),
//! ));
//! assert!(v.find_text("b").is_some());
//! ```

pub mod anim;
pub mod anim_ext;
pub mod host;
pub mod interop;
pub mod layout;
pub mod lazy;
pub mod transition;

pub use anim::*;
pub use anim_ext::*;
pub use host::*;
pub use interop::*;
pub use layout::{LayoutNode, TextLayout, layout, layout_and_paint, measure_text, paint};
pub use lazy::*;
pub use transition::*;

use recompose_core::*;

/// Default text size, in dp.
pub const DEFAULT_FONT_SIZE: f32 = 16.0;

/// Container painted with the theme's surface color.
pub fn Surface(modifier: Modifier, child: View) -> View {
    let modifier = Modifier::new().background(theme().surface).then(modifier);
    View::new(0, ViewKind::Surface)
        .modifier(modifier)
        .with_children(vec![child])
}

/// Stacks its children at the top-start corner.
pub fn Box(modifier: Modifier) -> View {
    View::new(0, ViewKind::Box).modifier(modifier)
}

pub fn Row(modifier: Modifier) -> View {
    View::new(0, ViewKind::Row).modifier(modifier)
}

pub fn Column(modifier: Modifier) -> View {
    View::new(0, ViewKind::Column).modifier(modifier)
}

/// Text in the enclosing content color; see [`TextStyle`].
pub fn Text(text: impl Into<String>) -> View {
    View::new(
        0,
        ViewKind::Text {
            text: text.into(),
            color: None,
            font_size: DEFAULT_FONT_SIZE,
        },
    )
}

/// Empty space; give it a size through the modifier.
pub fn Spacer(modifier: Modifier) -> View {
    Box(modifier)
}

pub fn Image(modifier: Modifier, painter: Painter) -> View {
    View::new(
        0,
        ViewKind::Image {
            painter,
            content_description: None,
        },
    )
    .modifier(modifier)
}

/// Material-style button: primary background, rounded corners, a 64x36dp
/// minimum, content centered.
pub fn Button(modifier: Modifier, on_click: impl Fn() + 'static, content: View) -> View {
    let t = theme();
    let modifier = modifier
        .min_size(64, 36)
        .clip_rounded(4)
        .background(t.primary)
        .clickable(on_click)
        .padding_xy(16, 8);
    View::new(0, ViewKind::Button)
        .modifier(modifier)
        .with_children(vec![content])
}

pub trait ImageExt {
    fn content_description(self, description: impl Into<String>) -> View;
}

impl ImageExt for View {
    fn content_description(mut self, description: impl Into<String>) -> View {
        if let ViewKind::Image {
            content_description,
            ..
        } = &mut self.kind
        {
            *content_description = Some(description.into());
        }
        self
    }
}

/// Method styling
pub trait TextStyle {
    fn color(self, c: Color) -> View;
    fn size(self, dp: f32) -> View;
}

impl TextStyle for View {
    fn color(mut self, c: Color) -> View {
        if let ViewKind::Text {
            color: text_color, ..
        } = &mut self.kind
        {
            *text_color = Some(c);
        }
        self
    }
    fn size(mut self, dp_font: f32) -> View {
        if let ViewKind::Text {
            font_size: text_size_dp,
            ..
        } = &mut self.kind
        {
            *text_size_dp = dp_font;
        }
        self
    }
}

/// Extension trait for child building
pub trait ViewExt: Sized {
    fn child(self, children: impl IntoChildren) -> Self;
}

impl ViewExt for View {
    fn child(mut self, children: impl IntoChildren) -> Self {
        self.children.extend(children.into_children());
        self
    }
}

pub trait IntoChildren {
    fn into_children(self) -> Vec<View>;
}

impl IntoChildren for View {
    fn into_children(self) -> Vec<View> {
        vec![self]
    }
}

impl IntoChildren for Option<View> {
    fn into_children(self) -> Vec<View> {
        self.into_iter().collect()
    }
}

impl IntoChildren for () {
    fn into_children(self) -> Vec<View> {
        Vec::new()
    }
}

impl IntoChildren for Vec<View> {
    fn into_children(self) -> Vec<View> {
        self
    }
}

impl<const N: usize> IntoChildren for [View; N] {
    fn into_children(self) -> Vec<View> {
        self.into()
    }
}

macro_rules! impl_into_children_tuple {
    ($($idx:tt $t:ident),+) => {
        impl<$($t: IntoChildren),+> IntoChildren for ($($t,)+) {
            fn into_children(self) -> Vec<View> {
                let mut v = Vec::new();
                $(v.extend(self.$idx.into_children());)+
                v
            }
        }
    };
}

impl_into_children_tuple!(0 A, 1 B);
impl_into_children_tuple!(0 A, 1 B, 2 C);
impl_into_children_tuple!(0 A, 1 B, 2 C, 3 D);
impl_into_children_tuple!(0 A, 1 B, 2 C, 3 D, 4 E);
impl_into_children_tuple!(0 A, 1 B, 2 C, 3 D, 4 E, 5 F);
impl_into_children_tuple!(0 A, 1 B, 2 C, 3 D, 4 E, 5 F, 6 G);
impl_into_children_tuple!(0 A, 1 B, 2 C, 3 D, 4 E, 5 F, 6 G, 7 H);

#[cfg(test)]
mod tests;
