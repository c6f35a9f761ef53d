//! Ordered presentation directives.
//!
//! A `Modifier` is a chain read left to right, outermost first: every element
//! wraps everything to its right. That makes order significant:
//!
//! ```rust
//! use recompose_core::*;
//!
//! // 150dp green square, content inset by 50dp inside it.
//! let a = Modifier::new().background(Color::GREEN).size(150).padding(50);
//! // 50dp of empty space, then a 150dp green square.
//! let b = Modifier::new().padding(50).background(Color::GREEN).size(150);
//! assert_ne!(format!("{a:?}"), format!("{b:?}"));
//! ```
//!
//! There is no margin: outer spacing is padding placed before the
//! background.

use smallvec::SmallVec;

use crate::view::Handler;
use crate::{Color, Dp, Shape};

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PaddingValues {
    pub start: Dp,
    pub top: Dp,
    pub end: Dp,
    pub bottom: Dp,
}

impl PaddingValues {
    pub fn all(v: Dp) -> Self {
        Self {
            start: v,
            top: v,
            end: v,
            bottom: v,
        }
    }
}

#[derive(Clone, Debug)]
pub enum ModifierElement {
    /// Exact size, coerced into the incoming constraints. `None` leaves an
    /// axis alone.
    Size {
        width: Option<Dp>,
        height: Option<Dp>,
    },
    /// Minimum size used when the incoming constraints allow anything smaller.
    MinSize {
        width: Option<Dp>,
        height: Option<Dp>,
    },
    FillMax {
        width: bool,
        height: bool,
        fraction: f32,
    },
    Padding(PaddingValues),
    Background {
        color: Color,
        shape: Shape,
    },
    Border {
        width: Dp,
        color: Color,
        shape: Shape,
    },
    Clip(Shape),
    Alpha(f32),
    Scale {
        x: f32,
        y: f32,
    },
    Offset {
        x: Dp,
        y: Dp,
    },
    /// Reports a fraction of the wrapped size and clips to it. Drives
    /// expand/shrink transitions.
    LayoutFraction {
        width: f32,
        height: f32,
    },
    Clickable(Handler),
}

#[derive(Clone, Default)]
pub struct Modifier {
    elements: SmallVec<[ModifierElement; 4]>,
}

impl std::fmt::Debug for Modifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.elements.iter()).finish()
    }
}

impl Modifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn elements(&self) -> &[ModifierElement] {
        &self.elements
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// `self` followed by `other`; `self` ends up outermost.
    pub fn then(mut self, other: Modifier) -> Self {
        self.elements.extend(other.elements);
        self
    }

    fn push(mut self, e: ModifierElement) -> Self {
        self.elements.push(e);
        self
    }

    pub fn size(self, v: impl Into<Dp>) -> Self {
        let v = v.into();
        self.size_wh(v, v)
    }
    pub fn size_wh(self, w: impl Into<Dp>, h: impl Into<Dp>) -> Self {
        self.push(ModifierElement::Size {
            width: Some(w.into()),
            height: Some(h.into()),
        })
    }
    pub fn width(self, w: impl Into<Dp>) -> Self {
        self.push(ModifierElement::Size {
            width: Some(w.into()),
            height: None,
        })
    }
    pub fn height(self, h: impl Into<Dp>) -> Self {
        self.push(ModifierElement::Size {
            width: None,
            height: Some(h.into()),
        })
    }
    pub fn min_size(self, w: impl Into<Dp>, h: impl Into<Dp>) -> Self {
        self.push(ModifierElement::MinSize {
            width: Some(w.into()),
            height: Some(h.into()),
        })
    }
    pub fn fill_max_size(self) -> Self {
        self.push(ModifierElement::FillMax {
            width: true,
            height: true,
            fraction: 1.0,
        })
    }
    pub fn fill_max_width(self) -> Self {
        self.push(ModifierElement::FillMax {
            width: true,
            height: false,
            fraction: 1.0,
        })
    }
    pub fn fill_max_height(self) -> Self {
        self.push(ModifierElement::FillMax {
            width: false,
            height: true,
            fraction: 1.0,
        })
    }
    pub fn padding(self, v: impl Into<Dp>) -> Self {
        self.push(ModifierElement::Padding(PaddingValues::all(v.into())))
    }
    pub fn padding_xy(self, horizontal: impl Into<Dp>, vertical: impl Into<Dp>) -> Self {
        let (h, v) = (horizontal.into(), vertical.into());
        self.push(ModifierElement::Padding(PaddingValues {
            start: h,
            top: v,
            end: h,
            bottom: v,
        }))
    }
    pub fn padding_each(
        self,
        start: impl Into<Dp>,
        top: impl Into<Dp>,
        end: impl Into<Dp>,
        bottom: impl Into<Dp>,
    ) -> Self {
        self.push(ModifierElement::Padding(PaddingValues {
            start: start.into(),
            top: top.into(),
            end: end.into(),
            bottom: bottom.into(),
        }))
    }
    /// Set a solid color background.
    pub fn background(self, color: Color) -> Self {
        self.background_shape(color, Shape::Rectangle)
    }
    pub fn background_shape(self, color: Color, shape: Shape) -> Self {
        self.push(ModifierElement::Background { color, shape })
    }
    pub fn border(self, width: impl Into<Dp>, color: Color, shape: Shape) -> Self {
        self.push(ModifierElement::Border {
            width: width.into(),
            color,
            shape,
        })
    }
    pub fn clip(self, shape: Shape) -> Self {
        self.push(ModifierElement::Clip(shape))
    }
    pub fn clip_rounded(self, radius: impl Into<Dp>) -> Self {
        self.clip(Shape::RoundedCorner(radius.into().0))
    }
    pub fn alpha(self, a: f32) -> Self {
        self.push(ModifierElement::Alpha(a))
    }
    pub fn scale(self, s: f32) -> Self {
        self.scale2(s, s)
    }
    pub fn scale2(self, sx: f32, sy: f32) -> Self {
        self.push(ModifierElement::Scale { x: sx, y: sy })
    }
    pub fn offset(self, x: impl Into<Dp>, y: impl Into<Dp>) -> Self {
        self.push(ModifierElement::Offset {
            x: x.into(),
            y: y.into(),
        })
    }
    pub fn layout_fraction(self, width: f32, height: f32) -> Self {
        self.push(ModifierElement::LayoutFraction { width, height })
    }
    pub fn clickable(self, on_click: impl Fn() + 'static) -> Self {
        self.push(ModifierElement::Clickable(Handler::new(on_click)))
    }
}
