#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const ZERO: Size = Size {
        width: 0.0,
        height: 0.0,
    };

    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.x && p.x <= self.x + self.w && p.y >= self.y && p.y <= self.y + self.h
    }

    pub fn size(&self) -> Size {
        Size::new(self.w, self.h)
    }

    pub fn translate(&self, dx: f32, dy: f32) -> Rect {
        Rect {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.x + other.w
            && other.x < self.x + self.w
            && self.y < other.y + other.h
            && other.y < self.y + self.h
    }

    pub fn center(&self) -> Vec2 {
        Vec2 {
            x: self.x + self.w / 2.0,
            y: self.y + self.h / 2.0,
        }
    }
}

/// Measurement bounds handed from a parent to a child, in px.
///
/// `max_*` may be `f32::INFINITY` (e.g. the main axis of a lazy list).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Constraints {
    pub min_w: f32,
    pub max_w: f32,
    pub min_h: f32,
    pub max_h: f32,
}

impl Constraints {
    pub fn fixed(w: f32, h: f32) -> Self {
        Self {
            min_w: w,
            max_w: w,
            min_h: h,
            max_h: h,
        }
    }

    pub fn loose(max_w: f32, max_h: f32) -> Self {
        Self {
            min_w: 0.0,
            max_w,
            min_h: 0.0,
            max_h,
        }
    }

    pub fn has_bounded_width(&self) -> bool {
        self.max_w.is_finite()
    }

    pub fn has_bounded_height(&self) -> bool {
        self.max_h.is_finite()
    }

    /// Drops the minimums; children of containers are free to be smaller.
    pub fn relax(&self) -> Self {
        Self {
            min_w: 0.0,
            min_h: 0.0,
            ..*self
        }
    }

    /// Clamps `size` into these bounds.
    pub fn constrain(&self, size: Size) -> Size {
        Size {
            width: size.width.clamp(self.min_w, self.max_w.max(self.min_w)),
            height: size.height.clamp(self.min_h, self.max_h.max(self.min_h)),
        }
    }

    /// Coerces `other` so that it never leaves these bounds.
    pub fn constrain_inner(&self, other: Constraints) -> Constraints {
        let cw = |v: f32| v.clamp(self.min_w, self.max_w.max(self.min_w));
        let ch = |v: f32| v.clamp(self.min_h, self.max_h.max(self.min_h));
        Constraints {
            min_w: cw(other.min_w),
            max_w: cw(other.max_w),
            min_h: ch(other.min_h),
            max_h: ch(other.max_h),
        }
    }

    /// Shrinks both bounds by the given insets, never below zero.
    pub fn deflate(&self, horizontal: f32, vertical: f32) -> Constraints {
        Constraints {
            min_w: (self.min_w - horizontal).max(0.0),
            max_w: (self.max_w - horizontal).max(0.0),
            min_h: (self.min_h - vertical).max(0.0),
            max_h: (self.max_h - vertical).max(0.0),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Transform {
    pub translate_x: f32,
    pub translate_y: f32,
    pub scale_x: f32,
    pub scale_y: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform {
    pub fn identity() -> Self {
        Self {
            translate_x: 0.0,
            translate_y: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
        }
    }

    pub fn translate(x: f32, y: f32) -> Self {
        Self {
            translate_x: x,
            translate_y: y,
            ..Self::identity()
        }
    }

    /// Scale about the center of `rect`.
    pub fn scale_about(rect: Rect, sx: f32, sy: f32) -> Self {
        let c = rect.center();
        Self {
            translate_x: c.x - c.x * sx,
            translate_y: c.y - c.y * sy,
            scale_x: sx,
            scale_y: sy,
        }
    }

    pub fn apply_to_point(&self, p: Vec2) -> Vec2 {
        Vec2 {
            x: p.x * self.scale_x + self.translate_x,
            y: p.y * self.scale_y + self.translate_y,
        }
    }

    pub fn apply_to_rect(&self, r: Rect) -> Rect {
        let p = self.apply_to_point(Vec2 { x: r.x, y: r.y });
        Rect {
            x: p.x,
            y: p.y,
            w: r.w * self.scale_x,
            h: r.h * self.scale_y,
        }
    }

    /// `self` applied after `inner`.
    pub fn combine(&self, inner: &Transform) -> Transform {
        Transform {
            translate_x: inner.translate_x * self.scale_x + self.translate_x,
            translate_y: inner.translate_y * self.scale_y + self.translate_y,
            scale_x: self.scale_x * inner.scale_x,
            scale_y: self.scale_y * inner.scale_y,
        }
    }
}
