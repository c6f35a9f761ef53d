//! # Theming and locals
//!
//! Recompose uses thread‑local “composition locals” for global UI parameters:
//!
//! - `Theme`: colors for surfaces, text and buttons.
//! - `Density`: dp→px scale factor.
//!
//! You can override these for a subtree using `with_theme` and `with_density`:
//!
//! ```rust
//! use recompose_core::*;
//!
//! let px = with_density(Density { scale: 2.0 }, || Dp(10.0).to_px());
//! assert_eq!(px, 20.0);
//! ```

use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::collections::HashMap;
use std::ops::{Add, Div, Mul, Neg, Sub};

use crate::Color;

thread_local! {
    static LOCALS_STACK: RefCell<Vec<HashMap<TypeId, Box<dyn Any>>>> = RefCell::new(Vec::new());
}

/// density‑independent pixels (dp)
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Dp(pub f32);

impl Dp {
    pub const ZERO: Dp = Dp(0.0);

    /// Converts this dp value into physical pixels using the current Density.
    pub fn to_px(self) -> f32 {
        self.0 * density().scale
    }
}

impl Add for Dp {
    type Output = Dp;
    fn add(self, rhs: Dp) -> Dp {
        Dp(self.0 + rhs.0)
    }
}

impl Sub for Dp {
    type Output = Dp;
    fn sub(self, rhs: Dp) -> Dp {
        Dp(self.0 - rhs.0)
    }
}

impl Mul<f32> for Dp {
    type Output = Dp;
    fn mul(self, rhs: f32) -> Dp {
        Dp(self.0 * rhs)
    }
}

impl Div<f32> for Dp {
    type Output = Dp;
    fn div(self, rhs: f32) -> Dp {
        Dp(self.0 / rhs)
    }
}

impl Neg for Dp {
    type Output = Dp;
    fn neg(self) -> Dp {
        Dp(-self.0)
    }
}

impl From<f32> for Dp {
    fn from(v: f32) -> Dp {
        Dp(v)
    }
}

impl From<f64> for Dp {
    fn from(v: f64) -> Dp {
        Dp(v as f32)
    }
}

impl From<i32> for Dp {
    fn from(v: i32) -> Dp {
        Dp(v as f32)
    }
}

/// `100.dp()` shorthand.
pub trait DpExt {
    fn dp(self) -> Dp;
}

impl DpExt for f32 {
    fn dp(self) -> Dp {
        Dp(self)
    }
}

impl DpExt for i32 {
    fn dp(self) -> Dp {
        Dp(self as f32)
    }
}

/// Convenience: convert a raw dp scalar into px using current Density.
pub fn dp_to_px(dp: f32) -> f32 {
    Dp(dp).to_px()
}

fn with_locals_frame<R>(f: impl FnOnce() -> R) -> R {
    // Non-panicking frame guard (ensures pop on unwind)
    struct Guard;
    impl Drop for Guard {
        fn drop(&mut self) {
            LOCALS_STACK.with(|st| {
                st.borrow_mut().pop();
            });
        }
    }
    LOCALS_STACK.with(|st| st.borrow_mut().push(HashMap::new()));
    let _guard = Guard;
    f()
}

fn set_local_boxed(t: TypeId, v: Box<dyn Any>) {
    LOCALS_STACK.with(|st| {
        if let Some(top) = st.borrow_mut().last_mut() {
            top.insert(t, v);
        } else {
            // no frame: create a temporary one
            let mut m = HashMap::new();
            m.insert(t, v);
            st.borrow_mut().push(m);
        }
    });
}

fn local_or_default<T: Any + Copy + Default>() -> T {
    LOCALS_STACK.with(|st| {
        for frame in st.borrow().iter().rev() {
            if let Some(v) = frame.get(&TypeId::of::<T>())
                && let Some(t) = v.downcast_ref::<T>()
            {
                return *t;
            }
        }
        T::default()
    })
}

/// Colors read by the stock widgets.
#[derive(Clone, Copy, Debug)]
pub struct Theme {
    /// Window background / app root.
    pub background: Color,
    /// Default container surface.
    pub surface: Color,
    /// Text drawn on `surface`/`background`.
    pub on_surface: Color,
    /// Button background.
    pub primary: Color,
    /// Text drawn on `primary`.
    pub on_primary: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            background: Color::WHITE,
            surface: Color::WHITE,
            on_surface: Color::BLACK,
            primary: Color::from_hex("#6200EE"),
            on_primary: Color::WHITE,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Density {
    pub scale: f32, // dp→px multiplier
}
impl Default for Density {
    fn default() -> Self {
        Self { scale: 1.0 }
    }
}

// Provide helpers (push a new frame, set the local, run closure, pop frame)

pub fn with_theme<R>(theme: Theme, f: impl FnOnce() -> R) -> R {
    with_locals_frame(|| {
        set_local_boxed(TypeId::of::<Theme>(), Box::new(theme));
        f()
    })
}

pub fn with_density<R>(density: Density, f: impl FnOnce() -> R) -> R {
    with_locals_frame(|| {
        set_local_boxed(TypeId::of::<Density>(), Box::new(density));
        f()
    })
}

// Getters with defaults if not set

pub fn theme() -> Theme {
    local_or_default::<Theme>()
}

pub fn density() -> Density {
    local_or_default::<Density>()
}
