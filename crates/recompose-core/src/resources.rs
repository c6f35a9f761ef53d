//! Drawable resources addressed by integer id.

use std::cell::RefCell;
use std::collections::HashMap;

use crate::error::ComposeError;
use crate::{Color, Dp};

#[allow(non_snake_case)]
pub mod R {
    pub mod drawable {
        pub const IC_LAUNCHER_FOREGROUND: u32 = 0x7f07_0001;
        pub const IC_LAUNCHER_BACKGROUND: u32 = 0x7f07_0002;
    }
}

/// Something an `Image` can draw: a resource id plus its intrinsic size.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Painter {
    pub resource: u32,
    pub name: String,
    pub intrinsic_width: Dp,
    pub intrinsic_height: Dp,
    /// Flat color the headless renderer uses to stand in for the bitmap.
    pub tint: Color,
}

impl Painter {
    fn missing(id: u32) -> Self {
        Painter {
            resource: id,
            name: "missing".into(),
            intrinsic_width: Dp(0.0),
            intrinsic_height: Dp(0.0),
            tint: Color::TRANSPARENT,
        }
    }
}

thread_local! {
    static DRAWABLES: RefCell<HashMap<u32, Painter>> = RefCell::new(builtin_drawables());
}

fn builtin_drawables() -> HashMap<u32, Painter> {
    let launcher = |resource: u32, name: &str, tint: Color| Painter {
        resource,
        name: name.into(),
        intrinsic_width: Dp(108.0),
        intrinsic_height: Dp(108.0),
        tint,
    };
    HashMap::from([
        (
            R::drawable::IC_LAUNCHER_FOREGROUND,
            launcher(
                R::drawable::IC_LAUNCHER_FOREGROUND,
                "ic_launcher_foreground",
                Color::from_hex("#3DDC84"),
            ),
        ),
        (
            R::drawable::IC_LAUNCHER_BACKGROUND,
            launcher(
                R::drawable::IC_LAUNCHER_BACKGROUND,
                "ic_launcher_background",
                Color::from_hex("#073042"),
            ),
        ),
    ])
}

/// Registers (or replaces) a drawable on this thread.
pub fn register_drawable(painter: Painter) {
    DRAWABLES.with(|d| {
        d.borrow_mut().insert(painter.resource, painter);
    });
}

pub fn try_painter_resource(id: u32) -> Result<Painter, ComposeError> {
    DRAWABLES.with(|d| d.borrow().get(&id).cloned().ok_or(ComposeError::ResourceNotFound(id)))
}

/// Like [`try_painter_resource`], but logs and yields an empty painter for
/// unknown ids.
pub fn painter_resource(id: u32) -> Painter {
    try_painter_resource(id).unwrap_or_else(|e| {
        log::error!("painter_resource: {e}");
        Painter::missing(id)
    })
}
