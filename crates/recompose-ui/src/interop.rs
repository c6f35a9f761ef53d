//! Embedding imperative widgets in a declarative tree.
//!
//! ```rust
//! use recompose_core::*;
//! use recompose_ui::*;
//!
//! let mut host = HeadlessHost::new(HostConfig { density: 1.0, ..Default::default() });
//! let name = signal(String::from("hello"));
//! host.mount({
//!     let name = name.clone();
//!     move || {
//!         let name = name.get();
//!         LegacyView(Modifier::new(), || TextWidget::new(""), move |w| w.set_text(&name))
//!     }
//! });
//! assert_eq!(host.texts(), ["hello"]);
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use recompose_core::*;

use crate::DEFAULT_FONT_SIZE;
use crate::layout::{LINE_HEIGHT, measure_text};

/// Hosts a widget built once by `factory` for the lifetime of the calling
/// scope. `update` runs on every render with the widget borrowed mutably;
/// read signals before it to have the scope re-render when they change.
pub fn LegacyView<W: LegacyWidget>(
    modifier: Modifier,
    factory: impl FnOnce() -> W,
    update: impl FnOnce(&mut W),
) -> View {
    let widget = remember(|| {
        log::debug!("LegacyView: created {}", std::any::type_name::<W>());
        Rc::new(RefCell::new(factory()))
    });
    match widget.try_borrow_mut() {
        Ok(mut w) => update(&mut *w),
        Err(_) => log::warn!("LegacyView: widget busy, update skipped"),
    }
    let concrete: Rc<RefCell<W>> = (*widget).clone();
    let handle: Rc<RefCell<dyn LegacyWidget>> = concrete;
    View::new(
        0,
        ViewKind::Legacy {
            widget: LegacyHandle(handle),
        },
    )
    .modifier(modifier)
}

/// Single-style text label, mutated through setters.
#[derive(Clone, Debug)]
pub struct TextWidget {
    text: String,
    /// dp
    text_size: f32,
    color: Color,
    invalidations: u32,
}

impl TextWidget {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            text_size: DEFAULT_FONT_SIZE,
            color: theme().on_surface,
            invalidations: 0,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Replaces the text; a no-op when unchanged.
    pub fn set_text(&mut self, text: &str) {
        if self.text != text {
            self.text.clear();
            self.text.push_str(text);
            self.invalidations += 1;
        }
    }

    pub fn set_text_size(&mut self, dp: f32) {
        self.text_size = dp;
        self.invalidations += 1;
    }

    pub fn set_color(&mut self, color: Color) {
        self.color = color;
        self.invalidations += 1;
    }

    /// How many setters actually changed something.
    pub fn invalidations(&self) -> u32 {
        self.invalidations
    }
}

impl LegacyWidget for TextWidget {
    fn measure(&self, constraints: Constraints) -> Size {
        let layout = measure_text(&self.text, dp_to_px(self.text_size), constraints.max_w);
        constraints.constrain(layout.size)
    }

    fn draw(&self, scene: &mut Scene, rect: Rect) {
        let font_px = dp_to_px(self.text_size);
        let line_h = font_px * LINE_HEIGHT;
        let lines = measure_text(&self.text, font_px, rect.w.max(font_px)).lines;
        for (i, line) in lines.into_iter().enumerate() {
            scene.nodes.push(SceneNode::Text {
                rect: Rect::new(rect.x, rect.y + i as f32 * line_h, rect.w, line_h),
                text: line,
                color: self.color,
                size: font_px,
            });
        }
    }

    fn describe(&self) -> String {
        self.text.clone()
    }
}
