use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::resources::Painter;
use crate::{Color, Constraints, Modifier, Rect, Size, Transform};

pub type ViewId = u64;

pub type Callback = Rc<dyn Fn()>;

/// Click (or other unit) handler carried by views and modifiers.
#[derive(Clone)]
pub struct Handler(pub Callback);

impl Handler {
    pub fn new(f: impl Fn() + 'static) -> Self {
        Self(Rc::new(f))
    }

    pub fn call(&self) {
        (self.0)()
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<callback>")
    }
}

/// Reports `(viewport extent, item extents)` along the main axis, in px.
#[derive(Clone)]
pub struct MeasureHandler(pub Rc<dyn Fn(f32, &[f32])>);

impl fmt::Debug for MeasureHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<measure>")
    }
}

/// An imperative widget embedded as a leaf of the declarative tree.
///
/// The widget is created once and mutated in place; layout asks it for its
/// size and paint lets it draw itself.
pub trait LegacyWidget: 'static {
    fn measure(&self, constraints: Constraints) -> Size;
    fn draw(&self, scene: &mut Scene, rect: Rect);
    /// Short human readable state, used by tree dumps and lookups.
    fn describe(&self) -> String;
}

#[derive(Clone)]
pub struct LegacyHandle(pub Rc<RefCell<dyn LegacyWidget>>);

impl fmt::Debug for LegacyHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.try_borrow() {
            Ok(w) => write!(f, "Legacy({:?})", w.describe()),
            Err(_) => f.write_str("Legacy(<borrowed>)"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Orientation {
    Vertical,
    Horizontal,
}

#[derive(Clone, Debug)]
pub enum ViewKind {
    Surface,
    Box,
    Row,
    Column,
    Text {
        text: String,
        /// `None` inherits the content color of the enclosing container.
        color: Option<Color>,
        font_size: f32,
    },
    Image {
        painter: Painter,
        content_description: Option<String>,
    },
    Button,
    LazyList {
        orientation: Orientation,
        /// Scroll offset (px) into the first composed child.
        first_offset: f32,
        on_measure: Option<MeasureHandler>,
    },
    Legacy {
        widget: LegacyHandle,
    },
    /// Placeholder for a child render scope, replaced by that scope's output
    /// when the tree is materialized.
    Group {
        scope: u64,
    },
}

impl ViewKind {
    pub fn name(&self) -> &'static str {
        match self {
            ViewKind::Surface => "Surface",
            ViewKind::Box => "Box",
            ViewKind::Row => "Row",
            ViewKind::Column => "Column",
            ViewKind::Text { .. } => "Text",
            ViewKind::Image { .. } => "Image",
            ViewKind::Button => "Button",
            ViewKind::LazyList {
                orientation: Orientation::Vertical,
                ..
            } => "LazyColumn",
            ViewKind::LazyList { .. } => "LazyRow",
            ViewKind::Legacy { .. } => "LegacyView",
            ViewKind::Group { .. } => "Group",
        }
    }
}

/// Immutable description of one visual element.
#[derive(Clone, Debug)]
pub struct View {
    pub id: ViewId,
    pub kind: ViewKind,
    pub modifier: Modifier,
    pub children: Vec<View>,
}

impl View {
    pub fn new(id: ViewId, kind: ViewKind) -> Self {
        View {
            id,
            kind,
            modifier: Modifier::default(),
            children: vec![],
        }
    }
    pub fn modifier(mut self, m: Modifier) -> Self {
        self.modifier = m;
        self
    }
    pub fn with_children(mut self, kids: Vec<View>) -> Self {
        self.children = kids;
        self
    }
    pub fn group(scope: u64) -> Self {
        View::new(0, ViewKind::Group { scope })
    }

    /// Depth-first search over this node and its descendants.
    pub fn find(&self, pred: &dyn Fn(&View) -> bool) -> Option<&View> {
        if pred(self) {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(pred))
    }

    pub fn find_text(&self, text: &str) -> Option<&View> {
        self.find(&|v: &View| matches!(&v.kind, ViewKind::Text { text: t, .. } if t == text))
    }

    pub fn count(&self) -> usize {
        1 + self.children.iter().map(View::count).sum::<usize>()
    }
}

/// Renderable scene
#[derive(Clone, Debug, Default)]
pub struct Scene {
    pub clear_color: Color,
    pub nodes: Vec<SceneNode>,
}

impl Scene {
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().filter_map(|n| match n {
            SceneNode::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum SceneNode {
    Rect {
        rect: Rect,
        color: Color,
        radius: f32,
    },
    Border {
        rect: Rect,
        color: Color,
        width: f32,
        radius: f32,
    },
    Text {
        rect: Rect,
        text: String,
        color: Color,
        size: f32,
    },
    Image {
        rect: Rect,
        resource: u32,
    },
    PushClip {
        rect: Rect,
        radius: f32,
    },
    PopClip,
    PushAlpha(f32),
    PopAlpha,
    PushTransform {
        transform: Transform,
    },
    PopTransform,
}
