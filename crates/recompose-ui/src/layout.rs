//! Measurement, placement and painting of a materialized `View` tree.
//!
//! Every node walks its modifier chain outermost first. Each element sees the
//! constraints its predecessor hands down and reports a size back up, so
//! `background(..).size(150).padding(50)` paints a 150px square with content
//! inset by 50px while `padding(50).background(..).size(150)` paints the same
//! square 50px into a 250px slot.

use recompose_core::*;
use serde::Serialize;
use unicode_segmentation::UnicodeSegmentation;

/// Advance of one grapheme, as a fraction of the font size.
pub const CHAR_ADVANCE: f32 = 0.6;
pub const LINE_HEIGHT: f32 = 1.2;

#[derive(Clone, Debug, PartialEq)]
pub struct TextLayout {
    pub lines: Vec<String>,
    pub size: Size,
}

/// Fixed advance text layout: wraps on grapheme boundaries when `max_width`
/// is bounded.
pub fn measure_text(text: &str, font_px: f32, max_width: f32) -> TextLayout {
    let advance = font_px * CHAR_ADVANCE;
    let graphemes: Vec<&str> = text.graphemes(true).collect();
    let per_line = if max_width.is_finite() && advance > 0.0 {
        // tolerate rounding when the width came from a previous measurement
        ((max_width / advance + 1e-3).floor() as usize).max(1)
    } else {
        graphemes.len().max(1)
    };
    let lines: Vec<String> = if graphemes.is_empty() {
        vec![String::new()]
    } else {
        graphemes.chunks(per_line).map(|c| c.concat()).collect()
    };
    let widest = lines
        .iter()
        .map(|l| l.graphemes(true).count())
        .max()
        .unwrap_or(0);
    TextLayout {
        size: Size::new(
            widest as f32 * advance,
            lines.len() as f32 * font_px * LINE_HEIGHT,
        ),
        lines,
    }
}

#[derive(Clone, Debug)]
struct PlacedElement {
    element: ModifierElement,
    rect: Rect,
}

#[derive(Clone, Debug, Default)]
enum Payload {
    #[default]
    None,
    Text {
        lines: Vec<String>,
        color: Option<Color>,
        font_px: f32,
    },
    Image {
        resource: u32,
        tint: Color,
    },
    Legacy(LegacyHandle),
}

/// Placed node, in px, in root coordinates.
#[derive(Clone, Debug, Serialize)]
pub struct LayoutNode {
    pub id: u64,
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Slot taken in the parent, outermost modifier included.
    pub rect: Rect,
    /// Area left for the node's own content once the chain is applied.
    pub content: Rect,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<LayoutNode>,
    #[serde(skip)]
    chain: Vec<PlacedElement>,
    #[serde(skip)]
    payload: Payload,
    #[serde(skip)]
    content_color: Option<Color>,
}

impl LayoutNode {
    /// Depth-first search.
    pub fn find(&self, pred: &dyn Fn(&LayoutNode) -> bool) -> Option<&LayoutNode> {
        if pred(self) {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(pred))
    }

    pub fn find_text(&self, text: &str) -> Option<&LayoutNode> {
        self.find(&|n: &LayoutNode| n.kind == "Text" && n.label.as_deref() == Some(text))
    }

    /// Rect of the first background painted by this node's chain.
    pub fn background_rect(&self) -> Option<Rect> {
        self.chain.iter().find_map(|p| match p.element {
            ModifierElement::Background { .. } => Some(p.rect),
            _ => None,
        })
    }

    /// One line per node, indented by depth: `Kind "label" x,y wxh`.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        self.dump_into(0, &mut out);
        out
    }

    fn dump_into(&self, depth: usize, out: &mut String) {
        use std::fmt::Write;
        let r = self.rect;
        let _ = write!(out, "{:indent$}{}", "", self.kind, indent = depth * 2);
        if let Some(label) = &self.label {
            let _ = write!(out, " {label:?}");
        }
        let _ = writeln!(out, " {:.0},{:.0} {:.0}x{:.0}", r.x, r.y, r.w, r.h);
        for c in &self.children {
            c.dump_into(depth + 1, out);
        }
    }

    fn translate(&mut self, dx: f32, dy: f32) {
        if dx == 0.0 && dy == 0.0 {
            return;
        }
        self.rect = self.rect.translate(dx, dy);
        self.content = self.content.translate(dx, dy);
        for p in &mut self.chain {
            p.rect = p.rect.translate(dx, dy);
        }
        for c in &mut self.children {
            c.translate(dx, dy);
        }
    }
}

#[derive(Clone, Copy, Default)]
struct ChainStep {
    size: Size,
    inner_offset: Vec2,
}

fn fixed_axis(incoming_min: f32, incoming_max: f32, v: f32) -> (f32, f32) {
    let v = v.clamp(incoming_min, incoming_max.max(incoming_min));
    (v, v)
}

/// Measures `elements` outermost first; `content` measures whatever the chain
/// wraps. Returns the size the chain reports to its parent.
fn measure_chain(
    elements: &[ModifierElement],
    c: Constraints,
    steps: &mut Vec<ChainStep>,
    content: &mut dyn FnMut(Constraints) -> Size,
) -> Size {
    let Some((first, rest)) = elements.split_first() else {
        return content(c);
    };
    let index = steps.len();
    steps.push(ChainStep::default());

    let step = match first {
        ModifierElement::Size { width, height } => {
            let mut inner = c;
            if let Some(w) = width {
                (inner.min_w, inner.max_w) = fixed_axis(c.min_w, c.max_w, w.to_px());
            }
            if let Some(h) = height {
                (inner.min_h, inner.max_h) = fixed_axis(c.min_h, c.max_h, h.to_px());
            }
            let size = measure_chain(rest, inner, steps, content);
            ChainStep {
                size: inner.constrain(size),
                inner_offset: Vec2::default(),
            }
        }
        ModifierElement::MinSize { width, height } => {
            let mut inner = c;
            if let Some(w) = width {
                inner.min_w = c.min_w.max(w.to_px().min(c.max_w));
            }
            if let Some(h) = height {
                inner.min_h = c.min_h.max(h.to_px().min(c.max_h));
            }
            let size = measure_chain(rest, inner, steps, content);
            ChainStep {
                size: inner.constrain(size),
                inner_offset: Vec2::default(),
            }
        }
        ModifierElement::FillMax {
            width,
            height,
            fraction,
        } => {
            let mut inner = c;
            if *width && c.has_bounded_width() {
                (inner.min_w, inner.max_w) = fixed_axis(c.min_w, c.max_w, c.max_w * fraction);
            }
            if *height && c.has_bounded_height() {
                (inner.min_h, inner.max_h) = fixed_axis(c.min_h, c.max_h, c.max_h * fraction);
            }
            let size = measure_chain(rest, inner, steps, content);
            ChainStep {
                size: inner.constrain(size),
                inner_offset: Vec2::default(),
            }
        }
        ModifierElement::Padding(p) => {
            let (start, top, end, bottom) =
                (p.start.to_px(), p.top.to_px(), p.end.to_px(), p.bottom.to_px());
            let inner = c.deflate(start + end, top + bottom);
            let size = measure_chain(rest, inner, steps, content);
            ChainStep {
                size: c.constrain(Size::new(
                    size.width + start + end,
                    size.height + top + bottom,
                )),
                inner_offset: Vec2 { x: start, y: top },
            }
        }
        ModifierElement::Offset { x, y } => {
            let size = measure_chain(rest, c, steps, content);
            ChainStep {
                size,
                inner_offset: Vec2 {
                    x: x.to_px(),
                    y: y.to_px(),
                },
            }
        }
        ModifierElement::LayoutFraction { width, height } => {
            let size = measure_chain(rest, c, steps, content);
            ChainStep {
                size: c.constrain(Size::new(
                    size.width * width.clamp(0.0, 1.0),
                    size.height * height.clamp(0.0, 1.0),
                )),
                inner_offset: Vec2::default(),
            }
        }
        // Draw-only and input elements take the size of what they wrap.
        ModifierElement::Background { .. }
        | ModifierElement::Border { .. }
        | ModifierElement::Clip(_)
        | ModifierElement::Alpha(_)
        | ModifierElement::Scale { .. }
        | ModifierElement::Clickable(_) => ChainStep {
            size: measure_chain(rest, c, steps, content),
            inner_offset: Vec2::default(),
        },
    };
    steps[index] = step;
    step.size
}

struct Measured {
    size: Size,
    children: Vec<LayoutNode>,
    payload: Payload,
    label: Option<String>,
}

fn measure_children_stacked(view: &View, c: Constraints, ids: &mut u64) -> (Size, Vec<LayoutNode>) {
    let children: Vec<LayoutNode> = view
        .children
        .iter()
        .map(|v| measure_view(v, c.relax(), ids))
        .collect();
    let w = children.iter().map(|n| n.rect.w).fold(0.0, f32::max);
    let h = children.iter().map(|n| n.rect.h).fold(0.0, f32::max);
    (c.constrain(Size::new(w, h)), children)
}

fn measure_content(view: &View, c: Constraints, ids: &mut u64) -> Measured {
    let mut label = None;
    let mut payload = Payload::None;
    let (size, children) = match &view.kind {
        ViewKind::Text {
            text,
            color,
            font_size,
        } => {
            let font_px = dp_to_px(*font_size);
            let layout = measure_text(text, font_px, c.max_w);
            label = Some(text.clone());
            payload = Payload::Text {
                lines: layout.lines,
                color: *color,
                font_px,
            };
            (c.constrain(layout.size), Vec::new())
        }
        ViewKind::Image {
            painter,
            content_description,
        } => {
            label = content_description.clone();
            payload = Payload::Image {
                resource: painter.resource,
                tint: painter.tint,
            };
            let intrinsic = Size::new(
                painter.intrinsic_width.to_px(),
                painter.intrinsic_height.to_px(),
            );
            (c.constrain(intrinsic), Vec::new())
        }
        ViewKind::Legacy { widget } => {
            let size = match widget.0.try_borrow() {
                Ok(w) => {
                    label = Some(w.describe());
                    w.measure(c)
                }
                Err(_) => {
                    log::warn!("legacy widget borrowed during layout; measuring as empty");
                    Size::ZERO
                }
            };
            payload = Payload::Legacy(widget.clone());
            (c.constrain(size), Vec::new())
        }
        ViewKind::Surface | ViewKind::Box | ViewKind::Group { .. } => {
            measure_children_stacked(view, c, ids)
        }
        ViewKind::Button => {
            let (size, mut children) = measure_children_stacked(view, c, ids);
            for child in &mut children {
                let dx = (size.width - child.rect.w) / 2.0;
                let dy = (size.height - child.rect.h) / 2.0;
                child.translate(dx, dy);
            }
            (size, children)
        }
        ViewKind::Column => {
            let mut used = 0.0f32;
            let mut width = 0.0f32;
            let mut children = Vec::with_capacity(view.children.len());
            for v in &view.children {
                let cc = Constraints {
                    min_w: 0.0,
                    max_w: c.max_w,
                    min_h: 0.0,
                    max_h: (c.max_h - used).max(0.0),
                };
                let mut node = measure_view(v, cc, ids);
                node.translate(0.0, used);
                used += node.rect.h;
                width = width.max(node.rect.w);
                children.push(node);
            }
            (c.constrain(Size::new(width, used)), children)
        }
        ViewKind::Row => {
            let mut used = 0.0f32;
            let mut height = 0.0f32;
            let mut children = Vec::with_capacity(view.children.len());
            for v in &view.children {
                let cc = Constraints {
                    min_w: 0.0,
                    max_w: (c.max_w - used).max(0.0),
                    min_h: 0.0,
                    max_h: c.max_h,
                };
                let mut node = measure_view(v, cc, ids);
                node.translate(used, 0.0);
                used += node.rect.w;
                height = height.max(node.rect.h);
                children.push(node);
            }
            (c.constrain(Size::new(used, height)), children)
        }
        ViewKind::LazyList {
            orientation,
            first_offset,
            on_measure,
        } => {
            let vertical = *orientation == Orientation::Vertical;
            let cc = if vertical {
                Constraints {
                    min_w: 0.0,
                    max_w: c.max_w,
                    min_h: 0.0,
                    max_h: f32::INFINITY,
                }
            } else {
                Constraints {
                    min_w: 0.0,
                    max_w: f32::INFINITY,
                    min_h: 0.0,
                    max_h: c.max_h,
                }
            };
            let mut main = -first_offset;
            let mut cross = 0.0f32;
            let mut extents = Vec::with_capacity(view.children.len());
            let mut children = Vec::with_capacity(view.children.len());
            for v in &view.children {
                let mut node = measure_view(v, cc, ids);
                let (extent, across) = if vertical {
                    node.translate(0.0, main);
                    (node.rect.h, node.rect.w)
                } else {
                    node.translate(main, 0.0);
                    (node.rect.w, node.rect.h)
                };
                main += extent;
                cross = cross.max(across);
                extents.push(extent);
                children.push(node);
            }
            let total: f32 = extents.iter().sum();
            let size = if vertical {
                c.constrain(Size::new(cross, total))
            } else {
                c.constrain(Size::new(total, cross))
            };
            if let Some(m) = on_measure {
                let viewport = if vertical { size.height } else { size.width };
                (m.0)(viewport, &extents);
            }
            (size, children)
        }
    };
    Measured {
        size,
        children,
        payload,
        label,
    }
}

fn measure_view(view: &View, c: Constraints, ids: &mut u64) -> LayoutNode {
    let id = *ids;
    *ids += 1;

    let mut steps = Vec::with_capacity(view.modifier.elements().len());
    let mut measured = None;
    let size = measure_chain(view.modifier.elements(), c, &mut steps, &mut |inner: Constraints| {
        let m = measure_content(view, inner, ids);
        let size = m.size;
        measured = Some(m);
        size
    });
    let Measured {
        size: content_size,
        mut children,
        payload,
        label,
    } = measured.unwrap_or(Measured {
        size: Size::ZERO,
        children: Vec::new(),
        payload: Payload::None,
        label: None,
    });

    let mut origin = Vec2::default();
    let chain = view
        .modifier
        .elements()
        .iter()
        .zip(&steps)
        .map(|(element, step)| {
            let rect = Rect::new(origin.x, origin.y, step.size.width, step.size.height);
            origin.x += step.inner_offset.x;
            origin.y += step.inner_offset.y;
            PlacedElement {
                element: element.clone(),
                rect,
            }
        })
        .collect();
    for child in &mut children {
        child.translate(origin.x, origin.y);
    }

    LayoutNode {
        id,
        kind: view.kind.name(),
        label,
        rect: Rect::new(0.0, 0.0, size.width, size.height),
        content: Rect::new(origin.x, origin.y, content_size.width, content_size.height),
        children,
        chain,
        payload,
        content_color: matches!(view.kind, ViewKind::Button).then(|| theme().on_primary),
    }
}

/// Measures and places `root` in a window of `size_px`. The root sees loose
/// constraints, like a composition root.
pub fn layout(root: &View, size_px: (u32, u32)) -> LayoutNode {
    let mut ids = 1u64;
    measure_view(
        root,
        Constraints::loose(size_px.0 as f32, size_px.1 as f32),
        &mut ids,
    )
}

fn intersect(a: Rect, b: Rect) -> Rect {
    let x = a.x.max(b.x);
    let y = a.y.max(b.y);
    let right = (a.x + a.w).min(b.x + b.w);
    let bottom = (a.y + a.h).min(b.y + b.h);
    Rect::new(x, y, (right - x).max(0.0), (bottom - y).max(0.0))
}

#[derive(Clone, Copy)]
struct PaintCtx {
    clip: Option<Rect>,
    transform: Transform,
    content_color: Color,
}

enum Pop {
    Clip,
    Alpha,
    Transform,
}

fn first_text(node: &LayoutNode) -> Option<String> {
    if node.kind == "Text" {
        return node.label.clone();
    }
    node.children.iter().find_map(first_text)
}

fn paint_node(node: &LayoutNode, mut ctx: PaintCtx, scene: &mut Scene, hits: &mut Vec<HitRegion>) {
    let mut pops = Vec::new();
    for placed in &node.chain {
        let r = placed.rect;
        match &placed.element {
            ModifierElement::Background { color, shape } => scene.nodes.push(SceneNode::Rect {
                rect: r,
                color: *color,
                radius: shape.radius_px(r.w, r.h),
            }),
            ModifierElement::Border {
                width,
                color,
                shape,
            } => scene.nodes.push(SceneNode::Border {
                rect: r,
                color: *color,
                width: width.to_px(),
                radius: shape.radius_px(r.w, r.h),
            }),
            ModifierElement::Clip(shape) => {
                scene.nodes.push(SceneNode::PushClip {
                    rect: r,
                    radius: shape.radius_px(r.w, r.h),
                });
                pops.push(Pop::Clip);
                let screen = ctx.transform.apply_to_rect(r);
                ctx.clip = Some(ctx.clip.map_or(screen, |c| intersect(c, screen)));
            }
            ModifierElement::LayoutFraction { .. } => {
                scene.nodes.push(SceneNode::PushClip { rect: r, radius: 0.0 });
                pops.push(Pop::Clip);
                let screen = ctx.transform.apply_to_rect(r);
                ctx.clip = Some(ctx.clip.map_or(screen, |c| intersect(c, screen)));
            }
            ModifierElement::Alpha(a) => {
                scene.nodes.push(SceneNode::PushAlpha(a.clamp(0.0, 1.0)));
                pops.push(Pop::Alpha);
            }
            ModifierElement::Scale { x, y } => {
                let transform = Transform::scale_about(r, *x, *y);
                scene.nodes.push(SceneNode::PushTransform { transform });
                pops.push(Pop::Transform);
                ctx.transform = ctx.transform.combine(&transform);
            }
            ModifierElement::Clickable(handler) => {
                let mut rect = ctx.transform.apply_to_rect(r);
                if let Some(clip) = ctx.clip {
                    rect = intersect(rect, clip);
                }
                if rect.w > 0.0 && rect.h > 0.0 {
                    hits.push(HitRegion {
                        id: node.id,
                        rect,
                        on_click: Some(handler.clone()),
                        label: first_text(node),
                    });
                }
            }
            ModifierElement::Size { .. }
            | ModifierElement::MinSize { .. }
            | ModifierElement::FillMax { .. }
            | ModifierElement::Padding(_)
            | ModifierElement::Offset { .. } => {}
        }
    }

    if let Some(color) = node.content_color {
        ctx.content_color = color;
    }
    match &node.payload {
        Payload::Text {
            lines,
            color,
            font_px,
        } => {
            let line_h = font_px * LINE_HEIGHT;
            for (i, line) in lines.iter().enumerate() {
                scene.nodes.push(SceneNode::Text {
                    rect: Rect::new(
                        node.content.x,
                        node.content.y + i as f32 * line_h,
                        node.content.w,
                        line_h,
                    ),
                    text: line.clone(),
                    color: color.unwrap_or(ctx.content_color),
                    size: *font_px,
                });
            }
        }
        Payload::Image { resource, tint } => {
            scene.nodes.push(SceneNode::Rect {
                rect: node.content,
                color: *tint,
                radius: 0.0,
            });
            scene.nodes.push(SceneNode::Image {
                rect: node.content,
                resource: *resource,
            });
        }
        Payload::Legacy(widget) => match widget.0.try_borrow() {
            Ok(w) => w.draw(scene, node.content),
            Err(_) => log::warn!("legacy widget borrowed during paint; skipped"),
        },
        Payload::None => {}
    }

    let clips_children = node.kind == "LazyColumn" || node.kind == "LazyRow";
    if clips_children {
        scene.nodes.push(SceneNode::PushClip {
            rect: node.content,
            radius: 0.0,
        });
        let screen = ctx.transform.apply_to_rect(node.content);
        ctx.clip = Some(ctx.clip.map_or(screen, |c| intersect(c, screen)));
    }
    for child in &node.children {
        paint_node(child, ctx, scene, hits);
    }
    if clips_children {
        scene.nodes.push(SceneNode::PopClip);
    }

    for pop in pops.into_iter().rev() {
        scene.nodes.push(match pop {
            Pop::Clip => SceneNode::PopClip,
            Pop::Alpha => SceneNode::PopAlpha,
            Pop::Transform => SceneNode::PopTransform,
        });
    }
}

/// Paints a placed tree. Hit regions come out in paint order; the last one
/// containing a point is the topmost.
pub fn paint(root: &LayoutNode) -> (Scene, Vec<HitRegion>) {
    let theme = theme();
    let mut scene = Scene {
        clear_color: theme.background,
        nodes: Vec::new(),
    };
    let mut hits = Vec::new();
    let ctx = PaintCtx {
        clip: None,
        transform: Transform::identity(),
        content_color: theme.on_surface,
    };
    paint_node(root, ctx, &mut scene, &mut hits);
    (scene, hits)
}

pub fn layout_and_paint(root: &View, size_px: (u32, u32)) -> (Scene, Vec<HitRegion>) {
    paint(&layout(root, size_px))
}
