//! Windowless host: owns a [`Scheduler`], drives frames at a fixed interval
//! and dispatches clicks against the last painted frame.

use std::time::Duration;

use recompose_core::*;

use crate::layout::{self, LayoutNode};

#[derive(Clone, Copy, Debug)]
pub struct HostConfig {
    /// Viewport, in px.
    pub size: (u32, u32),
    /// dp to px multiplier.
    pub density: f32,
    pub frame_interval: Duration,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            size: (1080, 1920),
            density: 2.75,
            frame_interval: Duration::from_millis(16),
        }
    }
}

pub struct HeadlessHost {
    pub config: HostConfig,
    scheduler: Scheduler,
    last: Option<Frame>,
    last_layout: Option<LayoutNode>,
}

impl Default for HeadlessHost {
    fn default() -> Self {
        Self::new(HostConfig::default())
    }
}

impl HeadlessHost {
    pub fn new(config: HostConfig) -> Self {
        let mut scheduler = Scheduler::new();
        scheduler.size = config.size;
        Self {
            config,
            scheduler,
            last: None,
            last_layout: None,
        }
    }

    pub fn scheduler(&mut self) -> &mut Scheduler {
        &mut self.scheduler
    }

    /// Mounts `content` as the root and paints a first frame.
    pub fn mount(&mut self, content: impl Fn() -> View + 'static) -> &Frame {
        let density = Density {
            scale: self.config.density,
        };
        with_density(density, || self.scheduler.mount(content));
        log::debug!(
            "host: mounted at {}x{} px, density {}",
            self.config.size.0,
            self.config.size.1,
            self.config.density
        );
        self.frame_with(Duration::ZERO)
    }

    /// One frame after the configured interval.
    pub fn frame(&mut self) -> &Frame {
        self.frame_with(self.config.frame_interval)
    }

    pub fn frame_with(&mut self, dt: Duration) -> &Frame {
        let density = Density {
            scale: self.config.density,
        };
        let mut placed = None;
        let frame = with_density(density, || {
            self.scheduler.repose(dt, |root, size| {
                let node = layout::layout(root, size);
                let painted = layout::paint(&node);
                placed = Some(node);
                painted
            })
        });
        self.last_layout = placed;
        self.last.insert(frame)
    }

    /// Drives frames until `duration` has elapsed. Returns the frame count.
    pub fn advance(&mut self, duration: Duration) -> usize {
        let interval = self.config.frame_interval.max(Duration::from_millis(1));
        let mut elapsed = Duration::ZERO;
        let mut frames = 0;
        while elapsed < duration {
            self.frame();
            elapsed += interval;
            frames += 1;
        }
        frames
    }

    /// Drives frames while tasks wait on the clock or scopes are invalid,
    /// at most `max_frames`. Returns the frame count.
    pub fn run_until_idle(&mut self, max_frames: usize) -> usize {
        let mut frames = 0;
        while frames < max_frames && self.scheduler.has_pending_work() {
            self.frame();
            frames += 1;
        }
        if frames == max_frames && self.scheduler.has_pending_work() {
            log::warn!("host: still busy after {max_frames} frames");
        }
        frames
    }

    /// Fires the topmost clickable under `(x, y)` (px). Returns whether one
    /// was hit. State changes show up on the next frame.
    pub fn click_at(&mut self, x: f32, y: f32) -> bool {
        let Some(frame) = &self.last else {
            return false;
        };
        let p = Vec2 { x, y };
        let handler = frame
            .hit_regions
            .iter()
            .rev()
            .find(|h| h.rect.contains(p))
            .and_then(|h| h.on_click.clone());
        match handler {
            Some(h) => {
                log::debug!("host: click at {x},{y}");
                h.call();
                true
            }
            None => false,
        }
    }

    /// Clicks the center of the first text node reading `text`.
    pub fn click_text(&mut self, text: &str) -> Result<(), ComposeError> {
        let center = self
            .last_layout
            .as_ref()
            .and_then(|l| l.find_text(text))
            .map(|n| n.rect.center())
            .ok_or_else(|| ComposeError::NotFound(format!("text {text:?}")))?;
        if self.click_at(center.x, center.y) {
            Ok(())
        } else {
            Err(ComposeError::NotFound(format!("clickable under {text:?}")))
        }
    }

    pub fn last_frame(&self) -> Option<&Frame> {
        self.last.as_ref()
    }

    pub fn layout(&self) -> Option<&LayoutNode> {
        self.last_layout.as_ref()
    }

    pub fn scene(&self) -> Option<&Scene> {
        self.last.as_ref().map(|f| &f.scene)
    }

    /// Text painted in the last frame, in paint order.
    pub fn texts(&self) -> Vec<String> {
        self.scene()
            .map(|s| s.texts().map(str::to_owned).collect())
            .unwrap_or_default()
    }
}
