//! Page-level navigation: a continuous scroll position over the pages, page
//! turn animation, and boundary overscroll detection.

use std::time::Duration;
use tracing::debug;

/// Which end of the page list was overscrolled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverscrollEdge {
    /// Before the first page
    Leading,
    /// Past the last page
    Trailing,
}

/// Notifications produced by position updates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigatorEvent {
    PageChanged(usize),
    Overscroll(OverscrollEdge),
}

/// Input from the host's scrolling primitive, in page units
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScrollUpdate {
    /// Relative drag movement
    DragBy(f64),
    /// Absolute raw position, possibly outside the valid range
    Position(f64),
    /// The finger lifted; snap to the nearest page
    End,
}

#[derive(Debug, Clone, Copy)]
struct PageAnimation {
    from: f64,
    to: usize,
    elapsed: Duration,
}

/// Tracks the continuous page position.
///
/// Overscroll is reported from boundary deltas rather than pixel extents: any
/// update that tries to go below page 0 or above the last page counts. The
/// detector disarms after firing and re-arms once an update lands back in
/// range or the drag ends, so one gesture fires at most once.
#[derive(Debug, Clone)]
pub struct PageNavigator {
    position: f64,
    page_count: usize,
    current_page: usize,
    dragging: bool,
    overscroll_armed: bool,
    animation: Option<PageAnimation>,
    animation_duration: Duration,
}

impl PageNavigator {
    pub fn new(page_count: usize, initial_page: usize, animation_duration: Duration) -> Self {
        let initial = initial_page.min(page_count.saturating_sub(1));
        Self {
            position: initial as f64,
            page_count,
            current_page: initial,
            dragging: false,
            overscroll_armed: true,
            animation: None,
            animation_duration,
        }
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    /// `round(position)`
    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn last_page(&self) -> Option<usize> {
        self.page_count.checked_sub(1)
    }

    pub fn is_last_page(&self, page: usize) -> bool {
        self.last_page() == Some(page)
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    /// A page turn is in progress (drag or animation)
    pub fn is_paging(&self) -> bool {
        self.dragging || self.animation.is_some()
    }

    /// Target of the running animation, if any
    pub fn animation_target(&self) -> Option<usize> {
        self.animation.map(|a| a.to)
    }

    pub fn apply(&mut self, update: ScrollUpdate) -> Vec<NavigatorEvent> {
        match update {
            ScrollUpdate::DragBy(delta) => self.drag_by(delta),
            ScrollUpdate::Position(raw) => self.update_position(raw),
            ScrollUpdate::End => {
                self.end_drag();
                Vec::new()
            }
        }
    }

    pub fn drag_by(&mut self, delta: f64) -> Vec<NavigatorEvent> {
        self.update_position(self.position + delta)
    }

    /// Position update from the scrolling primitive
    pub fn update_position(&mut self, raw: f64) -> Vec<NavigatorEvent> {
        let mut events = Vec::new();
        let Some(last) = self.last_page() else {
            return events;
        };
        if raw.is_nan() {
            return events;
        }

        // A user drag takes over from any programmatic motion
        self.animation = None;
        self.dragging = true;

        let last = last as f64;
        let edge = if raw < 0.0 {
            Some(OverscrollEdge::Leading)
        } else if raw > last {
            Some(OverscrollEdge::Trailing)
        } else {
            None
        };

        match edge {
            Some(edge) if self.overscroll_armed => {
                self.overscroll_armed = false;
                debug!("Overscroll at {:?} edge", edge);
                events.push(NavigatorEvent::Overscroll(edge));
            }
            Some(_) => {}
            None => self.overscroll_armed = true,
        }

        self.position = raw.clamp(0.0, last);
        self.emit_page_change(&mut events);
        events
    }

    /// Finish a drag, snapping to the nearest page
    pub fn end_drag(&mut self) {
        if !self.dragging {
            return;
        }
        self.dragging = false;
        self.overscroll_armed = true;

        let target = self.current_page;
        if self.position != target as f64 {
            self.start_animation(target);
        }
    }

    /// Smoothly move to `index`. Out-of-range targets are ignored.
    pub fn animate_to_page(&mut self, index: usize) -> bool {
        if index >= self.page_count {
            debug!("Ignoring animation to page {} of {}", index, self.page_count);
            return false;
        }
        self.dragging = false;
        self.overscroll_armed = true;

        if self.position == index as f64 {
            self.animation = None;
        } else {
            self.start_animation(index);
        }
        true
    }

    /// Advance the page animation
    pub fn tick(&mut self, elapsed: Duration) -> Vec<NavigatorEvent> {
        let mut events = Vec::new();
        let Some(mut animation) = self.animation else {
            return events;
        };

        animation.elapsed = animation.elapsed.saturating_add(elapsed);
        let t = if self.animation_duration.is_zero() {
            1.0
        } else {
            (animation.elapsed.as_secs_f64() / self.animation_duration.as_secs_f64()).min(1.0)
        };

        if t >= 1.0 {
            self.position = animation.to as f64;
            self.animation = None;
        } else {
            let eased = smoothstep(t);
            self.position = animation.from + (animation.to as f64 - animation.from) * eased;
            self.animation = Some(animation);
        }

        self.emit_page_change(&mut events);
        events
    }

    fn start_animation(&mut self, to: usize) {
        self.animation = Some(PageAnimation {
            from: self.position,
            to,
            elapsed: Duration::ZERO,
        });
    }

    fn emit_page_change(&mut self, events: &mut Vec<NavigatorEvent>) {
        let Some(last) = self.last_page() else {
            return;
        };
        let page = (self.position.round() as usize).min(last);
        if page != self.current_page {
            self.current_page = page;
            events.push(NavigatorEvent::PageChanged(page));
        }
    }
}

fn smoothstep(t: f64) -> f64 {
    t * t * (3.0 - 2.0 * t)
}
