use crate::navigation::OverscrollEdge;
use chrono::{DateTime, Utc};

/// Outward callbacks of the viewer.
///
/// All methods default to no-ops so hosts implement only what they need.
pub trait ViewerObserver<C> {
    /// End of all content. Called at most once per viewer.
    fn on_page_limit_reached(&mut self) {}

    /// Once per boundary overscroll gesture
    fn on_page_overscroll(&mut self, _edge: OverscrollEdge) {}

    fn on_page_changed(&mut self, _page: usize) {}

    /// The active segment changed; `content` is what the story source rendered
    fn on_segment_shown(&mut self, _page: usize, _segment: usize, _content: &C) {}
}

impl<C> ViewerObserver<C> for () {}

/// Something the viewer reported
#[derive(Debug, Clone, PartialEq)]
pub enum ViewerEvent<C> {
    LimitReached,
    Overscroll(OverscrollEdge),
    PageChanged(usize),
    SegmentShown { page: usize, segment: usize, content: C },
}

#[derive(Debug, Clone)]
pub struct LoggedEvent<C> {
    pub at: DateTime<Utc>,
    pub event: ViewerEvent<C>,
}

/// Observer that records every callback with a timestamp
#[derive(Debug, Clone)]
pub struct EventLog<C> {
    entries: Vec<LoggedEvent<C>>,
}

impl<C> Default for EventLog<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> EventLog<C> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn entries(&self) -> &[LoggedEvent<C>] {
        &self.entries
    }

    pub fn events(&self) -> impl Iterator<Item = &ViewerEvent<C>> {
        self.entries.iter().map(|e| &e.event)
    }

    pub fn limit_count(&self) -> usize {
        self.events()
            .filter(|e| matches!(e, ViewerEvent::LimitReached))
            .count()
    }

    pub fn overscrolls(&self) -> Vec<OverscrollEdge> {
        self.events()
            .filter_map(|e| match e {
                ViewerEvent::Overscroll(edge) => Some(*edge),
                _ => None,
            })
            .collect()
    }

    pub fn pages_changed(&self) -> Vec<usize> {
        self.events()
            .filter_map(|e| match e {
                ViewerEvent::PageChanged(page) => Some(*page),
                _ => None,
            })
            .collect()
    }

    /// `(page, segment)` pairs in the order they were shown
    pub fn segments_shown(&self) -> Vec<(usize, usize)> {
        self.events()
            .filter_map(|e| match e {
                ViewerEvent::SegmentShown { page, segment, .. } => Some((*page, *segment)),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    fn push(&mut self, event: ViewerEvent<C>) {
        self.entries.push(LoggedEvent {
            at: Utc::now(),
            event,
        });
    }
}

impl<C: Clone> ViewerObserver<C> for EventLog<C> {
    fn on_page_limit_reached(&mut self) {
        self.push(ViewerEvent::LimitReached);
    }

    fn on_page_overscroll(&mut self, edge: OverscrollEdge) {
        self.push(ViewerEvent::Overscroll(edge));
    }

    fn on_page_changed(&mut self, page: usize) {
        self.push(ViewerEvent::PageChanged(page));
    }

    fn on_segment_shown(&mut self, page: usize, segment: usize, content: &C) {
        self.push(ViewerEvent::SegmentShown {
            page,
            segment,
            content: content.clone(),
        });
    }
}
