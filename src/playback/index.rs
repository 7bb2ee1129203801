/// What happened on [`StoryIndexController::advance`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceOutcome {
    /// Index moved to the contained segment; the clock must restart
    Moved(usize),
    /// Already on the terminal segment; the owner must page forward
    /// (or trip the limit on the last page)
    PastEnd,
}

/// What happened on [`StoryIndexController::retreat`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetreatOutcome {
    Moved(usize),
    /// Already on segment 0; the owner must page back
    BeforeStart,
}

/// Current segment of one page.
///
/// `advance` and `retreat` are the only mutators. Boundary crossings are
/// reported back to the owner rather than handled here, so the page container
/// resolves them synchronously in one place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoryIndexController {
    current: usize,
    segment_count: usize,
}

impl StoryIndexController {
    /// `initial` is clamped into the valid range. A page with no segments sits
    /// at index 0 and is terminal in both directions.
    pub fn new(segment_count: usize, initial: usize) -> Self {
        Self {
            current: initial.min(segment_count.saturating_sub(1)),
            segment_count,
        }
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn segment_count(&self) -> usize {
        self.segment_count
    }

    pub fn is_terminal(&self) -> bool {
        self.current + 1 >= self.segment_count
    }

    pub fn advance(&mut self) -> AdvanceOutcome {
        if self.is_terminal() {
            return AdvanceOutcome::PastEnd;
        }
        self.current += 1;
        AdvanceOutcome::Moved(self.current)
    }

    pub fn retreat(&mut self) -> RetreatOutcome {
        if self.current == 0 {
            return RetreatOutcome::BeforeStart;
        }
        self.current -= 1;
        RetreatOutcome::Moved(self.current)
    }
}
