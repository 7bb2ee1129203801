use serde::{Deserialize, Serialize};

/// Supplies the page structure and segment content to the viewer.
///
/// Segment counts must stay fixed while a page is mounted.
pub trait StorySource {
    /// Whatever the host renders for one segment
    type Content;

    fn page_count(&self) -> usize;

    fn segment_count(&self, page: usize) -> usize;

    /// Segment shown the first time a page is mounted. Clamped by the viewer.
    fn initial_segment_index(&self, _page: usize) -> usize {
        0
    }

    /// Pure function of the two indices; must not touch viewer state
    fn render_segment(&self, page: usize, segment: usize) -> Self::Content;
}

/// Static description of one page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSpec {
    pub segment_count: usize,
    #[serde(default)]
    pub initial_segment_index: usize,
}

impl PageSpec {
    pub fn new(segment_count: usize) -> Self {
        Self {
            segment_count,
            initial_segment_index: 0,
        }
    }

    pub fn starting_at(mut self, index: usize) -> Self {
        self.initial_segment_index = index;
        self
    }
}

/// Address of one segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SegmentRef {
    pub page: usize,
    pub segment: usize,
}

/// In-memory story source built from a list of page specs
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StaticStories {
    pages: Vec<PageSpec>,
}

impl StaticStories {
    pub fn new(pages: Vec<PageSpec>) -> Self {
        Self { pages }
    }

    /// Build from plain segment counts, every page starting at segment 0
    pub fn from_counts(counts: &[usize]) -> Self {
        Self::new(counts.iter().map(|&c| PageSpec::new(c)).collect())
    }
}

impl StorySource for StaticStories {
    type Content = SegmentRef;

    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn segment_count(&self, page: usize) -> usize {
        self.pages.get(page).map(|p| p.segment_count).unwrap_or(0)
    }

    fn initial_segment_index(&self, page: usize) -> usize {
        self.pages
            .get(page)
            .map(|p| p.initial_segment_index)
            .unwrap_or(0)
    }

    fn render_segment(&self, page: usize, segment: usize) -> SegmentRef {
        SegmentRef { page, segment }
    }
}
