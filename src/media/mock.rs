use super::loader::{ContentLoader, LoadResult};
use crate::core::SegmentRef;
use async_trait::async_trait;
use std::collections::HashSet;
use std::time::Duration;

/// Mock content loader for testing without a network or decoder
///
/// Every load takes `latency`; segments marked as failing return an error.
/// Successfully loaded segments are cached.
pub struct MockContentLoader {
    name: String,
    latency: Duration,
    failing: HashSet<SegmentRef>,
    cache: HashSet<SegmentRef>,
    loads: Vec<SegmentRef>,
}

impl MockContentLoader {
    /// Create a new mock loader
    pub fn new(name: &str, latency: Duration) -> Self {
        Self {
            name: name.to_string(),
            latency,
            failing: HashSet::new(),
            cache: HashSet::new(),
            loads: Vec::new(),
        }
    }

    /// Make every load of `segment` fail
    pub fn fail_on(&mut self, segment: SegmentRef) {
        self.failing.insert(segment);
    }

    /// Segments passed to `load`, in order (for verification)
    pub fn loads(&self) -> &[SegmentRef] {
        &self.loads
    }
}

#[async_trait]
impl ContentLoader for MockContentLoader {
    fn name(&self) -> &str {
        &self.name
    }

    async fn load(&mut self, segment: SegmentRef) -> LoadResult<()> {
        self.loads.push(segment);
        tokio::time::sleep(self.latency).await;

        if self.failing.contains(&segment) {
            return Err(format!("segment {}/{} unavailable", segment.page, segment.segment).into());
        }
        self.cache.insert(segment);
        Ok(())
    }

    fn is_cached(&self, segment: SegmentRef) -> bool {
        self.cache.contains(&segment)
    }
}
