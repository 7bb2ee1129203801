use super::{MediaReadiness, MediaReadinessSignal};
use crate::core::SegmentRef;
use async_trait::async_trait;
use std::error::Error;
use tracing::{debug, warn};

/// Result type for content loading
pub type LoadResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

/// Content-loading collaborator.
///
/// The viewer never looks inside loaded content; it only observes the
/// readiness signal that [`load_segment`] drives around a load.
#[async_trait]
pub trait ContentLoader: Send {
    /// Get the name/identifier of this loader
    fn name(&self) -> &str;

    /// Fetch and decode the content for one segment
    async fn load(&mut self, segment: SegmentRef) -> LoadResult<()>;

    /// Whether the segment is already cached and needs no loading phase
    fn is_cached(&self, _segment: SegmentRef) -> bool {
        false
    }
}

/// Load one segment, flipping `signal` to `Loading` for the duration.
///
/// A failed load still ends in `Available` so playback is never stuck behind
/// content that will not arrive. Returns whether the load succeeded.
pub async fn load_segment<L>(loader: &mut L, segment: SegmentRef, signal: &MediaReadinessSignal) -> bool
where
    L: ContentLoader + ?Sized,
{
    if loader.is_cached(segment) {
        signal.set(MediaReadiness::Available);
        return true;
    }

    signal.set(MediaReadiness::Loading);
    debug!(
        "{} loading page {} segment {}",
        loader.name(),
        segment.page,
        segment.segment
    );

    let ok = match loader.load(segment).await {
        Ok(()) => true,
        Err(e) => {
            warn!(
                "{} failed to load page {} segment {}: {}",
                loader.name(),
                segment.page,
                segment.segment,
                e
            );
            false
        }
    };

    signal.set(MediaReadiness::Available);
    ok
}
