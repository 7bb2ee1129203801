pub mod loader;
pub mod mock;

pub use loader::{load_segment, ContentLoader, LoadResult};
pub use mock::MockContentLoader;

use std::sync::Arc;
use tokio::sync::watch;

/// Loading state of the content item currently displayed on a page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MediaReadiness {
    /// Content is still being fetched or decoded; the clock must not advance
    Loading,
    /// Content is on screen
    #[default]
    Available,
}

impl MediaReadiness {
    pub fn is_available(self) -> bool {
        self == MediaReadiness::Available
    }
}

/// Observable readiness cell owned by the content-loading side.
///
/// Cloning yields another handle to the same cell. The viewer only ever
/// reads it, through [`MediaReadinessSignal::subscribe`].
#[derive(Debug, Clone)]
pub struct MediaReadinessSignal {
    tx: Arc<watch::Sender<MediaReadiness>>,
}

impl Default for MediaReadinessSignal {
    fn default() -> Self {
        Self::new(MediaReadiness::default())
    }
}

impl MediaReadinessSignal {
    pub fn new(initial: MediaReadiness) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx: Arc::new(tx) }
    }

    /// Current value
    pub fn get(&self) -> MediaReadiness {
        *self.tx.borrow()
    }

    /// Update the value; returns true if it actually changed
    pub fn set(&self, readiness: MediaReadiness) -> bool {
        self.tx.send_if_modified(|current| {
            if *current == readiness {
                false
            } else {
                *current = readiness;
                true
            }
        })
    }

    pub fn subscribe(&self) -> watch::Receiver<MediaReadiness> {
        self.tx.subscribe()
    }
}
