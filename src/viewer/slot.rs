use crate::bridge::{BridgeSubscription, ExternalAnimationBridge};
use crate::playback::{StoryIndexController, StoryProgressClock};
use std::time::Duration;

/// Per-page state kept in the viewer's arena
#[derive(Debug)]
pub struct PageState {
    pub index: StoryIndexController,
    pub clock: StoryProgressClock,
    subscription: Option<BridgeSubscription>,
}

impl PageState {
    pub fn new(segment_count: usize, initial_segment: usize, duration: Duration) -> Self {
        Self {
            index: StoryIndexController::new(segment_count, initial_segment),
            clock: StoryProgressClock::new(duration),
            subscription: None,
        }
    }

    pub fn attach(&mut self, bridge: &ExternalAnimationBridge) {
        if self.subscription.is_none() {
            self.subscription = Some(bridge.subscribe());
        }
    }

    /// Stop the clock and drop the bridge subscription. The segment index
    /// and the last known readiness are left untouched.
    pub fn detach(&mut self, bridge: &ExternalAnimationBridge) {
        self.clock.deactivate(false);
        if let Some(subscription) = self.subscription.take() {
            bridge.unsubscribe(subscription.id());
        }
    }

    pub fn subscription_mut(&mut self) -> Option<&mut BridgeSubscription> {
        self.subscription.as_mut()
    }
}

/// Lifecycle of one page index.
///
/// `Parked` is the explicit keep-alive state: the page is offscreen, its
/// clock is cancelled and it observes nothing, but its segment index survives
/// for when it is mounted again. `Vacant` pages are rebuilt from scratch.
#[derive(Debug, Default)]
pub enum PageSlot {
    #[default]
    Vacant,
    Mounted(PageState),
    Parked(PageState),
}

impl PageSlot {
    pub fn is_mounted(&self) -> bool {
        matches!(self, PageSlot::Mounted(_))
    }

    /// Mounted or parked state
    pub fn state(&self) -> Option<&PageState> {
        match self {
            PageSlot::Mounted(state) | PageSlot::Parked(state) => Some(state),
            PageSlot::Vacant => None,
        }
    }

    pub fn mounted(&self) -> Option<&PageState> {
        match self {
            PageSlot::Mounted(state) => Some(state),
            _ => None,
        }
    }

    pub fn mounted_mut(&mut self) -> Option<&mut PageState> {
        match self {
            PageSlot::Mounted(state) => Some(state),
            _ => None,
        }
    }
}
