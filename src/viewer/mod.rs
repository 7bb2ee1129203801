//! The composed playback state machine.
//!
//! A [`StoryViewer`] owns page navigation, one arena slot per page (segment
//! index + progress clock), the shared limit gate and the gesture plumbing.
//! Every input goes through [`StoryViewer::dispatch`], which runs to
//! completion before returning: a clock completion, the index advance it
//! causes and the resulting restart / page turn / limit trigger all happen
//! inside one call.
//!
//! Only the active page (`round(position)` while no page turn is in progress)
//! may have a running clock.

pub mod observer;
mod slot;

#[cfg(test)]
mod tests;

pub use observer::{EventLog, LoggedEvent, ViewerEvent, ViewerObserver};
pub use slot::{PageSlot, PageState};

use crate::bridge::{AnimationCommand, ExternalAnimationBridge};
use crate::config::ViewerConfig;
use crate::core::{LimitGate, StorySource};
use crate::gesture::{GestureAction, GestureEvent, GestureRouter, PointerInput, PressTracker, Region};
use crate::media::MediaReadiness;
use crate::navigation::{NavigatorEvent, PageNavigator, ScrollUpdate};
use crate::playback::{AdvanceOutcome, ClockPhase, ClockTick, RetreatOutcome, StoryProgressClock};
use std::time::Duration;
use tracing::{debug, info};

/// Everything that can drive the viewer
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewerInput {
    /// Time passed (timer tick)
    Tick(Duration),
    /// Already-classified gesture
    Gesture(GestureEvent),
    /// Raw pointer input, classified by the viewer
    Pointer(PointerInput),
    /// Movement from the host's scrolling primitive
    Scroll(ScrollUpdate),
    /// Readiness of the content shown on `page`
    Readiness {
        page: usize,
        readiness: MediaReadiness,
    },
    /// Command for the active page's clock
    Animation(AnimationCommand),
}

/// `{page, segment, clock phase}` of the viewer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackSnapshot {
    pub page: usize,
    pub segment: usize,
    pub phase: ClockPhase,
    pub progress: f64,
    /// False while a page turn is in progress
    pub active: bool,
}

/// Paged story player: navigation, per-page segment clocks, gestures and
/// the end-of-content limit behind one [`dispatch`](Self::dispatch) entry point.
pub struct StoryViewer<S, O>
where
    S: StorySource,
    O: ViewerObserver<S::Content>,
{
    source: S,
    observer: O,
    config: ViewerConfig,
    navigator: PageNavigator,
    limit: LimitGate,
    slots: Vec<PageSlot>,
    /// Last readiness reported per page, kept while the page is unmounted
    readiness: Vec<MediaReadiness>,
    active: Option<usize>,
    last_active: Option<usize>,
    bridge: ExternalAnimationBridge,
    router: GestureRouter,
    presses: PressTracker,
    closed: bool,
}

impl<S, O> StoryViewer<S, O>
where
    S: StorySource,
    O: ViewerObserver<S::Content>,
{
    /// Build the viewer and activate `initial_page` (clamped)
    pub fn new(source: S, observer: O, config: ViewerConfig, initial_page: usize) -> Self {
        let config = config.normalized();
        let page_count = source.page_count();
        let mut viewer = Self {
            navigator: PageNavigator::new(page_count, initial_page, config.page_animation()),
            slots: (0..page_count).map(|_| PageSlot::Vacant).collect(),
            readiness: vec![MediaReadiness::default(); page_count],
            router: GestureRouter::new(config.back_region_fraction),
            presses: PressTracker::new(config.long_press()),
            limit: LimitGate::new(),
            active: None,
            last_active: None,
            bridge: ExternalAnimationBridge::new(),
            closed: false,
            source,
            observer,
            config,
        };
        info!(
            "Story viewer with {} page(s), starting at page {}",
            page_count,
            viewer.navigator.current_page()
        );
        viewer.sync();
        viewer
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }

    pub fn navigator(&self) -> &PageNavigator {
        &self.navigator
    }

    /// Handle for hosts that want to restart/start/pause the active page
    pub fn bridge(&self) -> &ExternalAnimationBridge {
        &self.bridge
    }

    pub fn active_page(&self) -> Option<usize> {
        self.active
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn limit_reached(&self) -> bool {
        self.limit.is_reached()
    }

    pub fn slot(&self, page: usize) -> Option<&PageSlot> {
        self.slots.get(page)
    }

    /// Segment index of a mounted or parked page
    pub fn segment_of(&self, page: usize) -> Option<usize> {
        self.slots
            .get(page)
            .and_then(PageSlot::state)
            .map(|s| s.index.current())
    }

    pub fn clock_of(&self, page: usize) -> Option<&StoryProgressClock> {
        self.slots
            .get(page)
            .and_then(PageSlot::mounted)
            .map(|s| &s.clock)
    }

    pub fn snapshot(&self) -> PlaybackSnapshot {
        let page = self.navigator.current_page();
        let state = self.slots.get(page).and_then(PageSlot::state);
        PlaybackSnapshot {
            page,
            segment: state.map(|s| s.index.current()).unwrap_or(0),
            phase: state.map(|s| s.clock.phase()).unwrap_or(ClockPhase::Idle),
            progress: state.map(|s| s.clock.progress()).unwrap_or(0.0),
            active: self.active == Some(page),
        }
    }

    /// Number of clocks currently running. Never more than one.
    pub fn running_clocks(&self) -> usize {
        self.slots
            .iter()
            .filter_map(PageSlot::mounted)
            .filter(|s| s.clock.is_running())
            .count()
    }

    /// Apply one input. This match is the viewer's transition table.
    pub fn dispatch(&mut self, input: ViewerInput) {
        if self.closed {
            return;
        }
        match input {
            ViewerInput::Tick(elapsed) => self.on_tick(elapsed),
            ViewerInput::Gesture(event) => self.on_gesture(event),
            ViewerInput::Pointer(pointer) => self.on_pointer(pointer),
            ViewerInput::Scroll(update) => self.on_scroll(update),
            ViewerInput::Readiness { page, readiness } => self.on_readiness(page, readiness),
            ViewerInput::Animation(command) => {
                if let Some(page) = self.active {
                    self.apply_animation(page, command);
                }
            }
        }
        self.process_bridge();
        self.check_invariants();
    }

    pub fn tick(&mut self, elapsed: Duration) {
        self.dispatch(ViewerInput::Tick(elapsed));
    }

    pub fn gesture(&mut self, event: GestureEvent) {
        self.dispatch(ViewerInput::Gesture(event));
    }

    /// Tap on the active page, if there is one
    pub fn tap(&mut self, region: Region) {
        if let Some(page) = self.active {
            self.gesture(GestureEvent::tap(page, region));
        }
    }

    pub fn scroll(&mut self, update: ScrollUpdate) {
        self.dispatch(ViewerInput::Scroll(update));
    }

    pub fn set_readiness(&mut self, page: usize, readiness: MediaReadiness) {
        self.dispatch(ViewerInput::Readiness { page, readiness });
    }

    /// Programmatic page turn. Out-of-range targets are ignored.
    pub fn animate_to_page(&mut self, page: usize) -> bool {
        if self.closed {
            return false;
        }
        let started = self.navigator.animate_to_page(page);
        if started {
            self.sync();
        }
        started
    }

    /// Apply pending bridge commands. Only the active page acts on them.
    pub fn process_bridge(&mut self) {
        let mut pending = Vec::new();
        for (page, slot) in self.slots.iter_mut().enumerate() {
            if let Some(subscription) = slot.mounted_mut().and_then(PageState::subscription_mut) {
                for command in subscription.drain() {
                    pending.push((page, command));
                }
            }
        }

        for (page, command) in pending {
            if Some(page) == self.active {
                self.apply_animation(page, command);
            }
        }
    }

    /// Permanently drop a page's state; it is rebuilt from the story
    /// source's initial segment if it is mounted again.
    pub fn destroy_page(&mut self, page: usize) {
        let Some(slot) = self.slots.get_mut(page) else {
            return;
        };
        if let PageSlot::Mounted(state) | PageSlot::Parked(state) = slot {
            state.detach(&self.bridge);
        }
        *slot = PageSlot::Vacant;
        if self.active == Some(page) {
            self.active = None;
        }
        debug!("Destroyed page {}", page);
        self.sync();
    }

    /// Detach every page and clear the bridge. Inputs are ignored afterwards.
    pub fn shutdown(&mut self) {
        self.closed = true;
        self.active = None;
        for slot in &mut self.slots {
            if let PageSlot::Mounted(state) | PageSlot::Parked(state) = slot {
                state.detach(&self.bridge);
            }
            *slot = PageSlot::Vacant;
        }
        self.bridge.dispose();
        info!("Story viewer shut down");
    }

    fn on_tick(&mut self, elapsed: Duration) {
        let events = self.navigator.tick(elapsed);
        self.handle_navigator_events(events);

        if let Some(event) = self.presses.hold(elapsed) {
            self.on_gesture(event);
        }

        let before = self.active;
        self.sync();

        // A page activated on this tick starts counting from the next one
        let Some(page) = self.active.filter(|&page| before == Some(page)) else {
            return;
        };
        let tick = match self.slots[page].mounted_mut() {
            Some(state) => state.clock.tick(elapsed),
            None => ClockTick::Stalled,
        };
        if tick == ClockTick::Completed {
            self.on_clock_completed(page);
        }
    }

    fn on_pointer(&mut self, pointer: PointerInput) {
        let event = match pointer {
            PointerInput::Down { x, width } => {
                let Some(page) = self.active else {
                    return;
                };
                let region = self.router.hit_test(x, width);
                Some(self.presses.press(page, region))
            }
            PointerInput::Up => self.presses.release(),
            PointerInput::Cancel => self.presses.cancel(),
        };
        if let Some(event) = event {
            self.on_gesture(event);
        }
    }

    fn on_gesture(&mut self, event: GestureEvent) {
        if Some(event.page) != self.active {
            debug!("Ignoring {:?} for inactive page {}", event.kind, event.page);
            return;
        }
        let page = event.page;

        match self.router.route(event.kind, event.region) {
            GestureAction::Pause => {
                if let Some(state) = self.slots[page].mounted_mut() {
                    state.clock.pause();
                }
            }
            GestureAction::Resume => {
                if let Some(state) = self.slots[page].mounted_mut() {
                    state.clock.start();
                }
            }
            GestureAction::TapBack => self.tap_back(page),
            GestureAction::TapForward => self.tap_forward(page),
        }
    }

    fn tap_back(&mut self, page: usize) {
        let Some(state) = self.slots[page].mounted_mut() else {
            return;
        };
        state.clock.restart();
        match state.index.retreat() {
            RetreatOutcome::Moved(segment) => self.show_segment(page, segment),
            RetreatOutcome::BeforeStart => self.page_back(page),
        }
    }

    fn tap_forward(&mut self, page: usize) {
        let is_last = self.navigator.is_last_page(page);
        let Some(state) = self.slots[page].mounted_mut() else {
            return;
        };
        match state.index.advance() {
            AdvanceOutcome::Moved(segment) => {
                state.clock.restart();
                self.show_segment(page, segment);
            }
            AdvanceOutcome::PastEnd if is_last => {
                state.clock.freeze_complete();
                self.page_forward(page);
            }
            // The clock is left alone: the page turn is about to deactivate it
            AdvanceOutcome::PastEnd => self.page_forward(page),
        }
    }

    fn on_clock_completed(&mut self, page: usize) {
        let Some(state) = self.slots[page].mounted_mut() else {
            return;
        };
        match state.index.advance() {
            AdvanceOutcome::Moved(segment) => {
                state.clock.restart();
                self.show_segment(page, segment);
            }
            AdvanceOutcome::PastEnd => self.page_forward(page),
        }
    }

    fn page_forward(&mut self, page: usize) {
        if self.navigator.is_last_page(page) {
            let observer = &mut self.observer;
            self.limit.trigger(|| observer.on_page_limit_reached());
            return;
        }
        debug!("Page {} finished, moving forward", page);
        self.animate_to_page(page + 1);
    }

    fn page_back(&mut self, page: usize) {
        if page == 0 {
            return;
        }
        debug!("Page {} rewound past its start, moving back", page);
        self.animate_to_page(page - 1);
    }

    fn on_scroll(&mut self, update: ScrollUpdate) {
        let events = self.navigator.apply(update);
        self.handle_navigator_events(events);
        self.sync();

        // A drag takes over the press; the page is no longer active so the
        // resulting release is dropped
        if self.navigator.is_dragging() {
            if let Some(event) = self.presses.cancel() {
                self.on_gesture(event);
            }
        }
    }

    fn on_readiness(&mut self, page: usize, readiness: MediaReadiness) {
        let Some(stored) = self.readiness.get_mut(page) else {
            debug!("Readiness for unknown page {} ignored", page);
            return;
        };
        *stored = readiness;

        let may_autostart = self.active == Some(page) && !self.limit.is_reached();
        match self.slots.get_mut(page).and_then(PageSlot::mounted_mut) {
            Some(state) => {
                if state.clock.set_readiness(readiness, may_autostart) {
                    debug!("Media ready, clock resumed on page {}", page);
                }
            }
            None => debug!("Readiness for unmounted page {} stored", page),
        }
    }

    fn apply_animation(&mut self, page: usize, command: AnimationCommand) {
        let Some(state) = self.slots[page].mounted_mut() else {
            return;
        };
        match command {
            AnimationCommand::Restart => {
                state.clock.restart();
            }
            AnimationCommand::Start => {
                state.clock.start();
            }
            AnimationCommand::Pause => state.clock.pause(),
        }
    }

    fn handle_navigator_events(&mut self, events: Vec<NavigatorEvent>) {
        for event in events {
            match event {
                NavigatorEvent::PageChanged(page) => {
                    info!("Page changed to {}", page);
                    self.observer.on_page_changed(page);
                }
                NavigatorEvent::Overscroll(edge) => {
                    info!("Overscroll past {:?} edge", edge);
                    self.observer.on_page_overscroll(edge);
                }
            }
        }
    }

    fn show_segment(&mut self, page: usize, segment: usize) {
        let content = self.source.render_segment(page, segment);
        self.observer.on_segment_shown(page, segment, &content);
    }

    /// Bring mounts and the active page in line with the navigator
    fn sync(&mut self) {
        if self.closed {
            return;
        }
        self.sync_mounts();
        self.sync_activity();
    }

    fn sync_mounts(&mut self) {
        let Some(last) = self.navigator.last_page() else {
            return;
        };
        let current = self.navigator.current_page();
        let radius = self.config.preload_radius;
        let lo = current.saturating_sub(radius);
        let hi = current.saturating_add(radius).min(last);

        for page in 0..=last {
            if (lo..=hi).contains(&page) {
                self.mount(page);
            } else {
                self.release(page);
            }
        }
    }

    fn mount(&mut self, page: usize) {
        let slot = &mut self.slots[page];
        let mut state = match std::mem::take(slot) {
            PageSlot::Mounted(state) => {
                *slot = PageSlot::Mounted(state);
                return;
            }
            PageSlot::Parked(state) => state,
            PageSlot::Vacant => PageState::new(
                self.source.segment_count(page),
                self.source.initial_segment_index(page),
                self.config.segment_duration(),
            ),
        };
        state.clock.set_readiness(self.readiness[page], false);
        state.attach(&self.bridge);
        *slot = PageSlot::Mounted(state);
        debug!("Mounted page {}", page);
    }

    fn release(&mut self, page: usize) {
        let slot = &mut self.slots[page];
        if !slot.is_mounted() {
            return;
        }
        if let PageSlot::Mounted(mut state) = std::mem::take(slot) {
            state.detach(&self.bridge);
            if self.config.keep_alive {
                *slot = PageSlot::Parked(state);
                debug!("Parked page {}", page);
            } else {
                debug!("Dropped page {}", page);
            }
        }
    }

    fn sync_activity(&mut self) {
        let paging = self.navigator.is_paging();
        let target = if paging || self.navigator.page_count() == 0 {
            None
        } else {
            Some(self.navigator.current_page())
        };

        if target != self.active {
            // Deactivate before activating to keep a single running clock
            if let Some(old) = self.active.take() {
                if let Some(state) = self.slots.get_mut(old).and_then(PageSlot::mounted_mut) {
                    state.clock.deactivate(paging);
                }
            }
            if let Some(page) = target {
                self.activate(page);
            }
        }

        // Activation may have started another page turn
        if !self.navigator.is_paging() {
            let active = self.active;
            for (page, slot) in self.slots.iter_mut().enumerate() {
                if Some(page) == active {
                    continue;
                }
                if let Some(state) = slot.mounted_mut() {
                    state.clock.deactivate(false);
                }
            }
        }
    }

    fn activate(&mut self, page: usize) {
        let arrived_backward = self.last_active.is_some_and(|previous| previous > page);
        self.active = Some(page);
        self.last_active = Some(page);
        let limit_reached = self.limit.is_reached();
        let Some(state) = self.slots[page].mounted_mut() else {
            return;
        };

        // Nothing to show: move on in the direction of travel
        if state.index.segment_count() == 0 {
            info!("Page {} has no segments, skipping", page);
            if arrived_backward && page > 0 {
                self.page_back(page);
            } else {
                self.page_forward(page);
            }
            return;
        }

        // A page turn that was cut short leaves a completed clock behind
        if state.clock.phase() == ClockPhase::Completed && !limit_reached {
            state.clock.restart();
        } else {
            state.clock.start();
        }
        let segment = state.index.current();
        info!("Page {} active at segment {}", page, segment);
        self.show_segment(page, segment);
    }

    fn check_invariants(&self) {
        debug_assert!(self.running_clocks() <= 1, "more than one clock running");
        debug_assert!(
            self.slots
                .iter()
                .enumerate()
                .filter_map(|(page, slot)| slot.mounted().map(|s| (page, s)))
                .all(|(page, s)| !s.clock.is_running() || Some(page) == self.active),
            "clock running on an inactive page"
        );
    }
}
