//! Async event loop that owns a [`StoryViewer`] and feeds it timer ticks and
//! host input.
//!
//! The viewer itself is synchronous; the driver serialises every input onto
//! one task so a clock completion and its consequences finish before the next
//! tick or gesture is looked at.

use crate::core::StorySource;
use crate::error::{Result, StoryError};
use crate::gesture::{GestureEvent, Region};
use crate::media::MediaReadinessSignal;
use crate::viewer::{StoryViewer, ViewerInput, ViewerObserver};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info};

/// Cloneable handle for sending input to a running driver
#[derive(Debug, Clone)]
pub struct ViewerHandle {
    tx: mpsc::UnboundedSender<ViewerInput>,
    stop: Arc<watch::Sender<bool>>,
}

impl ViewerHandle {
    pub fn send(&self, input: ViewerInput) -> Result<()> {
        self.tx.send(input).map_err(|_| StoryError::ChannelClosed)
    }

    pub fn tap(&self, page: usize, region: Region) -> Result<()> {
        self.send(ViewerInput::Gesture(GestureEvent::tap(page, region)))
    }

    /// Ask the driver to stop; the timer is cancelled before `run` returns
    pub fn stop(&self) {
        let _ = self.stop.send(true);
    }
}

/// Event loop around a viewer
pub struct ViewerDriver<S, O>
where
    S: StorySource,
    O: ViewerObserver<S::Content>,
{
    viewer: StoryViewer<S, O>,
    rx: mpsc::UnboundedReceiver<ViewerInput>,
    stop: watch::Receiver<bool>,
    tick_interval: Duration,
}

impl<S, O> ViewerDriver<S, O>
where
    S: StorySource,
    O: ViewerObserver<S::Content>,
{
    pub fn new(viewer: StoryViewer<S, O>) -> (Self, ViewerHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        let (stop_tx, stop_rx) = watch::channel(false);
        let tick_interval = viewer.config().tick_interval();
        let driver = Self {
            viewer,
            rx,
            stop: stop_rx,
            tick_interval,
        };
        let handle = ViewerHandle {
            tx,
            stop: Arc::new(stop_tx),
        };
        (driver, handle)
    }

    /// Run until stopped or every handle is dropped, then hand the viewer
    /// back. No tick reaches the viewer after this returns.
    pub async fn run(mut self) -> StoryViewer<S, O> {
        let mut interval = tokio::time::interval(self.tick_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut last_tick = Instant::now();

        info!("Viewer driver started ({:?} tick)", self.tick_interval);

        loop {
            tokio::select! {
                biased;

                changed = self.stop.changed() => {
                    if changed.is_err() || *self.stop.borrow() {
                        break;
                    }
                }
                // Ticks go first so a busy input channel cannot starve the clock
                _ = interval.tick() => {
                    let now = Instant::now();
                    self.viewer.tick(now - last_tick);
                    last_tick = now;
                }
                input = self.rx.recv() => match input {
                    Some(input) => self.viewer.dispatch(input),
                    None => {
                        debug!("All viewer handles dropped");
                        break;
                    }
                },
            }
        }

        info!("Viewer driver stopped");
        self.viewer
    }
}

/// Forward a readiness signal for `page` into the driver.
///
/// The current value is sent first. The task ends when the signal is dropped
/// or the driver goes away.
pub fn forward_readiness(page: usize, signal: &MediaReadinessSignal, handle: ViewerHandle) -> JoinHandle<()> {
    let mut rx = signal.subscribe();
    tokio::spawn(async move {
        let readiness = *rx.borrow_and_update();
        if handle.send(ViewerInput::Readiness { page, readiness }).is_err() {
            return;
        }
        while rx.changed().await.is_ok() {
            let readiness = *rx.borrow_and_update();
            if handle.send(ViewerInput::Readiness { page, readiness }).is_err() {
                break;
            }
        }
        debug!("Readiness forwarding for page {} finished", page);
    })
}
