//! Lets a host restart, start or pause whichever page is active without
//! reaching into per-page state.
//!
//! Commands are multicast to every subscribed page; each page drops the
//! command unless it is the active one.
//!
//! Pages read their queue when the viewer next dispatches an input, so under
//! the driver a command takes effect on the next tick at the latest (one
//! `tick_interval_ms`, 16 ms by default).

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::mpsc;
use tracing::debug;

/// Command sent through the bridge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationCommand {
    Restart,
    Start,
    Pause,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriberId(u64);

#[derive(Debug, Default)]
struct Subscribers {
    next_id: u64,
    senders: BTreeMap<SubscriberId, mpsc::UnboundedSender<AnimationCommand>>,
}

/// Broadcast channel handle. Clones share the same subscriber list.
#[derive(Debug, Clone, Default)]
pub struct ExternalAnimationBridge {
    subscribers: Arc<Mutex<Subscribers>>,
}

/// Receiving end held by one page
#[derive(Debug)]
pub struct BridgeSubscription {
    id: SubscriberId,
    rx: mpsc::UnboundedReceiver<AnimationCommand>,
}

impl BridgeSubscription {
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Take every command received so far
    pub fn drain(&mut self) -> Vec<AnimationCommand> {
        let mut commands = Vec::new();
        while let Ok(command) = self.rx.try_recv() {
            commands.push(command);
        }
        commands
    }
}

impl ExternalAnimationBridge {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Subscribers> {
        self.subscribers.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn subscribe(&self) -> BridgeSubscription {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut subscribers = self.lock();
        let id = SubscriberId(subscribers.next_id);
        subscribers.next_id += 1;
        subscribers.senders.insert(id, tx);
        BridgeSubscription { id, rx }
    }

    /// Remove a subscriber. Safe to call more than once.
    pub fn unsubscribe(&self, id: SubscriberId) -> bool {
        self.lock().senders.remove(&id).is_some()
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock().senders.len()
    }

    /// Send `command` to every subscriber; returns how many received it
    pub fn broadcast(&self, command: AnimationCommand) -> usize {
        let mut subscribers = self.lock();
        // Receivers dropped without unsubscribing are pruned here
        subscribers
            .senders
            .retain(|_, tx| tx.send(command).is_ok());
        let delivered = subscribers.senders.len();
        debug!("Broadcast {:?} to {} page(s)", command, delivered);
        delivered
    }

    pub fn restart(&self) -> usize {
        self.broadcast(AnimationCommand::Restart)
    }

    pub fn start(&self) -> usize {
        self.broadcast(AnimationCommand::Start)
    }

    pub fn pause(&self) -> usize {
        self.broadcast(AnimationCommand::Pause)
    }

    /// Drop all subscribers
    pub fn dispose(&self) {
        self.lock().senders.clear();
    }
}
